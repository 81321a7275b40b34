//! Playback port interface

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Source file not readable: {0}")]
    SourceNotReadable(String),

    #[error("Source cannot be decoded: {0}")]
    UnsupportedSource(String),

    #[error("No audio output device available: {0}")]
    NoOutputDevice(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Port for the playback resource bound to a user-selected source file
#[async_trait]
pub trait SourcePlayer: Send + Sync {
    /// Validate a source file and prepare it for low-latency start.
    ///
    /// # Errors
    /// Fails when the file cannot be opened or its format is not decodable.
    async fn prepare(&self, source: &Path) -> Result<(), PlaybackError>;

    /// Start playback of the prepared source.
    async fn start(&self) -> Result<(), PlaybackError>;

    /// Stop playback. Idempotent; a no-op when nothing is playing.
    async fn stop(&self);
}
