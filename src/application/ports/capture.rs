//! Capture port interface

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Capture device busy: {0}")]
    DeviceBusy(String),

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture stream failed: {0}")]
    StreamFailed(String),

    #[error("Failed to finalize capture file: {0}")]
    FinalizeFailed(String),
}

/// Port for the microphone capture resource.
///
/// `start` opens the device and begins appending audio to `output`;
/// `stop` flushes and closes the file before returning, so the caller may
/// rename or reopen it immediately afterwards.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the capture device and start writing to `output`.
    async fn start(&self, output: &Path) -> Result<(), CaptureError>;

    /// Stop capturing, flush and close the output file.
    /// A no-op when no capture is active.
    async fn stop(&self) -> Result<(), CaptureError>;

    /// Check if a capture is currently running
    fn is_capturing(&self) -> bool;

    /// Get elapsed capture time in milliseconds
    fn elapsed_ms(&self) -> u64;
}
