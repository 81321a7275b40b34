//! File picker port interface

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Picker errors
#[derive(Debug, Clone, Error)]
pub enum PickerError {
    #[error("File picker failed: {0}")]
    Failed(String),
}

/// Port for the host shell's audio file chooser.
#[async_trait]
pub trait SourcePicker: Send + Sync {
    /// Ask the user for an audio file.
    ///
    /// # Returns
    /// `Ok(None)` when the user cancelled; callers treat that as a silent
    /// no-op, not an error.
    async fn pick(&self) -> Result<Option<PathBuf>, PickerError>;
}

/// Blanket implementation for boxed picker types
#[async_trait]
impl SourcePicker for Box<dyn SourcePicker> {
    async fn pick(&self) -> Result<Option<PathBuf>, PickerError> {
        self.as_ref().pick().await
    }
}
