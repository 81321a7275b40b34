//! Interactive picker reading a path from stdin

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use colored::Colorize;

use crate::application::ports::{PickerError, SourcePicker};

/// Asks for a source path on the terminal; a blank line cancels.
pub struct PromptSourcePicker;

impl PromptSourcePicker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PromptSourcePicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourcePicker for PromptSourcePicker {
    async fn pick(&self) -> Result<Option<PathBuf>, PickerError> {
        tokio::task::spawn_blocking(|| {
            eprint!("{} Audio file to play along with (blank to cancel): ", "?".cyan());
            io::stderr()
                .flush()
                .map_err(|e| PickerError::Failed(e.to_string()))?;

            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| PickerError::Failed(e.to_string()))?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(PathBuf::from(trimmed)))
            }
        })
        .await
        .map_err(|e| PickerError::Failed(format!("task join error: {e}")))?
    }
}
