//! Picker fed by a path the user already supplied on the command line

use std::path::PathBuf;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;

use crate::application::ports::{PickerError, SourcePicker};

/// One-shot picker wrapping a command-line argument.
/// The path is handed out once; later picks report a cancel.
pub struct ArgSourcePicker {
    path: StdMutex<Option<PathBuf>>,
}

impl ArgSourcePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: StdMutex::new(path),
        }
    }
}

#[async_trait]
impl SourcePicker for ArgSourcePicker {
    async fn pick(&self) -> Result<Option<PathBuf>, PickerError> {
        Ok(self.path.lock().unwrap().take())
    }
}
