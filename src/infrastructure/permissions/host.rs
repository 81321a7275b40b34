//! Permission gate for desktop hosts
//!
//! Desktops have no runtime permission dialogs; capability checks reduce to
//! probing that the resource is actually usable.

use std::path::PathBuf;

use async_trait::async_trait;
use cpal::traits::HostTrait;

use crate::application::ports::{Capability, PermissionGate, PermissionState};

/// Probe-based permission gate.
/// Microphone is granted when an input device exists; storage is granted
/// when the output directory can be created and written.
pub struct HostPermissionGate {
    output_dir: PathBuf,
}

impl HostPermissionGate {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl PermissionGate for HostPermissionGate {
    async fn query(&self, capability: Capability) -> PermissionState {
        match capability {
            Capability::Microphone => {
                let present =
                    tokio::task::spawn_blocking(|| cpal::default_host().default_input_device().is_some())
                        .await
                        .unwrap_or(false);
                if present {
                    PermissionState::Granted
                } else {
                    tracing::warn!("no input device found, treating microphone as denied");
                    PermissionState::Denied
                }
            }
            Capability::Storage => match tokio::fs::create_dir_all(&self.output_dir).await {
                Ok(()) => PermissionState::Granted,
                Err(e) => {
                    tracing::warn!(dir = %self.output_dir.display(), "output dir not writable: {e}");
                    PermissionState::Denied
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_granted_for_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let gate = HostPermissionGate::new(dir.path().join("recordings"));
        assert_eq!(
            gate.query(Capability::Storage).await,
            PermissionState::Granted
        );
    }

    #[tokio::test]
    async fn storage_denied_when_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blocker");
        std::fs::write(&file, b"").unwrap();

        // A directory cannot be created under a regular file
        let gate = HostPermissionGate::new(file.join("recordings"));
        assert_eq!(
            gate.query(Capability::Storage).await,
            PermissionState::Denied
        );
    }
}
