//! Recording session use case
//!
//! Owns the record/playback lifecycle: pick a source, capture the microphone
//! while the source plays, stop both, and rename the finished capture to a
//! user-chosen name. All hardware and host-shell access goes through ports.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::error::InvalidSaveName;
use crate::domain::session::{SaveName, Session, SessionPhase};

use super::ports::{
    Capability, CaptureDevice, NotificationIcon, Notifier, PermissionGate, PermissionState,
    SourcePicker, SourcePlayer,
};

/// Fixed extension for temporary captures and saved recordings
pub const OUTPUT_EXTENSION: &str = "wav";

/// Prefix for temporary capture filenames
const TEMP_PREFIX: &str = "take-";

/// Errors from the recording session use case
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    #[error("Capture unavailable: {reason}")]
    CaptureUnavailable { reason: String },

    #[error("{capability} permission denied")]
    PermissionDenied { capability: Capability },

    #[error("{0}")]
    InvalidName(#[from] InvalidSaveName),

    #[error("Save failed: {reason}")]
    SaveFailed { reason: String },
}

/// Configuration for a recording session controller
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory for temporary captures and saved recordings
    pub output_dir: PathBuf,
    /// Also require the storage capability before recording
    pub require_storage_permission: bool,
    /// Whether to show desktop notifications
    pub enable_notify: bool,
}

/// Recording session controller, generic over its ports.
///
/// A single session is live at a time. Commands arrive from one foreground
/// control flow; the capture adapter owns the only background worker.
pub struct RecordingSession<P, C, F, G, N>
where
    P: SourcePlayer,
    C: CaptureDevice,
    F: SourcePicker,
    G: PermissionGate,
    N: Notifier,
{
    player: P,
    capture: C,
    picker: F,
    permissions: G,
    notifier: N,
    session: Arc<Mutex<Session>>,
    config: SessionConfig,
}

impl<P, C, F, G, N> RecordingSession<P, C, F, G, N>
where
    P: SourcePlayer,
    C: CaptureDevice,
    F: SourcePicker,
    G: PermissionGate,
    N: Notifier,
{
    /// Create a new controller with an idle session
    pub fn new(
        player: P,
        capture: C,
        picker: F,
        permissions: G,
        notifier: N,
        config: SessionConfig,
    ) -> Self {
        Self {
            player,
            capture,
            picker,
            permissions,
            notifier,
            session: Arc::new(Mutex::new(Session::new())),
            config,
        }
    }

    /// Get the current session phase
    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    /// Check if a capture is currently running
    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    /// Get elapsed capture time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.capture.elapsed_ms()
    }

    /// Drive the host file chooser and bind the picked file as the playback
    /// source. Returns `Ok(None)` when the user cancelled, which is a silent
    /// no-op, or when a pick arrives outside the idle/source-selected phases.
    pub async fn select_source(&self) -> Result<Option<PathBuf>, SessionError> {
        let picked = self
            .picker
            .pick()
            .await
            .map_err(|e| SessionError::SourceUnavailable {
                reason: e.to_string(),
            })?;
        let Some(path) = picked else {
            tracing::debug!("file pick cancelled");
            return Ok(None);
        };

        {
            let session = self.session.lock().await;
            match session.phase() {
                SessionPhase::Idle | SessionPhase::SourceSelected => {}
                phase => {
                    tracing::debug!(%phase, "ignoring source pick outside idle");
                    return Ok(None);
                }
            }
        }

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            SessionError::SourceUnavailable {
                reason: format!("{}: {}", path.display(), e),
            }
        })?;
        if !metadata.is_file() {
            return Err(SessionError::SourceUnavailable {
                reason: format!("{} is not a file", path.display()),
            });
        }

        self.player
            .prepare(&path)
            .await
            .map_err(|e| SessionError::SourceUnavailable {
                reason: e.to_string(),
            })?;

        let mut session = self.session.lock().await;
        session
            .bind_source(path.clone())
            .map_err(|e| SessionError::SourceUnavailable {
                reason: e.to_string(),
            })?;
        tracing::info!(source = %path.display(), "source bound");
        Ok(Some(path))
    }

    /// Start capturing the microphone and playing the bound source.
    /// The two streams are started back to back, best-effort concurrent;
    /// they are not sample-synchronized.
    pub async fn start(&self) -> Result<PathBuf, SessionError> {
        self.check_permissions().await?;

        {
            let session = self.session.lock().await;
            match session.phase() {
                SessionPhase::SourceSelected => {}
                SessionPhase::Recording => {
                    return Err(SessionError::CaptureUnavailable {
                        reason: "a recording is already in progress".to_string(),
                    });
                }
                phase => {
                    return Err(SessionError::CaptureUnavailable {
                        reason: format!("no source selected ({phase} phase)"),
                    });
                }
            }
        }

        let capture_path =
            self.fresh_capture_path()
                .await
                .map_err(|e| SessionError::CaptureUnavailable {
                    reason: e.to_string(),
                })?;

        self.capture
            .start(&capture_path)
            .await
            .map_err(|e| SessionError::CaptureUnavailable {
                reason: e.to_string(),
            })?;

        if let Err(e) = self.player.start().await {
            // half-started session: release the capture and drop its file
            let _ = self.capture.stop().await;
            let _ = tokio::fs::remove_file(&capture_path).await;
            return Err(SessionError::SourceUnavailable {
                reason: e.to_string(),
            });
        }

        {
            let mut session = self.session.lock().await;
            session
                .begin_capture(capture_path.clone())
                .map_err(|e| SessionError::CaptureUnavailable {
                    reason: e.to_string(),
                })?;
        }

        if self.config.enable_notify {
            let _ = self
                .notifier
                .notify("Overdub", "Recording started", NotificationIcon::Recording)
                .await;
        }
        tracing::info!(path = %capture_path.display(), "recording started");
        Ok(capture_path)
    }

    /// Stop playback and capture. Outside the recording phase this is a
    /// tolerated no-op returning `Ok(None)`.
    ///
    /// The capture file is flushed and closed before this returns, so the
    /// session can be saved (renamed) immediately afterwards.
    pub async fn stop(&self) -> Result<Option<PathBuf>, SessionError> {
        self.player.stop().await;

        let recording = self.session.lock().await.phase() == SessionPhase::Recording;
        if !recording {
            return Ok(None);
        }

        let stop_result = self.capture.stop().await;

        let path = {
            let mut session = self.session.lock().await;
            session
                .finish_capture()
                .map_err(|e| SessionError::CaptureUnavailable {
                    reason: e.to_string(),
                })?;
            session.capture_path().map(Path::to_path_buf)
        };

        stop_result.map_err(|e| SessionError::CaptureUnavailable {
            reason: e.to_string(),
        })?;
        tracing::info!("recording stopped");
        Ok(path)
    }

    /// Rename the finished capture to `<output dir>/<name>.wav`.
    ///
    /// An invalid name or a failed rename leaves the temporary file in place
    /// and the session stopped, so the caller can retry. On success the
    /// session resets to idle.
    pub async fn save_as(&self, name: &str) -> Result<PathBuf, SessionError> {
        let name: SaveName = name.parse()?;

        let mut session = self.session.lock().await;
        if session.phase() != SessionPhase::Stopped {
            return Err(SessionError::SaveFailed {
                reason: "no finished recording to save".to_string(),
            });
        }
        let temp = session
            .capture_path()
            .map(Path::to_path_buf)
            .ok_or_else(|| SessionError::SaveFailed {
                reason: "capture path missing".to_string(),
            })?;

        let parent = temp.parent().unwrap_or_else(|| Path::new("."));
        let dest = parent.join(format!("{}.{}", name, OUTPUT_EXTENSION));
        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            drop(session);
            return Err(self
                .save_failure(format!("{} already exists", dest.display()))
                .await);
        }

        if let Err(e) = tokio::fs::rename(&temp, &dest).await {
            drop(session);
            return Err(self.save_failure(e.to_string()).await);
        }

        session.reset();
        drop(session);

        if self.config.enable_notify {
            let _ = self
                .notifier
                .notify(
                    "Overdub",
                    &format!("Saved {}", dest.display()),
                    NotificationIcon::Success,
                )
                .await;
        }
        tracing::info!(path = %dest.display(), "recording saved");
        Ok(dest)
    }

    /// Decline to save: reset the session and keep the temporary file on
    /// disk. Returns the kept path, if a capture had finished. A recording
    /// still in flight is stopped first.
    pub async fn discard(&self) -> Result<Option<PathBuf>, SessionError> {
        if self.session.lock().await.phase() == SessionPhase::Recording {
            self.stop().await?;
        }

        let mut session = self.session.lock().await;
        let kept = session.capture_path().map(Path::to_path_buf);
        session.reset();
        if let Some(ref path) = kept {
            tracing::info!(path = %path.display(), "save declined, temp file kept");
        }
        Ok(kept)
    }

    /// Report a failed save, leaving the session stopped for a retry
    async fn save_failure(&self, reason: String) -> SessionError {
        if self.config.enable_notify {
            let _ = self
                .notifier
                .notify("Overdub", "Save failed", NotificationIcon::Warning)
                .await;
        }
        SessionError::SaveFailed { reason }
    }

    async fn check_permissions(&self) -> Result<(), SessionError> {
        if self.permissions.query(Capability::Microphone).await == PermissionState::Denied {
            return Err(SessionError::PermissionDenied {
                capability: Capability::Microphone,
            });
        }
        if self.config.require_storage_permission
            && self.permissions.query(Capability::Storage).await == PermissionState::Denied
        {
            return Err(SessionError::PermissionDenied {
                capability: Capability::Storage,
            });
        }
        Ok(())
    }

    /// Allocate a timestamped capture path that collides with no existing file
    async fn fresh_capture_path(&self) -> Result<PathBuf, std::io::Error> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let mut candidate = self
            .config
            .output_dir
            .join(format!("{TEMP_PREFIX}{millis}.{OUTPUT_EXTENSION}"));
        let mut bump = 1u32;
        while tokio::fs::try_exists(&candidate).await? {
            candidate = self
                .config
                .output_dir
                .join(format!("{TEMP_PREFIX}{millis}-{bump}.{OUTPUT_EXTENSION}"));
            bump += 1;
        }
        Ok(candidate)
    }
}
