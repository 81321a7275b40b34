//! Record/playback session state machine

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    SourceSelected,
    Recording,
    Stopped,
}

impl SessionPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SourceSelected => "source-selected",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid phase transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Cannot {action} while in {phase} phase")]
pub struct PhaseError {
    pub phase: SessionPhase,
    pub action: &'static str,
}

/// One record/playback cycle.
///
/// Phase machine:
///   IDLE -> SOURCE_SELECTED (bind_source)
///   SOURCE_SELECTED -> RECORDING (begin_capture)
///   RECORDING -> STOPPED (finish_capture)
///   STOPPED -> IDLE (reset)
///
/// Re-binding a source while one is already selected is allowed; the capture
/// path is present exactly while the phase is Recording or Stopped.
#[derive(Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    source: Option<PathBuf>,
    capture_path: Option<PathBuf>,
}

impl Session {
    /// Create a new session in the idle phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The bound playback source, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The temporary capture path, present iff Recording or Stopped
    pub fn capture_path(&self) -> Option<&Path> {
        self.capture_path.as_deref()
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.phase == SessionPhase::Recording
    }

    /// Bind a playback source: IDLE or SOURCE_SELECTED -> SOURCE_SELECTED
    pub fn bind_source(&mut self, source: PathBuf) -> Result<(), PhaseError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::SourceSelected => {
                self.source = Some(source);
                self.phase = SessionPhase::SourceSelected;
                Ok(())
            }
            phase => Err(PhaseError {
                phase,
                action: "bind a source",
            }),
        }
    }

    /// Transition from SOURCE_SELECTED to RECORDING, assigning the capture path
    pub fn begin_capture(&mut self, capture_path: PathBuf) -> Result<(), PhaseError> {
        if self.phase != SessionPhase::SourceSelected {
            return Err(PhaseError {
                phase: self.phase,
                action: "begin capturing",
            });
        }
        self.capture_path = Some(capture_path);
        self.phase = SessionPhase::Recording;
        Ok(())
    }

    /// Transition from RECORDING to STOPPED
    pub fn finish_capture(&mut self) -> Result<(), PhaseError> {
        if self.phase != SessionPhase::Recording {
            return Err(PhaseError {
                phase: self.phase,
                action: "finish capturing",
            });
        }
        self.phase = SessionPhase::Stopped;
        Ok(())
    }

    /// Return to IDLE, clearing the source and capture path
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
