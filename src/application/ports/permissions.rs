//! Permission port interface

use async_trait::async_trait;
use std::fmt;

/// Capabilities the session needs from the host before touching hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Microphone,
    Storage,
}

impl Capability {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Storage => "storage",
        }
    }

    /// Why the capability is needed, phrased for the user
    pub const fn rationale(&self) -> &'static str {
        match self {
            Self::Microphone => "Microphone access is needed to record your voice over the track",
            Self::Storage => "Storage access is needed to save recordings",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a capability query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Port for the host permission subsystem.
///
/// The controller only reacts to granted/denied outcomes; any request UI
/// belongs to the host shell.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Query whether a capability is currently granted.
    async fn query(&self, capability: Capability) -> PermissionState;
}
