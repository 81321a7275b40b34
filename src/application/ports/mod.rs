//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod notifier;
pub mod permissions;
pub mod picker;
pub mod player;

// Re-export common types
pub use capture::{CaptureDevice, CaptureError};
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use permissions::{Capability, PermissionGate, PermissionState};
pub use picker::{PickerError, SourcePicker};
pub use player::{PlaybackError, SourcePlayer};
