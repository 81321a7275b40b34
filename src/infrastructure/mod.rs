//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio hardware, the terminal, and the filesystem.

pub mod capture;
pub mod config;
pub mod notification;
pub mod permissions;
pub mod picker;
pub mod playback;

// Re-export adapters
pub use capture::CpalWavCapture;
pub use config::XdgConfigStore;
pub use notification::NotifyRustNotifier;
pub use permissions::HostPermissionGate;
pub use picker::{ArgSourcePicker, PromptSourcePicker};
pub use playback::RodioPlayer;
