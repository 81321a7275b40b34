//! Permission gate adapters

pub mod host;

pub use host::HostPermissionGate;
