//! Application layer - Use cases and port interfaces

pub mod ports;
pub mod session;

pub use session::{RecordingSession, SessionConfig, SessionError, OUTPUT_EXTENSION};
