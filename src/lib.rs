//! Overdub - play a backing track while recording the microphone
//!
//! This crate records microphone input while a user-selected audio file
//! plays, then renames the finished capture to a user-chosen name.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session entity, phase state machine, value objects, errors
//! - **Application**: The recording session use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal capture, rodio playback,
//!   file picker, permission gate, notifications, config store)
//! - **CLI**: Command-line interface, argument parsing, and the interactive flow

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod logging;
