//! Microphone capture adapters

pub mod cpal_wav;

pub use cpal_wav::CpalWavCapture;
