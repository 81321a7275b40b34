//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Overdub - play a backing track while recording the microphone
#[derive(Parser, Debug)]
#[command(name = "overdub")]
#[command(version)]
#[command(about = "Play a backing track while recording the microphone, then save the take")]
#[command(long_about = None)]
pub struct Cli {
    /// Audio file to play along with (prompted for interactively when omitted)
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory for temporary and saved recordings
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Capture sample rate in Hz
    #[arg(short = 'r', long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(8_000..=192_000))]
    pub sample_rate: Option<u32>,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Save name decided up front (skips the interactive save prompt)
    #[arg(short = 's', long, value_name = "NAME")]
    pub save_as: Option<String>,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub source: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub sample_rate: u32,
    pub notify: bool,
    pub require_storage_permission: bool,
    pub save_as: Option<String>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "output_dir",
    "sample_rate",
    "notify",
    "require_storage_permission",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
