//! Application configuration value object

use serde::{Deserialize, Serialize};

/// Output sample rate used when the config does not name one
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub output_dir: Option<String>,
    pub sample_rate: Option<u32>,
    pub notify: Option<bool>,
    pub require_storage_permission: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            output_dir: None,
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            notify: Some(false),
            require_storage_permission: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            output_dir: other.output_dir.or(self.output_dir),
            sample_rate: other.sample_rate.or(self.sample_rate),
            notify: other.notify.or(self.notify),
            require_storage_permission: other
                .require_storage_permission
                .or(self.require_storage_permission),
        }
    }

    /// Get the sample rate, or 44.1 kHz if not set
    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Get the notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    /// Get the legacy storage-permission setting, or false if not set
    pub fn require_storage_permission_or_default(&self) -> bool {
        self.require_storage_permission.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.output_dir.is_none());
        assert_eq!(config.sample_rate, Some(44_100));
        assert_eq!(config.notify, Some(false));
        assert_eq!(config.require_storage_permission, Some(false));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.output_dir.is_none());
        assert!(config.sample_rate.is_none());
        assert!(config.notify.is_none());
        assert!(config.require_storage_permission.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            output_dir: Some("/base".to_string()),
            sample_rate: Some(44_100),
            ..Default::default()
        };

        let other = AppConfig {
            output_dir: Some("/other".to_string()),
            sample_rate: None, // Should not override
            notify: Some(true),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.output_dir, Some("/other".to_string()));
        assert_eq!(merged.sample_rate, Some(44_100)); // Kept from base
        assert_eq!(merged.notify, Some(true));
    }

    #[test]
    fn merge_preserves_base_when_other_is_none() {
        let base = AppConfig {
            output_dir: Some("/base".to_string()),
            require_storage_permission: Some(true),
            ..Default::default()
        };

        let merged = base.merge(AppConfig::empty());

        assert_eq!(merged.output_dir, Some("/base".to_string()));
        assert_eq!(merged.require_storage_permission, Some(true));
    }

    #[test]
    fn sample_rate_or_default_uses_default_on_none() {
        let config = AppConfig::empty();
        assert_eq!(config.sample_rate_or_default(), 44_100);
    }

    #[test]
    fn sample_rate_or_default_uses_configured() {
        let config = AppConfig {
            sample_rate: Some(48_000),
            ..Default::default()
        };
        assert_eq!(config.sample_rate_or_default(), 48_000);
    }

    #[test]
    fn boolean_defaults() {
        let config = AppConfig::empty();
        assert!(!config.notify_or_default());
        assert!(!config.require_storage_permission_or_default());
    }
}
