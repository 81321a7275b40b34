//! Save-name value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidSaveName;

/// Validated base name for a saved recording.
/// Trimmed on parse; never empty and never contains path separators or NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveName(String);

impl SaveName {
    /// The validated name as a plain string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SaveName {
    type Err = InvalidSaveName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidSaveName {
                input: s.to_string(),
            });
        }
        if trimmed.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return Err(InvalidSaveName {
                input: s.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for SaveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name_parses() {
        let name: SaveName = "take one".parse().unwrap();
        assert_eq!(name.as_str(), "take one");
    }

    #[test]
    fn name_is_trimmed() {
        let name: SaveName = "  vocals  ".parse().unwrap();
        assert_eq!(name.as_str(), "vocals");
    }

    #[test]
    fn empty_name_rejected() {
        assert!("".parse::<SaveName>().is_err());
    }

    #[test]
    fn whitespace_only_name_rejected() {
        assert!("   ".parse::<SaveName>().is_err());
        assert!("\t\n".parse::<SaveName>().is_err());
    }

    #[test]
    fn path_separators_rejected() {
        assert!("a/b".parse::<SaveName>().is_err());
        assert!("a\\b".parse::<SaveName>().is_err());
        assert!("../escape".parse::<SaveName>().is_err());
    }

    #[test]
    fn nul_rejected() {
        assert!("bad\0name".parse::<SaveName>().is_err());
    }

    #[test]
    fn error_reports_original_input() {
        let err = "  ".parse::<SaveName>().unwrap_err();
        assert_eq!(err.input, "  ");
    }
}
