use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much a release changes the public surface.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `None < Patch < Minor < Major`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeLevel {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl ChangeLevel {
    /// All levels in ascending order
    pub const ALL: [ChangeLevel; 4] = [
        ChangeLevel::None,
        ChangeLevel::Patch,
        ChangeLevel::Minor,
        ChangeLevel::Major,
    ];

    /// Lowercase name used in labels, config files and output
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeLevel::None => "none",
            ChangeLevel::Patch => "patch",
            ChangeLevel::Minor => "minor",
            ChangeLevel::Major => "major",
        }
    }

    /// Floor this level at `min` and cap it at `max`.
    pub fn clamp_between(self, min: ChangeLevel, max: ChangeLevel) -> ChangeLevel {
        self.max(min).min(max)
    }
}

impl fmt::Display for ChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeLevel {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(ChangeLevel::None),
            "patch" => Ok(ChangeLevel::Patch),
            "minor" => Ok(ChangeLevel::Minor),
            "major" => Ok(ChangeLevel::Major),
            other => Err(ReleaseError::config(format!(
                "unknown change level '{}': expected one of none, patch, minor, major",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(ChangeLevel::None < ChangeLevel::Patch);
        assert!(ChangeLevel::Patch < ChangeLevel::Minor);
        assert!(ChangeLevel::Minor < ChangeLevel::Major);
        assert_eq!(ChangeLevel::ALL.iter().max(), Some(&ChangeLevel::Major));
    }

    #[test]
    fn test_display_and_parse() {
        for level in ChangeLevel::ALL {
            assert_eq!(level.to_string().parse::<ChangeLevel>().unwrap(), level);
        }
        assert_eq!("MINOR".parse::<ChangeLevel>().unwrap(), ChangeLevel::Minor);
        assert!("huge".parse::<ChangeLevel>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChangeLevel::Major).unwrap(),
            "\"major\""
        );
        let level: ChangeLevel = serde_json::from_str("\"patch\"").unwrap();
        assert_eq!(level, ChangeLevel::Patch);
    }

    #[test]
    fn test_clamp_between() {
        assert_eq!(
            ChangeLevel::None.clamp_between(ChangeLevel::Patch, ChangeLevel::Major),
            ChangeLevel::Patch
        );
        assert_eq!(
            ChangeLevel::Major.clamp_between(ChangeLevel::None, ChangeLevel::Minor),
            ChangeLevel::Minor
        );
        assert_eq!(
            ChangeLevel::Minor.clamp_between(ChangeLevel::Patch, ChangeLevel::Major),
            ChangeLevel::Minor
        );
    }
}
