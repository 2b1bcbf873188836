//! Pre-release suffix handling
//!
//! A suffix such as `alpha.33` is split into its text part (`alpha`) and a
//! trailing numeric iteration (`33`). Either part may be missing: `2` has no
//! text and `rc0` has no iteration.

use crate::error::{ReleaseError, Result};
use semver::Prerelease;
use std::fmt;

/// A pre-release suffix split into track label and iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrereleaseSuffix {
    /// Everything before the trailing numeric component
    pub label: String,
    /// The trailing numeric component, if there is one
    pub iteration: Option<u64>,
}

impl PrereleaseSuffix {
    /// Start a new track: `<prefix>.0`, or just `0` without a prefix
    pub fn start(prefix: &str) -> Self {
        PrereleaseSuffix {
            label: prefix.to_string(),
            iteration: Some(0),
        }
    }

    /// Split a suffix like `beta.4` into `("beta", Some(4))`
    pub fn parse(pre: &str) -> Self {
        let (label, last) = match pre.rsplit_once('.') {
            Some((label, last)) => (label, last),
            None => ("", pre),
        };

        match parse_numeric(last) {
            Some(n) => PrereleaseSuffix {
                label: label.to_string(),
                iteration: Some(n),
            },
            None => PrereleaseSuffix {
                label: pre.to_string(),
                iteration: None,
            },
        }
    }

    /// Next suffix on the same track.
    ///
    /// Increments the iteration, or starts one at `0` when there is none
    /// (`rc0` becomes `rc0.0`). The label is kept unchanged.
    pub fn increment_iteration(&self) -> Result<Self> {
        let iteration = match self.iteration {
            Some(n) => n.checked_add(1).ok_or_else(|| {
                ReleaseError::version(format!("pre-release iteration overflow in \"{}\"", self))
            })?,
            None => 0,
        };

        Ok(PrereleaseSuffix {
            label: self.label.clone(),
            iteration: Some(iteration),
        })
    }

    /// Whether this suffix belongs to the track named `prefix`
    pub fn is_track(&self, prefix: &str) -> bool {
        self.label == prefix
    }

    pub fn to_prerelease(&self) -> Result<Prerelease> {
        let text = self.to_string();
        Prerelease::new(&text).map_err(|e| {
            ReleaseError::version(format!("invalid pre-release \"{}\": {}", text, e))
        })
    }
}

fn parse_numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for PrereleaseSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.label.is_empty(), self.iteration) {
            (_, None) => write!(f, "{}", self.label),
            (true, Some(n)) => write!(f, "{}", n),
            (false, Some(n)) => write!(f, "{}.{}", self.label, n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_label_and_iteration() {
        let s = PrereleaseSuffix::parse("alpha.33");
        assert_eq!(s.label, "alpha");
        assert_eq!(s.iteration, Some(33));
    }

    #[test]
    fn test_parse_numeric_only() {
        let s = PrereleaseSuffix::parse("2");
        assert_eq!(s.label, "");
        assert_eq!(s.iteration, Some(2));
    }

    #[test]
    fn test_parse_without_iteration() {
        let s = PrereleaseSuffix::parse("rc0");
        assert_eq!(s.label, "rc0");
        assert_eq!(s.iteration, None);
    }

    #[test]
    fn test_parse_dotted_label() {
        let s = PrereleaseSuffix::parse("x.y.7");
        assert_eq!(s.label, "x.y");
        assert_eq!(s.iteration, Some(7));
    }

    #[test]
    fn test_increment_iteration() {
        let s = PrereleaseSuffix::parse("beta.1").increment_iteration().unwrap();
        assert_eq!(s.to_string(), "beta.2");

        let s = PrereleaseSuffix::parse("2").increment_iteration().unwrap();
        assert_eq!(s.to_string(), "3");
    }

    #[test]
    fn test_increment_appends_iteration() {
        let s = PrereleaseSuffix::parse("rc0").increment_iteration().unwrap();
        assert_eq!(s.to_string(), "rc0.0");
    }

    #[test]
    fn test_increment_overflow() {
        let s = PrereleaseSuffix {
            label: "a".to_string(),
            iteration: Some(u64::MAX),
        };
        assert!(s.increment_iteration().is_err());
    }

    #[test]
    fn test_start() {
        assert_eq!(PrereleaseSuffix::start("").to_string(), "0");
        assert_eq!(PrereleaseSuffix::start("alpha").to_string(), "alpha.0");
    }

    #[test]
    fn test_to_prerelease_rejects_invalid_text() {
        assert!(PrereleaseSuffix::start("bad_track").to_prerelease().is_err());
        assert_eq!(
            PrereleaseSuffix::start("rc").to_prerelease().unwrap().as_str(),
            "rc.0"
        );
    }

    #[test]
    fn test_is_track() {
        let s = PrereleaseSuffix::parse("beta.0");
        assert!(s.is_track("beta"));
        assert!(!s.is_track("alpha"));
    }
}
