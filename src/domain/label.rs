//! Pull request label classification
//!
//! Labels are compared case-insensitively. Resolution order is: built-in exact
//! match, then a configured alias, then a marker prefix such as
//! `semver:prerelease:alpha`.

use crate::domain::ChangeLevel;
use crate::error::{ReleaseError, Result};
use std::collections::HashMap;

/// Label marking a pull request as pre-release work
pub const PRERELEASE_LABEL: &str = "semver:prerelease";

/// Label marking a pull request as ready for a stable release
pub const STABLE_LABEL: &str = "semver:stable";

const BUILTIN_LEVELS: &[(&str, ChangeLevel)] = &[
    ("semver:breaking", ChangeLevel::Major),
    ("semver:major", ChangeLevel::Major),
    ("breaking", ChangeLevel::Major),
    ("breaking change", ChangeLevel::Major),
    ("major", ChangeLevel::Major),
    ("semver:minor", ChangeLevel::Minor),
    ("minor", ChangeLevel::Minor),
    ("enhancement", ChangeLevel::Minor),
    ("feature", ChangeLevel::Minor),
    ("semver:patch", ChangeLevel::Patch),
    ("patch", ChangeLevel::Patch),
    ("fix", ChangeLevel::Patch),
    ("bug", ChangeLevel::Patch),
    ("bugfix", ChangeLevel::Patch),
    ("semver:none", ChangeLevel::None),
    ("none", ChangeLevel::None),
    ("no change", ChangeLevel::None),
];

/// What a single label means for the release decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMeaning {
    /// The label sets a change level
    Level(ChangeLevel),
    /// The label requests a pre-release, optionally on a named track
    Prerelease { prefix: String },
    /// The label requests a stable release
    Stable,
    /// The label has no release meaning
    Unrecognized,
}

impl LabelMeaning {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, LabelMeaning::Unrecognized)
    }
}

/// Maps raw label strings to their [`LabelMeaning`].
///
/// Built once from configuration and shared read-only by every pull.
#[derive(Debug, Clone, Default)]
pub struct LabelClassifier {
    aliases: HashMap<String, String>,
}

impl LabelClassifier {
    /// Classifier with only the built-in labels
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier with additional `alias -> canonical label` mappings.
    ///
    /// Every target must itself be a built-in label or marker.
    pub fn with_aliases<I, K, V>(aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (alias, target) in aliases {
            let alias = normalize(alias.as_ref());
            let target = normalize(target.as_ref());
            if alias.is_empty() {
                return Err(ReleaseError::config("label alias cannot be empty"));
            }
            if !builtin(&target).is_recognized() {
                return Err(ReleaseError::config(format!(
                    "label alias \"{}\" targets unknown label \"{}\"",
                    alias, target
                )));
            }
            map.insert(alias, target);
        }
        Ok(LabelClassifier { aliases: map })
    }

    /// Number of configured aliases
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Classify one raw label
    pub fn classify(&self, label: &str) -> LabelMeaning {
        let label = normalize(label);

        if let Some(meaning) = builtin_exact(&label) {
            return meaning;
        }

        if let Some(target) = self.aliases.get(&label) {
            return builtin(target);
        }

        if let Some(meaning) = builtin_prefixed(&label) {
            return meaning;
        }

        self.alias_prefixed(&label)
            .unwrap_or(LabelMeaning::Unrecognized)
    }

    // `<alias>:<suffix>` where the alias stands for one of the markers
    fn alias_prefixed(&self, label: &str) -> Option<LabelMeaning> {
        let (head, _) = label.split_once(':')?;
        let mut candidate = head.to_string();
        let mut rest = &label[head.len()..];

        // Aliases may themselves contain colons, so try every split point.
        loop {
            if let Some(target) = self.aliases.get(&candidate) {
                match builtin(target) {
                    LabelMeaning::Prerelease { .. } => {
                        return Some(LabelMeaning::Prerelease {
                            prefix: suffix_after_last_colon(label),
                        });
                    }
                    LabelMeaning::Stable => return Some(LabelMeaning::Stable),
                    _ => {}
                }
            }
            let next = rest[1..].find(':')?;
            candidate.push_str(&rest[..=next]);
            rest = &rest[next + 1..];
        }
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn suffix_after_last_colon(label: &str) -> String {
    label
        .rsplit_once(':')
        .map(|(_, suffix)| suffix.to_string())
        .unwrap_or_default()
}

fn builtin_exact(label: &str) -> Option<LabelMeaning> {
    if let Some((_, level)) = BUILTIN_LEVELS.iter().find(|(name, _)| *name == label) {
        return Some(LabelMeaning::Level(*level));
    }
    match label {
        PRERELEASE_LABEL => Some(LabelMeaning::Prerelease {
            prefix: String::new(),
        }),
        STABLE_LABEL => Some(LabelMeaning::Stable),
        _ => None,
    }
}

fn builtin_prefixed(label: &str) -> Option<LabelMeaning> {
    let marker_prefix = |marker: &str| {
        label
            .strip_prefix(marker)
            .is_some_and(|rest| rest.starts_with(':'))
    };

    if marker_prefix(PRERELEASE_LABEL) {
        Some(LabelMeaning::Prerelease {
            prefix: suffix_after_last_colon(label),
        })
    } else if marker_prefix(STABLE_LABEL) {
        Some(LabelMeaning::Stable)
    } else {
        None
    }
}

fn builtin(label: &str) -> LabelMeaning {
    builtin_exact(label)
        .or_else(|| builtin_prefixed(label))
        .unwrap_or(LabelMeaning::Unrecognized)
}
