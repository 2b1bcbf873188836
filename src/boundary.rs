use serde::Serialize;
use std::fmt;

/// Non-fatal issues found while computing or publishing a release.
/// These are reported to the user but never change the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReleaseWarning {
    /// No reachable tag matched any prefix
    NoPreviousTag {
        prefixes: Vec<String>,
        initial_version: String,
    },
    /// Head is the previous release commit or behind it
    NoNewCommits { previous_tag: String, head: String },
    /// Tag has a configured prefix but is not a semantic version
    UnparsableTag { tag: String, reason: String },
    /// A post-tag or post-release hook failed
    HookFailed { hook: String, message: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::NoPreviousTag {
                prefixes,
                initial_version,
            } => {
                let quoted: Vec<String> = prefixes.iter().map(|p| format!("'{}'", p)).collect();
                write!(
                    f,
                    "No tag with prefix {} found, starting from {}",
                    quoted.join(", "),
                    initial_version
                )
            }
            ReleaseWarning::NoNewCommits { previous_tag, head } => {
                let short_hash = if head.len() > 7 { &head[..7] } else { head.as_str() };
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    previous_tag, short_hash
                )
            }
            ReleaseWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            ReleaseWarning::HookFailed { hook, message } => {
                write!(f, "Hook '{}' failed: {}", hook, message)
            }
        }
    }
}
