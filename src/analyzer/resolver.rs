use crate::domain::pull::{find_prefix_conflict, format_pull_numbers};
use crate::domain::version::{cmp_precedence, increment, increment_prerelease, is_prerelease, stabilize};
use crate::domain::{ChangeLevel, Commit, Pull};
use crate::error::{ReleaseError, Result};
use semver::Version;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Result of resolving the next version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionChange {
    pub previous_version: Version,
    pub next_version: Version,
    /// The level actually applied to reach `next_version`
    pub change_level: ChangeLevel,
}

impl VersionChange {
    /// Whether anything would be released
    pub fn is_release(&self) -> bool {
        self.next_version != self.previous_version
    }
}

/// Turns annotated commits into a single version decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    min_change: ChangeLevel,
    max_change: ChangeLevel,
    force_prerelease: bool,
    force_stable: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver {
            min_change: ChangeLevel::None,
            max_change: ChangeLevel::Major,
            force_prerelease: false,
            force_stable: false,
        }
    }
}

impl Resolver {
    /// Create a resolver, validating the bump bounds and force flags
    pub fn new(
        min_change: ChangeLevel,
        max_change: ChangeLevel,
        force_prerelease: bool,
        force_stable: bool,
    ) -> Result<Self> {
        if min_change > max_change {
            return Err(ReleaseError::version(format!(
                "minimum bump ({}) is greater than maximum bump ({})",
                min_change, max_change
            )));
        }
        if force_prerelease && force_stable {
            return Err(ReleaseError::config(
                "cannot force both a pre-release and a stable release",
            ));
        }

        Ok(Resolver {
            min_change,
            max_change,
            force_prerelease,
            force_stable,
        })
    }

    /// Compute the next version after `previous` for the given commits
    pub fn resolve(&self, previous: &Version, commits: &[Commit]) -> Result<VersionChange> {
        let pulls = unique_pulls(commits);

        if pulls.is_empty() {
            let next_version = if self.force_stable {
                stabilize(previous)
            } else {
                previous.clone()
            };
            debug!(previous = %previous, "no pull requests in range");
            return Ok(VersionChange {
                previous_version: previous.clone(),
                next_version,
                change_level: ChangeLevel::None,
            });
        }

        let raw_level = pulls
            .iter()
            .map(|p| p.change_level)
            .max()
            .unwrap_or_default();
        let level = raw_level.clamp_between(self.min_change, self.max_change);

        let is_pre =
            self.force_prerelease || (!self.force_stable && pulls.iter().any(|p| p.has_pre_label));

        self.validate_pulls(previous, &pulls, is_pre)?;

        let change = if is_pre {
            self.resolve_prerelease(previous, &pulls, level)?
        } else if !is_prerelease(previous) {
            VersionChange {
                previous_version: previous.clone(),
                next_version: increment(previous, level)?,
                change_level: level,
            }
        } else {
            self.resolve_stabilization(previous, &pulls, level)?
        };

        debug!(
            previous = %change.previous_version,
            next = %change.next_version,
            level = %change.change_level,
            pulls = pulls.len(),
            "resolved next version"
        );
        Ok(change)
    }

    fn validate_pulls(&self, previous: &Version, pulls: &[&Pull], is_pre: bool) -> Result<()> {
        let (stable, unstable): (Vec<&Pull>, Vec<&Pull>) =
            pulls.iter().copied().partition(|p| p.has_stable_label);

        if self.force_prerelease && !stable.is_empty() {
            return Err(ReleaseError::label(format!(
                "cannot force pre-release with stable PRs. stable PRs: {}",
                format_pull_numbers(stable)
            )));
        }

        let (pre, non_pre): (Vec<&Pull>, Vec<&Pull>) =
            pulls.iter().copied().partition(|p| p.has_pre_label);
        let mixed = !pre.is_empty() && !non_pre.is_empty();
        if !self.force_prerelease && mixed && (!is_prerelease(previous) || !stable.is_empty()) {
            return Err(ReleaseError::label(format!(
                "cannot have pre-release and non-pre-release PRs in the same release. pre-release PRs: {}, non-pre-release PRs: {}",
                format_pull_numbers(pre),
                format_pull_numbers(non_pre)
            )));
        }

        if is_pre || self.force_stable || stable.is_empty() || unstable.is_empty() {
            return Ok(());
        }

        if is_prerelease(previous) {
            Err(ReleaseError::label(format!(
                "cannot create a stable release from a pre-release unless all PRs are labeled semver:stable. unlabeled PRs: {}",
                format_pull_numbers(unstable)
            )))
        } else {
            Err(ReleaseError::label(format!(
                "in order to release a stable version, all PRs must be labeled as stable. stable PRs: {}, unstable PRs: {}",
                format_pull_numbers(stable),
                format_pull_numbers(unstable)
            )))
        }
    }

    fn resolve_prerelease(
        &self,
        previous: &Version,
        pulls: &[&Pull],
        level: ChangeLevel,
    ) -> Result<VersionChange> {
        if let Some((a, b)) = find_prefix_conflict(pulls.iter().copied()) {
            return Err(ReleaseError::label(format!(
                "cannot have multiple pre-release prefixes in the same release. pre-release prefix. release contains both \"{}\" and \"{}\"",
                a.pre_release_prefix, b.pre_release_prefix
            )));
        }
        let prefix = pulls
            .iter()
            .map(|p| p.pre_release_prefix.as_str())
            .find(|p| !p.is_empty())
            .unwrap_or("");

        let next_version = increment_prerelease(previous, level, prefix)?;
        if cmp_precedence(&next_version, previous) != Ordering::Greater {
            return Err(ReleaseError::ordering(format!(
                "pre-release version \"{}\" is not greater than \"{}\"",
                next_version, previous
            )));
        }

        Ok(VersionChange {
            previous_version: previous.clone(),
            next_version,
            change_level: level,
        })
    }

    fn resolve_stabilization(
        &self,
        previous: &Version,
        pulls: &[&Pull],
        level: ChangeLevel,
    ) -> Result<VersionChange> {
        let base = stabilize(previous);
        let has_unstable = pulls.iter().any(|p| !p.has_stable_label);

        // Forcing a stable release out of an in-progress pre-release only
        // drops the suffix.
        if self.force_stable && has_unstable {
            return Ok(VersionChange {
                previous_version: previous.clone(),
                next_version: base,
                change_level: ChangeLevel::None,
            });
        }

        Ok(VersionChange {
            previous_version: previous.clone(),
            next_version: increment(&base, level)?,
            change_level: level,
        })
    }
}

/// All pulls across the commits, first occurrence of each number kept
fn unique_pulls(commits: &[Commit]) -> Vec<&Pull> {
    let mut seen = HashSet::new();
    commits
        .iter()
        .flat_map(|c| c.pulls.iter())
        .filter(|p| seen.insert(p.number))
        .collect()
}
