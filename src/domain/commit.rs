use crate::domain::pull::{find_prefix_conflict, format_pull_numbers, Pull, RawPull};
use crate::domain::{ChangeLevel, LabelClassifier};
use crate::error::{ReleaseError, Result};
use serde::Serialize;
use tracing::debug;

/// A commit and the pull requests it was merged through, as fetched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCommit {
    pub sha: String,
    pub pulls: Vec<RawPull>,
}

/// A commit with annotated pull requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub sha: String,
    pub pulls: Vec<Pull>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, pulls: Vec<Pull>) -> Self {
        Commit {
            sha: sha.into(),
            pulls,
        }
    }

    /// Highest change level over this commit's pulls
    pub fn change_level(&self) -> ChangeLevel {
        self.pulls
            .iter()
            .map(|p| p.change_level)
            .max()
            .unwrap_or_default()
    }

    /// Check that the pulls merged through this commit agree with each other.
    ///
    /// A commit without pulls is always valid.
    pub fn validate(&self) -> Result<()> {
        if self.pulls.is_empty() {
            return Ok(());
        }

        let stable: Vec<&Pull> = self.pulls.iter().filter(|p| p.has_stable_label).collect();
        let pre: Vec<&Pull> = self.pulls.iter().filter(|p| p.has_pre_label).collect();
        if !stable.is_empty() && !pre.is_empty() {
            return Err(ReleaseError::label(format!(
                "commit {} has both stable and prerelease labels: stable PR: {}, prerelease PR: {}",
                self.sha,
                format_pull_numbers(stable),
                format_pull_numbers(pre)
            )));
        }

        if let Some((a, b)) = find_prefix_conflict(&self.pulls) {
            return Err(ReleaseError::label(format!(
                "commit {} has pull requests with conflicting prefixes: #{} and #{}",
                self.sha, a.number, b.number
            )));
        }

        if !self.pulls.iter().any(Pull::is_labeled) {
            return Err(ReleaseError::label(format!(
                "commit {} has no labels on associated pull requests: {}",
                self.sha,
                format_pull_numbers(&self.pulls)
            )));
        }

        Ok(())
    }
}

impl RawCommit {
    pub fn new(sha: impl Into<String>, pulls: Vec<RawPull>) -> Self {
        RawCommit {
            sha: sha.into(),
            pulls,
        }
    }

    /// Annotate every pull and validate the commit as a whole
    pub fn annotate(&self, classifier: &LabelClassifier) -> Result<Commit> {
        let pulls = self
            .pulls
            .iter()
            .map(|raw| raw.annotate(classifier))
            .collect::<Result<Vec<_>>>()?;

        let commit = Commit::new(self.sha.clone(), pulls);
        commit.validate()?;

        debug!(
            sha = %commit.sha,
            pulls = commit.pulls.len(),
            level = %commit.change_level(),
            "annotated commit"
        );
        Ok(commit)
    }
}

/// Annotate a commit range.
///
/// Every commit is checked; all failures are joined in commit order.
pub fn annotate_commits(classifier: &LabelClassifier, commits: &[RawCommit]) -> Result<Vec<Commit>> {
    let mut annotated = Vec::with_capacity(commits.len());
    let mut errors = Vec::new();

    for raw in commits {
        match raw.annotate(classifier) {
            Ok(commit) => annotated.push(commit),
            Err(e) => errors.push(e),
        }
    }

    match ReleaseError::join(errors) {
        Some(err) => Err(err),
        None => Ok(annotated),
    }
}
