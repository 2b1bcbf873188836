use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, Repository};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Mock repository for testing without actual git operations
///
/// History is linear: commits are stored oldest first and `HEAD` is the last
/// one added.
#[derive(Default)]
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    tags: HashMap<String, String>,
    remotes: HashMap<String, String>,
    created_tags: Mutex<Vec<(String, String)>>,
    pushed_tags: Mutex<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit to the history
    pub fn add_commit(&mut self, hash: impl Into<String>, summary: impl Into<String>) {
        self.commits.push(CommitInfo {
            hash: hash.into(),
            summary: summary.into(),
            author: "Test Author".to_string(),
        });
    }

    /// Add a tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, hash: impl Into<String>) {
        self.tags.insert(name.into(), hash.into());
    }

    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    /// Tags created through the trait, as `(name, target)`
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.created_tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tags pushed through the trait, as `(remote, name)`
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed_tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn position(&self, rev: &str) -> Result<usize> {
        let hash = self.resolve_commit(rev)?;
        self.commits
            .iter()
            .position(|c| c.hash == hash)
            .ok_or_else(|| ReleaseError::tag(format!("Commit not found: {}", rev)))
    }
}

impl Repository for MockRepository {
    fn resolve_commit(&self, rev: &str) -> Result<String> {
        if rev == "HEAD" {
            return self
                .commits
                .last()
                .map(|c| c.hash.clone())
                .ok_or_else(|| ReleaseError::tag("HEAD has no commits"));
        }
        if let Some(hash) = self.tags.get(rev) {
            return Ok(hash.clone());
        }
        if let Some((_, target)) = self.created_tags().into_iter().find(|(name, _)| name == rev) {
            return Ok(target);
        }
        self.commits
            .iter()
            .find(|c| !rev.is_empty() && c.hash.starts_with(rev))
            .map(|c| c.hash.clone())
            .ok_or_else(|| ReleaseError::tag(format!("Cannot resolve '{}'", rev)))
    }

    fn tags_by_commit(&self) -> Result<HashMap<String, Vec<String>>> {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (name, hash) in &self.tags {
            grouped.entry(hash.clone()).or_default().push(name.clone());
        }
        for (name, hash) in self.created_tags() {
            grouped.entry(hash).or_default().push(name);
        }
        Ok(grouped)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let end = self.position(to)?;
        let start = match from {
            Some(from) => self.position(from)? + 1,
            None => 0,
        };
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end].to_vec())
    }

    fn create_tag(&self, name: &str, target: &str) -> Result<()> {
        let hash = self.resolve_commit(target)?;
        let mut created = self
            .created_tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.tags.contains_key(name) || created.iter().any(|(n, _)| n == name) {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        created.push((name.to_string(), hash));
        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        if !self.remotes.contains_key(remote) {
            return Err(ReleaseError::remote(format!(
                "Cannot find remote '{}'",
                remote
            )));
        }
        let mut pushed = self
            .pushed_tags
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pushed.extend(
            tag_names
                .iter()
                .map(|name| (remote.to_string(), name.to_string())),
        );
        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remotes.get(remote).cloned())
    }
}
