//! GitHub operations abstraction layer
//!
//! The release logic only needs a handful of read calls (pull requests merged
//! through a commit, commit ranges, single pull requests) and one write call
//! (creating a release). They are expressed by the [GitHubClient] trait:
//!
//! - [http::HttpGitHubClient]: async REST client built on `reqwest`
//! - [mock::MockGitHub]: in-memory implementation for tests

pub mod http;
pub mod mock;

pub use http::HttpGitHubClient;
pub use mock::MockGitHub;

use crate::domain::RawPull;
use crate::error::{ReleaseError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A GitHub repository identifier (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Extract the repository from a git remote URL.
    ///
    /// Supports `https://host/owner/name(.git)`, `git@host:owner/name(.git)`
    /// and `ssh://git@host/owner/name(.git)`.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let re = Regex::new(
            r"^(?:https?://[^/]+/|ssh://[^/]+/|[^@/\s]+@[^:/\s]+:)([^/\s]+)/([^/\s]+?)(?:\.git)?/?$",
        )
        .map_err(|e| ReleaseError::repo(format!("invalid remote URL pattern: {}", e)))?;

        let captures = re.captures(url.trim()).ok_or_else(|| {
            ReleaseError::repo(format!("cannot determine repository from remote URL '{}'", url))
        })?;

        Ok(RepoId::new(&captures[1], &captures[2]))
    }
}

impl FromStr for RepoId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoId::new(owner, name))
            }
            _ => Err(ReleaseError::repo(format!(
                "invalid repository '{}': expected owner/name",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Commits between two refs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitComparison {
    pub ahead_by: u64,
    pub behind_by: u64,
    /// Commit SHAs reachable from head but not base, oldest first
    pub commits: Vec<String>,
}

/// Parameters for publishing a GitHub release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub target_commitish: String,
    pub prerelease: bool,
    pub generate_release_notes: bool,
}

/// Common GitHub operation trait for abstraction
///
/// All implementors must be `Send + Sync`: commit lookups for a range are
/// in flight concurrently.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Merged pull requests associated with a commit
    async fn list_merged_pulls_for_commit(&self, repo: &RepoId, sha: &str) -> Result<Vec<RawPull>>;

    /// Commits reachable from `head` but not from `base`.
    ///
    /// `max_count` limits the number of commits returned; `None` returns all.
    async fn compare_commits(
        &self,
        repo: &RepoId,
        base: &str,
        head: &str,
        max_count: Option<usize>,
    ) -> Result<CommitComparison>;

    /// A single pull request with its labels
    async fn get_pull_request(&self, repo: &RepoId, number: u64) -> Result<RawPull>;

    /// SHAs of the commits on a pull request, oldest first
    async fn get_pull_request_commits(&self, repo: &RepoId, number: u64) -> Result<Vec<String>>;

    /// Publish a release and return its URL
    async fn create_release(&self, repo: &RepoId, release: &NewRelease) -> Result<String>;
}
