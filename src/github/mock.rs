use crate::domain::RawPull;
use crate::error::{ReleaseError, Result};
use crate::github::{CommitComparison, GitHubClient, NewRelease, RepoId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Mock GitHub for testing without network access
#[derive(Default)]
pub struct MockGitHub {
    pulls_by_commit: HashMap<String, Vec<RawPull>>,
    pull_requests: HashMap<u64, (RawPull, Vec<String>)>,
    comparisons: HashMap<(String, String), Vec<String>>,
    failing_commits: HashSet<String>,
    releases: Mutex<Vec<NewRelease>>,
    commit_lookups: AtomicUsize,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the merged pulls for a commit
    pub fn add_commit(&mut self, sha: impl Into<String>, pulls: Vec<RawPull>) {
        self.pulls_by_commit.insert(sha.into(), pulls);
    }

    /// Register a pull request and its commits
    pub fn add_pull_request(&mut self, pull: RawPull, commits: Vec<String>) {
        self.pull_requests.insert(pull.number, (pull, commits));
    }

    /// Register the commits between `base` and `head`, oldest first
    pub fn set_comparison(
        &mut self,
        base: impl Into<String>,
        head: impl Into<String>,
        commits: Vec<String>,
    ) {
        self.comparisons.insert((base.into(), head.into()), commits);
    }

    /// Make lookups for this commit fail
    pub fn fail_commit(&mut self, sha: impl Into<String>) {
        self.failing_commits.insert(sha.into());
    }

    /// Releases created so far
    pub fn releases(&self) -> Vec<NewRelease> {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of commit lookups served
    pub fn commit_lookups(&self) -> usize {
        self.commit_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitHubClient for MockGitHub {
    async fn list_merged_pulls_for_commit(&self, _repo: &RepoId, sha: &str) -> Result<Vec<RawPull>> {
        self.commit_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_commits.contains(sha) {
            return Err(ReleaseError::github(format!(
                "failed to list pull requests for commit {}",
                sha
            )));
        }
        Ok(self.pulls_by_commit.get(sha).cloned().unwrap_or_default())
    }

    async fn compare_commits(
        &self,
        _repo: &RepoId,
        base: &str,
        head: &str,
        max_count: Option<usize>,
    ) -> Result<CommitComparison> {
        let commits = self
            .comparisons
            .get(&(base.to_string(), head.to_string()))
            .ok_or_else(|| {
                ReleaseError::github(format!("no comparison between {} and {}", base, head))
            })?;

        let mut comparison = CommitComparison {
            ahead_by: commits.len() as u64,
            behind_by: 0,
            commits: commits.clone(),
        };
        if let Some(max) = max_count {
            comparison.commits.truncate(max);
        }
        Ok(comparison)
    }

    async fn get_pull_request(&self, _repo: &RepoId, number: u64) -> Result<RawPull> {
        self.pull_requests
            .get(&number)
            .map(|(pull, _)| pull.clone())
            .ok_or_else(|| ReleaseError::github(format!("pull request #{} not found", number)))
    }

    async fn get_pull_request_commits(&self, _repo: &RepoId, number: u64) -> Result<Vec<String>> {
        self.pull_requests
            .get(&number)
            .map(|(_, commits)| commits.clone())
            .ok_or_else(|| ReleaseError::github(format!("pull request #{} not found", number)))
    }

    async fn create_release(&self, repo: &RepoId, release: &NewRelease) -> Result<String> {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(release.clone());
        Ok(format!(
            "https://github.com/{}/releases/tag/{}",
            repo, release.tag_name
        ))
    }
}
