use crate::domain::{Commit, LabelClassifier, RawCommit};
use crate::error::{ReleaseError, Result};
use crate::github::{GitHubClient, RepoId};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Fetches and annotates the pull requests of a commit range.
///
/// Up to `max_concurrency` lookups are in flight at once (`0` means no
/// limit). Results keep the order of the input SHAs. Every commit is
/// attempted; all failures are reported together, in commit order.
pub struct CommitAggregator<'a, G: GitHubClient + ?Sized> {
    github: &'a G,
    repo: &'a RepoId,
    classifier: &'a LabelClassifier,
    max_concurrency: usize,
}

impl<'a, G: GitHubClient + ?Sized> CommitAggregator<'a, G> {
    pub fn new(github: &'a G, repo: &'a RepoId, classifier: &'a LabelClassifier) -> Self {
        CommitAggregator {
            github,
            repo,
            classifier,
            max_concurrency: 0,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Fetch and annotate every commit in `shas`
    pub async fn collect(&self, shas: &[String]) -> Result<Vec<Commit>> {
        if shas.is_empty() {
            return Ok(Vec::new());
        }

        let in_flight = match self.max_concurrency {
            0 => shas.len(),
            n => n.min(shas.len()),
        };
        info!(commits = shas.len(), in_flight, "fetching pull requests");

        // `buffered` yields in input order
        let results: Vec<Result<Commit>> = stream::iter(shas)
            .map(|sha| self.fetch(sha))
            .buffered(in_flight)
            .collect()
            .await;

        let mut commits = Vec::with_capacity(shas.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(commit) => commits.push(commit),
                Err(e) => errors.push(e),
            }
        }

        match ReleaseError::join(errors) {
            Some(err) => Err(err),
            None => Ok(commits),
        }
    }

    async fn fetch(&self, sha: &str) -> Result<Commit> {
        let pulls = self
            .github
            .list_merged_pulls_for_commit(self.repo, sha)
            .await?;
        debug!(sha, pulls = pulls.len(), "fetched pull requests");
        RawCommit::new(sha, pulls).annotate(self.classifier)
    }
}
