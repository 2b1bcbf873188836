//! Git operations abstraction layer
//!
//! The release flow reads commit history and tags from the local clone and
//! writes one tag back. Those operations are expressed by the [Repository]
//! trait:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! [locator::locate_previous_tag] builds on the trait to find the release a
//! new version is computed from.

pub mod locator;
pub mod mock;
pub mod repository;

pub use locator::{locate_previous_tag, PreviousTag};
pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::collections::HashMap;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// First line of the commit message
    pub summary: String,
    /// The commit author
    pub author: String,
}

/// Common git operation trait for abstraction
///
/// All implementors must be `Send + Sync` to allow sharing across threads.
/// Implementations map underlying errors (like `git2::Error`) to the
/// matching [crate::error::ReleaseError] variants.
pub trait Repository: Send + Sync {
    /// Resolve a revision (branch, tag, `HEAD`, SHA) to a full commit SHA
    fn resolve_commit(&self, rev: &str) -> Result<String>;

    /// All tags, grouped by the commit they point at (annotated tags peeled)
    fn tags_by_commit(&self) -> Result<HashMap<String, Vec<String>>>;

    /// Commits reachable from `to` but not from `from`, oldest first.
    ///
    /// With `from == None` the whole history of `to` is returned.
    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>>;

    /// Create a lightweight tag pointing at `target`
    fn create_tag(&self, name: &str, target: &str) -> Result<()>;

    /// Push tags to a remote
    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()>;

    /// URL of a remote, `None` if the remote is not configured
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;
}
