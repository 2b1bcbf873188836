use crate::analyzer::aggregator::CommitAggregator;
use crate::analyzer::resolver::{Resolver, VersionChange};
use crate::boundary::ReleaseWarning;
use crate::domain::{ChangeLevel, LabelClassifier, TagMatch, TagPrefixes};
use crate::error::{ReleaseError, Result};
use crate::git::{locate_previous_tag, Repository};
use crate::github::{GitHubClient, RepoId};
use semver::Version;
use serde::Serialize;
use tracing::info;

/// Inputs for computing the next release
#[derive(Debug, Clone)]
pub struct NextRequest {
    pub repo: RepoId,
    /// Revision to release, usually `HEAD`
    pub head: String,
    /// Tag to compute from; located automatically when `None`
    pub previous_ref: Option<String>,
    pub prefixes: TagPrefixes,
    pub initial_version: Version,
    pub classifier: LabelClassifier,
    pub min_bump: ChangeLevel,
    pub max_bump: ChangeLevel,
    pub force_prerelease: bool,
    pub force_stable: bool,
    pub max_concurrency: usize,
}

impl NextRequest {
    /// A request with default bounds, prefixes and labels
    pub fn new(repo: RepoId, head: impl Into<String>) -> Self {
        NextRequest {
            repo,
            head: head.into(),
            previous_ref: None,
            prefixes: TagPrefixes::default(),
            initial_version: Version::new(0, 0, 0),
            classifier: LabelClassifier::new(),
            min_bump: ChangeLevel::None,
            max_bump: ChangeLevel::Major,
            force_prerelease: false,
            force_stable: false,
            max_concurrency: 8,
        }
    }
}

/// Outcome of [next]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextResult {
    /// Tag the computation started from, `None` for a first release
    pub previous_ref: Option<String>,
    pub head_sha: String,
    pub previous_version: Version,
    pub next_version: Version,
    pub change_level: ChangeLevel,
    /// Tag to create, `None` when there is nothing to release
    pub next_tag: Option<String>,
    pub commit_count: usize,
    pub warnings: Vec<ReleaseWarning>,
}

impl NextResult {
    pub fn is_release(&self) -> bool {
        self.next_tag.is_some()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.next_version.pre.is_empty()
    }
}

/// Compute the next version for `request.head`.
///
/// Locates the previous release, enumerates the commits since then, fetches
/// and annotates their pull requests and resolves the result.
pub async fn next<R, G>(request: &NextRequest, repo: &R, github: &G) -> Result<NextResult>
where
    R: Repository + ?Sized,
    G: GitHubClient + ?Sized,
{
    let resolver = Resolver::new(
        request.min_bump,
        request.max_bump,
        request.force_prerelease,
        request.force_stable,
    )?;

    let head_sha = repo.resolve_commit(&request.head)?;
    let mut warnings = Vec::new();

    let (previous_ref, previous_version) = match &request.previous_ref {
        Some(tag) => (Some(tag.clone()), version_from_ref(tag, &request.prefixes)?),
        None => {
            let previous = locate_previous_tag(
                repo,
                &head_sha,
                &request.prefixes,
                &request.initial_version,
            )?;
            warnings.extend(previous.warnings);
            (previous.tag, previous.version)
        }
    };

    let shas: Vec<String> = match &previous_ref {
        Some(tag) => github
            .compare_commits(&request.repo, tag, &head_sha, None)
            .await?
            .commits,
        None => repo
            .commits_between(None, &head_sha)?
            .into_iter()
            .map(|c| c.hash)
            .collect(),
    };

    if let (Some(tag), true) = (&previous_ref, shas.is_empty()) {
        warnings.push(ReleaseWarning::NoNewCommits {
            previous_tag: tag.clone(),
            head: head_sha.clone(),
        });
    }

    let commits = CommitAggregator::new(github, &request.repo, &request.classifier)
        .with_max_concurrency(request.max_concurrency)
        .collect(&shas)
        .await?;

    let change: VersionChange = resolver.resolve(&previous_version, &commits)?;
    let next_tag = change
        .is_release()
        .then(|| request.prefixes.format(&change.next_version));

    info!(
        previous = %change.previous_version,
        next = %change.next_version,
        level = %change.change_level,
        commits = shas.len(),
        "resolved next version"
    );

    Ok(NextResult {
        previous_ref,
        head_sha,
        previous_version: change.previous_version,
        next_version: change.next_version,
        change_level: change.change_level,
        next_tag,
        commit_count: shas.len(),
        warnings,
    })
}

/// Version named by a tag, after stripping one of `prefixes`
pub fn version_from_ref(tag: &str, prefixes: &TagPrefixes) -> Result<Version> {
    match prefixes.parse(tag) {
        TagMatch::Version { version, .. } => Ok(version),
        TagMatch::Unparsable { reason } => Err(ReleaseError::version(format!(
            "previous ref '{}' is not a version tag: {}",
            tag, reason
        ))),
        TagMatch::NoMatch => Err(ReleaseError::version(format!(
            "previous ref '{}' does not start with any of the tag prefixes {:?}",
            tag,
            prefixes.as_slice()
        ))),
    }
}
