use crate::analyzer::resolver::{Resolver, VersionChange};
use crate::domain::{Commit, LabelClassifier, Pull};
use crate::error::Result;
use crate::github::{GitHubClient, RepoId};
use semver::Version;
use serde::Serialize;
use tracing::info;

/// Result of checking a single pull request's labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullCheck {
    pub pull: Pull,
    /// Commits on the pull request, oldest first
    pub commits: Vec<String>,
    /// Version the pull would produce on its own, when a base was given
    pub change: Option<VersionChange>,
}

/// Validate the labels of pull request `number` before it is merged.
///
/// The pull is checked as if it were the only pull merged through its head
/// commit. With `previous` set, the version it would release is resolved too.
pub async fn check_pull<G: GitHubClient + ?Sized>(
    github: &G,
    repo: &RepoId,
    number: u64,
    classifier: &LabelClassifier,
    resolver: &Resolver,
    previous: Option<&Version>,
) -> Result<PullCheck> {
    let raw = github.get_pull_request(repo, number).await?;
    let commits = github.get_pull_request_commits(repo, number).await?;
    let pull = raw.annotate(classifier)?;

    let head = commits
        .last()
        .cloned()
        .unwrap_or_else(|| format!("#{}", number));
    let commit = Commit::new(head, vec![pull.clone()]);
    commit.validate()?;

    let change = previous
        .map(|previous| resolver.resolve(previous, std::slice::from_ref(&commit)))
        .transpose()?;

    info!(
        pull = number,
        level = %pull.change_level,
        commits = commits.len(),
        "pull request labels are valid"
    );

    Ok(PullCheck {
        pull,
        commits,
        change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeLevel, RawPull};
    use crate::error::ReleaseError;
    use crate::github::MockGitHub;

    fn repo() -> RepoId {
        RepoId::new("octo", "widgets")
    }

    fn github_with(labels: &[&str]) -> MockGitHub {
        let mut github = MockGitHub::new();
        github.add_pull_request(
            RawPull::new(12, labels.iter().copied()),
            vec!["a1".to_string(), "b2".to_string()],
        );
        github
    }

    #[tokio::test]
    async fn test_check_labeled_pull() {
        let github = github_with(&["feature"]);
        let check = check_pull(
            &github,
            &repo(),
            12,
            &LabelClassifier::new(),
            &Resolver::default(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(check.pull.change_level, ChangeLevel::Minor);
        assert_eq!(check.commits, vec!["a1", "b2"]);
        assert_eq!(check.change, None);
    }

    #[tokio::test]
    async fn test_check_resolves_against_previous() {
        let github = github_with(&["semver:patch", "semver:prerelease:rc"]);
        let previous = Version::parse("2.0.0").unwrap();
        let check = check_pull(
            &github,
            &repo(),
            12,
            &LabelClassifier::new(),
            &Resolver::default(),
            Some(&previous),
        )
        .await
        .unwrap();

        let change = check.change.unwrap();
        assert_eq!(change.next_version, Version::parse("2.0.1-rc.0").unwrap());
    }

    #[tokio::test]
    async fn test_check_unlabeled_pull() {
        let github = github_with(&["documentation"]);
        let err = check_pull(
            &github,
            &repo(),
            12,
            &LabelClassifier::new(),
            &Resolver::default(),
            None,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "commit b2 has no labels on associated pull requests: [#12]"
        );
    }

    #[tokio::test]
    async fn test_check_conflicting_markers() {
        let github = github_with(&["minor", "semver:prerelease", "semver:stable"]);
        let err = check_pull(
            &github,
            &repo(),
            12,
            &LabelClassifier::new(),
            &Resolver::default(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ReleaseError::Label(_)));
        assert_eq!(err.to_string(), "pull #12 has both prerelease and stable labels");
    }

    #[tokio::test]
    async fn test_check_missing_pull() {
        let github = MockGitHub::new();
        assert!(check_pull(
            &github,
            &repo(),
            99,
            &LabelClassifier::new(),
            &Resolver::default(),
            None,
        )
        .await
        .is_err());
    }
}
