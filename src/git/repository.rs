use crate::error::{ReleaseError, Result};
use crate::git::CommitInfo;
use git2::{Cred, CredentialType, Oid, Repository as Git2Repo, Sort};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    push_token: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
            push_token: None,
        }
    }

    /// Token offered for HTTPS pushes
    pub fn with_push_token(mut self, token: Option<String>) -> Self {
        self.push_token = token.filter(|t| !t.is_empty());
        self
    }

    fn repo(&self) -> MutexGuard<'_, Git2Repo> {
        self.repo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_oid(repo: &Git2Repo, rev: &str) -> Result<Oid> {
        Ok(repo.revparse_single(rev)?.peel_to_commit()?.id())
    }
}

fn ssh_key_paths() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    ["id_ed25519", "id_rsa", "id_ecdsa"]
        .iter()
        .map(|name| home.join(".ssh").join(name))
        .collect()
}

/// Credentials offered to a push, each source at most once.
///
/// libgit2 calls the credentials callback again after every rejected attempt,
/// so handing out the same credential would retry forever.
struct PushCredentials<'a> {
    token: Option<&'a str>,
    ssh_keys: std::vec::IntoIter<PathBuf>,
    token_tried: bool,
    agent_tried: bool,
    default_tried: bool,
}

impl<'a> PushCredentials<'a> {
    fn new(token: Option<&'a str>, ssh_keys: Vec<PathBuf>) -> Self {
        PushCredentials {
            token,
            ssh_keys: ssh_keys.into_iter(),
            token_tried: false,
            agent_tried: false,
            default_tried: false,
        }
    }

    fn next(
        &mut self,
        username_from_url: Option<&str>,
        allowed_types: CredentialType,
    ) -> std::result::Result<Cred, git2::Error> {
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) && !self.token_tried {
            if let Some(token) = self.token {
                self.token_tried = true;
                return Cred::userpass_plaintext("x-access-token", token);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            for path in self.ssh_keys.by_ref() {
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }

            if !self.agent_tried {
                self.agent_tried = true;
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }
        }

        if allowed_types.contains(CredentialType::DEFAULT) && !self.default_tried {
            self.default_tried = true;
            return Cred::default();
        }

        Err(git2::Error::from_str(
            "authentication failed: no remaining credentials to try",
        ))
    }
}

impl super::Repository for Git2Repository {
    fn resolve_commit(&self, rev: &str) -> Result<String> {
        let repo = self.repo();
        Ok(Self::resolve_oid(&repo, rev)?.to_string())
    }

    fn tags_by_commit(&self) -> Result<HashMap<String, Vec<String>>> {
        let repo = self.repo();
        let names = repo.tag_names(None)?;
        let mut tags: HashMap<String, Vec<String>> = HashMap::new();

        for name in names.iter().flatten() {
            let reference = repo.find_reference(&format!("refs/tags/{}", name))?;
            match reference.peel_to_commit() {
                Ok(commit) => tags
                    .entry(commit.id().to_string())
                    .or_default()
                    .push(name.to_string()),
                Err(e) => debug!(tag = name, error = %e, "tag does not point at a commit"),
            }
        }

        Ok(tags)
    }

    fn commits_between(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let repo = self.repo();
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;
        revwalk.push(Self::resolve_oid(&repo, to)?)?;
        if let Some(from) = from {
            revwalk.hide(Self::resolve_oid(&repo, from)?)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = repo.find_commit(oid)?;

            commits.push(CommitInfo {
                hash: oid.to_string(),
                summary: commit.summary().unwrap_or("(empty message)").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
            });
        }

        commits.reverse();
        Ok(commits)
    }

    fn create_tag(&self, name: &str, target: &str) -> Result<()> {
        let repo = self.repo();
        let oid = Self::resolve_oid(&repo, target)?;
        let object = repo
            .find_object(oid, None)
            .map_err(|e| ReleaseError::tag(format!("Cannot find object: {}", e)))?;

        repo.tag_lightweight(name, &object, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        let repo = self.repo();
        let mut remote_handle = repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote '{}': {}", remote, e)))?;

        let mut callbacks = git2::RemoteCallbacks::new();
        let mut credentials = PushCredentials::new(self.push_token.as_deref(), ssh_key_paths());
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            credentials.next(username_from_url, allowed_types)
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                warn!(refname, status, "remote rejected reference");
                Err(git2::Error::from_str(&format!("Push failed for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();

        remote_handle
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                }
                _ => ReleaseError::remote(format!("Push to '{}' failed: {}", remote, e)),
            })?;

        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let repo = self.repo();
        let found = repo.find_remote(remote);
        match found {
            Ok(handle) => Ok(handle.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::remote(format!(
                "Cannot read remote '{}': {}",
                remote, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) -> Oid {
        let signature = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    fn init() -> (TempDir, Git2Repository, Vec<Oid>) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        let oids = vec![
            commit(&repo, "first"),
            commit(&repo, "second"),
            commit(&repo, "third"),
        ];
        (dir, Git2Repository::from_git2(repo), oids)
    }

    #[test]
    fn test_commits_between() {
        let (_dir, repo, oids) = init();

        let all = repo.commits_between(None, "HEAD").unwrap();
        let hashes: Vec<_> = all.iter().map(|c| c.hash.clone()).collect();
        let expected: Vec<_> = oids.iter().map(|o| o.to_string()).collect();
        assert_eq!(hashes, expected);
        assert_eq!(all[0].summary, "first");

        let first = oids[0].to_string();
        let range = repo.commits_between(Some(&first), "HEAD").unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].summary, "second");
    }

    #[test]
    fn test_create_tag_and_group() {
        let (_dir, repo, oids) = init();
        let second = oids[1].to_string();

        repo.create_tag("v1.0.0", &second).unwrap();
        repo.create_tag("release-1.0.0", &second).unwrap();
        assert!(repo.create_tag("v1.0.0", "HEAD").is_err());

        let tags = repo.tags_by_commit().unwrap();
        let mut names = tags.get(&second).cloned().unwrap();
        names.sort();
        assert_eq!(names, vec!["release-1.0.0", "v1.0.0"]);
        assert_eq!(repo.resolve_commit("v1.0.0").unwrap(), second);
    }

    #[test]
    fn test_resolve_unknown_revision() {
        let (_dir, repo, _) = init();
        assert!(repo.resolve_commit("no-such-branch").is_err());
    }

    #[test]
    fn test_missing_remote() {
        let (_dir, repo, _) = init();
        assert_eq!(repo.remote_url("origin").unwrap(), None);
        assert!(matches!(
            repo.push_tags("origin", &["v1.0.0"]),
            Err(ReleaseError::Remote(_))
        ));
    }

    #[test]
    fn test_remote_url() {
        let dir = TempDir::new().unwrap();
        let git = Git2Repo::init(dir.path()).unwrap();
        git.remote("origin", "git@github.com:octo/widgets.git").unwrap();
        let repo = Git2Repository::from_git2(git);

        assert_eq!(
            repo.remote_url("origin").unwrap().as_deref(),
            Some("git@github.com:octo/widgets.git")
        );
        assert_eq!(repo.remote_url("upstream").unwrap(), None);
    }

    #[test]
    fn test_push_token_offered_once() {
        let mut credentials = PushCredentials::new(Some("secret"), Vec::new());

        assert!(credentials
            .next(None, CredentialType::USER_PASS_PLAINTEXT)
            .is_ok());
        let err = credentials
            .next(None, CredentialType::USER_PASS_PLAINTEXT)
            .err()
            .unwrap();
        assert!(err.message().contains("authentication failed"));
    }

    #[test]
    fn test_push_without_token_fails_for_https() {
        let mut credentials = PushCredentials::new(None, Vec::new());
        assert!(credentials
            .next(None, CredentialType::USER_PASS_PLAINTEXT)
            .is_err());
    }

    #[test]
    fn test_push_ssh_sources_exhaust() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("id_ed25519");
        let mut credentials = PushCredentials::new(Some("secret"), vec![missing]);

        // missing key files are skipped; the agent is offered once
        assert!(credentials.next(Some("git"), CredentialType::SSH_KEY).is_ok());
        assert!(credentials.next(Some("git"), CredentialType::SSH_KEY).is_err());
    }

    #[test]
    fn test_push_default_credential_offered_once() {
        let mut credentials = PushCredentials::new(None, Vec::new());
        assert!(credentials.next(None, CredentialType::DEFAULT).is_ok());
        assert!(credentials.next(None, CredentialType::DEFAULT).is_err());
    }
}
