use crate::domain::RawPull;
use crate::error::{ReleaseError, Result};
use crate::github::{CommitComparison, GitHubClient, NewRelease, RepoId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Deserialize)]
struct ApiPull {
    number: u64,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    merged_at: Option<String>,
}

impl ApiPull {
    fn into_raw(self) -> RawPull {
        RawPull::new(self.number, self.labels.into_iter().map(|l| l.name))
    }
}

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
}

#[derive(Deserialize)]
struct ApiComparison {
    ahead_by: u64,
    behind_by: u64,
    #[serde(default)]
    commits: Vec<ApiCommit>,
}

#[derive(Serialize)]
struct ApiReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    target_commitish: &'a str,
    prerelease: bool,
    generate_release_notes: bool,
}

#[derive(Deserialize)]
struct ApiRelease {
    html_url: String,
}

/// GitHub REST API client
pub struct HttpGitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl HttpGitHubClient {
    /// Create a client for the given API root (e.g. `https://api.github.com`)
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("label-release/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpGitHubClient {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        let request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::github(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        debug!(%url, %status, "github request");
        Ok(response.json().await?)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, page: usize) -> Result<T> {
        let request = self
            .request(Method::GET, path)
            .query(&[("per_page", PER_PAGE), ("page", page)]);
        self.send(request).await
    }
}

#[async_trait]
impl GitHubClient for HttpGitHubClient {
    async fn list_merged_pulls_for_commit(&self, repo: &RepoId, sha: &str) -> Result<Vec<RawPull>> {
        let path = format!("/repos/{}/{}/commits/{}/pulls", repo.owner, repo.name, sha);
        let mut pulls = Vec::new();

        for page in 1.. {
            let batch: Vec<ApiPull> = self.get_page(&path, page).await?;
            let done = batch.len() < PER_PAGE;
            pulls.extend(
                batch
                    .into_iter()
                    .filter(|p| p.merged_at.is_some())
                    .map(ApiPull::into_raw),
            );
            if done {
                break;
            }
        }

        Ok(pulls)
    }

    async fn compare_commits(
        &self,
        repo: &RepoId,
        base: &str,
        head: &str,
        max_count: Option<usize>,
    ) -> Result<CommitComparison> {
        let path = format!(
            "/repos/{}/{}/compare/{}...{}",
            repo.owner, repo.name, base, head
        );
        let mut comparison = CommitComparison::default();

        for page in 1.. {
            let batch: ApiComparison = self.get_page(&path, page).await?;
            comparison.ahead_by = batch.ahead_by;
            comparison.behind_by = batch.behind_by;

            let received = batch.commits.len();
            comparison
                .commits
                .extend(batch.commits.into_iter().map(|c| c.sha));

            let total = usize::try_from(batch.ahead_by).unwrap_or(usize::MAX);
            let wanted = max_count.map_or(total, |max| max.min(total));
            if received == 0 || comparison.commits.len() >= wanted {
                break;
            }
        }

        if let Some(max) = max_count {
            comparison.commits.truncate(max);
        }
        Ok(comparison)
    }

    async fn get_pull_request(&self, repo: &RepoId, number: u64) -> Result<RawPull> {
        let path = format!("/repos/{}/{}/pulls/{}", repo.owner, repo.name, number);
        let pull: ApiPull = self.send(self.request(Method::GET, &path)).await?;
        Ok(pull.into_raw())
    }

    async fn get_pull_request_commits(&self, repo: &RepoId, number: u64) -> Result<Vec<String>> {
        let path = format!("/repos/{}/{}/pulls/{}/commits", repo.owner, repo.name, number);
        let mut shas = Vec::new();

        for page in 1.. {
            let batch: Vec<ApiCommit> = self.get_page(&path, page).await?;
            let done = batch.len() < PER_PAGE;
            shas.extend(batch.into_iter().map(|c| c.sha));
            if done {
                break;
            }
        }

        Ok(shas)
    }

    async fn create_release(&self, repo: &RepoId, release: &NewRelease) -> Result<String> {
        if self.token.is_none() {
            return Err(ReleaseError::github(
                "a token is required to create releases",
            ));
        }

        let path = format!("/repos/{}/{}/releases", repo.owner, repo.name);
        let body = ApiReleaseRequest {
            tag_name: &release.tag_name,
            name: &release.name,
            target_commitish: &release.target_commitish,
            prerelease: release.prerelease,
            generate_release_notes: release.generate_release_notes,
        };

        let created: ApiRelease = self
            .send(self.request(Method::POST, &path).json(&body))
            .await?;
        Ok(created.html_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_pull_deserialize() {
        let json = r#"{
            "number": 42,
            "merged_at": "2024-01-01T00:00:00Z",
            "labels": [{"name": "minor", "color": "fff"}, {"name": "semver:prerelease"}]
        }"#;
        let pull: ApiPull = serde_json::from_str(json).unwrap();
        assert!(pull.merged_at.is_some());

        let raw = pull.into_raw();
        assert_eq!(raw.number, 42);
        assert_eq!(raw.labels, vec!["minor", "semver:prerelease"]);
    }

    #[test]
    fn test_api_pull_unmerged() {
        let json = r#"{"number": 7, "merged_at": null}"#;
        let pull: ApiPull = serde_json::from_str(json).unwrap();
        assert!(pull.merged_at.is_none());
        assert!(pull.labels.is_empty());
    }

    #[test]
    fn test_api_comparison_deserialize() {
        let json = r#"{"ahead_by": 2, "behind_by": 0, "commits": [{"sha": "a"}, {"sha": "b"}]}"#;
        let comparison: ApiComparison = serde_json::from_str(json).unwrap();
        assert_eq!(comparison.ahead_by, 2);
        let shas: Vec<_> = comparison.commits.into_iter().map(|c| c.sha).collect();
        assert_eq!(shas, vec!["a", "b"]);
    }

    #[test]
    fn test_client_trims_api_url() {
        let client = HttpGitHubClient::new("https://ghe.example.com/api/v3/", None).unwrap();
        assert_eq!(client.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(client.token, None);
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = HttpGitHubClient::new(DEFAULT_API_URL, Some(String::new())).unwrap();
        assert_eq!(client.token, None);
    }

    #[tokio::test]
    async fn test_create_release_requires_token() {
        let client = HttpGitHubClient::new(DEFAULT_API_URL, None).unwrap();
        let release = NewRelease {
            tag_name: "v1.0.0".to_string(),
            name: "v1.0.0".to_string(),
            target_commitish: "abc".to_string(),
            prerelease: false,
            generate_release_notes: true,
        };
        let err = client
            .create_release(&RepoId::new("octo", "widgets"), &release)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::GitHub(_)));
    }
}
