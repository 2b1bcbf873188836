use crate::analyzer::Resolver;
use crate::domain::version::parse_version;
use crate::domain::{ChangeLevel, LabelClassifier, TagPrefixes};
use crate::error::{ReleaseError, Result};
use crate::github::http::DEFAULT_API_URL;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "label-release.toml";

/// Represents the complete configuration for label-release.
///
/// Contains label aliases, release rules, GitHub access and hook scripts.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Alias label -> canonical label, matched case-insensitively
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

fn default_tag_prefixes() -> Vec<String> {
    vec!["v".to_string()]
}

fn default_initial_version() -> String {
    "0.0.0".to_string()
}

fn default_max_bump() -> ChangeLevel {
    ChangeLevel::Major
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_max_concurrency() -> usize {
    8
}

/// Rules for computing and tagging releases.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// First entry is used for new tags; all are searched for the previous tag
    #[serde(default = "default_tag_prefixes")]
    pub tag_prefixes: Vec<String>,

    #[serde(default = "default_initial_version")]
    pub initial_version: String,

    #[serde(default)]
    pub min_bump: ChangeLevel,

    #[serde(default = "default_max_bump")]
    pub max_bump: ChangeLevel,

    #[serde(default)]
    pub force_prerelease: bool,

    #[serde(default)]
    pub force_stable: bool,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Bound on concurrent pull request lookups; 0 means one per commit
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            tag_prefixes: default_tag_prefixes(),
            initial_version: default_initial_version(),
            min_bump: ChangeLevel::None,
            max_bump: default_max_bump(),
            force_prerelease: false,
            force_stable: false,
            remote: default_remote(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

/// GitHub API access.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub create_release: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: default_api_url(),
            token_env: default_token_env(),
            create_release: false,
        }
    }
}

impl GitHubConfig {
    /// Token from the configured environment variable, if set and non-empty
    pub fn token_from_env(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Hook scripts run around tagging.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    #[serde(default)]
    pub pre_tag: Option<String>,

    #[serde(default)]
    pub post_tag: Option<String>,

    #[serde(default)]
    pub post_release: Option<String>,
}

impl Config {
    /// Build the label classifier from `[labels]`
    pub fn label_classifier(&self) -> Result<LabelClassifier> {
        LabelClassifier::with_aliases(self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn tag_prefixes(&self) -> TagPrefixes {
        TagPrefixes::new(self.release.tag_prefixes.iter().cloned())
    }

    pub fn initial_version(&self) -> Result<Version> {
        parse_version(&self.release.initial_version)
    }

    /// Resolver with the configured bounds and force flags
    pub fn resolver(&self) -> Result<Resolver> {
        Resolver::new(
            self.release.min_bump,
            self.release.max_bump,
            self.release.force_prerelease,
            self.release.force_stable,
        )
    }

    /// Check every value that can be checked without I/O
    pub fn validate(&self) -> Result<()> {
        self.label_classifier()?;
        self.initial_version()?;
        self.resolver()?;
        if self.release.remote.trim().is_empty() {
            return Err(ReleaseError::config("release.remote must not be empty"));
        }
        Ok(())
    }
}

/// Config file used when no explicit path is given, if one exists.
///
/// Searched in order:
/// 1. `label-release.toml` in the current directory
/// 2. `label-release.toml` in the user config directory
pub fn discover_config_path() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Loads configuration from file or returns defaults.
///
/// Uses `config_path` when given, otherwise [discover_config_path], otherwise
/// [Config::default].
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If the file cannot be read or parsed, or holds invalid values
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => match discover_config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("invalid {}: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}
