use thiserror::Error;

/// Unified error type for label-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Repository identifier error: {0}")]
    Repo(String),

    /// Pull request labels that cannot be turned into a release decision.
    #[error("{0}")]
    Label(String),

    /// A computed pre-release does not sort after the previous version.
    #[error("{0}")]
    Ordering(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}", join_messages(.0))]
    Joined(Vec<ReleaseError>),
}

/// Convenience type alias for Results in label-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

fn join_messages(errors: &[ReleaseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a repository identifier error
    pub fn repo(msg: impl Into<String>) -> Self {
        ReleaseError::Repo(msg.into())
    }

    /// Create a label consistency error
    pub fn label(msg: impl Into<String>) -> Self {
        ReleaseError::Label(msg.into())
    }

    /// Create a version ordering error
    pub fn ordering(msg: impl Into<String>) -> Self {
        ReleaseError::Ordering(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Create a GitHub API error with context
    pub fn github(msg: impl Into<String>) -> Self {
        ReleaseError::GitHub(msg.into())
    }

    /// Create a hook error with context
    pub fn hook(msg: impl Into<String>) -> Self {
        ReleaseError::Hook(msg.into())
    }

    /// Combine several errors into one.
    ///
    /// Returns `None` for an empty list and the error itself when there is
    /// only one, so single failures keep their original message.
    pub fn join(mut errors: Vec<ReleaseError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ReleaseError::Joined(errors)),
        }
    }
}
