use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Types of hooks available in the release workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    PreTag,
    PostTag,
    PostRelease,
}

impl HookType {
    /// Get the hook name as a string
    pub fn name(&self) -> &'static str {
        match self {
            HookType::PreTag => "pre-tag",
            HookType::PostTag => "post-tag",
            HookType::PostRelease => "post-release",
        }
    }

    /// Whether a failure of this hook aborts the release
    pub fn is_blocking(&self) -> bool {
        matches!(self, HookType::PreTag)
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Type of hook being executed
    pub hook_type: HookType,
    /// Tag name being created or pushed
    pub tag: String,
    pub previous_version: String,
    pub next_version: String,
    /// Change level applied (none, patch, minor, major)
    pub change_level: String,
    /// Remote repository name
    pub remote: String,
    /// Release URL, known only after the release is published
    pub release_url: Option<String>,
}

impl HookContext {
    /// Convert context to environment variables for the hook script
    ///
    /// Maps context fields to RELEASE_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("RELEASE_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert("RELEASE_TAG".to_string(), self.tag.clone());
        env.insert(
            "RELEASE_PREVIOUS_VERSION".to_string(),
            self.previous_version.clone(),
        );
        env.insert("RELEASE_NEXT_VERSION".to_string(), self.next_version.clone());
        env.insert("RELEASE_CHANGE_LEVEL".to_string(), self.change_level.clone());
        env.insert("RELEASE_REMOTE".to_string(), self.remote.clone());

        if let Some(ref url) = self.release_url {
            env.insert("RELEASE_URL".to_string(), url.clone());
        }

        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(hook_type: HookType) -> HookContext {
        HookContext {
            hook_type,
            tag: "v1.3.0".to_string(),
            previous_version: "1.2.3".to_string(),
            next_version: "1.3.0".to_string(),
            change_level: "minor".to_string(),
            remote: "origin".to_string(),
            release_url: None,
        }
    }

    #[test]
    fn test_hook_names() {
        assert_eq!(HookType::PreTag.name(), "pre-tag");
        assert_eq!(HookType::PostTag.name(), "post-tag");
        assert_eq!(HookType::PostRelease.name(), "post-release");
    }

    #[test]
    fn test_only_pre_tag_blocks() {
        assert!(HookType::PreTag.is_blocking());
        assert!(!HookType::PostTag.is_blocking());
        assert!(!HookType::PostRelease.is_blocking());
    }

    #[test]
    fn test_hook_context_to_env_vars() {
        let env = context(HookType::PreTag).to_env_vars();
        assert_eq!(env.len(), 6);
        assert_eq!(env.get("RELEASE_HOOK"), Some(&"pre-tag".to_string()));
        assert_eq!(env.get("RELEASE_TAG"), Some(&"v1.3.0".to_string()));
        assert_eq!(
            env.get("RELEASE_PREVIOUS_VERSION"),
            Some(&"1.2.3".to_string())
        );
        assert_eq!(env.get("RELEASE_NEXT_VERSION"), Some(&"1.3.0".to_string()));
        assert_eq!(env.get("RELEASE_CHANGE_LEVEL"), Some(&"minor".to_string()));
        assert_eq!(env.get("RELEASE_REMOTE"), Some(&"origin".to_string()));
        assert!(env.get("RELEASE_URL").is_none());
    }

    #[test]
    fn test_hook_context_with_release_url() {
        let mut ctx = context(HookType::PostRelease);
        ctx.release_url = Some("https://github.com/o/r/releases/tag/v1.3.0".to_string());

        let env = ctx.to_env_vars();
        assert_eq!(
            env.get("RELEASE_URL"),
            Some(&"https://github.com/o/r/releases/tag/v1.3.0".to_string())
        );
    }
}
