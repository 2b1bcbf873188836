use crate::domain::version::parse_version;
use semver::Version;

/// Outcome of matching a tag name against the configured prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagMatch {
    /// No prefix applies to this tag
    NoMatch,
    /// The tag is `<prefix><version>`; `priority` is the prefix position
    Version { version: Version, priority: usize },
    /// A prefix applies but the remainder is not a semantic version
    Unparsable { reason: String },
}

/// Tag name prefixes (e.g. `v` in `v1.2.3`)
///
/// The first prefix is used when creating tags. All of them are accepted when
/// reading existing tags, earlier prefixes taking priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPrefixes {
    prefixes: Vec<String>,
}

impl TagPrefixes {
    /// Create from a list of prefixes; an empty list means the single prefix `v`
    pub fn new<S: Into<String>>(prefixes: impl IntoIterator<Item = S>) -> Self {
        let mut prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            prefixes.push("v".to_string());
        }
        TagPrefixes { prefixes }
    }

    /// Prefix used for new tags
    pub fn primary(&self) -> &str {
        &self.prefixes[0]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.prefixes
    }

    /// Format a version as a tag name.
    /// Example: prefix="v", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        format!("{}{}", self.primary(), version)
    }

    /// Match a tag name against the prefixes
    pub fn parse(&self, tag: &str) -> TagMatch {
        let mut failure = None;

        for (priority, prefix) in self.prefixes.iter().enumerate() {
            let Some(rest) = tag.strip_prefix(prefix.as_str()) else {
                continue;
            };
            // with an empty prefix only tags that look like versions count
            if prefix.is_empty() && !rest.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            match parse_version(rest) {
                Ok(version) if rest.starts_with(|c: char| c.is_ascii_digit()) => {
                    return TagMatch::Version { version, priority };
                }
                Ok(_) => {
                    failure.get_or_insert_with(|| format!("'{}' is not a bare version", rest));
                }
                Err(e) => {
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        }

        match failure {
            Some(reason) => TagMatch::Unparsable { reason },
            None => TagMatch::NoMatch,
        }
    }
}

impl Default for TagPrefixes {
    fn default() -> Self {
        TagPrefixes::new(["v"])
    }
}
