use crate::boundary::ReleaseWarning;
use crate::domain::version::cmp_precedence;
use crate::domain::{TagMatch, TagPrefixes};
use crate::error::Result;
use crate::git::Repository;
use semver::Version;
use std::cmp::Ordering;
use tracing::{debug, info};

/// The release a new version is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousTag {
    /// Tag name, `None` when no version tag is reachable
    pub tag: Option<String>,
    pub version: Version,
    pub warnings: Vec<ReleaseWarning>,
}

/// Find the highest version tag reachable from `head`.
///
/// Tags matching one of `prefixes` are compared by semver precedence; on a
/// tie the earlier prefix wins. Tags with a matching prefix that fail to
/// parse are reported as warnings. Without any version tag the result
/// carries `initial_version`.
pub fn locate_previous_tag<R: Repository + ?Sized>(
    repo: &R,
    head: &str,
    prefixes: &TagPrefixes,
    initial_version: &Version,
) -> Result<PreviousTag> {
    let tags = repo.tags_by_commit()?;
    let history = repo.commits_between(None, head)?;

    let mut best: Option<(String, Version, usize)> = None;
    let mut warnings = Vec::new();

    for commit in &history {
        let Some(names) = tags.get(&commit.hash) else {
            continue;
        };
        for name in names {
            match prefixes.parse(name) {
                TagMatch::NoMatch => {}
                TagMatch::Unparsable { reason } => {
                    debug!(tag = %name, %reason, "skipping tag");
                    warnings.push(ReleaseWarning::UnparsableTag {
                        tag: name.clone(),
                        reason,
                    });
                }
                TagMatch::Version { version, priority } => {
                    let better = match &best {
                        None => true,
                        Some((best_name, best_version, best_priority)) => {
                            match cmp_precedence(&version, best_version) {
                                Ordering::Greater => true,
                                Ordering::Less => false,
                                Ordering::Equal => {
                                    (priority, name.as_str()) < (*best_priority, best_name.as_str())
                                }
                            }
                        }
                    };
                    if better {
                        best = Some((name.clone(), version, priority));
                    }
                }
            }
        }
    }

    // report in a stable order regardless of tag map iteration
    warnings.sort_by(|a, b| a.to_string().cmp(&b.to_string()));

    match best {
        Some((tag, version, _)) => {
            info!(tag = %tag, version = %version, "found previous release");
            Ok(PreviousTag {
                tag: Some(tag),
                version,
                warnings,
            })
        }
        None => {
            info!(version = %initial_version, "no previous release tag");
            warnings.push(ReleaseWarning::NoPreviousTag {
                prefixes: prefixes.as_slice().to_vec(),
                initial_version: initial_version.to_string(),
            });
            Ok(PreviousTag {
                tag: None,
                version: initial_version.clone(),
                warnings,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn history() -> MockRepository {
        let mut repo = MockRepository::new();
        for hash in ["c1", "c2", "c3", "c4"] {
            repo.add_commit(hash, hash);
        }
        repo
    }

    #[test]
    fn test_highest_reachable_tag() {
        let mut repo = history();
        repo.add_tag("v1.0.0", "c1");
        repo.add_tag("v1.2.0", "c2");
        repo.add_tag("v1.1.5", "c3");

        let previous =
            locate_previous_tag(&repo, "HEAD", &TagPrefixes::default(), &v("0.0.0")).unwrap();
        assert_eq!(previous.tag.as_deref(), Some("v1.2.0"));
        assert_eq!(previous.version, v("1.2.0"));
        assert!(previous.warnings.is_empty());
    }

    #[test]
    fn test_tags_after_head_are_ignored() {
        let mut repo = history();
        repo.add_tag("v1.0.0", "c1");
        repo.add_tag("v2.0.0", "c4");

        let previous =
            locate_previous_tag(&repo, "c3", &TagPrefixes::default(), &v("0.0.0")).unwrap();
        assert_eq!(previous.tag.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        let mut repo = history();
        repo.add_tag("v2.0.0-rc.1", "c3");
        repo.add_tag("v2.0.0", "c2");

        let previous =
            locate_previous_tag(&repo, "HEAD", &TagPrefixes::default(), &v("0.0.0")).unwrap();
        assert_eq!(previous.version, v("2.0.0"));
    }

    #[test]
    fn test_prefix_priority_on_tie() {
        let mut repo = history();
        repo.add_tag("release-1.0.0", "c2");
        repo.add_tag("v1.0.0", "c2");

        let prefixes = TagPrefixes::new(["v", "release-"]);
        let previous = locate_previous_tag(&repo, "HEAD", &prefixes, &v("0.0.0")).unwrap();
        assert_eq!(previous.tag.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_other_prefixes_are_ignored() {
        let mut repo = history();
        repo.add_tag("release-9.0.0", "c2");
        repo.add_tag("v1.0.0", "c1");

        let previous =
            locate_previous_tag(&repo, "HEAD", &TagPrefixes::default(), &v("0.0.0")).unwrap();
        assert_eq!(previous.tag.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_unparsable_tag_warns() {
        let mut repo = history();
        repo.add_tag("vnext", "c2");
        repo.add_tag("v1.0.0", "c1");

        let previous =
            locate_previous_tag(&repo, "HEAD", &TagPrefixes::default(), &v("0.0.0")).unwrap();
        assert_eq!(previous.tag.as_deref(), Some("v1.0.0"));
        assert_eq!(previous.warnings.len(), 1);
        assert!(matches!(
            &previous.warnings[0],
            ReleaseWarning::UnparsableTag { tag, .. } if tag == "vnext"
        ));
    }

    #[test]
    fn test_no_tags_uses_initial_version() {
        let repo = history();

        let previous =
            locate_previous_tag(&repo, "HEAD", &TagPrefixes::default(), &v("0.1.0")).unwrap();
        assert_eq!(previous.tag, None);
        assert_eq!(previous.version, v("0.1.0"));
        assert!(matches!(
            previous.warnings.last(),
            Some(ReleaseWarning::NoPreviousTag { .. })
        ));
    }
}
