use crate::domain::{ChangeLevel, LabelClassifier, LabelMeaning};
use crate::error::{ReleaseError, Result};
use serde::Serialize;

/// Release-relevant metadata of one merged pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pull {
    pub number: u64,
    /// Highest level implied by any recognized label
    pub change_level: ChangeLevel,
    /// Raw labels that mapped to a change level, sorted
    pub level_labels: Vec<String>,
    pub has_pre_label: bool,
    /// Track name from `semver:prerelease:<prefix>`, empty when unspecified
    pub pre_release_prefix: String,
    pub has_stable_label: bool,
}

impl Pull {
    /// Annotate a pull request from its raw labels.
    ///
    /// Fails when two labels name different pre-release prefixes or when the
    /// pull carries both a pre-release and a stable marker.
    pub fn new<S: AsRef<str>>(
        number: u64,
        classifier: &LabelClassifier,
        labels: &[S],
    ) -> Result<Self> {
        let mut sorted: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
        sorted.sort_unstable();

        let mut pull = Pull {
            number,
            change_level: ChangeLevel::None,
            level_labels: Vec::new(),
            has_pre_label: false,
            pre_release_prefix: String::new(),
            has_stable_label: false,
        };

        for label in sorted {
            match classifier.classify(label) {
                LabelMeaning::Level(level) => {
                    pull.level_labels.push(label.to_string());
                    pull.change_level = pull.change_level.max(level);
                }
                LabelMeaning::Prerelease { prefix } => {
                    pull.has_pre_label = true;
                    if prefix.is_empty() {
                        continue;
                    }
                    if pull.pre_release_prefix.is_empty() {
                        pull.pre_release_prefix = prefix;
                    } else if pull.pre_release_prefix != prefix {
                        return Err(ReleaseError::label(format!(
                            "pull #{} has conflicting prerelease prefixes: {} and {}",
                            number, pull.pre_release_prefix, prefix
                        )));
                    }
                }
                LabelMeaning::Stable => pull.has_stable_label = true,
                LabelMeaning::Unrecognized => {}
            }
        }

        if pull.has_pre_label && pull.has_stable_label {
            return Err(ReleaseError::label(format!(
                "pull #{} has both prerelease and stable labels",
                number
            )));
        }

        Ok(pull)
    }

    /// Whether at least one label set a change level
    pub fn is_labeled(&self) -> bool {
        !self.level_labels.is_empty()
    }
}

/// A pull request as fetched, before its labels are interpreted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPull {
    pub number: u64,
    pub labels: Vec<String>,
}

impl RawPull {
    pub fn new<S: Into<String>>(number: u64, labels: impl IntoIterator<Item = S>) -> Self {
        RawPull {
            number,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Interpret the labels with `classifier`
    pub fn annotate(&self, classifier: &LabelClassifier) -> Result<Pull> {
        Pull::new(self.number, classifier, &self.labels)
    }
}

/// First pair of pulls naming different non-empty pre-release prefixes.
///
/// The first element is the pull that introduced the earlier prefix.
pub fn find_prefix_conflict<'a, I>(pulls: I) -> Option<(&'a Pull, &'a Pull)>
where
    I: IntoIterator<Item = &'a Pull>,
{
    let mut first: Option<&Pull> = None;
    for pull in pulls {
        if pull.pre_release_prefix.is_empty() {
            continue;
        }
        match first {
            None => first = Some(pull),
            Some(seen) if seen.pre_release_prefix != pull.pre_release_prefix => {
                return Some((seen, pull));
            }
            Some(_) => {}
        }
    }
    None
}

/// Format pull numbers as `[#1 #2]` for diagnostics
pub fn format_pull_numbers<'a, I>(pulls: I) -> String
where
    I: IntoIterator<Item = &'a Pull>,
{
    let numbers: Vec<String> = pulls.into_iter().map(|p| format!("#{}", p.number)).collect();
    format!("[{}]", numbers.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull(number: u64, labels: &[&str]) -> Result<Pull> {
        Pull::new(number, &LabelClassifier::new(), labels)
    }

    #[test]
    fn test_highest_level_wins() {
        let p = pull(1, &["semver:patch", "semver:minor", "documentation"]).unwrap();
        assert_eq!(p.change_level, ChangeLevel::Minor);
        assert_eq!(p.level_labels, vec!["semver:minor", "semver:patch"]);
        assert!(p.is_labeled());
    }

    #[test]
    fn test_level_labels_keep_raw_text_sorted() {
        let p = pull(2, &["Bug", "Enhancement"]).unwrap();
        assert_eq!(p.level_labels, vec!["Bug", "Enhancement"]);
        assert_eq!(p.change_level, ChangeLevel::Minor);
    }

    #[test]
    fn test_unlabeled_pull() {
        let p = pull(3, &["documentation"]).unwrap();
        assert_eq!(p.change_level, ChangeLevel::None);
        assert!(!p.is_labeled());
    }

    #[test]
    fn test_none_label_counts_as_labeled() {
        let p = pull(4, &["semver:none"]).unwrap();
        assert_eq!(p.change_level, ChangeLevel::None);
        assert!(p.is_labeled());
    }

    #[test]
    fn test_prerelease_prefix_captured() {
        let p = pull(5, &["semver:prerelease:alpha", "semver:prerelease", "semver:patch"])
            .unwrap();
        assert!(p.has_pre_label);
        assert_eq!(p.pre_release_prefix, "alpha");
        assert!(!p.has_stable_label);
    }

    #[test]
    fn test_conflicting_prefixes() {
        let err = pull(6, &["semver:prerelease:beta", "semver:prerelease:alpha"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "pull #6 has conflicting prerelease prefixes: alpha and beta"
        );
    }

    #[test]
    fn test_same_prefix_twice_is_fine() {
        let classifier =
            LabelClassifier::with_aliases([("alpha", "semver:prerelease:alpha")]).unwrap();
        let p = Pull::new(7, &classifier, &["alpha", "semver:prerelease:alpha"]).unwrap();
        assert_eq!(p.pre_release_prefix, "alpha");
    }

    #[test]
    fn test_pre_and_stable_conflict() {
        let err = pull(8, &["semver:stable", "semver:prerelease"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "pull #8 has both prerelease and stable labels"
        );
    }

    #[test]
    fn test_raw_pull_annotate() {
        let raw = RawPull::new(9, ["semver:minor"]);
        let p = raw.annotate(&LabelClassifier::new()).unwrap();
        assert_eq!(p.number, 9);
        assert_eq!(p.change_level, ChangeLevel::Minor);
    }

    #[test]
    fn test_find_prefix_conflict() {
        let pulls = vec![
            pull(1, &["semver:prerelease"]).unwrap(),
            pull(2, &["semver:prerelease:alpha"]).unwrap(),
            pull(3, &["semver:prerelease:alpha"]).unwrap(),
            pull(4, &["semver:prerelease:beta"]).unwrap(),
        ];
        let (a, b) = find_prefix_conflict(&pulls).unwrap();
        assert_eq!((a.number, b.number), (2, 4));
        assert!(find_prefix_conflict(&pulls[..3]).is_none());
    }

    #[test]
    fn test_format_pull_numbers() {
        let pulls = vec![pull(1, &[]).unwrap(), pull(22, &[]).unwrap()];
        assert_eq!(format_pull_numbers(&pulls), "[#1 #22]");
        assert_eq!(format_pull_numbers(std::iter::empty()), "[]");
    }
}
