//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text; `display_*` functions print it.
//! Results go to stdout, diagnostics to stderr.

use crate::analyzer::{NextResult, PullCheck};
use crate::boundary::ReleaseWarning;
use crate::cli::orchestration::WorkflowResult;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary of a computed release.
///
/// Shows either:
/// - If releasing: "From: old -> To: new" with the tag
/// - Otherwise: that nothing would be released
pub fn format_next(result: &NextResult) -> String {
    let from = result
        .previous_ref
        .clone()
        .unwrap_or_else(|| format!("{} (no tag)", result.previous_version));

    let mut out = format!(
        "{}\n  Commits analyzed: {}\n",
        style("Release Analysis:").bold(),
        result.commit_count
    );

    match &result.next_tag {
        Some(tag) => {
            out.push_str(&format!("  From:   {}\n", style(&from).red()));
            out.push_str(&format!("  To:     {}\n", style(tag).green()));
            out.push_str(&format!("  Change: {}", result.change_level));
            if result.is_prerelease() {
                out.push_str(" (pre-release)");
            }
        }
        None => {
            out.push_str(&format!(
                "  Current: {}\n  Nothing to release",
                style(&from).cyan()
            ));
        }
    }
    out
}

pub fn display_next(result: &NextResult) {
    println!("{}", format_next(result));
}

/// Summary of a single pull request check.
pub fn format_pull_check(check: &PullCheck) -> String {
    let mut out = format!(
        "{} #{}: {}",
        style("Pull request").bold(),
        check.pull.number,
        check.pull.change_level
    );

    if !check.pull.level_labels.is_empty() {
        out.push_str(&format!(" [{}]", check.pull.level_labels.join(", ")));
    }
    if check.pull.has_pre_label {
        match check.pull.pre_release_prefix.as_str() {
            "" => out.push_str(", pre-release"),
            prefix => out.push_str(&format!(", pre-release ({})", prefix)),
        }
    }
    if check.pull.has_stable_label {
        out.push_str(", stable");
    }
    if let Some(change) = &check.change {
        out.push_str(&format!(
            "\n  Would release: {} -> {}",
            change.previous_version,
            style(&change.next_version).green()
        ));
    }
    out
}

pub fn display_pull_check(check: &PullCheck) {
    println!("{}", format_pull_check(check));
}

/// Display the outcome of a release workflow.
pub fn display_workflow_result(result: &WorkflowResult) {
    let Some(tag) = &result.tag else {
        display_status("No tag created");
        return;
    };

    display_success(&format!("Created tag {}", style(tag).green()));
    if result.pushed {
        display_success(&format!("Pushed {} to {}", tag, result.remote));
    } else {
        display_manual_push_instruction(tag, &result.remote);
    }
    if let Some(url) = &result.release_url {
        display_success(&format!("Published release {}", url));
    }
}

/// Display manual push instruction for a tag.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::VersionChange;
    use crate::domain::{ChangeLevel, LabelClassifier, Pull};
    use console::strip_ansi_codes;
    use semver::Version;

    fn result(next_tag: Option<&str>, next: &str) -> NextResult {
        NextResult {
            previous_ref: Some("v1.2.3".to_string()),
            head_sha: "abc".to_string(),
            previous_version: Version::parse("1.2.3").unwrap(),
            next_version: Version::parse(next).unwrap(),
            change_level: ChangeLevel::Minor,
            next_tag: next_tag.map(String::from),
            commit_count: 4,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_format_next_release() {
        let text = format_next(&result(Some("v1.3.0"), "1.3.0"));
        let plain = strip_ansi_codes(&text);
        assert!(plain.contains("Commits analyzed: 4"));
        assert!(plain.contains("From:   v1.2.3"));
        assert!(plain.contains("To:     v1.3.0"));
        assert!(plain.contains("Change: minor"));
        assert!(!plain.contains("pre-release"));
    }

    #[test]
    fn test_format_next_prerelease() {
        let text = format_next(&result(Some("v1.3.0-rc.0"), "1.3.0-rc.0"));
        assert!(strip_ansi_codes(&text).contains("(pre-release)"));
    }

    #[test]
    fn test_format_next_nothing() {
        let text = format_next(&result(None, "1.2.3"));
        let plain = strip_ansi_codes(&text);
        assert!(plain.contains("Current: v1.2.3"));
        assert!(plain.contains("Nothing to release"));
    }

    #[test]
    fn test_format_pull_check() {
        let pull = Pull::new(
            5,
            &LabelClassifier::new(),
            &["feature", "semver:prerelease:beta"],
        )
        .unwrap();
        let check = PullCheck {
            pull,
            commits: vec!["a".to_string()],
            change: Some(VersionChange {
                previous_version: Version::parse("1.0.0").unwrap(),
                next_version: Version::parse("1.1.0-beta.0").unwrap(),
                change_level: ChangeLevel::Minor,
            }),
        };

        let plain = strip_ansi_codes(&format_pull_check(&check)).to_string();
        assert!(plain.starts_with("Pull request #5: minor [feature], pre-release (beta)"));
        assert!(plain.contains("Would release: 1.0.0 -> 1.1.0-beta.0"));
    }
}
