// tests/config_test.rs
use label_release::config::{load_config, Config, CONFIG_FILE_NAME};
use label_release::domain::{ChangeLevel, LabelMeaning};
use label_release::ReleaseError;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[labels]
"type: feature" = "semver:minor"
"pre" = "semver:prerelease"

[release]
tag_prefixes = ["release-", "v"]
initial_version = "1.0.0"
max_bump = "minor"
max_concurrency = 2

[github]
create_release = true

[hooks]
post_tag = "scripts/notify.sh"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.release.tag_prefixes, vec!["release-", "v"]);
    assert_eq!(config.release.max_bump, ChangeLevel::Minor);
    assert_eq!(config.release.max_concurrency, 2);
    assert_eq!(config.initial_version().unwrap().to_string(), "1.0.0");
    assert!(config.github.create_release);
    assert_eq!(config.hooks.post_tag.as_deref(), Some("scripts/notify.sh"));
    assert_eq!(config.hooks.pre_tag, None);

    let classifier = config.label_classifier().unwrap();
    assert_eq!(classifier.alias_count(), 2);
    assert_eq!(
        classifier.classify("pre:rc"),
        LabelMeaning::Prerelease {
            prefix: "rc".to_string()
        }
    );
}

#[test]
fn test_load_missing_file() {
    let err = load_config(Some("/nonexistent/label-release.toml")).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}

#[test]
fn test_load_invalid_toml() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[release\nmax_bump = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}

#[test]
fn test_load_rejects_inverted_bounds() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[release]\nmin_bump = \"major\"\nmax_bump = \"patch\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
}

#[test]
#[serial]
fn test_discover_config_in_current_directory() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[release]\nremote = \"upstream\"\n",
    )
    .unwrap();

    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(temp_dir.path()).unwrap();
    let result = load_config(None);
    env::set_current_dir(original_dir).unwrap();

    assert_eq!(result.unwrap().release.remote, "upstream");
}

#[test]
#[serial]
fn test_token_from_configured_env() {
    let mut config = Config::default();
    config.github.token_env = "LABEL_RELEASE_TEST_TOKEN".to_string();

    env::set_var("LABEL_RELEASE_TEST_TOKEN", "secret");
    assert_eq!(config.github.token_from_env().as_deref(), Some("secret"));

    env::set_var("LABEL_RELEASE_TEST_TOKEN", "  ");
    assert_eq!(config.github.token_from_env(), None);

    env::remove_var("LABEL_RELEASE_TEST_TOKEN");
    assert_eq!(config.github.token_from_env(), None);
}
