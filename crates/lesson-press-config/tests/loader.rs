use std::fs;

use lesson_press_config::{Config, ConfigError, DiagnosticKind, LoadOptions, SeverityLevel};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("lesson-press.toml"), contents).expect("write config");
}

#[test]
fn defaults_apply_without_config_file() {
    let temp = TempDir::new().expect("tempdir");
    let config =
        Config::load(LoadOptions::default().with_working_dir(temp.path())).expect("load config");

    assert_eq!(config.site.title, "Lessons");
    assert_eq!(config.site.base_url, "/");
    assert!(config.build.source_dir.ends_with("lessons"));
    assert!(config.build.output_dir.ends_with("public"));
    assert!(config.source_file.is_none());
    assert_eq!(
        config.severity.severity_for(DiagnosticKind::DanglingReference),
        SeverityLevel::Error
    );
    assert_eq!(
        config.severity.severity_for(DiagnosticKind::UnbalancedSnippet),
        SeverityLevel::Warning
    );
}

#[test]
fn config_file_overrides_defaults() {
    let temp = TempDir::new().expect("tempdir");
    write_config(
        &temp,
        concat!(
            "[site]\n",
            "title = \"Programming 101\"\n",
            "base_url = \"/course\"\n\n",
            "[build]\n",
            "source = \"content\"\n",
            "output = \"dist\"\n\n",
            "[severity]\n",
            "dangling-reference = \"warning\"\n",
        ),
    );

    let config =
        Config::load(LoadOptions::default().with_working_dir(temp.path())).expect("load config");

    assert_eq!(config.site.title, "Programming 101");
    // Trailing slash is normalised on.
    assert_eq!(config.site.base_url, "/course/");
    assert!(config.build.source_dir.ends_with("content"));
    assert!(config.build.output_dir.ends_with("dist"));
    assert!(config.source_file.is_some());
    assert_eq!(
        config.severity.severity_for(DiagnosticKind::DanglingReference),
        SeverityLevel::Warning
    );
}

#[test]
fn severity_wildcard_applies_to_unlisted_kinds() {
    let temp = TempDir::new().expect("tempdir");
    write_config(
        &temp,
        concat!(
            "[severity]\n",
            "\"*\" = \"ignore\"\n",
            "duplicate-id = \"error\"\n",
        ),
    );

    let config =
        Config::load(LoadOptions::default().with_working_dir(temp.path())).expect("load config");

    assert_eq!(
        config.severity.severity_for(DiagnosticKind::UnbalancedSnippet),
        SeverityLevel::Ignore
    );
    assert_eq!(
        config.severity.severity_for(DiagnosticKind::DuplicateId),
        SeverityLevel::Error
    );
}

#[test]
fn validation_problems_are_collected_together() {
    let temp = TempDir::new().expect("tempdir");
    write_config(
        &temp,
        concat!(
            "[build]\n",
            "include = [\"[bad\"]\n\n",
            "[severity]\n",
            "no-such-kind = \"error\"\n",
            "front-matter = \"loud\"\n",
        ),
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect_err("validation should fail");

    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.iter().count(), 3);
            let rendered = errors.to_string();
            assert!(rendered.contains("build.include"));
            assert!(rendered.contains("no-such-kind"));
            assert!(rendered.contains("loud"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn explicit_config_path_must_exist() {
    let temp = TempDir::new().expect("tempdir");
    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(temp.path())
            .with_config_path("missing.toml"),
    )
    .expect_err("missing config should fail");

    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}
