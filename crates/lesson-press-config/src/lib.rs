//! Configuration primitives and loader for the lesson-press compiler.
//!
//! Settings resolve through a short precedence stack: built-in defaults,
//! then an optional `lesson-press.toml`, then command-line overrides
//! applied by the CLI layer. Parsed settings are normalised into typed
//! structures so downstream crates never touch raw TOML, and every
//! validation problem is collected and reported in one batch.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "lesson-press.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteSettings,
    pub build: BuildSettings,
    pub severity: SeverityPolicy,
    /// Path of the config file that was loaded, if any.
    pub source_file: Option<PathBuf>,
}

/// Site-wide presentation settings used by the renderer.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    pub title: String,
    /// Href prefix for rendered pages; always ends with `/`.
    pub base_url: String,
}

/// Settings that govern corpus discovery and output placement.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub include: PatternList,
    pub exclude: PatternList,
    pub respect_ignore: bool,
}

/// Per-kind severity overrides with optional `"*"` wildcard.
#[derive(Clone, Debug, Default)]
pub struct SeverityPolicy {
    overrides: HashMap<DiagnosticKind, SeverityLevel>,
    wildcard: Option<SeverityLevel>,
}

impl SeverityPolicy {
    /// Returns the effective severity for `kind`, falling back to the
    /// wildcard entry and then to the kind's built-in default.
    pub fn severity_for(&self, kind: DiagnosticKind) -> SeverityLevel {
        self.overrides
            .get(&kind)
            .copied()
            .or(self.wildcard)
            .unwrap_or_else(|| kind.default_severity())
    }

    pub fn set(&mut self, kind: DiagnosticKind, level: SeverityLevel) {
        self.overrides.insert(kind, level);
    }
}

/// The kinds of diagnostics a build can collect.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DiagnosticKind {
    FrontMatter,
    DanglingReference,
    UnbalancedSnippet,
    DuplicateId,
}

impl DiagnosticKind {
    pub const ALL: &'static [DiagnosticKind] = &[
        DiagnosticKind::FrontMatter,
        DiagnosticKind::DanglingReference,
        DiagnosticKind::UnbalancedSnippet,
        DiagnosticKind::DuplicateId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::FrontMatter => "front-matter",
            DiagnosticKind::DanglingReference => "dangling-reference",
            DiagnosticKind::UnbalancedSnippet => "unbalanced-snippet",
            DiagnosticKind::DuplicateId => "duplicate-id",
        }
    }

    /// Built-in severity when no override applies. Reference and identifier
    /// problems break navigation, so they default to errors; a dropped or
    /// ugly page is survivable and defaults to a warning.
    pub fn default_severity(self) -> SeverityLevel {
        match self {
            DiagnosticKind::FrontMatter => SeverityLevel::Warning,
            DiagnosticKind::DanglingReference => SeverityLevel::Error,
            DiagnosticKind::UnbalancedSnippet => SeverityLevel::Warning,
            DiagnosticKind::DuplicateId => SeverityLevel::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosticKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "front-matter" => Ok(DiagnosticKind::FrontMatter),
            "dangling-reference" => Ok(DiagnosticKind::DanglingReference),
            "unbalanced-snippet" => Ok(DiagnosticKind::UnbalancedSnippet),
            "duplicate-id" => Ok(DiagnosticKind::DuplicateId),
            _ => Err(()),
        }
    }
}

/// Severity attached to collected diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeverityLevel {
    Error,
    Warning,
    Ignore,
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeverityLevel::Error => "error",
            SeverityLevel::Warning => "warning",
            SeverityLevel::Ignore => "ignore",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for SeverityLevel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "error" => Ok(SeverityLevel::Error),
            "warning" => Ok(SeverityLevel::Warning),
            "ignore" => Ok(SeverityLevel::Ignore),
            _ => Err(()),
        }
    }
}

/// Glob pattern plus compiled matcher helper.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    glob: Glob,
}

impl Pattern {
    fn new(value: String) -> Result<Self, ConfigValidationError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                original: value,
                glob,
            }),
            Err(err) => Err(ConfigValidationError::new(format!(
                "invalid glob pattern '{value}': {err}"
            ))),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn glob(&self) -> &Glob {
        &self.glob
    }
}

/// Ordered list of glob patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    fn new(patterns: Vec<Pattern>) -> Self {
        PatternList { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| {
            let matcher: GlobMatcher = pattern.glob().compile_matcher();
            matcher.is_match(path)
        })
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("config file {path} not found")]
    FileNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;

        let config_path = match options.config_path {
            Some(path) => {
                let absolute = make_absolute(&path, &working_dir);
                if !absolute.exists() {
                    return Err(ConfigError::FileNotFound { path: absolute });
                }
                Some(absolute)
            }
            None => {
                let candidate = working_dir.join(CONFIG_FILE_NAME);
                candidate.exists().then_some(candidate)
            }
        };

        let raw = match &config_path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                toml::from_str::<RawConfig>(&contents).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => RawConfig::default(),
        };

        // Relative paths in the file resolve against the file's directory;
        // without a file they resolve against the working directory.
        let base_dir = config_path
            .as_ref()
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| working_dir.clone());

        finalize(raw, &base_dir, config_path).map_err(ConfigError::Validation)
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn finalize(
    raw: RawConfig,
    base_dir: &Path,
    source_file: Option<PathBuf>,
) -> Result<Config, ConfigValidationErrors> {
    let mut errors = Vec::new();

    let site_raw = raw.site.unwrap_or_default();
    let title = site_raw.title.unwrap_or_else(|| "Lessons".to_string());
    if title.trim().is_empty() {
        errors.push(
            ConfigValidationError::new("title cannot be empty".into()).with_context("site.title"),
        );
    }

    let mut base_url = site_raw.base_url.unwrap_or_else(|| "/".to_string());
    if base_url.is_empty() {
        errors.push(
            ConfigValidationError::new("base_url cannot be empty".into())
                .with_context("site.base_url"),
        );
    } else if !base_url.ends_with('/') {
        base_url.push('/');
    }

    let build_raw = raw.build.unwrap_or_default();
    let source_dir = make_absolute(
        &build_raw.source.unwrap_or_else(|| PathBuf::from("lessons")),
        base_dir,
    );
    let output_dir = make_absolute(
        &build_raw.output.unwrap_or_else(|| PathBuf::from("public")),
        base_dir,
    );

    let include = compile_patterns(
        build_raw
            .include
            .unwrap_or_else(|| vec!["**/*.md".to_string()]),
        "build.include",
        &mut errors,
    );
    let exclude = compile_patterns(
        build_raw.exclude.unwrap_or_default(),
        "build.exclude",
        &mut errors,
    );

    let severity = parse_severity_map(raw.severity, &mut errors);

    if !errors.is_empty() {
        return Err(ConfigValidationErrors(errors));
    }

    Ok(Config {
        site: SiteSettings { title, base_url },
        build: BuildSettings {
            source_dir,
            output_dir,
            include: PatternList::new(include),
            exclude: PatternList::new(exclude),
            respect_ignore: true,
        },
        severity,
        source_file,
    })
}

fn compile_patterns(
    values: Vec<String>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for value in values {
        match Pattern::new(value) {
            Ok(compiled) => patterns.push(compiled),
            Err(err) => errors.push(err.with_context(context)),
        }
    }
    patterns
}

fn parse_severity_map(
    raw: HashMap<String, String>,
    errors: &mut Vec<ConfigValidationError>,
) -> SeverityPolicy {
    let mut policy = SeverityPolicy::default();
    for (kind_name, level_name) in raw {
        let level = match level_name.parse::<SeverityLevel>() {
            Ok(level) => level,
            Err(_) => {
                errors.push(
                    ConfigValidationError::new(format!(
                        "invalid severity '{level_name}' for '{kind_name}'"
                    ))
                    .with_context("severity"),
                );
                continue;
            }
        };

        if kind_name == "*" {
            policy.wildcard = Some(level);
            continue;
        }

        match kind_name.parse::<DiagnosticKind>() {
            Ok(kind) => {
                policy.overrides.insert(kind, level);
            }
            Err(_) => errors.push(
                ConfigValidationError::new(format!("unknown diagnostic kind '{kind_name}'"))
                    .with_context("severity"),
            ),
        }
    }
    policy
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional context naming the offending key.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(message: String) -> Self {
        ConfigValidationError {
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    site: Option<RawSite>,
    #[serde(default)]
    build: Option<RawBuild>,
    #[serde(default)]
    severity: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSite {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBuild {
    #[serde(default)]
    source: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}
