//! Link target classification and id-space path resolution.

use std::path::{Component, Path, PathBuf};

/// Return true if the provided target points to an external resource (http/mailto/etc.).
pub(crate) fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

/// Determine whether the provided string looks like a Markdown file path.
pub(crate) fn is_markdown_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

/// Split a link target into its path and optional fragment components.
pub(crate) fn split_link_target(target: &str) -> (&str, Option<&str>) {
    if let Some((path, fragment)) = target.split_once('#') {
        if path.is_empty() {
            ("", Some(fragment))
        } else {
            (path, Some(fragment))
        }
    } else if let Some(stripped) = target.strip_prefix('#') {
        ("", Some(stripped))
    } else {
        (target, None)
    }
}

/// Resolve a link target against the source document's location, staying in
/// corpus-relative space. A leading `/` anchors the target at the corpus
/// root.
pub(crate) fn resolve_relative(source: &Path, target: &str) -> PathBuf {
    let combined = if let Some(rooted) = target.strip_prefix('/') {
        PathBuf::from(rooted)
    } else {
        let base = source.parent().unwrap_or_else(|| Path::new(""));
        base.join(target)
    };
    normalize_path(combined)
}

/// Canonicalise `.` and `..` path segments without touching the filesystem.
fn normalize_path(path: PathBuf) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_schemes_are_recognised() {
        assert!(is_external("https://example.com/page"));
        assert!(is_external("mailto:someone@example.com"));
        assert!(!is_external("lessons/intro.md"));
    }

    #[test]
    fn split_separates_fragment() {
        assert_eq!(split_link_target("a.md#setup"), ("a.md", Some("setup")));
        assert_eq!(split_link_target("#setup"), ("", Some("setup")));
        assert_eq!(split_link_target("a.md"), ("a.md", None));
    }

    #[test]
    fn relative_targets_resolve_against_source_dir() {
        let resolved = resolve_relative(Path::new("basics/references.md"), "../advanced/io.md");
        assert_eq!(resolved, PathBuf::from("advanced/io.md"));
    }

    #[test]
    fn rooted_targets_resolve_against_corpus_root() {
        let resolved = resolve_relative(Path::new("basics/references.md"), "/intro.md");
        assert_eq!(resolved, PathBuf::from("intro.md"));
    }
}
