//! Source discovery for the Loading stage.

use std::path::PathBuf;

use ignore::WalkBuilder;
use lesson_press_config::BuildSettings;

use crate::OperationError;

/// Walk the source directory and return the corpus file set as sorted
/// root-relative paths. Any walker failure is fatal: the build cannot claim
/// a complete corpus view over a partially readable tree.
pub(crate) fn scan_sources(build: &BuildSettings) -> Result<Vec<PathBuf>, OperationError> {
    let root = &build.source_dir;

    let mut walker = WalkBuilder::new(root);
    walker.follow_links(false);
    if !build.respect_ignore {
        walker
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false);
    }

    let mut files = Vec::new();
    for entry in walker.build() {
        let entry = entry.map_err(|source| OperationError::Scan {
            path: root.clone(),
            source,
        })?;

        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();

        if !build.include.is_empty() && !build.include.matches(&relative) {
            continue;
        }
        if build.exclude.matches(&relative) {
            continue;
        }

        files.push(relative);
    }

    files.sort();
    Ok(files)
}
