//! Corpus loading: read and parse every discovered source unit.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use lesson_press_config::{BuildSettings, DiagnosticKind, SeverityPolicy};
use lesson_press_format::BuildReport;
use lesson_press_parser::{parse_document, DocId, Document};

use crate::{make_diagnostic, OperationError};

/// Parse the file set into the corpus mapping. A document that fails to
/// parse is excluded and collected as a `front-matter` diagnostic; an
/// identifier collision keeps the first document and collects a
/// `duplicate-id` diagnostic. An unreadable file aborts the build.
pub(crate) fn load(
    build: &BuildSettings,
    files: &[PathBuf],
    policy: &SeverityPolicy,
    report: &mut BuildReport,
) -> Result<BTreeMap<DocId, Document>, OperationError> {
    let mut corpus: BTreeMap<DocId, Document> = BTreeMap::new();

    for relative in files {
        let absolute = build.source_dir.join(relative);
        let contents = fs::read_to_string(&absolute).map_err(|source| OperationError::Io {
            path: absolute.clone(),
            source,
        })?;

        match parse_document(relative, &contents) {
            Ok(doc) => {
                if let Some(existing) = corpus.get(&doc.id) {
                    report.extend(make_diagnostic(
                        policy,
                        DiagnosticKind::DuplicateId,
                        doc.id.clone(),
                        relative.clone(),
                        0,
                        format!(
                            "identifier '{}' already taken by {}",
                            doc.id,
                            existing.relative_path.display()
                        ),
                    ));
                } else {
                    corpus.insert(doc.id.clone(), doc);
                }
            }
            Err(err) => {
                report.extend(make_diagnostic(
                    policy,
                    DiagnosticKind::FrontMatter,
                    DocId::from_relative_path(relative),
                    relative.clone(),
                    0,
                    err.to_string(),
                ));
            }
        }
    }

    Ok(corpus)
}
