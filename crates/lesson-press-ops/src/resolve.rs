//! The Resolving stage: link reference markers to corpus documents.
//!
//! Documents are independent of one another here, so the per-document work
//! fans out across rayon workers; results are merged back in identifier
//! order to keep the pass deterministic.

use std::collections::BTreeMap;
use std::path::PathBuf;

use lesson_press_config::{DiagnosticKind, SeverityPolicy, SiteSettings};
use lesson_press_format::{page_href, BuildReport, Diagnostic, ResolvedReference, ResolvedTarget};
use lesson_press_parser::{DocId, Document, RefMarker};
use percent_encoding::percent_decode_str;
use rayon::prelude::*;
use strsim::normalized_levenshtein;

use crate::{make_diagnostic, paths};

/// Resolve every document's reference markers against the corpus.
pub(crate) fn resolve_corpus(
    corpus: &BTreeMap<DocId, Document>,
    site: &SiteSettings,
    policy: &SeverityPolicy,
    report: &mut BuildReport,
) -> BTreeMap<DocId, Vec<ResolvedReference>> {
    let docs: Vec<&Document> = corpus.values().collect();

    let resolved: Vec<(DocId, Vec<ResolvedReference>, Vec<Diagnostic>)> = docs
        .par_iter()
        .map(|doc| resolve_document(doc, corpus, site, policy))
        .collect();

    let mut annotations = BTreeMap::new();
    for (id, references, diagnostics) in resolved {
        report.extend(diagnostics);
        annotations.insert(id, references);
    }
    annotations
}

fn resolve_document(
    doc: &Document,
    corpus: &BTreeMap<DocId, Document>,
    site: &SiteSettings,
    policy: &SeverityPolicy,
) -> (DocId, Vec<ResolvedReference>, Vec<Diagnostic>) {
    let mut references = Vec::with_capacity(doc.references.len());
    let mut diagnostics = Vec::new();

    for marker in &doc.references {
        let outcome = match classify(doc, marker, corpus, site) {
            Classification::External => ResolvedTarget::External,
            Classification::Internal { id, href } => ResolvedTarget::Internal { id, href },
            Classification::Dangling { candidate } => {
                let mut message = format!("unresolved reference '{}'", marker.target);
                if let Some(suggestion) = suggest_target(candidate.as_str(), corpus) {
                    message.push_str(&format!(". Did you mean '{suggestion}'?"));
                }
                diagnostics.extend(make_diagnostic(
                    policy,
                    DiagnosticKind::DanglingReference,
                    doc.id.clone(),
                    doc.relative_path.clone(),
                    marker.line,
                    message,
                ));
                ResolvedTarget::Dangling
            }
        };

        references.push(ResolvedReference {
            target: marker.target.clone(),
            line: marker.line,
            outcome,
        });
    }

    (doc.id.clone(), references, diagnostics)
}

enum Classification {
    External,
    Internal { id: DocId, href: String },
    Dangling { candidate: DocId },
}

fn classify(
    doc: &Document,
    marker: &RefMarker,
    corpus: &BTreeMap<DocId, Document>,
    site: &SiteSettings,
) -> Classification {
    let target = marker.target.as_str();
    if paths::is_external(target) {
        return Classification::External;
    }

    let (path_part, fragment) = paths::split_link_target(target);
    if path_part.is_empty() {
        // Pure fragment links stay within the page.
        return Classification::External;
    }

    let decoded = percent_decode_str(path_part).decode_utf8_lossy();
    if !paths::is_markdown_path(&decoded) {
        return Classification::External;
    }

    let resolved_path: PathBuf = paths::resolve_relative(&doc.relative_path, &decoded);
    let id = DocId::from_relative_path(&resolved_path);

    if corpus.contains_key(&id) {
        let mut href = page_href(site, &id);
        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(fragment);
        }
        Classification::Internal { id, href }
    } else {
        Classification::Dangling { candidate: id }
    }
}

fn suggest_target(candidate: &str, corpus: &BTreeMap<DocId, Document>) -> Option<String> {
    corpus
        .keys()
        .map(|id| (id.as_str(), normalized_levenshtein(candidate, id.as_str())))
        .filter(|(_, score)| *score > 0.6)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id.to_string())
}
