//! The lesson-press build pipeline.
//!
//! A build walks four stages in a fixed order: Loading scans and parses the
//! corpus, Resolving links reference markers to their targets, Validating
//! sanity-checks embedded code blocks, and Rendering emits the output pages.
//! Stage problems are collected into the [`BuildReport`], never raised; only
//! an unrecoverable I/O failure aborts the walk. The corpus is read-only
//! once Loading completes, so the per-document work in the Resolving and
//! Validating stages runs across parallel workers with results merged in
//! identifier order.

mod corpus;
mod paths;
mod resolve;
mod scan;
mod snippets;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use lesson_press_config::{Config, DiagnosticKind, SeverityLevel, SeverityPolicy};
use lesson_press_format::{
    document_order, render_index, render_page, BuildReport, Diagnostic, PageInputs, RenderedPage,
    ResolvedReference, SnippetFault,
};
use lesson_press_parser::{DocId, Document, PageKind};
use lesson_press_utils::atomic_write;
use log::debug;
use thiserror::Error;

/// Pipeline entry point bound to a resolved configuration.
pub struct Operations {
    config: Config,
}

/// Per-invocation build options supplied by the CLI layer.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Write rendered pages under the configured output directory.
    pub write_output: bool,
    /// Treat every collected diagnostic as fatal for the exit code.
    pub strict: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            write_output: true,
            strict: false,
        }
    }
}

/// Result of a completed (non-aborted) build pass.
#[derive(Debug)]
pub struct BuildOutcome {
    pub report: BuildReport,
    pub pages: Vec<RenderedPage>,
    pub exit_code: i32,
}

/// Unrecoverable failures that abort the pipeline immediately.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("failed to scan source directory {path}: {source}")]
    Scan {
        path: PathBuf,
        source: ignore::Error,
    },
    #[error("I/O failure on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// The linear stage walk of a build pass. No backward transitions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildStage {
    Loading,
    Resolving,
    Validating,
    Rendering,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildStage::Loading => "loading",
            BuildStage::Resolving => "resolving",
            BuildStage::Validating => "validating",
            BuildStage::Rendering => "rendering",
            BuildStage::Done => "done",
        };
        f.write_str(label)
    }
}

impl Operations {
    pub fn new(config: Config) -> Self {
        Operations { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline. The report always describes the whole corpus;
    /// the exit code applies the severity and strictness policy.
    pub fn build(&self, options: &BuildOptions) -> Result<BuildOutcome, OperationError> {
        let mut report = BuildReport::default();

        debug!("stage {}", BuildStage::Loading);
        let files = scan::scan_sources(&self.config.build)?;
        let corpus = corpus::load(
            &self.config.build,
            &files,
            &self.config.severity,
            &mut report,
        )?;
        report.documents_loaded = corpus.len();
        debug!("loaded {} documents from {} files", corpus.len(), files.len());

        debug!("stage {}", BuildStage::Resolving);
        let resolutions =
            resolve::resolve_corpus(&corpus, &self.config.site, &self.config.severity, &mut report);

        debug!("stage {}", BuildStage::Validating);
        let faults = snippets::check_corpus(&corpus, &self.config.severity, &mut report);

        debug!("stage {}", BuildStage::Rendering);
        let pages = self.render(&corpus, &resolutions, &faults);
        report.pages_rendered = pages.len();

        report.finalize();

        if options.write_output {
            for page in &pages {
                let target = self.config.build.output_dir.join(&page.output_path);
                atomic_write(&target, &page.html).map_err(|source| OperationError::Io {
                    path: target.clone(),
                    source,
                })?;
            }
            debug!(
                "wrote {} pages under {}",
                pages.len(),
                self.config.build.output_dir.display()
            );
        }

        debug!("stage {}", BuildStage::Done);
        let exit_code = exit_code_for(&report, options.strict);
        Ok(BuildOutcome {
            report,
            pages,
            exit_code,
        })
    }

    fn render(
        &self,
        corpus: &BTreeMap<DocId, Document>,
        resolutions: &BTreeMap<DocId, Vec<ResolvedReference>>,
        faults: &BTreeMap<DocId, Vec<SnippetFault>>,
    ) -> Vec<RenderedPage> {
        let mut ordered: Vec<&Document> = corpus.values().collect();
        ordered.sort_by(|a, b| document_order(a, b));

        let indexed: Vec<&Document> = ordered
            .iter()
            .copied()
            .filter(|doc| doc.front.kind == PageKind::Indexed)
            .collect();

        let mut pages = Vec::with_capacity(ordered.len() + 1);
        pages.push(render_index(&self.config.site, &indexed));

        for doc in &ordered {
            let inputs = PageInputs {
                site: &self.config.site,
                resolutions: resolutions
                    .get(&doc.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
                faults: faults.get(&doc.id).map(Vec::as_slice).unwrap_or_default(),
            };
            pages.push(render_page(doc, &inputs));
        }
        pages
    }
}

fn exit_code_for(report: &BuildReport, strict: bool) -> i32 {
    if report.has_errors() || (strict && !report.diagnostics.is_empty()) {
        1
    } else {
        0
    }
}

/// Build one diagnostic under the severity policy; kinds set to `ignore`
/// produce nothing.
pub(crate) fn make_diagnostic(
    policy: &SeverityPolicy,
    kind: DiagnosticKind,
    document: DocId,
    path: PathBuf,
    line: usize,
    message: String,
) -> Option<Diagnostic> {
    let severity = policy.severity_for(kind);
    if severity == SeverityLevel::Ignore {
        return None;
    }
    Some(Diagnostic {
        kind,
        severity,
        document,
        path,
        line,
        message,
    })
}
