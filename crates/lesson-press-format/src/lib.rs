//! Shared pipeline result types and all output rendering for lesson-press:
//! per-document HTML pages, the navigation index, and the build report in
//! plain or JSON form.

mod page;
mod report;

pub use page::{document_order, page_href, page_output_path, render_index, render_page, PageInputs};
pub use report::{render_report, ReportFormat};

use std::path::PathBuf;

use lesson_press_config::{DiagnosticKind, SeverityLevel};
use lesson_press_parser::DocId;

/// One collected build problem. Never raised; gathered into the report.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: SeverityLevel,
    pub document: DocId,
    /// Source path relative to the corpus root.
    pub path: PathBuf,
    /// 1-based source line; 0 when the problem concerns the whole file.
    pub line: usize,
    pub message: String,
}

/// Final outcome of a build pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildStatus {
    Success,
    CompletedWithErrors,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Success => "success",
            BuildStatus::CompletedWithErrors => "completed-with-errors",
        }
    }
}

/// Accumulated diagnostics plus corpus counters for one build pass.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    pub diagnostics: Vec<Diagnostic>,
    pub documents_loaded: usize,
    pub pages_rendered: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

impl BuildReport {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Sort diagnostics into a stable order and refresh the severity counters.
    pub fn finalize(&mut self) {
        self.diagnostics.sort_by(|a, b| match a.path.cmp(&b.path) {
            std::cmp::Ordering::Equal => match a.line.cmp(&b.line) {
                std::cmp::Ordering::Equal => a.kind.as_str().cmp(b.kind.as_str()),
                other => other,
            },
            other => other,
        });

        let (errors, warnings) =
            self.diagnostics
                .iter()
                .fold((0usize, 0usize), |mut acc, diagnostic| {
                    match diagnostic.severity {
                        SeverityLevel::Error => acc.0 += 1,
                        SeverityLevel::Warning => acc.1 += 1,
                        SeverityLevel::Ignore => {}
                    }
                    acc
                });
        self.error_count = errors;
        self.warning_count = warnings;
    }

    pub fn status(&self) -> BuildStatus {
        if self.diagnostics.is_empty() {
            BuildStatus::Success
        } else {
            BuildStatus::CompletedWithErrors
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Resolver annotation for one reference marker.
#[derive(Clone, Debug)]
pub struct ResolvedReference {
    pub target: String,
    pub line: usize,
    pub outcome: ResolvedTarget,
}

/// Where a reference marker points after resolution.
#[derive(Clone, Debug)]
pub enum ResolvedTarget {
    Internal { id: DocId, href: String },
    External,
    Dangling,
}

/// Validator annotation for one unbalanced code block.
#[derive(Clone, Debug)]
pub struct SnippetFault {
    pub block_index: usize,
    /// Closing delimiter that was expected, if any was open.
    pub expected: Option<char>,
    /// Delimiter actually encountered; `None` when the block ended first.
    pub found: Option<char>,
    /// 1-based source line of the fault.
    pub line: usize,
}

/// A rendered output page, regenerated from scratch on every build.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// Output location relative to the output directory.
    pub output_path: PathBuf,
    pub html: String,
}
