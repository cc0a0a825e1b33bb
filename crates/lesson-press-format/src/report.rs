//! Build report formatters.

use serde_json::json;

use crate::BuildReport;

/// Output format for the user-facing build report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportFormat {
    Plain,
    Json,
}

/// Render the report for terminal or machine consumption. The report must be
/// finalized first so ordering and counters are stable.
pub fn render_report(report: &BuildReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Plain => render_plain(report),
        ReportFormat::Json => render_json(report),
    }
}

fn render_plain(report: &BuildReport) -> String {
    let mut out = String::new();

    for diagnostic in &report.diagnostics {
        let location = if diagnostic.line > 0 {
            format!("{}:{}", diagnostic.path.display(), diagnostic.line)
        } else {
            diagnostic.path.display().to_string()
        };
        out.push_str(&format!(
            "{location} {severity}[{kind}]: {message}\n",
            severity = diagnostic.severity,
            kind = diagnostic.kind,
            message = diagnostic.message,
        ));
    }

    out.push_str(&format!(
        "{} documents, {} pages, {} errors, {} warnings\n",
        report.documents_loaded, report.pages_rendered, report.error_count, report.warning_count,
    ));
    out
}

fn render_json(report: &BuildReport) -> String {
    let payload = json!({
        "status": report.status().as_str(),
        "documents": report.documents_loaded,
        "pages": report.pages_rendered,
        "errors": report.error_count,
        "warnings": report.warning_count,
        "diagnostics": report
            .diagnostics
            .iter()
            .map(|diagnostic| {
                json!({
                    "kind": diagnostic.kind.as_str(),
                    "severity": diagnostic.severity.to_string(),
                    "document": diagnostic.document.as_str(),
                    "path": diagnostic.path.display().to_string(),
                    "line": diagnostic.line,
                    "message": diagnostic.message,
                })
            })
            .collect::<Vec<_>>(),
    });

    serde_json::to_string_pretty(&payload).expect("report serialization cannot fail")
}
