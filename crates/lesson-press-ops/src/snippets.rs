//! The Validating stage: delimiter balance checks over embedded code blocks.
//!
//! This is a sanity check for obviously truncated examples, not a compiler:
//! it tracks `(){}[]` nesting and ignores everything else, regardless of the
//! declared language tag. Per-document work is independent and runs in
//! parallel, merged back in identifier order.

use std::collections::BTreeMap;

use lesson_press_config::{DiagnosticKind, SeverityPolicy};
use lesson_press_format::{BuildReport, Diagnostic, SnippetFault};
use lesson_press_parser::{DocId, Document};
use rayon::prelude::*;

use crate::make_diagnostic;

/// Check every document's code blocks, collecting one diagnostic per
/// unbalanced block.
pub(crate) fn check_corpus(
    corpus: &BTreeMap<DocId, Document>,
    policy: &SeverityPolicy,
    report: &mut BuildReport,
) -> BTreeMap<DocId, Vec<SnippetFault>> {
    let docs: Vec<&Document> = corpus.values().collect();

    let checked: Vec<(DocId, Vec<SnippetFault>, Vec<Diagnostic>)> = docs
        .par_iter()
        .map(|doc| check_document(doc, policy))
        .collect();

    let mut annotations = BTreeMap::new();
    for (id, faults, diagnostics) in checked {
        report.extend(diagnostics);
        if !faults.is_empty() {
            annotations.insert(id, faults);
        }
    }
    annotations
}

fn check_document(
    doc: &Document,
    policy: &SeverityPolicy,
) -> (DocId, Vec<SnippetFault>, Vec<Diagnostic>) {
    let mut faults = Vec::new();
    let mut diagnostics = Vec::new();

    for block in &doc.code_blocks {
        let Some(fault) = scan_block(&block.text) else {
            continue;
        };

        // Block text starts on the line after the opening fence.
        let line = block.line + fault.line;
        let message = match (fault.expected, fault.found) {
            (Some(expected), Some(found)) => format!(
                "code block {}: expected '{}' but found '{}'",
                block.index, expected, found
            ),
            (None, Some(found)) => {
                format!("code block {}: unexpected '{}'", block.index, found)
            }
            (Some(expected), None) => format!(
                "code block {}: missing '{}' before end of block",
                block.index, expected
            ),
            (None, None) => unreachable!("a fault names at least one delimiter"),
        };

        diagnostics.extend(make_diagnostic(
            policy,
            DiagnosticKind::UnbalancedSnippet,
            doc.id.clone(),
            doc.relative_path.clone(),
            line,
            message,
        ));
        faults.push(SnippetFault {
            block_index: block.index,
            expected: fault.expected,
            found: fault.found,
            line,
        });
    }

    (doc.id.clone(), faults, diagnostics)
}

struct BalanceFault {
    expected: Option<char>,
    found: Option<char>,
    /// 1-based line within the block text.
    line: usize,
}

/// Single-pass delimiter stack over the block text. The first fault wins.
fn scan_block(text: &str) -> Option<BalanceFault> {
    let mut stack: Vec<char> = Vec::new();
    let mut line = 1usize;

    for ch in text.chars() {
        match ch {
            '\n' => line += 1,
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => match stack.pop() {
                Some(expected) if expected == ch => {}
                Some(expected) => {
                    return Some(BalanceFault {
                        expected: Some(expected),
                        found: Some(ch),
                        line,
                    })
                }
                None => {
                    return Some(BalanceFault {
                        expected: None,
                        found: Some(ch),
                        line,
                    })
                }
            },
            _ => {}
        }
    }

    stack.pop().map(|expected| BalanceFault {
        expected: Some(expected),
        found: None,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_block_passes() {
        assert!(scan_block("class Logger {\n  void log() {}\n}\n").is_none());
    }

    #[test]
    fn unclosed_brace_is_reported_at_end() {
        let fault = scan_block("class Logger {\n  void log() {\n").expect("fault");
        assert_eq!(fault.expected, Some('}'));
        assert_eq!(fault.found, None);
    }

    #[test]
    fn mismatched_closer_is_reported_with_both_sides() {
        let fault = scan_block("log.info(args[0)]\n").expect("fault");
        assert_eq!(fault.expected, Some(']'));
        assert_eq!(fault.found, Some(')'));
        assert_eq!(fault.line, 1);
    }

    #[test]
    fn stray_closer_is_reported() {
        let fault = scan_block("}\n").expect("fault");
        assert_eq!(fault.expected, None);
        assert_eq!(fault.found, Some('}'));
    }
}
