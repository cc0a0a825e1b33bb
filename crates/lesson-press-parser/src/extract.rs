//! Body scanning: fenced code blocks and reference markers.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::{CodeBlock, RefMarker};

/// Extract fenced code blocks and link markers from a document body.
/// `line_offset` is the number of source lines preceding the body, so the
/// returned line numbers point into the original file.
pub(crate) fn scan_body(body: &str, line_offset: usize) -> (Vec<CodeBlock>, Vec<RefMarker>) {
    let offsets = compute_line_offsets(body);
    let mut blocks = Vec::new();
    let mut markers = Vec::new();
    let mut open_block: Option<OpenBlock> = None;

    let parser = Parser::new_ext(body, Options::all());
    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::Link(_, dest, _)) => {
                let target = dest.trim().to_string();
                if !target.is_empty() {
                    markers.push(RefMarker {
                        target,
                        line: line_offset + byte_to_line(range.start, &offsets),
                    });
                }
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info
                    .split_whitespace()
                    .next()
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string);
                open_block = Some(OpenBlock {
                    language,
                    text: String::new(),
                    line: line_offset + byte_to_line(range.start, &offsets),
                });
            }
            Event::Text(text) => {
                if let Some(block) = open_block.as_mut() {
                    block.text.push_str(&text);
                }
            }
            Event::End(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                if let Some(block) = open_block.take() {
                    blocks.push(CodeBlock {
                        index: blocks.len(),
                        language: block.language,
                        text: block.text,
                        line: block.line,
                    });
                }
            }
            _ => {}
        }
    }

    (blocks, markers)
}

struct OpenBlock {
    language: Option<String>,
    text: String,
    line: usize,
}

fn compute_line_offsets(contents: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    offsets.push(0);
    for (idx, ch) in contents.char_indices() {
        if ch == '\n' {
            offsets.push(idx + 1);
        }
    }
    offsets
}

fn byte_to_line(byte: usize, offsets: &[usize]) -> usize {
    match offsets.binary_search(&byte) {
        Ok(idx) => idx + 1,
        Err(idx) => idx,
    }
}
