//! Lesson source parsing for the lesson-press compiler.
//!
//! A source unit is a Markdown file opening with a TOML front-matter block
//! delimited by `+++` lines. The parser validates the front-matter, captures
//! the raw body, and extracts the fenced code blocks and link markers later
//! stages operate on. Parsing is pure: path and contents in, [`Document`]
//! out, with no filesystem access.

mod extract;
mod frontmatter;

pub use frontmatter::{FrontMatter, PageKind};

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use lesson_press_utils::slugify;
use thiserror::Error;

/// Corpus-unique document identifier derived from the source path.
///
/// Each path segment is slugified, the file extension is dropped, and
/// segments are joined with `/`: `basics/Intro Objects.md` becomes
/// `basics/intro-objects`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DocId(String);

impl DocId {
    pub fn from_relative_path(path: &Path) -> DocId {
        let mut segments = Vec::new();
        let mut components = path.components().peekable();

        while let Some(component) = components.next() {
            let text = component.as_os_str().to_string_lossy();
            let text = if components.peek().is_none() {
                Path::new(text.as_ref())
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| text.into_owned())
            } else {
                text.into_owned()
            };

            let slug = slugify(&text);
            if !slug.is_empty() {
                segments.push(slug);
            }
        }

        DocId(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed lesson source: validated metadata plus the raw body and the
/// markers later pipeline stages annotate. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct Document {
    pub id: DocId,
    /// Source path relative to the corpus root.
    pub relative_path: PathBuf,
    pub front: FrontMatter,
    pub body: String,
    /// Number of lines consumed before the body (front-matter plus fences),
    /// so extracted line numbers refer to the full source file.
    pub body_line_offset: usize,
    pub code_blocks: Vec<CodeBlock>,
    pub references: Vec<RefMarker>,
}

/// A fenced code block extracted from a document body.
#[derive(Clone, Debug)]
pub struct CodeBlock {
    /// Zero-based position among the document's fenced blocks.
    pub index: usize,
    pub language: Option<String>,
    pub text: String,
    /// 1-based line of the opening fence in the source file.
    pub line: usize,
}

/// A link destination found in a document body, before resolution.
#[derive(Clone, Debug)]
pub struct RefMarker {
    pub target: String,
    /// 1-based line in the source file.
    pub line: usize,
}

/// Failures that exclude a source unit from the corpus.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing front-matter block")]
    MissingFrontMatter,
    #[error("unterminated front-matter block")]
    UnterminatedFrontMatter,
    #[error("malformed front-matter: {source}")]
    Toml { source: toml::de::Error },
    #[error("missing required front-matter key '{key}'")]
    MissingKey { key: &'static str },
    #[error("unparseable date '{value}': {source}")]
    Date {
        value: String,
        source: chrono::format::ParseError,
    },
    #[error("unknown page type '{value}'")]
    UnknownKind { value: String },
}

/// Parse one source unit into a [`Document`].
pub fn parse_document(relative_path: &Path, contents: &str) -> Result<Document, ParseError> {
    let (raw_front, body, body_line_offset) = frontmatter::split(contents)?;
    let front = frontmatter::parse(&raw_front)?;

    let (code_blocks, references) = extract::scan_body(body, body_line_offset);

    Ok(Document {
        id: DocId::from_relative_path(relative_path),
        relative_path: relative_path.to_path_buf(),
        front,
        body: body.to_string(),
        body_line_offset,
        code_blocks,
        references,
    })
}

/// Deduplicated, deterministically ordered category set.
pub(crate) fn normalize_categories(raw: Vec<String>) -> BTreeSet<String> {
    raw.into_iter()
        .map(|category| category.trim().to_string())
        .filter(|category| !category.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_slugifies_segments_and_strips_extension() {
        let id = DocId::from_relative_path(Path::new("basics/Intro Objects.md"));
        assert_eq!(id.as_str(), "basics/intro-objects");
    }

    #[test]
    fn doc_id_handles_single_segment() {
        let id = DocId::from_relative_path(Path::new("index.md"));
        assert_eq!(id.as_str(), "index");
    }
}
