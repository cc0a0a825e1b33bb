//! Front-matter splitting and validation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{normalize_categories, ParseError};

const FENCE: &str = "+++";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated lesson metadata.
#[derive(Clone, Debug)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDate,
    pub categories: BTreeSet<String>,
    pub kind: PageKind,
}

/// Whether a page participates in generated navigation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageKind {
    Indexed,
    Unindexed,
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Indexed => "indexed",
            PageKind::Unindexed => "unindexed",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "indexed" => Ok(PageKind::Indexed),
            "unindexed" => Ok(PageKind::Unindexed),
            _ => Err(()),
        }
    }
}

/// Split raw contents into the front-matter TOML, the body, and the number
/// of lines consumed before the body starts.
pub(crate) fn split(contents: &str) -> Result<(String, &str, usize), ParseError> {
    let mut lines_consumed = 0usize;
    let mut byte_offset = 0usize;
    let mut front = String::new();
    let mut opened = false;

    for line in contents.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']).trim();
        byte_offset += line.len();
        lines_consumed += 1;

        if !opened {
            if trimmed == FENCE {
                opened = true;
                continue;
            }
            return Err(ParseError::MissingFrontMatter);
        }

        if trimmed == FENCE {
            return Ok((front, &contents[byte_offset..], lines_consumed));
        }
        front.push_str(line);
    }

    if opened {
        Err(ParseError::UnterminatedFrontMatter)
    } else {
        // Empty file: never saw an opening fence.
        Err(ParseError::MissingFrontMatter)
    }
}

#[derive(Debug, Deserialize)]
struct RawFrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Validate the raw TOML block into typed metadata.
pub(crate) fn parse(raw: &str) -> Result<FrontMatter, ParseError> {
    let raw: RawFrontMatter =
        toml::from_str(raw).map_err(|source| ParseError::Toml { source })?;

    let title = raw
        .title
        .filter(|title| !title.trim().is_empty())
        .ok_or(ParseError::MissingKey { key: "title" })?;

    let date_value = raw.date.ok_or(ParseError::MissingKey { key: "date" })?;
    let date =
        NaiveDate::parse_from_str(&date_value, DATE_FORMAT).map_err(|source| ParseError::Date {
            value: date_value,
            source,
        })?;

    let kind = match raw.kind {
        None => PageKind::Indexed,
        Some(value) => value
            .parse::<PageKind>()
            .map_err(|_| ParseError::UnknownKind { value })?,
    };

    Ok(FrontMatter {
        title: title.trim().to_string(),
        date,
        categories: normalize_categories(raw.categories),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_separates_front_matter_from_body() {
        let contents = "+++\ntitle = \"A\"\n+++\nBody line.\n";
        let (front, body, offset) = split(contents).expect("split");
        assert_eq!(front, "title = \"A\"\n");
        assert_eq!(body, "Body line.\n");
        assert_eq!(offset, 3);
    }

    #[test]
    fn split_rejects_missing_opening_fence() {
        assert!(matches!(
            split("# Just markdown\n"),
            Err(ParseError::MissingFrontMatter)
        ));
    }

    #[test]
    fn split_rejects_unterminated_block() {
        assert!(matches!(
            split("+++\ntitle = \"A\"\n"),
            Err(ParseError::UnterminatedFrontMatter)
        ));
    }

    #[test]
    fn parse_defaults_type_to_indexed() {
        let front = parse("title = \"A\"\ndate = \"2021-01-01\"\n").expect("parse");
        assert_eq!(front.kind, PageKind::Indexed);
        assert!(front.categories.is_empty());
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = parse("title = \"A\"\ndate = \"2021-01-01\"\ntype = \"draft\"\n")
            .expect_err("unknown type");
        assert!(matches!(err, ParseError::UnknownKind { value } if value == "draft"));
    }
}
