use std::path::Path;

use lesson_press_parser::{parse_document, PageKind, ParseError};

const LESSON: &str = concat!(
    "+++\n",
    "title = \"Object References\"\n",
    "date = \"2020-12-14\"\n",
    "categories = [\"java\", \"basics\", \"java\"]\n",
    "type = \"indexed\"\n",
    "+++\n",
    "\n",
    "A reference points at an object. See [constructors](constructors.md).\n",
    "\n",
    "```java\n",
    "Logger log = new Logger();\n",
    "```\n",
);

#[test]
fn parses_complete_lesson() {
    let doc = parse_document(Path::new("basics/references.md"), LESSON).expect("parse");

    assert_eq!(doc.id.as_str(), "basics/references");
    assert_eq!(doc.front.title, "Object References");
    assert_eq!(doc.front.date.to_string(), "2020-12-14");
    assert_eq!(doc.front.kind, PageKind::Indexed);
    // Duplicates collapse, order is deterministic.
    let categories: Vec<&str> = doc.front.categories.iter().map(String::as_str).collect();
    assert_eq!(categories, ["basics", "java"]);

    assert_eq!(doc.body_line_offset, 6);
    assert_eq!(doc.references.len(), 1);
    assert_eq!(doc.references[0].target, "constructors.md");
    assert_eq!(doc.references[0].line, 8);

    assert_eq!(doc.code_blocks.len(), 1);
    assert_eq!(doc.code_blocks[0].language.as_deref(), Some("java"));
    assert_eq!(doc.code_blocks[0].line, 10);
}

#[test]
fn missing_date_is_a_parse_error() {
    let contents = "+++\ntitle = \"No Date\"\n+++\nBody.\n";
    let err = parse_document(Path::new("a.md"), contents).expect_err("missing date");
    assert!(matches!(err, ParseError::MissingKey { key: "date" }));
}

#[test]
fn unparseable_date_is_a_parse_error() {
    let contents = "+++\ntitle = \"Bad Date\"\ndate = \"14/12/2020\"\n+++\n";
    let err = parse_document(Path::new("a.md"), contents).expect_err("bad date");
    assert!(matches!(err, ParseError::Date { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let contents = "+++\ntitle = unquoted\n+++\n";
    let err = parse_document(Path::new("a.md"), contents).expect_err("bad toml");
    assert!(matches!(err, ParseError::Toml { .. }));
}

#[test]
fn blank_title_is_a_parse_error() {
    let contents = "+++\ntitle = \"  \"\ndate = \"2020-01-01\"\n+++\n";
    let err = parse_document(Path::new("a.md"), contents).expect_err("blank title");
    assert!(matches!(err, ParseError::MissingKey { key: "title" }));
}
