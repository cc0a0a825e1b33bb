use std::fs;
use std::io::Write;
use std::path::PathBuf;

use lesson_press_config::{Config, LoadOptions};
use lesson_press_ops::{BuildOptions, Operations};
use tempfile::TempDir;

fn setup_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

fn lesson(title: &str, date: &str, body: &str) -> String {
    format!("+++\ntitle = \"{title}\"\ndate = \"{date}\"\n+++\n{body}")
}

fn base_config(dir: &TempDir) -> Config {
    Config::load(LoadOptions::default().with_working_dir(dir.path())).expect("load config")
}

fn check_options() -> BuildOptions {
    BuildOptions {
        write_output: false,
        strict: false,
    }
}

#[test]
fn rebuilding_an_unchanged_corpus_is_byte_identical() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        &temp,
        "lessons/a.md",
        &lesson("A", "2021-01-01", "See [b](b.md).\n\n```java\nint x = 1;\n```\n"),
    );
    setup_file(&temp, "lessons/b.md", &lesson("B", "2020-12-14", "Body.\n"));

    let ops = Operations::new(base_config(&temp));
    let first = ops.build(&check_options()).expect("first build");
    let second = ops.build(&check_options()).expect("second build");

    assert_eq!(first.pages.len(), second.pages.len());
    for (a, b) in first.pages.iter().zip(second.pages.iter()) {
        assert_eq!(a.output_path, b.output_path);
        assert_eq!(a.html, b.html);
    }
}

#[test]
fn pages_are_ordered_by_date_descending_then_id() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "lessons/mid.md", &lesson("Mid", "2020-12-14", "Body.\n"));
    setup_file(&temp, "lessons/new.md", &lesson("New", "2021-01-01", "Body.\n"));
    setup_file(&temp, "lessons/old.md", &lesson("Old", "2019-05-05", "Body.\n"));

    let ops = Operations::new(base_config(&temp));
    let outcome = ops.build(&check_options()).expect("build");

    let order: Vec<PathBuf> = outcome
        .pages
        .iter()
        .map(|page| page.output_path.clone())
        .collect();
    assert_eq!(
        order,
        vec![
            PathBuf::from("index.html"),
            PathBuf::from("new.html"),
            PathBuf::from("mid.html"),
            PathBuf::from("old.html"),
        ]
    );
}

#[test]
fn unindexed_documents_render_but_stay_out_of_navigation() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        &temp,
        "lessons/shown.md",
        &lesson("Shown", "2021-01-01", "Body.\n"),
    );
    setup_file(
        &temp,
        "lessons/hidden.md",
        "+++\ntitle = \"Hidden\"\ndate = \"2021-01-02\"\ntype = \"unindexed\"\n+++\nBody.\n",
    );

    let ops = Operations::new(base_config(&temp));
    let outcome = ops.build(&check_options()).expect("build");

    let index = outcome
        .pages
        .iter()
        .find(|page| page.output_path == PathBuf::from("index.html"))
        .expect("index page");
    assert!(index.html.contains("Shown"));
    assert!(!index.html.contains("Hidden"));

    assert!(outcome
        .pages
        .iter()
        .any(|page| page.output_path == PathBuf::from("hidden.html")));
}

#[test]
fn resolved_references_link_to_the_target_page() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(
        &temp,
        "lessons/basics/refs.md",
        &lesson("Refs", "2021-01-01", "See [ctors](../ctors.md#rules).\n"),
    );
    setup_file(&temp, "lessons/ctors.md", &lesson("Ctors", "2020-01-01", "Body.\n"));

    let ops = Operations::new(base_config(&temp));
    let outcome = ops.build(&check_options()).expect("build");

    assert_eq!(outcome.exit_code, 0);
    let page = outcome
        .pages
        .iter()
        .find(|page| page.output_path == PathBuf::from("basics/refs.html"))
        .expect("refs page");
    assert!(page.html.contains("href=\"/ctors.html#rules\""));
}

#[test]
fn build_writes_pages_under_the_output_dir() {
    let temp = TempDir::new().expect("tempdir");
    setup_file(&temp, "lessons/a.md", &lesson("A", "2021-01-01", "Body.\n"));

    let ops = Operations::new(base_config(&temp));
    let outcome = ops
        .build(&BuildOptions {
            write_output: true,
            strict: false,
        })
        .expect("build");

    assert_eq!(outcome.exit_code, 0);
    let output_dir = temp.path().join("public");
    assert!(output_dir.join("index.html").is_file());
    let page = fs::read_to_string(output_dir.join("a.html")).expect("read page");
    assert!(page.contains("<h1>A</h1>"));
}

#[test]
fn missing_source_dir_is_fatal() {
    let temp = TempDir::new().expect("tempdir");
    let ops = Operations::new(base_config(&temp));
    assert!(ops.build(&check_options()).is_err());
}
