//! HTML emission for lesson pages and the navigation index.
//!
//! The body is re-parsed as Markdown and emitted through an event rewrite
//! pass: internal links get their resolved hrefs, dangling links are wrapped
//! in a visible marker, and unbalanced snippets are preceded by a warning
//! annotation. The raw body text itself is never modified.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use chrono::NaiveDate;
use lesson_press_config::SiteSettings;
use lesson_press_parser::{DocId, Document, PageKind};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};

use crate::{RenderedPage, ResolvedReference, ResolvedTarget, SnippetFault};

/// Renderer inputs for one document: the site settings plus the annotations
/// the Resolver and Validator attached.
pub struct PageInputs<'a> {
    pub site: &'a SiteSettings,
    pub resolutions: &'a [ResolvedReference],
    pub faults: &'a [SnippetFault],
}

/// Site-root-relative href of a document's rendered page.
pub fn page_href(site: &SiteSettings, id: &DocId) -> String {
    format!("{}{}.html", site.base_url, id)
}

/// Output location of a document's rendered page, relative to the output dir.
pub fn page_output_path(id: &DocId) -> PathBuf {
    PathBuf::from(format!("{id}.html"))
}

/// Canonical output ordering: date descending, identifier ascending.
pub fn document_order(a: &Document, b: &Document) -> Ordering {
    b.front
        .date
        .cmp(&a.front.date)
        .then_with(|| a.id.cmp(&b.id))
}

/// Render one document to a complete page.
pub fn render_page(doc: &Document, inputs: &PageInputs<'_>) -> RenderedPage {
    let targets: HashMap<&str, &ResolvedTarget> = inputs
        .resolutions
        .iter()
        .map(|resolution| (resolution.target.as_str(), &resolution.outcome))
        .collect();
    let faulted: BTreeSet<usize> = inputs
        .faults
        .iter()
        .map(|fault| fault.block_index)
        .collect();

    let mut events: Vec<Event> = Vec::new();
    let mut wrap_open = false;
    let mut fence_index = 0usize;

    for event in Parser::new_ext(&doc.body, Options::all()) {
        match event {
            Event::Start(Tag::Link(link_type, dest, title)) => {
                match targets.get(dest.trim()) {
                    Some(ResolvedTarget::Internal { href, .. }) => {
                        events.push(Event::Start(Tag::Link(
                            link_type,
                            CowStr::from(href.clone()),
                            title,
                        )));
                    }
                    Some(ResolvedTarget::Dangling) => {
                        events.push(Event::Html(CowStr::from(
                            "<span class=\"unresolved-reference\">",
                        )));
                        events.push(Event::Start(Tag::Link(link_type, dest, title)));
                        wrap_open = true;
                    }
                    _ => events.push(Event::Start(Tag::Link(link_type, dest, title))),
                }
            }
            Event::End(Tag::Link(link_type, dest, title)) => {
                events.push(Event::End(Tag::Link(link_type, dest, title)));
                if wrap_open {
                    events.push(Event::Html(CowStr::from("</span>")));
                    wrap_open = false;
                }
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                if faulted.contains(&fence_index) {
                    events.push(Event::Html(CowStr::from(
                        "<div class=\"snippet-warning\">example may be truncated: \
                         delimiters do not balance</div>\n",
                    )));
                }
                fence_index += 1;
                events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
            }
            other => events.push(other),
        }
    }

    let mut body_html = String::new();
    html::push_html(&mut body_html, events.into_iter());

    let date = iso_date(doc.front.date);
    let mut meta_line = format!("<time datetime=\"{date}\">{date}</time>");
    for category in &doc.front.categories {
        meta_line.push_str(&format!(
            " <span class=\"category\">{}</span>",
            escape_html(category)
        ));
    }

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{page_title} - {site_title}</title>\n</head>\n<body>\n<article>\n\
         <header>\n<h1>{page_title}</h1>\n<p class=\"meta\">{meta_line}</p>\n</header>\n\
         {body_html}</article>\n</body>\n</html>\n",
        page_title = escape_html(&doc.front.title),
        site_title = escape_html(&inputs.site.title),
    );

    RenderedPage {
        output_path: page_output_path(&doc.id),
        html,
    }
}

/// Render the navigation index over the listed documents. Callers pass only
/// `indexed` documents, already in canonical order.
pub fn render_index(site: &SiteSettings, documents: &[&Document]) -> RenderedPage {
    debug_assert!(documents
        .iter()
        .all(|doc| doc.front.kind == PageKind::Indexed));

    let mut items = String::new();
    for doc in documents {
        let date = iso_date(doc.front.date);
        items.push_str(&format!(
            "<li><a href=\"{href}\">{title}</a> <time datetime=\"{date}\">{date}</time></li>\n",
            href = page_href(site, &doc.id),
            title = escape_html(&doc.front.title),
        ));
    }

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{site_title}</title>\n</head>\n<body>\n<h1>{site_title}</h1>\n\
         <nav>\n<ul class=\"lesson-list\">\n{items}</ul>\n</nav>\n</body>\n</html>\n",
        site_title = escape_html(&site.title),
    );

    RenderedPage {
        output_path: PathBuf::from("index.html"),
        html,
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
