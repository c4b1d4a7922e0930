//! Heading search and nearest-table selection.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::html::{collect_text, contains_link};
use crate::types::{TableKind, TableSection};

/// Elements whose text may act as a table title.
const HEADING_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "caption", "p", "b", "strong", "div", "span",
];

/// Titles longer than this are prose, not headings.
const MAX_HEADING_LEN: usize = 200;

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));

/// Numbered table title such as `2. Maturity Distribution ...`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBERED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}[A-Za-z]?\.\s").expect("valid regex"));

/// Find every table that follows a heading matching one of `headings`.
///
/// A table split across "(continued)" headings yields one fragment per part.
/// Headings inside links are ignored, and a different numbered table title
/// between a heading and the next table cancels the match.
pub fn locate_after_heading(document: &Html, kind: TableKind, headings: &[&str]) -> TableSection {
    let needles: Vec<String> = headings.iter().map(|h| fold(h)).collect();

    let mut fragments = Vec::new();
    let mut seen = HashSet::new();
    let mut first_heading: Option<String> = None;
    let mut armed = false;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let name = element.value().name();

        if HEADING_TAGS.contains(&name) {
            if let Some(text) = heading_text(element) {
                let folded = fold(&text);
                if needles.iter().any(|needle| folded.contains(needle.as_str())) {
                    tracing::debug!(table = %kind, heading = %text, "Matched table heading");
                    first_heading.get_or_insert(text);

                    if name == "caption" {
                        if let Some(table) = element
                            .parent()
                            .and_then(ElementRef::wrap)
                            .filter(|p| p.value().name() == "table")
                        {
                            if seen.insert(table.id()) {
                                fragments.push(table.html());
                            }
                            armed = false;
                            continue;
                        }
                    }
                    armed = true;
                    continue;
                }

                if armed && name.starts_with('h') && NUMBERED_TITLE.is_match(&text) {
                    tracing::debug!(table = %kind, heading = %text, "Heading for another table, disarming");
                    armed = false;
                }
            }
        }

        if armed && name == "table" {
            if seen.insert(element.id()) {
                fragments.push(element.html());
            }
            armed = false;
        }
    }

    match first_heading {
        Some(heading) if !fragments.is_empty() => TableSection::Found {
            kind,
            heading,
            fragments,
        },
        Some(heading) => TableSection::NotFound {
            kind,
            reason: format!("heading \"{heading}\" is not followed by a table"),
        },
        None => TableSection::NotFound {
            kind,
            reason: format!(
                "no heading matching {}",
                headings
                    .iter()
                    .map(|h| format!("\"{h}\""))
                    .collect::<Vec<_>>()
                    .join(" or ")
            ),
        },
    }
}

/// Text of an element if it looks like a standalone heading.
fn heading_text(element: ElementRef<'_>) -> Option<String> {
    if element.value().name() != "caption" && element.select(&TABLE_SELECTOR).next().is_some() {
        return None;
    }
    if contains_link(element) {
        return None;
    }
    let text = collect_text(element);
    if text.is_empty() || text.len() > MAX_HEADING_LEN {
        return None;
    }
    Some(text)
}

fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
