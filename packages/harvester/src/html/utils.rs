//! DOM helpers for navigating and extracting text from parsed HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Collapse runs of whitespace into single spaces and trim.
///
/// # Examples
/// ```
/// use h41_harvester::html::normalize_ws;
///
/// assert_eq!(normalize_ws("  Reserve\n   balances\u{a0} "), "Reserve balances");
/// ```
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with footnote superscripts removed.
///
/// # Examples
/// ```
/// use scraper::{Html, Selector};
/// use h41_harvester::html::collect_text;
///
/// let html = Html::parse_fragment("<p>Loans<sup>4</sup> and <b>float</b></p>");
/// let p = html.select(&Selector::parse("p").unwrap()).next().unwrap();
/// assert_eq!(collect_text(p), "Loans and float");
/// ```
pub fn collect_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    normalize_ws(&out)
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        if let Some(child_element) = ElementRef::wrap(child) {
            match child_element.value().name() {
                "sup" | "script" | "style" => {}
                "br" => out.push(' '),
                _ => {
                    push_text(child_element, out);
                    out.push(' ');
                }
            }
        }
    }
}

/// Whether the element's visible text comes from a hyperlink.
///
/// Headings that are links belong to navigation (tables of contents), not to
/// the table that follows them. Footnote links under `<sup>` and links
/// without visible text do not count.
pub fn contains_link(element: ElementRef<'_>) -> bool {
    if element.value().name() == "a"
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name() == "a")
    {
        return true;
    }
    element
        .select(&LINK_SELECTOR)
        .any(|link| !in_superscript(link, element) && !collect_text(link).is_empty())
}

/// Whether `node` sits inside a `<sup>` below `root`.
fn in_superscript(node: ElementRef<'_>, root: ElementRef<'_>) -> bool {
    node.ancestors()
        .take_while(|ancestor| ancestor.id() != root.id())
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "sup")
}

/// Texts of the `td`/`th` cells of one row.
pub fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR).map(collect_text).collect()
}

/// Parse a table fragment into rows of cell texts, in document order.
pub fn select_rows(fragment: &str) -> Vec<Vec<String>> {
    let html = Html::parse_fragment(fragment);
    html.select(&TR_SELECTOR).map(cell_texts).collect()
}
