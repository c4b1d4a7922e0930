//! Label and number cleanup for table cells.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Parenthesized footnote reference at the end of a label, e.g. `Float (4)`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FOOTNOTE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d{1,2}\)$").expect("valid regex"));

/// Footnote digits glued to the last word, e.g. `Loans4`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FOOTNOTE_GLUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z\)])\d{1,2}$").expect("valid regex"));

/// Plain decimal number after separators and signs have been handled.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid regex"));

/// Cell contents that mean "not reported".
const NOT_REPORTED: &[&str] = &["", "...", "n.a.", "na", "n/a", "-", "--", "\u{2014}", "\u{2013}", "*"];

/// Clean a row label for display.
///
/// Trims whitespace and strips footnote markers and trailing punctuation.
///
/// # Examples
/// ```
/// use h41_harvester::html::clean_label;
///
/// assert_eq!(clean_label("  Loans4 "), "Loans");
/// assert_eq!(clean_label("Float (4):"), "Float");
/// assert_eq!(clean_label("Gold stock*"), "Gold stock");
/// assert_eq!(clean_label("Net portfolio holdings of MS Facilities 2020 LLC"),
///            "Net portfolio holdings of MS Facilities 2020 LLC");
/// ```
pub fn clean_label(raw: &str) -> String {
    let mut label: String = raw.nfkc().collect::<String>();
    label = label.split_whitespace().collect::<Vec<_>>().join(" ");

    loop {
        let before = label.len();
        label = label
            .trim_end_matches(|c: char| {
                matches!(c, '*' | '\u{2020}' | '\u{2021}' | ':' | ',' | ';' | '.' | ' ')
            })
            .to_string();
        label = FOOTNOTE_PAREN.replace(&label, "").into_owned();
        label = FOOTNOTE_GLUED.replace(&label, "$1").into_owned();
        if label.len() == before {
            break;
        }
    }

    label.trim().to_string()
}

/// Normalize a label for matching: NFKC, lowercase, punctuation removed,
/// whitespace collapsed.
///
/// # Examples
/// ```
/// use h41_harvester::html::normalize_label;
///
/// assert_eq!(
///     normalize_label("Deposits with F.R. Banks, other than  reserve balances"),
///     "deposits with fr banks other than reserve balances"
/// );
/// ```
pub fn normalize_label(raw: &str) -> String {
    let cleaned = clean_label(raw).to_lowercase();
    let mut out = String::with_capacity(cleaned.len());
    for ch in cleaned.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '/' {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a numeric cell.
///
/// Strips thousands separators and treats parenthesized values as negative.
/// Returns `None` for anything that is not a number, including the
/// "not reported" markers; zero is only returned for an actual zero.
///
/// # Examples
/// ```
/// use h41_harvester::html::parse_number;
///
/// assert_eq!(parse_number("6,300,000"), Some(6_300_000.0));
/// assert_eq!(parse_number("(22,000)"), Some(-22_000.0));
/// assert_eq!(parse_number("\u{2212}150"), Some(-150.0));
/// assert_eq!(parse_number("0"), Some(0.0));
/// assert_eq!(parse_number("..."), None);
/// assert_eq!(parse_number("Jan 7, 2026"), None);
/// ```
pub fn parse_number(raw: &str) -> Option<f64> {
    let normalized: String = raw.nfkc().collect();
    let compact: String = normalized
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if NOT_REPORTED.contains(&compact.to_lowercase().as_str()) {
        return None;
    }

    let (negative, body) = if compact.len() >= 2 && compact.starts_with('(') && compact.ends_with(')')
    {
        (true, compact[1..compact.len() - 1].to_string())
    } else {
        (false, compact)
    };
    let body = body.replace('\u{2212}', "-");

    if !DECIMAL.is_match(&body) {
        return None;
    }

    let value: f64 = body.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let value = if negative { -value } else { value };
    // Normalize negative zero so serialized output is stable.
    Some(if value == 0.0 { 0.0 } else { value })
}
