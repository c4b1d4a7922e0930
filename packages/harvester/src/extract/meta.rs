//! Report metadata found in the running text of a release.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;

use crate::html::normalize_ws;

/// "Week ended January 7, 2026", also with abbreviated months ("Jan. 7, 2026").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WEEK_ENDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)week\s+ended\s+([A-Za-z]{3,9})\.?\s+(\d{1,2}),\s*(\d{4})")
        .expect("valid regex")
});

/// ISO date of the first "Week ended ..." phrase in the document.
///
/// # Examples
/// ```
/// use scraper::Html;
/// use h41_harvester::extract::extract_week_ended;
///
/// let doc = Html::parse_document("<th>Averages of daily figures<br>Week ended<br>Jan 7, 2026</th>");
/// assert_eq!(extract_week_ended(&doc), Some("2026-01-07".to_string()));
/// ```
pub fn extract_week_ended(document: &Html) -> Option<String> {
    let text = normalize_ws(&document.root_element().text().collect::<Vec<_>>().join(" "));
    let caps = WEEK_ENDED.captures(&text)?;

    // Three letters identify the month, whatever abbreviation the source uses.
    let month = caps.get(1)?.as_str().get(..3)?;
    let day = caps.get(2)?.as_str();
    let year = caps.get(3)?.as_str();

    NaiveDate::parse_from_str(&format!("{month} {day} {year}"), "%b %d %Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_ended(html: &str) -> Option<String> {
        extract_week_ended(&Html::parse_document(html))
    }

    #[test]
    fn test_full_month_name() {
        assert_eq!(
            week_ended("<p>Week ended January 7, 2026</p>"),
            Some("2026-01-07".into())
        );
    }

    #[test]
    fn test_abbreviated_and_dotted_months() {
        assert_eq!(week_ended("<p>week ended Sept. 3, 2025</p>"), Some("2025-09-03".into()));
        assert_eq!(week_ended("<p>Week ended Dec 31, 2025</p>"), Some("2025-12-31".into()));
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            week_ended("<p>Week ended Jan 7, 2026</p><p>Change from week ended Dec 31, 2025</p>"),
            Some("2026-01-07".into())
        );
    }

    #[test]
    fn test_missing_or_invalid() {
        assert_eq!(week_ended("<p>No dates here</p>"), None);
        assert_eq!(week_ended("<p>Week ended Foo 7, 2026</p>"), None);
        assert_eq!(week_ended("<p>Week ended Feb 30, 2026</p>"), None);
    }
}
