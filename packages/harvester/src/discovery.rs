//! Release discovery: which weekly releases exist and where they live.
//!
//! The RSS feed is consulted first. When it yields nothing (or cannot be
//! fetched) the release index page is scraped for links whose path carries
//! an 8-digit `YYYYMMDD` segment. Failures of either source are logged and
//! skipped; only the caller decides whether an empty catalog is fatal.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Document;
use scraper::{Html, Selector};

use crate::config::HarvesterConfig;
use crate::dates::ReleaseDate;
use crate::error::Result;
use crate::http::Transport;

/// An 8-digit date as a whole path segment.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)(\d{8})(?:/|$|[?#.])").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ORIGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://[^/]+)").expect("valid regex"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Known releases keyed by date. The first URL seen for a date is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    entries: BTreeMap<ReleaseDate, String>,
}

impl ReleaseCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release; returns false if the date was already known.
    pub fn insert(&mut self, date: ReleaseDate, url: impl Into<String>) -> bool {
        if self.entries.contains_key(&date) {
            return false;
        }
        self.entries.insert(date, url.into());
        true
    }

    /// Known dates, newest first.
    #[must_use]
    pub fn dates(&self) -> Vec<ReleaseDate> {
        self.entries.keys().rev().cloned().collect()
    }

    #[must_use]
    pub fn url_for(&self, date: &ReleaseDate) -> Option<&str> {
        self.entries.get(date).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = (&ReleaseDate, &str)> {
        self.entries.iter().rev().map(|(d, u)| (d, u.as_str()))
    }
}

impl FromIterator<(ReleaseDate, String)> for ReleaseCatalog {
    fn from_iter<I: IntoIterator<Item = (ReleaseDate, String)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (date, url) in iter {
            catalog.insert(date, url);
        }
        catalog
    }
}

/// Release date encoded in a URL path, if any.
#[must_use]
pub fn date_from_url(url: &str) -> Option<ReleaseDate> {
    DATE_SEGMENT
        .captures_iter(url)
        .filter_map(|c| c.get(1))
        .find_map(|m| ReleaseDate::from_yyyymmdd(m.as_str()).ok())
}

/// Release links from an RSS feed (`<item><link>`).
pub fn parse_feed(xml: &str) -> Result<Vec<(ReleaseDate, String)>> {
    let doc = Document::parse(xml)?;
    let releases = doc
        .descendants()
        .filter(|n| n.has_tag_name("item"))
        .filter_map(|item| item.children().find(|c| c.has_tag_name("link")))
        .filter_map(|link| link.text())
        .map(str::trim)
        .filter_map(|url| date_from_url(url).map(|date| (date, url.to_string())))
        .collect();
    Ok(releases)
}

/// Release links from the index page, resolved against `base_url`.
#[must_use]
pub fn parse_index(html: &str, base_url: &str) -> Vec<(ReleaseDate, String)> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter_map(|href| {
            let date = date_from_url(href)?;
            Some((date, resolve_href(base_url, href)))
        })
        .collect()
}

fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix('/') {
        let origin = ORIGIN
            .captures(base_url)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());
        return format!("{origin}/{rest}");
    }
    format!("{}/{}", base_url.trim_end_matches('/'), href)
}

/// Build the release catalog from the feed, falling back to the index page.
pub fn discover_releases(transport: &dyn Transport, config: &HarvesterConfig) -> ReleaseCatalog {
    let mut catalog = ReleaseCatalog::new();

    match transport.get_text(&config.feed_url).and_then(|xml| parse_feed(&xml)) {
        Ok(releases) => {
            tracing::debug!(count = releases.len(), "Releases listed in feed");
            catalog.extend(releases);
        }
        Err(e) => tracing::warn!(url = %config.feed_url, error = %e, "Feed unavailable, skipping"),
    }

    if catalog.is_empty() {
        let index_url = format!("{}/", config.base_url.trim_end_matches('/'));
        match transport.get_text(&index_url) {
            Ok(html) => {
                let releases = parse_index(&html, &config.base_url);
                tracing::debug!(count = releases.len(), "Releases linked from index");
                catalog.extend(releases);
            }
            Err(e) => tracing::warn!(url = %index_url, error = %e, "Index unavailable, skipping"),
        }
    }

    tracing::info!(releases = catalog.len(), "Discovered releases");
    catalog
}

impl Extend<(ReleaseDate, String)> for ReleaseCatalog {
    fn extend<I: IntoIterator<Item = (ReleaseDate, String)>>(&mut self, iter: I) {
        for (date, url) in iter {
            self.insert(date, url);
        }
    }
}
