//! Configuration constants, URL builders, and runtime configuration.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarvesterError, Result};

/// Base URL of the H.4.1 release archive.
pub const DEFAULT_BASE_URL: &str = "https://www.federalreserve.gov/releases/h41";

/// RSS feed listing recent H.4.1 releases.
pub const DEFAULT_FEED_URL: &str = "https://www.federalreserve.gov/feeds/h41.xml";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Upper bound on configured attempts, so an unreachable host fails in minutes.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Absolute tolerance (millions of dollars) when reconciling totals.
///
/// Admits rounding in the published figures, nothing more.
pub const DEFAULT_RECONCILE_TOLERANCE: f64 = 1.0;

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Validate date format (YYYY-MM-DD) and that it names a real calendar day.
///
/// # Examples
/// ```
/// use h41_harvester::config::validate_date;
///
/// assert!(validate_date("2026-01-08").is_ok());
/// assert!(validate_date("2026-02-30").is_err());
/// assert!(validate_date("20260108").is_err());
/// ```
pub fn validate_date(date_str: &str) -> Result<()> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    }

    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))?;

    Ok(())
}

/// Build the release page URL for a compact `YYYYMMDD` date.
///
/// # Examples
/// ```
/// use h41_harvester::config::release_url;
///
/// assert_eq!(
///     release_url("https://www.federalreserve.gov/releases/h41", "20260108"),
///     "https://www.federalreserve.gov/releases/h41/20260108/"
/// );
/// ```
pub fn release_url(base_url: &str, yyyymmdd: &str) -> String {
    format!("{}/{yyyymmdd}/", base_url.trim_end_matches('/'))
}

/// Build the PDF URL for a compact `YYYYMMDD` date.
pub fn pdf_url(base_url: &str, yyyymmdd: &str) -> String {
    format!("{}/{yyyymmdd}/h41.pdf", base_url.trim_end_matches('/'))
}

/// Settings for the totals reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Absolute tolerance for `supplying - absorbing == reserve balances`.
    pub tolerance: f64,
    /// Whether all-zero totals with non-zero items fail the parse.
    pub zero_totals_fatal: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_RECONCILE_TOLERANCE,
            zero_totals_fatal: true,
        }
    }
}

/// Runtime configuration for one harvester.
#[derive(Debug, Clone)]
pub struct HarvesterConfig {
    pub base_url: String,
    pub feed_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Optional contact sent in the `From` header.
    pub contact: Option<String>,
    pub reconcile: ReconcileConfig,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HarvesterConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(base_url) = std::env::var("H41_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Ok(feed_url) = std::env::var("H41_FEED_URL") {
            builder = builder.feed_url(feed_url);
        }
        if let Some(timeout) = parse_env::<u64>("H41_TIMEOUT_SECS")? {
            builder = builder.timeout_secs(timeout);
        }
        if let Some(retries) = parse_env::<u32>("H41_MAX_RETRIES")? {
            builder = builder.max_retries(retries);
        }
        if let Ok(contact) = std::env::var("H41_CONTACT") {
            builder = builder.contact(contact);
        }
        if let Some(tolerance) = parse_env::<f64>("H41_RECONCILE_TOLERANCE")? {
            builder = builder.tolerance(tolerance);
        }
        if let Some(fatal) = parse_env::<bool>("H41_ZERO_TOTALS_FATAL")? {
            builder = builder.zero_totals_fatal(fatal);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Create a config builder populated with defaults.
    pub fn builder() -> HarvesterConfigBuilder {
        HarvesterConfigBuilder {
            base_url: DEFAULT_BASE_URL.into(),
            feed_url: DEFAULT_FEED_URL.into(),
            timeout_secs: HTTP_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            contact: None,
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Reject values that would make the pipeline hang or accept anything.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(HarvesterError::Config(
                "timeout must be at least one second".into(),
            ));
        }
        if self.max_retries == 0 || self.max_retries > MAX_RETRIES_LIMIT {
            return Err(HarvesterError::Config(format!(
                "max_retries must be between 1 and {MAX_RETRIES_LIMIT}, got {}",
                self.max_retries
            )));
        }
        if !self.reconcile.tolerance.is_finite() || self.reconcile.tolerance < 0.0 {
            return Err(HarvesterError::Config(format!(
                "reconcile tolerance must be a non-negative number, got {}",
                self.reconcile.tolerance
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| HarvesterError::Config(format!("{key} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Builder for `HarvesterConfig`.
pub struct HarvesterConfigBuilder {
    base_url: String,
    feed_url: String,
    timeout_secs: u64,
    max_retries: u32,
    contact: Option<String>,
    reconcile: ReconcileConfig,
}

impl HarvesterConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = feed_url.into();
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.reconcile.tolerance = tolerance;
        self
    }

    pub fn zero_totals_fatal(mut self, fatal: bool) -> Self {
        self.reconcile.zero_totals_fatal = fatal;
        self
    }

    pub fn build(self) -> HarvesterConfig {
        HarvesterConfig {
            base_url: self.base_url,
            feed_url: self.feed_url,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            contact: self.contact,
            reconcile: self.reconcile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_valid() {
        assert!(validate_date("2026-01-08").is_ok());
        assert!(validate_date("2024-02-29").is_ok());
    }

    #[test]
    fn test_validate_date_invalid_format() {
        assert!(validate_date("").is_err());
        assert!(validate_date("2026/01/08").is_err());
        assert!(validate_date("08-01-2026").is_err());
        assert!(validate_date("2026-1-8").is_err());
    }

    #[test]
    fn test_validate_date_invalid_date() {
        assert!(validate_date("2026-13-01").is_err());
        assert!(validate_date("2025-02-29").is_err());
        assert!(validate_date("2026-00-10").is_err());
    }

    #[test]
    fn test_release_urls() {
        assert_eq!(
            release_url(DEFAULT_BASE_URL, "20260108"),
            "https://www.federalreserve.gov/releases/h41/20260108/"
        );
        assert_eq!(
            release_url("http://localhost:8080/h41/", "20260108"),
            "http://localhost:8080/h41/20260108/"
        );
        assert_eq!(
            pdf_url(DEFAULT_BASE_URL, "20260108"),
            "https://www.federalreserve.gov/releases/h41/20260108/h41.pdf"
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = HarvesterConfig::builder().build();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.reconcile, ReconcileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = HarvesterConfig::builder()
            .tolerance(5.0)
            .zero_totals_fatal(false)
            .contact("ops@example.test")
            .build();
        assert_eq!(config.reconcile.tolerance, 5.0);
        assert!(!config.reconcile.zero_totals_fatal);
        assert_eq!(config.contact.as_deref(), Some("ops@example.test"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(HarvesterConfig::builder().timeout_secs(0).build().validate().is_err());
        assert!(HarvesterConfig::builder().max_retries(0).build().validate().is_err());
        assert!(HarvesterConfig::builder()
            .max_retries(MAX_RETRIES_LIMIT)
            .build()
            .validate()
            .is_ok());
        let err = HarvesterConfig::builder()
            .max_retries(65)
            .build()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 10"), "{err}");
        assert!(HarvesterConfig::builder().tolerance(-1.0).build().validate().is_err());
        assert!(HarvesterConfig::builder()
            .tolerance(f64::NAN)
            .build()
            .validate()
            .is_err());
    }
}
