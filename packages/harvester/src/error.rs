//! Error types for the harvester.
//!
//! `HarvesterError` carries detailed context for library consumers, and
//! [`FailureKind`] classifies every error into the pipeline's failure taxonomy
//! so callers can decide between "terminal" and "report as not ok".

use thiserror::Error;

/// Failure classes of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No known release dates were available to resolve against.
    Resolution,
    /// Network/HTTP error, non-2xx status, or empty body.
    Fetch,
    /// Expected tables or row counts were not matched.
    StructuralDrift,
    /// Itemized values do not sum to the published totals.
    Reconciliation,
    /// A mandatory canonical field could not be populated.
    Adapter,
    /// Invalid input or configuration, caught before any work was done.
    Input,
    /// Local I/O or serialization failure.
    Output,
}

impl FailureKind {
    /// Terminal failures never produce a partial report.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolution | Self::Fetch | Self::Input)
    }
}

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid date format.
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD (e.g., 2026-01-08)")]
    InvalidDate(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No release could be resolved for the requested date.
    #[error("Could not resolve a release for {requested}: {reason}")]
    Resolution { requested: String, reason: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The release document could not be fetched.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// All retry attempts were exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Discovery feed is not well-formed XML.
    #[error("Feed parsing failed: {0}")]
    FeedParse(#[from] roxmltree::Error),

    /// Table layout differs from the known structure.
    #[error("Structural drift in {section}: {message}")]
    StructuralDrift { section: String, message: String },

    /// Totals do not reconcile with the itemized rows.
    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    /// A mandatory canonical section is missing.
    #[error("Cannot build canonical report: missing mandatory section '{0}'")]
    Adapter(String),

    /// A pipeline thread panicked before producing a result.
    #[error("Pipeline for {0} panicked")]
    WorkerPanicked(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarvesterError {
    /// Classify this error into the pipeline failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::InvalidDate(_) | Self::Config(_) => FailureKind::Input,
            Self::Resolution { .. } => FailureKind::Resolution,
            Self::Http(_) | Self::Fetch { .. } | Self::RetriesExhausted { .. } => {
                FailureKind::Fetch
            }
            Self::FeedParse(_) | Self::WorkerPanicked(_) => FailureKind::Fetch,
            Self::StructuralDrift { .. } => FailureKind::StructuralDrift,
            Self::Reconciliation(_) => FailureKind::Reconciliation,
            Self::Adapter(_) => FailureKind::Adapter,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => FailureKind::Output,
        }
    }

    pub(crate) fn drift(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralDrift {
            section: section.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
