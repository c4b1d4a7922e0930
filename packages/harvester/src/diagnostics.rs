//! Typed diagnostics attached to a parse.
//!
//! Diagnostics are the only channel through which the parser reports
//! problems to its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A table heading could not be located.
    TableNotFound,
    /// Row counts or mandatory rows differ from the known layout.
    StructuralDrift,
    /// Totals did not reconcile with itemized rows.
    Reconciliation,
    /// A row had numeric cells but no usable value.
    RowSkipped,
    /// Report metadata (e.g. week ended) could not be read.
    Metadata,
    /// The canonical report could not be assembled.
    Adapter,
}

impl DiagnosticKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableNotFound => "table not found",
            Self::StructuralDrift => "structural drift",
            Self::Reconciliation => "reconciliation failure",
            Self::RowSkipped => "row skipped",
            Self::Metadata => "metadata",
            Self::Adapter => "adapter failure",
        }
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Fatal,
}

/// One problem found while parsing a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub section: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(
        kind: DiagnosticKind,
        section: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            section: section.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn fatal(kind: DiagnosticKind, section: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Fatal,
            section: section.map(str::to_string),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{} [{section}]: {}", self.kind.as_str(), self.message),
            None => write!(f, "{}: {}", self.kind.as_str(), self.message),
        }
    }
}

/// Render diagnostics as the plain warning strings surfaced to callers.
#[must_use]
pub fn render_warnings(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}
