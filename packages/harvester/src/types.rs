//! Core data types passed between pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dates::ReleaseDate;

/// One extracted table row.
///
/// `None` deltas mean "not reported", which is distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub value: f64,
    pub weekly_change: Option<f64>,
    pub yearly_change: Option<f64>,
}

impl LineItem {
    /// Create a line item with both deltas unreported.
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            weekly_change: None,
            yearly_change: None,
        }
    }

    #[must_use]
    pub fn with_changes(mut self, weekly: Option<f64>, yearly: Option<f64>) -> Self {
        self.weekly_change = weekly;
        self.yearly_change = yearly;
        self
    }

    /// Copy of this item under a different label.
    #[must_use]
    pub fn relabeled(&self, label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..self.clone()
        }
    }
}

/// The fetched HTML of one release.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub html: String,
    pub source_url: String,
    pub date: ReleaseDate,
}

/// Logical tables of the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Factors,
    MaturityDistribution,
    ConsolidatedStatement,
    RegionalDetail,
    Collateral,
}

impl TableKind {
    /// All tables in release order.
    pub const ALL: [TableKind; 5] = [
        TableKind::Factors,
        TableKind::MaturityDistribution,
        TableKind::ConsolidatedStatement,
        TableKind::RegionalDetail,
        TableKind::Collateral,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factors => "factors",
            Self::MaturityDistribution => "maturity_distribution",
            Self::ConsolidatedStatement => "consolidated_statement",
            Self::RegionalDetail => "regional_detail",
            Self::Collateral => "collateral",
        }
    }

    /// Whether a release without this table is unusable.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Factors)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A located table, or the reason it could not be located.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSection {
    Found {
        kind: TableKind,
        /// Heading text that matched.
        heading: String,
        /// Outer HTML of every table belonging to this section, in document order.
        fragments: Vec<String>,
    },
    NotFound {
        kind: TableKind,
        reason: String,
    },
}

impl TableSection {
    #[must_use]
    pub fn kind(&self) -> TableKind {
        match self {
            Self::Found { kind, .. } | Self::NotFound { kind, .. } => *kind,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Fragments of a found section; empty when not found.
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        match self {
            Self::Found { fragments, .. } => fragments,
            Self::NotFound { .. } => &[],
        }
    }
}

/// Whether a factor supplies or absorbs reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorSide {
    Supplying,
    Absorbing,
}

/// Officially labeled summary rows of the factors table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_supplying: LineItem,
    pub total_absorbing_ex_reserves: LineItem,
    pub reserve_balances: LineItem,
}

impl Totals {
    #[must_use]
    pub fn all_zero(&self) -> bool {
        self.total_supplying.value == 0.0
            && self.total_absorbing_ex_reserves.value == 0.0
            && self.reserve_balances.value == 0.0
    }
}

/// Outcome of reconciling factor items against their totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integrity {
    pub ok: bool,
    /// `sum(supplying) - sum(absorbing)`.
    pub computed_reserve_balances: f64,
    pub reported_reserve_balances: f64,
    pub difference: f64,
    pub tolerance: f64,
}

/// Parsed factors table: supplying and absorbing items plus their totals.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorsTable {
    pub supplying: Vec<LineItem>,
    pub absorbing: Vec<LineItem>,
    pub totals: Totals,
    pub integrity: Integrity,
}
