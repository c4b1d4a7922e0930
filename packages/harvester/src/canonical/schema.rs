//! Stable output shape consumed by every downstream reader.
//!
//! Every key is always serialized. Absent values are `null`, absent tables
//! are empty arrays.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::ReleaseDate;
use crate::parse::ParseSummary;
use crate::types::{Integrity, LineItem, Totals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    pub meta: Meta,
    pub overview: Overview,
    pub factors: Factors,
    pub consolidated_statement: Vec<LineItem>,
    pub maturity_distribution: Vec<LineItem>,
    pub regional_detail: Vec<LineItem>,
    pub collateral: Vec<LineItem>,
    /// `null` when the parse raised no diagnostics.
    pub diagnostics: Option<ParseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub report_date: ReleaseDate,
    pub week_ended: Option<String>,
    pub source_url: String,
    pub pdf_url: Option<String>,
    /// RFC 3339 timestamp, set only by [`CanonicalReport::stamp`].
    pub updated_at: Option<String>,
}

/// Headline figures, in millions of dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub reserve_balances: f64,
    pub total_factors_supplying: f64,
    pub total_factors_absorbing: f64,
    pub total_assets: Option<f64>,
    pub securities_held_outright: f64,
    pub currency_in_circulation: f64,
    pub reverse_repurchase_agreements: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factors {
    pub supplying: Vec<LineItem>,
    pub absorbing: Vec<LineItem>,
    pub totals: Totals,
    pub integrity: Integrity,
}

impl CanonicalReport {
    /// Record when the report was produced.
    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.meta.updated_at = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }

    /// Whether the underlying parse was free of fatal diagnostics.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.diagnostics.as_ref().is_none_or(|d| d.ok)
    }
}
