//! Mapping from parsed sections to the canonical report.

use crate::config::pdf_url;
use crate::dates::ReleaseDate;
use crate::error::{HarvesterError, Result};
use crate::html::normalize_label;
use crate::parse::ParseResult;
use crate::types::{LineItem, TableKind};

use super::schema::{CanonicalReport, Factors, Meta, Overview};

fn value_of(items: &[LineItem], label: &str) -> Option<f64> {
    let wanted = normalize_label(label);
    items
        .iter()
        .find(|i| normalize_label(&i.label) == wanted)
        .map(|i| i.value)
}

/// PDF companion of a release URL such as `.../h41/20260108/`.
fn pdf_url_for(source_url: &str, date: &ReleaseDate) -> Option<String> {
    let compact = date.compact();
    let root_end = source_url.find(&format!("/{compact}"))?;
    Some(pdf_url(&source_url[..root_end], &compact))
}

/// Build the canonical report from a parse.
///
/// The mapping is pure: the same inputs always give identical output, and
/// `meta.updatedAt` stays `null` until [`CanonicalReport::stamp`] is called.
/// Missing optional tables become empty arrays. Fails only when the factors
/// section, and with it the overview, is unavailable.
pub fn adapt_to_canonical(
    parsed: &ParseResult,
    date: &ReleaseDate,
    source_url: &str,
) -> Result<CanonicalReport> {
    let sections = &parsed.sections;
    let factors = sections
        .factors
        .as_ref()
        .ok_or_else(|| HarvesterError::Adapter(TableKind::Factors.as_str().to_string()))?;

    let overview_item = |items: &[LineItem], label: &str| {
        value_of(items, label).ok_or_else(|| HarvesterError::Adapter(format!("overview ({label})")))
    };

    let overview = Overview {
        reserve_balances: factors.totals.reserve_balances.value,
        total_factors_supplying: factors.totals.total_supplying.value,
        total_factors_absorbing: factors.totals.total_absorbing_ex_reserves.value,
        total_assets: sections
            .consolidated_statement
            .as_deref()
            .and_then(|items| value_of(items, "Total assets")),
        securities_held_outright: overview_item(&factors.supplying, "Securities held outright")?,
        currency_in_circulation: overview_item(&factors.absorbing, "Currency in circulation")?,
        reverse_repurchase_agreements: overview_item(
            &factors.absorbing,
            "Reverse repurchase agreements",
        )?,
    };

    Ok(CanonicalReport {
        meta: Meta {
            report_date: date.clone(),
            week_ended: sections.week_ended.clone(),
            source_url: source_url.to_string(),
            pdf_url: pdf_url_for(source_url, date),
            updated_at: None,
        },
        overview,
        factors: Factors {
            supplying: factors.supplying.clone(),
            absorbing: factors.absorbing.clone(),
            totals: factors.totals.clone(),
            integrity: factors.integrity.clone(),
        },
        consolidated_statement: sections.consolidated_statement.clone().unwrap_or_default(),
        maturity_distribution: sections.maturity_distribution.clone().unwrap_or_default(),
        regional_detail: sections.regional_detail.clone().unwrap_or_default(),
        collateral: sections.collateral.clone().unwrap_or_default(),
        diagnostics: (!parsed.diagnostics.is_empty()).then(|| parsed.summary()),
    })
}
