//! Classification of the factors table into supplying and absorbing groups.
//!
//! Rows are identified by their normalized label, and emitted under a
//! canonical label so that two releases compare row-for-row even when the
//! source relabels a line.

use std::sync::LazyLock;

use scraper::Html;

use crate::config::ReconcileConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{HarvesterError, Result};
use crate::extract::rows::extract_rows;
use crate::html::normalize_label;
use crate::reconcile::reconcile_factors;
use crate::tables::matchers::FactorsMatcher;
use crate::tables::{ColumnLayout, TableMatcher};
use crate::types::{FactorSide, FactorsTable, LineItem, TableKind, TableSection, Totals};

/// Number of supplying items in a well-formed release.
pub const SUPPLYING_COUNT: usize = 13;

/// Number of absorbing items in a well-formed release.
pub const ABSORBING_COUNT: usize = 4;

/// A factor row: canonical label plus accepted spellings.
struct RowSpec {
    label: &'static str,
    aliases: &'static [&'static str],
}

const SUPPLYING: [RowSpec; SUPPLYING_COUNT] = [
    RowSpec { label: "Securities held outright", aliases: &[] },
    RowSpec {
        label: "Unamortized premiums on securities held outright",
        aliases: &["Unamortized premiums"],
    },
    RowSpec {
        label: "Unamortized discounts on securities held outright",
        aliases: &["Unamortized discounts"],
    },
    RowSpec { label: "Repurchase agreements", aliases: &["Repos"] },
    RowSpec { label: "Loans", aliases: &["Loans and other credit extensions"] },
    RowSpec {
        label: "Net portfolio holdings of MS Facilities 2020 LLC",
        aliases: &[
            "Net portfolio holdings of MS Facilities 2020 LLC (Main Street Lending Program)",
            "Net portfolio holdings of MS Facilities LLC",
        ],
    },
    RowSpec { label: "Float", aliases: &[] },
    RowSpec { label: "Central bank liquidity swaps", aliases: &[] },
    RowSpec { label: "Other Federal Reserve assets", aliases: &[] },
    RowSpec { label: "Foreign currency denominated assets", aliases: &[] },
    RowSpec { label: "Gold stock", aliases: &[] },
    RowSpec {
        label: "Special drawing rights certificate account",
        aliases: &["SDR certificate account"],
    },
    RowSpec { label: "Treasury currency outstanding", aliases: &[] },
];

const ABSORBING: [RowSpec; ABSORBING_COUNT] = [
    RowSpec { label: "Currency in circulation", aliases: &[] },
    RowSpec {
        label: "Reverse repurchase agreements",
        aliases: &["Reverse repos"],
    },
    RowSpec {
        label: "Deposits with F.R. Banks, other than reserve balances",
        aliases: &["Deposits with Federal Reserve Banks, other than reserve balances"],
    },
    RowSpec { label: "Other liabilities and capital", aliases: &[] },
];

/// Top-level absorbing rows outside the four-item group. They are part of
/// the published totals, so reconciliation counts them.
const EXTRA_ABSORBING: [RowSpec; 1] = [RowSpec {
    label: "Treasury cash holdings",
    aliases: &[],
}];

const TOTAL_SUPPLYING: RowSpec = RowSpec {
    label: "Total factors supplying reserve funds",
    aliases: &[],
};

const TOTAL_ABSORBING: RowSpec = RowSpec {
    label: "Total factors, other than reserve balances, absorbing reserve funds",
    aliases: &["Total factors absorbing reserve funds, other than reserve balances"],
};

const RESERVE_BALANCES: RowSpec = RowSpec {
    label: "Reserve balances with Federal Reserve Banks",
    aliases: &["Reserve balances with F.R. Banks"],
};

/// Where a normalized label lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Factor(FactorSide, usize),
    ExtraAbsorbing,
    TotalSupplying,
    TotalAbsorbing,
    ReserveBalances,
}

/// Normalized spelling -> (slot, canonical label).
static LABEL_INDEX: LazyLock<Vec<(String, Slot, &'static str)>> = LazyLock::new(|| {
    let mut index = Vec::new();
    let mut add = |spec: &RowSpec, slot: Slot| {
        index.push((normalize_label(spec.label), slot, spec.label));
        for alias in spec.aliases {
            index.push((normalize_label(alias), slot, spec.label));
        }
    };
    for (i, spec) in SUPPLYING.iter().enumerate() {
        add(spec, Slot::Factor(FactorSide::Supplying, i));
    }
    for (i, spec) in ABSORBING.iter().enumerate() {
        add(spec, Slot::Factor(FactorSide::Absorbing, i));
    }
    for spec in &EXTRA_ABSORBING {
        add(spec, Slot::ExtraAbsorbing);
    }
    add(&TOTAL_SUPPLYING, Slot::TotalSupplying);
    add(&TOTAL_ABSORBING, Slot::TotalAbsorbing);
    add(&RESERVE_BALANCES, Slot::ReserveBalances);
    index
});

fn classify(label: &str) -> Option<(Slot, &'static str)> {
    let normalized = normalize_label(label);
    LABEL_INDEX
        .iter()
        .find(|(spelling, _, _)| *spelling == normalized)
        .map(|(_, slot, canonical)| (*slot, *canonical))
}

/// Canonical labels of the supplying group, in order.
#[must_use]
pub fn supplying_labels() -> Vec<&'static str> {
    SUPPLYING.iter().map(|s| s.label).collect()
}

/// Canonical labels of the absorbing group, in order.
#[must_use]
pub fn absorbing_labels() -> Vec<&'static str> {
    ABSORBING.iter().map(|s| s.label).collect()
}

/// Result of extracting the factors section.
///
/// `table` is `None` when the structure did not match; the reason is among
/// the fatal diagnostics.
#[derive(Debug, Clone, Default)]
pub struct FactorsExtraction {
    pub table: Option<FactorsTable>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract, classify, and reconcile a located factors section.
///
/// `layout` assigns the numeric columns, normally the registered factors
/// matcher's layout.
pub fn extract_factors(
    section: &TableSection,
    layout: &ColumnLayout,
    config: &ReconcileConfig,
) -> FactorsExtraction {
    let section_name = TableKind::Factors.as_str();
    let rows = extract_rows(section, layout);
    let mut diagnostics = rows.diagnostics;

    let mut supplying: Vec<Option<LineItem>> = vec![None; SUPPLYING_COUNT];
    let mut absorbing: Vec<Option<LineItem>> = vec![None; ABSORBING_COUNT];
    let mut total_supplying = None;
    let mut total_absorbing = None;
    let mut reserve_balances = None;
    let mut extra_absorbing = Vec::new();

    for item in rows.items {
        let Some((slot, canonical)) = classify(&item.label) else {
            continue;
        };
        let target = match slot {
            Slot::ExtraAbsorbing => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::StructuralDrift,
                    Some(section_name),
                    format!(
                        "absorbing row \"{canonical}\" ({}) is outside the {ABSORBING_COUNT} absorbing \
                         items; counted in reconciliation only",
                        item.value
                    ),
                ));
                extra_absorbing.push(item.relabeled(canonical));
                continue;
            }
            Slot::Factor(FactorSide::Supplying, i) => &mut supplying[i],
            Slot::Factor(FactorSide::Absorbing, i) => &mut absorbing[i],
            Slot::TotalSupplying => &mut total_supplying,
            Slot::TotalAbsorbing => &mut total_absorbing,
            Slot::ReserveBalances => &mut reserve_balances,
        };
        if target.is_some() {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::RowSkipped,
                Some(section_name),
                format!("duplicate row \"{}\" ignored; keeping the first", item.label),
            ));
            continue;
        }
        *target = Some(item.relabeled(canonical));
    }

    let mut drift = Vec::new();
    check_group(&supplying, &SUPPLYING, "supplying", &mut drift);
    check_group(&absorbing, &ABSORBING, "absorbing", &mut drift);
    for (row, spec) in [
        (&total_supplying, &TOTAL_SUPPLYING),
        (&total_absorbing, &TOTAL_ABSORBING),
        (&reserve_balances, &RESERVE_BALANCES),
    ] {
        if row.is_none() {
            drift.push(format!("total row \"{}\" not found", spec.label));
        }
    }

    let (Some(total_supplying), Some(total_absorbing), Some(reserve_balances)) =
        (total_supplying, total_absorbing, reserve_balances)
    else {
        return drift_failure(drift, diagnostics);
    };
    if !drift.is_empty() {
        return drift_failure(drift, diagnostics);
    }

    let supplying: Vec<LineItem> = supplying.into_iter().flatten().collect();
    let absorbing: Vec<LineItem> = absorbing.into_iter().flatten().collect();
    let totals = Totals {
        total_supplying,
        total_absorbing_ex_reserves: total_absorbing,
        reserve_balances,
    };

    let absorbed: Vec<LineItem> = absorbing.iter().chain(&extra_absorbing).cloned().collect();
    let reconciliation = reconcile_factors(&supplying, &absorbed, &totals, config);
    diagnostics.extend(reconciliation.diagnostics);

    FactorsExtraction {
        table: Some(FactorsTable {
            supplying,
            absorbing,
            totals,
            integrity: reconciliation.integrity,
        }),
        diagnostics,
    }
}

fn check_group(found: &[Option<LineItem>], specs: &[RowSpec], side: &str, drift: &mut Vec<String>) {
    let missing: Vec<&str> = found
        .iter()
        .zip(specs)
        .filter(|(row, _)| row.is_none())
        .map(|(_, spec)| spec.label)
        .collect();
    if !missing.is_empty() {
        drift.push(format!(
            "expected {} {side} items, found {} (missing: {})",
            specs.len(),
            specs.len() - missing.len(),
            missing.join("; ")
        ));
    }
}

fn drift_failure(drift: Vec<String>, mut diagnostics: Vec<Diagnostic>) -> FactorsExtraction {
    let section_name = TableKind::Factors.as_str();
    for message in drift {
        tracing::warn!(section = section_name, reason = %message, "Structural drift");
        diagnostics.push(Diagnostic::fatal(
            DiagnosticKind::StructuralDrift,
            Some(section_name),
            message,
        ));
    }
    FactorsExtraction {
        table: None,
        diagnostics,
    }
}

/// Parse only the factors table from raw HTML.
///
/// The table is located by its heading; input without the heading (e.g. a
/// bare table fragment) is treated as the section itself. Fails with
/// `StructuralDrift` when the 13/4 structure or a total row is missing; a
/// reconciliation problem is reported through `integrity.ok`.
///
/// # Examples
/// ```no_run
/// use h41_harvester::config::ReconcileConfig;
/// use h41_harvester::extract::parse_factors_table;
///
/// let html = std::fs::read_to_string("release.html").unwrap();
/// let factors = parse_factors_table(&html, &ReconcileConfig::default()).unwrap();
/// assert_eq!(factors.supplying.len(), 13);
/// ```
pub fn parse_factors_table(raw_html: &str, config: &ReconcileConfig) -> Result<FactorsTable> {
    let document = Html::parse_document(raw_html);
    let section = match FactorsMatcher.locate(&document) {
        found @ TableSection::Found { .. } => found,
        TableSection::NotFound { reason, .. } => {
            tracing::debug!(%reason, "No factors heading; treating input as the table itself");
            TableSection::Found {
                kind: TableKind::Factors,
                heading: String::new(),
                fragments: vec![raw_html.to_string()],
            }
        }
    };

    let extraction = extract_factors(&section, &FactorsMatcher.layout(), config);
    match extraction.table {
        Some(table) => Ok(table),
        None => {
            let message = extraction
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::StructuralDrift)
                .map(|d| d.message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            Err(HarvesterError::drift(TableKind::Factors.as_str(), message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_canonicalizes_labels() {
        assert_eq!(
            classify("DEPOSITS WITH FEDERAL RESERVE BANKS, other than reserve balances"),
            Some((
                Slot::Factor(FactorSide::Absorbing, 2),
                "Deposits with F.R. Banks, other than reserve balances"
            ))
        );
        assert_eq!(
            classify("Reserve balances with F.R. Banks"),
            Some((Slot::ReserveBalances, "Reserve balances with Federal Reserve Banks"))
        );
        assert_eq!(classify("U.S. Treasury securities"), None);
    }

    #[test]
    fn test_repurchase_and_reverse_repurchase_are_distinct() {
        assert_eq!(
            classify("Repurchase agreements").map(|(s, _)| s),
            Some(Slot::Factor(FactorSide::Supplying, 3))
        );
        assert_eq!(
            classify("Reverse repurchase agreements").map(|(s, _)| s),
            Some(Slot::Factor(FactorSide::Absorbing, 1))
        );
    }

    #[test]
    fn test_label_lists_have_fixed_sizes() {
        assert_eq!(supplying_labels().len(), 13);
        assert_eq!(absorbing_labels().len(), 4);
    }

    fn factors_section(rows: &str) -> TableSection {
        TableSection::Found {
            kind: TableKind::Factors,
            heading: "1. Factors Affecting Reserve Balances".into(),
            fragments: vec![format!("<table>{rows}</table>")],
        }
    }

    fn row(label: &str, value: f64) -> String {
        format!("<tr><td>{label}</td><td>{value}</td></tr>")
    }

    #[test]
    fn test_treasury_cash_holdings_is_reconciled_and_reported() {
        let mut rows: String = SUPPLYING.iter().map(|s| row(s.label, 10.0)).collect();
        rows.extend(ABSORBING.iter().map(|s| row(s.label, 10.0)));
        rows.push_str(&row("Treasury cash holdings", 5.0));
        rows.push_str(&row(TOTAL_SUPPLYING.label, 130.0));
        rows.push_str(&row(TOTAL_ABSORBING.label, 45.0));
        rows.push_str(&row(RESERVE_BALANCES.label, 85.0));

        let extraction = extract_factors(
            &factors_section(&rows),
            &ColumnLayout::LEVEL_ONLY,
            &ReconcileConfig::default(),
        );
        let table = extraction.table.unwrap();
        assert_eq!(table.absorbing.len(), ABSORBING_COUNT);
        assert!(table.integrity.ok, "{:?}", table.integrity);
        assert_eq!(table.integrity.computed_reserve_balances, 85.0);

        let warnings: Vec<&Diagnostic> = extraction.diagnostics.iter().collect();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert_eq!(warnings[0].kind, DiagnosticKind::StructuralDrift);
        assert!(!warnings[0].is_fatal());
        assert!(warnings[0].message.contains("Treasury cash holdings"));
    }

    #[test]
    fn test_layout_selects_value_column() {
        let wednesday = ColumnLayout {
            value: crate::tables::ValueColumn::Index(3),
            weekly: None,
            yearly: None,
        };
        let rows: String = SUPPLYING
            .iter()
            .map(|s| (s.label, 2.0))
            .chain(ABSORBING.iter().map(|s| (s.label, 1.0)))
            .chain([
                (TOTAL_SUPPLYING.label, 26.0),
                (TOTAL_ABSORBING.label, 4.0),
                (RESERVE_BALANCES.label, 22.0),
            ])
            .map(|(label, level)| {
                format!("<tr><td>{label}</td><td>9</td><td>0</td><td>0</td><td>{level}</td></tr>")
            })
            .collect();

        let extraction = extract_factors(&factors_section(&rows), &wednesday, &ReconcileConfig::default());
        let table = extraction.table.unwrap();
        assert_eq!(table.supplying[0].value, 2.0);
        assert_eq!(table.totals.reserve_balances.value, 22.0);
        assert!(table.integrity.ok);
    }

    #[test]
    fn test_missing_row_is_structural_drift() {
        let rows: String = SUPPLYING
            .iter()
            .skip(1)
            .chain(ABSORBING.iter())
            .map(|s| format!("<tr><td>{}</td><td>1</td></tr>", s.label))
            .collect();
        let html = format!("<table>{rows}</table>");
        let err = parse_factors_table(&html, &ReconcileConfig::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("expected 13 supplying items, found 12"), "{message}");
        assert!(message.contains("Securities held outright"), "{message}");
        assert!(message.contains("total row"), "{message}");
    }
}
