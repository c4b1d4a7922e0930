//! Week-over-week comparison of two canonical reports.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalReport;
use crate::dates::ReleaseDate;
use crate::types::LineItem;

/// Change of one labeled line between two reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDelta {
    pub label: String,
    pub from: Option<f64>,
    pub to: Option<f64>,
    /// `to - from`; `null` unless both sides are present.
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportComparison {
    pub from: ReleaseDate,
    pub to: ReleaseDate,
    pub factors: Vec<LineDelta>,
    pub consolidated_statement: Vec<LineDelta>,
}

/// Pair lines by label. Order follows `from`, then labels only in `to`.
fn diff_lines<'a>(
    from: impl IntoIterator<Item = &'a LineItem>,
    to: impl IntoIterator<Item = &'a LineItem>,
) -> Vec<LineDelta> {
    let to: Vec<&LineItem> = to.into_iter().collect();
    let mut deltas: Vec<LineDelta> = Vec::new();

    for item in from {
        if deltas.iter().any(|d| d.label == item.label) {
            continue;
        }
        let other = to.iter().find(|o| o.label == item.label).map(|o| o.value);
        deltas.push(LineDelta {
            label: item.label.clone(),
            from: Some(item.value),
            to: other,
            change: other.map(|v| v - item.value),
        });
    }
    for item in to {
        if deltas.iter().any(|d| d.label == item.label) {
            continue;
        }
        deltas.push(LineDelta {
            label: item.label.clone(),
            from: None,
            to: Some(item.value),
            change: None,
        });
    }
    deltas
}

fn factor_lines(report: &CanonicalReport) -> impl Iterator<Item = &LineItem> {
    let f = &report.factors;
    f.supplying
        .iter()
        .chain(f.absorbing.iter())
        .chain([
            &f.totals.total_supplying,
            &f.totals.total_absorbing_ex_reserves,
            &f.totals.reserve_balances,
        ])
}

/// Compare two reports line by line.
#[must_use]
pub fn compare_reports(from: &CanonicalReport, to: &CanonicalReport) -> ReportComparison {
    ReportComparison {
        from: from.meta.report_date.clone(),
        to: to.meta.report_date.clone(),
        factors: diff_lines(factor_lines(from), factor_lines(to)),
        consolidated_statement: diff_lines(&from.consolidated_statement, &to.consolidated_statement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diff_lines_pairs_by_label() {
        let from = vec![LineItem::new("Gold", 10.0), LineItem::new("Coin", 2.0)];
        let to = vec![LineItem::new("Coin", 3.0), LineItem::new("Loans", 7.0)];
        assert_eq!(
            diff_lines(&from, &to),
            vec![
                LineDelta { label: "Gold".into(), from: Some(10.0), to: None, change: None },
                LineDelta { label: "Coin".into(), from: Some(2.0), to: Some(3.0), change: Some(1.0) },
                LineDelta { label: "Loans".into(), from: None, to: Some(7.0), change: None },
            ]
        );
    }
}
