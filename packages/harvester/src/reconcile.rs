//! Totals reconciliation.
//!
//! Itemized factor rows are summed and compared against the officially
//! labeled total rows, which were parsed independently of the items.

use crate::config::ReconcileConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::html::normalize_label;
use crate::types::{Integrity, LineItem, TableKind, Totals};

/// Integrity status plus every diagnostic raised while reconciling.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub integrity: Integrity,
    pub diagnostics: Vec<Diagnostic>,
}

fn sum(items: &[LineItem]) -> f64 {
    items.iter().map(|i| i.value).sum()
}

/// Reconcile factor groups against their totals.
///
/// The fatal check is `sum(supplying) - sum(absorbing)` against the reported
/// reserve balances. Three zero totals beside non-zero items mean the totals
/// were read from the wrong rows; that is fatal unless
/// `config.zero_totals_fatal` is off, in which case it is a warning and the
/// sum check is skipped because the totals carry no information.
///
/// # Examples
/// ```
/// use h41_harvester::config::ReconcileConfig;
/// use h41_harvester::reconcile::reconcile_factors;
/// use h41_harvester::types::{LineItem, Totals};
///
/// let supplying = vec![LineItem::new("Securities held outright", 100.0)];
/// let absorbing = vec![LineItem::new("Currency in circulation", 60.0)];
/// let totals = Totals {
///     total_supplying: LineItem::new("Total factors supplying reserve funds", 100.0),
///     total_absorbing_ex_reserves: LineItem::new("Total absorbing", 60.0),
///     reserve_balances: LineItem::new("Reserve balances", 40.0),
/// };
/// let result = reconcile_factors(&supplying, &absorbing, &totals, &ReconcileConfig::default());
/// assert!(result.integrity.ok);
/// ```
pub fn reconcile_factors(
    supplying: &[LineItem],
    absorbing: &[LineItem],
    totals: &Totals,
    config: &ReconcileConfig,
) -> Reconciliation {
    let section = Some(TableKind::Factors.as_str());
    let sum_supplying = sum(supplying);
    let sum_absorbing = sum(absorbing);
    let computed = sum_supplying - sum_absorbing;
    let reported = totals.reserve_balances.value;
    let difference = computed - reported;

    let mut diagnostics = Vec::new();
    let mut ok = true;

    let items_present = supplying.iter().chain(absorbing).any(|i| i.value != 0.0);
    if totals.all_zero() && items_present {
        let message = "all three factor totals are zero while item rows are not; \
                       the totals were likely read from relabeled rows";
        if config.zero_totals_fatal {
            tracing::warn!(reason = message, "Reconciliation failed");
            diagnostics.push(Diagnostic::fatal(DiagnosticKind::Reconciliation, section, message));
            ok = false;
        } else {
            tracing::warn!(reason = message, "Zero totals accepted by configuration");
            diagnostics.push(Diagnostic::warning(DiagnosticKind::Reconciliation, section, message));
        }
    } else {
        if difference.abs() > config.tolerance {
            let message = format!(
                "sum(supplying) - sum(absorbing) = {computed} but reserve balances are {reported} \
                 (difference {difference}, tolerance {})",
                config.tolerance
            );
            tracing::warn!(reason = %message, "Reconciliation failed");
            diagnostics.push(Diagnostic::fatal(DiagnosticKind::Reconciliation, section, message));
            ok = false;
        }

        for (name, summed, total) in [
            ("supplying", sum_supplying, &totals.total_supplying),
            ("absorbing", sum_absorbing, &totals.total_absorbing_ex_reserves),
        ] {
            if (summed - total.value).abs() > config.tolerance {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::Reconciliation,
                    section,
                    format!(
                        "{name} items sum to {summed} but \"{}\" is {}",
                        total.label, total.value
                    ),
                ));
            }
        }
    }

    tracing::debug!(computed, reported, difference, ok, "Reconciled factors");

    Reconciliation {
        integrity: Integrity {
            ok,
            computed_reserve_balances: computed,
            reported_reserve_balances: reported,
            difference,
            tolerance: config.tolerance,
        },
        diagnostics,
    }
}

/// Advisory balance check of the consolidated statement.
///
/// Returns a warning when `Total assets` differs from `Total liabilities`
/// plus `Total capital` by more than `tolerance`. Nothing is checked unless
/// all three rows are present.
#[must_use]
pub fn check_consolidated(items: &[LineItem], tolerance: f64) -> Vec<Diagnostic> {
    let find = |label: &str| {
        let wanted = normalize_label(label);
        items
            .iter()
            .find(|i| normalize_label(&i.label) == wanted)
            .map(|i| i.value)
    };

    let (Some(assets), Some(liabilities), Some(capital)) = (
        find("Total assets"),
        find("Total liabilities"),
        find("Total capital"),
    ) else {
        return Vec::new();
    };

    let difference = assets - (liabilities + capital);
    if difference.abs() <= tolerance {
        return Vec::new();
    }
    vec![Diagnostic::warning(
        DiagnosticKind::Reconciliation,
        Some(TableKind::ConsolidatedStatement.as_str()),
        format!(
            "total assets {assets} differ from total liabilities and capital {} by {difference}",
            liabilities + capital
        ),
    )]
}
