//! Generic row extraction from a located table section.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::html::{clean_label, parse_number, select_rows};
use crate::tables::ColumnLayout;
use crate::types::{LineItem, TableSection};

/// Line items of one section plus anything worth reporting.
#[derive(Debug, Clone, Default)]
pub struct RowExtraction {
    pub items: Vec<LineItem>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extract ordered line items from every fragment of a section.
///
/// Rows without any numeric cell are headers and are skipped silently. Rows
/// that have numbers but no usable value column are skipped with a
/// diagnostic.
pub fn extract_rows(section: &TableSection, layout: &ColumnLayout) -> RowExtraction {
    let section_name = section.kind().as_str();
    let mut extraction = RowExtraction::default();

    for fragment in section.fragments() {
        for cells in select_rows(fragment) {
            match extract_row(&cells, layout) {
                RowOutcome::Item(item) => extraction.items.push(item),
                RowOutcome::Header => {}
                RowOutcome::Skipped(reason) => {
                    tracing::debug!(section = section_name, %reason, "Skipping row");
                    extraction.diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::RowSkipped,
                        Some(section_name),
                        reason,
                    ));
                }
            }
        }
    }

    extraction
}

enum RowOutcome {
    Item(LineItem),
    Header,
    Skipped(String),
}

fn extract_row(cells: &[String], layout: &ColumnLayout) -> RowOutcome {
    // The label is the first cell with text that is not itself a number.
    let label_index = cells
        .iter()
        .position(|c| !c.trim().is_empty() && parse_number(c).is_none());

    let numbers_from = label_index.map_or(0, |i| i + 1);
    let numbers: Vec<Option<f64>> = cells
        .get(numbers_from..)
        .unwrap_or_default()
        .iter()
        .map(|c| parse_number(c))
        .collect();

    if numbers.iter().all(Option::is_none) {
        return RowOutcome::Header;
    }

    let Some(label_index) = label_index else {
        return RowOutcome::Skipped(format!("row of {} numeric cells has no label", numbers.len()));
    };
    let label = clean_label(&cells[label_index]);
    if label.is_empty() {
        return RowOutcome::Skipped("row label is empty after cleanup".into());
    }

    let Some(value) = layout.value_of(&numbers) else {
        return RowOutcome::Skipped(format!("row \"{label}\" has no value in its level column"));
    };

    RowOutcome::Item(
        LineItem::new(label, value).with_changes(layout.weekly_of(&numbers), layout.yearly_of(&numbers)),
    )
}
