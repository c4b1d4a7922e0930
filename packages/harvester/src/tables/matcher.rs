//! Table matcher trait definition.

use scraper::Html;

use super::locate::locate_after_heading;
use crate::types::{TableKind, TableSection};

/// Which numeric column carries the row's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    /// Zero-based index among the cells that follow the label.
    Index(usize),
    /// The last cell of the row (e.g. a trailing "Total" column).
    Last,
}

/// Positional roles of the numeric cells of a table.
///
/// Roles come from the known layout of each table, never from header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub value: ValueColumn,
    pub weekly: Option<usize>,
    pub yearly: Option<usize>,
}

impl ColumnLayout {
    /// Level followed by week-over-week and year-over-year changes.
    pub const LEVEL_WITH_CHANGES: ColumnLayout = ColumnLayout {
        value: ValueColumn::Index(0),
        weekly: Some(1),
        yearly: Some(2),
    };

    /// A single level in the first numeric column.
    pub const LEVEL_ONLY: ColumnLayout = ColumnLayout {
        value: ValueColumn::Index(0),
        weekly: None,
        yearly: None,
    };

    /// A single level in the last column.
    pub const TRAILING_TOTAL: ColumnLayout = ColumnLayout {
        value: ValueColumn::Last,
        weekly: None,
        yearly: None,
    };

    /// Pick the value cell from a row's numeric cells.
    #[must_use]
    pub fn value_of(&self, numbers: &[Option<f64>]) -> Option<f64> {
        match self.value {
            ValueColumn::Index(i) => numbers.get(i).copied().flatten(),
            ValueColumn::Last => numbers.last().copied().flatten(),
        }
    }

    #[must_use]
    pub fn weekly_of(&self, numbers: &[Option<f64>]) -> Option<f64> {
        self.weekly.and_then(|i| numbers.get(i).copied().flatten())
    }

    #[must_use]
    pub fn yearly_of(&self, numbers: &[Option<f64>]) -> Option<f64> {
        self.yearly.and_then(|i| numbers.get(i).copied().flatten())
    }
}

/// Locates one logical table in a release document.
pub trait TableMatcher: Send + Sync {
    /// The logical table this matcher finds.
    fn kind(&self) -> TableKind;

    /// Heading texts that introduce the table, matched case-insensitively.
    fn headings(&self) -> &'static [&'static str];

    /// Positional layout of the table's numeric columns.
    fn layout(&self) -> ColumnLayout;

    /// Find the table in a parsed document.
    ///
    /// Default implementation takes every table that follows a matching heading.
    fn locate(&self, document: &Html) -> TableSection {
        locate_after_heading(document, self.kind(), self.headings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_picks_positional_columns() {
        let numbers = [Some(10.0), None, Some(-3.0), Some(12.0)];
        let layout = ColumnLayout::LEVEL_WITH_CHANGES;
        assert_eq!(layout.value_of(&numbers), Some(10.0));
        assert_eq!(layout.weekly_of(&numbers), None);
        assert_eq!(layout.yearly_of(&numbers), Some(-3.0));
        assert_eq!(ColumnLayout::TRAILING_TOTAL.value_of(&numbers), Some(12.0));
    }

    #[test]
    fn test_layout_handles_short_rows() {
        let numbers = [Some(5.0)];
        let layout = ColumnLayout::LEVEL_WITH_CHANGES;
        assert_eq!(layout.value_of(&numbers), Some(5.0));
        assert_eq!(layout.weekly_of(&numbers), None);
        assert_eq!(ColumnLayout::LEVEL_ONLY.value_of(&[]), None);
    }
}
