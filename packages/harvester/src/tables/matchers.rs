//! One matcher per known table of the release.

use super::matcher::{ColumnLayout, TableMatcher};
use crate::types::TableKind;

/// Table 1: factors affecting reserve balances (weekly averages).
pub struct FactorsMatcher;

impl TableMatcher for FactorsMatcher {
    fn kind(&self) -> TableKind {
        TableKind::Factors
    }

    fn headings(&self) -> &'static [&'static str] {
        &["Factors Affecting Reserve Balances"]
    }

    fn layout(&self) -> ColumnLayout {
        // Week average, change from prior week, change from year ago, Wednesday level.
        ColumnLayout::LEVEL_WITH_CHANGES
    }
}

/// Table 2: maturity distribution; the last column is the total.
pub struct MaturityDistributionMatcher;

impl TableMatcher for MaturityDistributionMatcher {
    fn kind(&self) -> TableKind {
        TableKind::MaturityDistribution
    }

    fn headings(&self) -> &'static [&'static str] {
        &[
            "Maturity Distribution of Securities, Loans",
            "Maturity Distribution of Securities and Loans",
        ]
    }

    fn layout(&self) -> ColumnLayout {
        ColumnLayout::TRAILING_TOTAL
    }
}

/// Table 5: consolidated statement of condition (Wednesday levels).
pub struct ConsolidatedStatementMatcher;

impl TableMatcher for ConsolidatedStatementMatcher {
    fn kind(&self) -> TableKind {
        TableKind::ConsolidatedStatement
    }

    fn headings(&self) -> &'static [&'static str] {
        &[
            "Consolidated Statement of Condition of All Federal Reserve Banks",
            "Consolidated Statement of Condition",
        ]
    }

    fn layout(&self) -> ColumnLayout {
        ColumnLayout::LEVEL_WITH_CHANGES
    }
}

/// Table 6: statement of condition of each Reserve Bank; first column is the total.
pub struct RegionalDetailMatcher;

impl TableMatcher for RegionalDetailMatcher {
    fn kind(&self) -> TableKind {
        TableKind::RegionalDetail
    }

    fn headings(&self) -> &'static [&'static str] {
        &["Statement of Condition of Each Federal Reserve Bank"]
    }

    fn layout(&self) -> ColumnLayout {
        ColumnLayout::LEVEL_ONLY
    }
}

/// Table 7: collateral held against Federal Reserve notes.
pub struct CollateralMatcher;

impl TableMatcher for CollateralMatcher {
    fn kind(&self) -> TableKind {
        TableKind::Collateral
    }

    fn headings(&self) -> &'static [&'static str] {
        &["Collateral Held against Federal Reserve Notes"]
    }

    fn layout(&self) -> ColumnLayout {
        ColumnLayout::LEVEL_ONLY
    }
}
