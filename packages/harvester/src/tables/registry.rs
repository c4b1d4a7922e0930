//! Registry of table matchers.

use scraper::Html;

use super::matcher::TableMatcher;
use super::matchers::{
    CollateralMatcher, ConsolidatedStatementMatcher, FactorsMatcher,
    MaturityDistributionMatcher, RegionalDetailMatcher,
};
use crate::types::{TableKind, TableSection};

/// Ordered collection of matchers, at most one per table kind.
pub struct MatcherRegistry {
    matchers: Vec<Box<dyn TableMatcher>>,
}

impl MatcherRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Register a matcher, replacing any existing matcher for the same kind.
    pub fn register(&mut self, matcher: impl TableMatcher + 'static) {
        let kind = matcher.kind();
        self.matchers.retain(|m| m.kind() != kind);
        self.matchers.push(Box::new(matcher));
    }

    /// Get the matcher for a table kind.
    #[must_use]
    pub fn get(&self, kind: TableKind) -> Option<&dyn TableMatcher> {
        self.matchers
            .iter()
            .find(|m| m.kind() == kind)
            .map(|m| m.as_ref())
    }

    /// Registered table kinds, in registration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<TableKind> {
        self.matchers.iter().map(|m| m.kind()).collect()
    }

    /// Run every matcher against the document.
    #[must_use]
    pub fn locate_all(&self, document: &Html) -> Vec<(&dyn TableMatcher, TableSection)> {
        self.matchers
            .iter()
            .map(|m| (m.as_ref(), m.locate(document)))
            .collect()
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with a matcher for every table of the H.4.1 release.
#[must_use]
pub fn create_release_registry() -> MatcherRegistry {
    let mut registry = MatcherRegistry::new();
    registry.register(FactorsMatcher);
    registry.register(MaturityDistributionMatcher);
    registry.register(ConsolidatedStatementMatcher);
    registry.register(RegionalDetailMatcher);
    registry.register(CollateralMatcher);
    registry
}
