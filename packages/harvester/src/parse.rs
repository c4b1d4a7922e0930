//! Whole-release parsing: locate every table, extract its rows, reconcile.
//!
//! Parsing is pure computation over a [`RawDocument`]; no I/O happens here.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::config::ReconcileConfig;
use crate::diagnostics::{render_warnings, Diagnostic, DiagnosticKind};
use crate::extract::{extract_factors, extract_rows, extract_week_ended};
use crate::reconcile::check_consolidated;
use crate::tables::{create_release_registry, MatcherRegistry};
use crate::types::{FactorsTable, LineItem, RawDocument, TableKind, TableSection};

/// Every section of a parsed release. `None` means the table was not found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSections {
    pub factors: Option<FactorsTable>,
    pub maturity_distribution: Option<Vec<LineItem>>,
    pub consolidated_statement: Option<Vec<LineItem>>,
    pub regional_detail: Option<Vec<LineItem>>,
    pub collateral: Option<Vec<LineItem>>,
    /// ISO date from the "Week ended ..." phrase.
    pub week_ended: Option<String>,
}

/// Outcome of parsing one release.
///
/// When `ok` is false the caller must not cache the result and must surface
/// `warnings` verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub ok: bool,
    pub sections: ParsedSections,
    pub warnings: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    fn from_parts(sections: ParsedSections, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            ok: !diagnostics.iter().any(Diagnostic::is_fatal),
            sections,
            warnings: render_warnings(&diagnostics),
            diagnostics,
        }
    }

    /// Whether a downstream cache may keep this result.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.ok
            && !self
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::StructuralDrift)
    }

    /// Diagnostics summary in the shape the canonical schema carries.
    #[must_use]
    pub fn summary(&self) -> ParseSummary {
        ParseSummary {
            ok: self.ok,
            warnings: self.warnings.clone(),
        }
    }
}

/// `{ ok, warnings }` as embedded in the canonical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    pub ok: bool,
    pub warnings: Vec<String>,
}

/// Parse a release with the standard matchers and default reconciliation.
#[must_use]
pub fn parse_report(doc: &RawDocument) -> ParseResult {
    parse_report_with(doc, &create_release_registry(), &ReconcileConfig::default())
}

/// Parse a release with an explicit matcher registry and reconciliation config.
///
/// A missing optional table becomes a `table not found` warning and never
/// stops the other tables from being extracted. A missing factors table is
/// fatal.
#[must_use]
pub fn parse_report_with(
    doc: &RawDocument,
    registry: &MatcherRegistry,
    config: &ReconcileConfig,
) -> ParseResult {
    let _span = tracing::info_span!("parse_report", date = %doc.date).entered();
    let document = Html::parse_document(&doc.html);

    let mut sections = ParsedSections::default();
    let mut diagnostics = Vec::new();

    for (matcher, section) in registry.locate_all(&document) {
        let kind = section.kind();
        if let TableSection::NotFound { reason, .. } = &section {
            tracing::warn!(table = %kind, %reason, "Table not found");
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::TableNotFound,
                Some(kind.as_str()),
                reason.clone(),
            ));
            continue;
        }

        if kind == TableKind::Factors {
            let extraction = extract_factors(&section, &matcher.layout(), config);
            diagnostics.extend(extraction.diagnostics);
            sections.factors = extraction.table;
            continue;
        }

        let rows = extract_rows(&section, &matcher.layout());
        diagnostics.extend(rows.diagnostics);
        if rows.items.is_empty() {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::StructuralDrift,
                Some(kind.as_str()),
                "table located but no rows could be extracted",
            ));
        }
        tracing::debug!(table = %kind, rows = rows.items.len(), "Extracted table");
        store(&mut sections, kind, rows.items);
    }

    for kind in registry.kinds() {
        if kind.is_mandatory() && !has_section(&sections, kind) && !has_fatal(&diagnostics, kind) {
            diagnostics.push(Diagnostic::fatal(
                DiagnosticKind::StructuralDrift,
                Some(kind.as_str()),
                "mandatory table is missing",
            ));
        }
    }

    if let Some(items) = &sections.consolidated_statement {
        diagnostics.extend(check_consolidated(items, config.tolerance));
    }

    sections.week_ended = extract_week_ended(&document);
    if sections.week_ended.is_none() {
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::Metadata,
            None,
            "no \"Week ended\" date found",
        ));
    }

    let result = ParseResult::from_parts(sections, diagnostics);
    tracing::info!(
        ok = result.ok,
        warnings = result.warnings.len(),
        "Parsed release"
    );
    result
}

fn store(sections: &mut ParsedSections, kind: TableKind, items: Vec<LineItem>) {
    let slot = match kind {
        TableKind::MaturityDistribution => &mut sections.maturity_distribution,
        TableKind::ConsolidatedStatement => &mut sections.consolidated_statement,
        TableKind::RegionalDetail => &mut sections.regional_detail,
        TableKind::Collateral => &mut sections.collateral,
        TableKind::Factors => return,
    };
    *slot = Some(items);
}

fn has_section(sections: &ParsedSections, kind: TableKind) -> bool {
    match kind {
        TableKind::Factors => sections.factors.is_some(),
        TableKind::MaturityDistribution => sections.maturity_distribution.is_some(),
        TableKind::ConsolidatedStatement => sections.consolidated_statement.is_some(),
        TableKind::RegionalDetail => sections.regional_detail.is_some(),
        TableKind::Collateral => sections.collateral.is_some(),
    }
}

fn has_fatal(diagnostics: &[Diagnostic], kind: TableKind) -> bool {
    diagnostics
        .iter()
        .any(|d| d.is_fatal() && d.section.as_deref() == Some(kind.as_str()))
}
