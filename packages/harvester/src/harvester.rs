//! Main harvester service that ties all pipeline stages together.

use std::thread;

use chrono::Utc;
use serde::Serialize;

use crate::canonical::{adapt_to_canonical, CanonicalReport};
use crate::compare::{compare_reports, ReportComparison};
use crate::config::HarvesterConfig;
use crate::dates::{resolve_release_date, ReleaseDate};
use crate::diagnostics::{render_warnings, Diagnostic, DiagnosticKind};
use crate::discovery::{discover_releases, ReleaseCatalog};
use crate::error::{HarvesterError, Result};
use crate::fetch::fetch_release;
use crate::http::{HttpTransport, Transport};
use crate::parse::parse_report_with;
use crate::tables::create_release_registry;
use crate::types::{RawDocument, TableKind};

/// Result of one pipeline run.
///
/// `ok == false` means the report must not be cached or shown as valid;
/// `warnings` explain why.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOutcome {
    pub ok: bool,
    pub requested_date: ReleaseDate,
    pub resolved_date: ReleaseDate,
    pub report: Option<CanonicalReport>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl HarvestOutcome {
    /// The first fatal diagnostic as a typed error, if the run was not ok.
    #[must_use]
    pub fn failure(&self) -> Option<HarvesterError> {
        let fatal = self.diagnostics.iter().find(|d| d.is_fatal())?;
        let section = fatal.section.clone().unwrap_or_default();
        Some(match fatal.kind {
            DiagnosticKind::Reconciliation => HarvesterError::Reconciliation(fatal.message.clone()),
            DiagnosticKind::Adapter => HarvesterError::Adapter(section),
            _ => HarvesterError::drift(section, fatal.message.clone()),
        })
    }
}

/// Two harvested reports and the line deltas between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateComparison {
    pub ok: bool,
    pub comparison: ReportComparison,
    pub warnings: Vec<String>,
}

/// Harvest the release closest to `date` over HTTP.
///
/// # Arguments
/// * `date` - Requested date in YYYY-MM-DD format
/// * `config` - Harvester configuration
///
/// # Errors
/// Invalid input, an unresolvable date, or a failed fetch. Structural and
/// reconciliation problems are reported through `HarvestOutcome::ok`.
pub fn harvest_report(date: &str, config: &HarvesterConfig) -> Result<HarvestOutcome> {
    let requested = ReleaseDate::parse(date)?;
    config.validate()?;
    let transport = HttpTransport::new(config)?;
    harvest_with(&transport, &requested, config)
}

/// Run discovery, resolution, fetch, parse and adaptation over `transport`.
pub fn harvest_with(
    transport: &dyn Transport,
    requested: &ReleaseDate,
    config: &HarvesterConfig,
) -> Result<HarvestOutcome> {
    let catalog = discover_releases(transport, config);
    let (resolved, doc) = locate_release(transport, requested, &catalog, config)?;
    tracing::info!(requested = %requested, resolved = %resolved, "Release resolved");
    Ok(process_document(requested, &doc, config))
}

fn locate_release(
    transport: &dyn Transport,
    requested: &ReleaseDate,
    catalog: &ReleaseCatalog,
    config: &HarvesterConfig,
) -> Result<(ReleaseDate, RawDocument)> {
    if catalog.is_empty() {
        // Nothing discovered: the canonical URL of the requested date is the last resort.
        let doc = fetch_release(transport, requested, catalog, config).map_err(|e| {
            HarvesterError::Resolution {
                requested: requested.to_string(),
                reason: format!("no releases discovered and direct fetch failed ({e})"),
            }
        })?;
        return Ok((requested.clone(), doc));
    }

    let resolved = resolve_release_date(requested, &catalog.dates());
    let doc = fetch_release(transport, &resolved, catalog, config)?;
    Ok((resolved, doc))
}

/// Parse and adapt an already fetched document.
///
/// Used by the pipeline after fetching and by offline parsing of saved
/// releases. The report is stamped with the current time.
#[must_use]
pub fn process_document(
    requested: &ReleaseDate,
    doc: &RawDocument,
    config: &HarvesterConfig,
) -> HarvestOutcome {
    let parsed = parse_report_with(doc, &create_release_registry(), &config.reconcile);
    let mut diagnostics = parsed.diagnostics.clone();

    let report = match adapt_to_canonical(&parsed, &doc.date, &doc.source_url) {
        Ok(mut report) => {
            report.stamp(Utc::now());
            Some(report)
        }
        Err(e) => {
            tracing::warn!(date = %doc.date, error = %e, "No canonical report");
            diagnostics.push(Diagnostic::fatal(DiagnosticKind::Adapter, None, e.to_string()));
            None
        }
    };

    HarvestOutcome {
        ok: parsed.ok && report.is_some(),
        requested_date: requested.clone(),
        resolved_date: doc.date.clone(),
        report,
        warnings: render_warnings(&diagnostics),
        diagnostics,
    }
}

/// List every discovered release, newest first.
pub fn list_releases(config: &HarvesterConfig) -> Result<ReleaseCatalog> {
    config.validate()?;
    let transport = HttpTransport::new(config)?;
    Ok(discover_releases(&transport, config))
}

/// Harvest two dates in parallel and compare the resulting reports.
pub fn compare_dates(from: &str, to: &str, config: &HarvesterConfig) -> Result<DateComparison> {
    let from = ReleaseDate::parse(from)?;
    let to = ReleaseDate::parse(to)?;
    config.validate()?;
    let transport = HttpTransport::new(config)?;
    compare_dates_with(&transport, &from, &to, config)
}

/// Run two independent pipelines on scoped threads and join them.
pub fn compare_dates_with(
    transport: &dyn Transport,
    from: &ReleaseDate,
    to: &ReleaseDate,
    config: &HarvesterConfig,
) -> Result<DateComparison> {
    let (from_outcome, to_outcome) = thread::scope(|scope| {
        let from_handle = scope.spawn(|| harvest_with(transport, from, config));
        let to_handle = scope.spawn(|| harvest_with(transport, to, config));
        (
            from_handle
                .join()
                .map_err(|_| HarvesterError::WorkerPanicked(from.to_string())),
            to_handle
                .join()
                .map_err(|_| HarvesterError::WorkerPanicked(to.to_string())),
        )
    });
    let from_outcome = from_outcome??;
    let to_outcome = to_outcome??;

    let (Some(from_report), Some(to_report)) = (&from_outcome.report, &to_outcome.report) else {
        return Err(HarvesterError::Adapter(TableKind::Factors.as_str().to_string()));
    };

    let warnings = [&from_outcome, &to_outcome]
        .iter()
        .flat_map(|o| {
            o.warnings
                .iter()
                .map(move |w| format!("{}: {w}", o.resolved_date))
        })
        .collect();

    Ok(DateComparison {
        ok: from_outcome.ok && to_outcome.ok,
        comparison: compare_reports(from_report, to_report),
        warnings,
    })
}
