//! H.4.1 Harvester - Extract the weekly Federal Reserve balance sheet.
//!
//! This crate locates the H.4.1 release ("Factors Affecting Reserve
//! Balances") closest to a requested date, parses its HTML tables into typed
//! line items, reconciles the factor totals, and adapts the result into a
//! stable canonical report.
//!
//! # Example
//!
//! ```
//! use h41_harvester::dates::{resolve_release_date, ReleaseDate};
//!
//! let known = vec![ReleaseDate::parse("2026-01-08").unwrap()];
//! let requested = ReleaseDate::parse("2026-01-08").unwrap();
//! assert_eq!(resolve_release_date(&requested, &known), requested);
//! ```
//!
//! # Architecture
//!
//! Data flows strictly through these stages:
//!
//! - [`dates`]: Release dates and the closest-release resolver
//! - [`discovery`] and [`fetch`]: Release catalog and document retrieval
//! - [`tables`]: Pluggable table matchers locating each logical table
//! - [`extract`]: Row extraction and factor classification
//! - [`reconcile`]: Totals reconciliation
//! - [`parse`]: Whole-release parsing into a `ParseResult`
//! - [`canonical`]: The canonical report schema and adapter
//!
//! Supporting modules:
//!
//! - [`config`]: Configuration constants, environment loading and validation
//! - [`error`]: Error types and Result alias
//! - [`diagnostics`]: Typed parse diagnostics
//! - [`http`]: Transport trait and the `reqwest` implementation
//! - [`compare`]: Line deltas between two reports
//! - [`harvester`]: Pipeline orchestration
//! - [`cli`]: Command-line interface

pub mod canonical;
pub mod cli;
pub mod compare;
pub mod config;
pub mod dates;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvester;
pub mod html;
pub mod http;
pub mod parse;
pub mod reconcile;
pub mod tables;
pub mod types;

// Re-export main functions
pub use canonical::adapt_to_canonical;
pub use dates::resolve_release_date;
pub use extract::parse_factors_table;
pub use fetch::fetch_release;
pub use harvester::{compare_dates, harvest_report};
pub use parse::parse_report;

// Re-export commonly used items
pub use canonical::CanonicalReport;
pub use config::HarvesterConfig;
pub use dates::ReleaseDate;
pub use error::{HarvesterError, Result};
pub use harvester::HarvestOutcome;
pub use parse::ParseResult;
pub use types::LineItem;
