//! Release document retrieval.

use crate::config::{release_url, HarvesterConfig};
use crate::dates::ReleaseDate;
use crate::discovery::ReleaseCatalog;
use crate::error::{HarvesterError, Result};
use crate::http::Transport;
use crate::types::RawDocument;

/// URL of the release for `date`: the discovered link if there is one,
/// otherwise the canonical `{base}/{YYYYMMDD}/` path.
#[must_use]
pub fn document_url(date: &ReleaseDate, catalog: &ReleaseCatalog, config: &HarvesterConfig) -> String {
    catalog
        .url_for(date)
        .map_or_else(|| release_url(&config.base_url, &date.compact()), str::to_string)
}

/// Fetch the raw HTML of one release.
///
/// Any failure for the targeted date is returned as an error; no stale or
/// partial document is ever substituted.
pub fn fetch_release(
    transport: &dyn Transport,
    date: &ReleaseDate,
    catalog: &ReleaseCatalog,
    config: &HarvesterConfig,
) -> Result<RawDocument> {
    let url = document_url(date, catalog, config);
    tracing::info!(date = %date, %url, "Fetching release");

    let html = transport.get_text(&url).map_err(|e| match e {
        HarvesterError::Fetch { .. } => e,
        other => HarvesterError::Fetch {
            url: url.clone(),
            reason: other.to_string(),
        },
    })?;

    Ok(RawDocument {
        html,
        source_url: url,
        date: date.clone(),
    })
}
