//! Release dates and the closest-release resolver.
//!
//! Dates travel as ISO strings and all arithmetic happens on `(year, month,
//! day)` integer triples, so comparisons are day-exact and independent of the
//! local timezone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::validate_date;
use crate::error::{HarvesterError, Result};

/// An ISO `YYYY-MM-DD` date identifying one weekly publication.
///
/// Deserialization validates like [`ReleaseDate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseDate(String);

impl ReleaseDate {
    /// Parse and validate an ISO date.
    pub fn parse(iso: &str) -> Result<Self> {
        validate_date(iso)?;
        Ok(Self(iso.to_string()))
    }

    /// Build from a compact `YYYYMMDD` string as found in release URLs.
    pub fn from_yyyymmdd(compact: &str) -> Result<Self> {
        Self::parse(&iso_from_yyyymmdd(compact)?)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compact `YYYYMMDD` form used in release paths.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.replace('-', "")
    }

    fn civil(&self) -> CivilDate {
        // Validated on construction, so the split always yields three numbers.
        CivilDate::from_iso(&self.0).unwrap_or(CivilDate {
            year: 0,
            month: 1,
            day: 1,
        })
    }

    /// Absolute distance in days between two dates.
    #[must_use]
    pub fn days_between(&self, other: &ReleaseDate) -> i64 {
        (self.civil().day_number() - other.civil().day_number()).abs()
    }
}

impl TryFrom<String> for ReleaseDate {
    type Error = HarvesterError;

    fn try_from(iso: String) -> Result<Self> {
        validate_date(&iso)?;
        Ok(Self(iso))
    }
}

impl From<ReleaseDate> for String {
    fn from(date: ReleaseDate) -> Self {
        date.0
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar day as plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilDate {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

impl CivilDate {
    /// Split an ISO date into its integer parts.
    #[must_use]
    pub fn from_iso(iso: &str) -> Option<Self> {
        let mut parts = iso.splitn(3, '-');
        let year = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        Some(Self { year, month, day })
    }

    /// Days since 1970-01-01 in the proleptic Gregorian calendar.
    #[must_use]
    pub fn day_number(&self) -> i64 {
        let y = if self.month <= 2 { self.year - 1 } else { self.year };
        let era = (if y >= 0 { y } else { y - 399 }) / 400;
        let yoe = y - era * 400;
        let mp = (self.month + 9) % 12;
        let doy = (153 * mp + 2) / 5 + self.day - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }
}

/// Convert `YYYY-MM-DD` to `YYYYMMDD`.
///
/// # Examples
/// ```
/// use h41_harvester::dates::yyyymmdd_from_iso;
///
/// assert_eq!(yyyymmdd_from_iso("2026-01-08").unwrap(), "20260108");
/// ```
pub fn yyyymmdd_from_iso(iso: &str) -> Result<String> {
    validate_date(iso)?;
    Ok(iso.replace('-', ""))
}

/// Convert `YYYYMMDD` to `YYYY-MM-DD`.
///
/// # Examples
/// ```
/// use h41_harvester::dates::iso_from_yyyymmdd;
///
/// assert_eq!(iso_from_yyyymmdd("20260108").unwrap(), "2026-01-08");
/// assert!(iso_from_yyyymmdd("2026018").is_err());
/// ```
pub fn iso_from_yyyymmdd(compact: &str) -> Result<String> {
    if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HarvesterError::InvalidDate(compact.to_string()));
    }
    let iso = format!("{}-{}-{}", &compact[..4], &compact[4..6], &compact[6..]);
    validate_date(&iso)?;
    Ok(iso)
}

/// Find the closest known release and its distance in days.
///
/// Ties go to the first candidate in input order. Returns `None` only when
/// `known` is empty.
pub fn closest_release<'a>(
    requested: &ReleaseDate,
    known: &'a [ReleaseDate],
) -> Option<(&'a ReleaseDate, i64)> {
    if let Some(exact) = known.iter().find(|d| *d == requested) {
        return Some((exact, 0));
    }

    let mut best: Option<(&ReleaseDate, i64)> = None;
    for candidate in known {
        let distance = requested.days_between(candidate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best
}

/// Resolve the requested date to the closest known release date.
///
/// An empty candidate set returns the requested date unchanged; the caller
/// must treat that as unresolved.
///
/// # Examples
/// ```
/// use h41_harvester::dates::{resolve_release_date, ReleaseDate};
///
/// let known = vec![
///     ReleaseDate::parse("2026-01-08").unwrap(),
///     ReleaseDate::parse("2026-01-01").unwrap(),
/// ];
/// let requested = ReleaseDate::parse("2026-01-05").unwrap();
/// assert_eq!(resolve_release_date(&requested, &known).as_str(), "2026-01-08");
/// ```
#[must_use]
pub fn resolve_release_date(requested: &ReleaseDate, known: &[ReleaseDate]) -> ReleaseDate {
    match closest_release(requested, known) {
        Some((date, distance)) => {
            tracing::debug!(
                requested = %requested,
                resolved = %date,
                distance_days = distance,
                "Resolved release date"
            );
            date.clone()
        }
        None => {
            tracing::warn!(requested = %requested, "No known release dates to resolve against");
            requested.clone()
        }
    }
}
