//! Table locator.
//!
//! Each logical table of the release has its own [`TableMatcher`]; matchers
//! are independent, so drift in one table's heading never blocks the others.
//! Absence is reported as [`TableSection::NotFound`](crate::types::TableSection),
//! never as an error.

mod locate;
mod matcher;
pub mod matchers;
mod registry;

pub use locate::locate_after_heading;
pub use matcher::{ColumnLayout, TableMatcher, ValueColumn};
pub use registry::{create_release_registry, MatcherRegistry};
