//! The canonical report schema and the adapter that produces it.

mod adapter;
mod schema;

pub use adapter::adapt_to_canonical;
pub use schema::{CanonicalReport, Factors, Meta, Overview};
