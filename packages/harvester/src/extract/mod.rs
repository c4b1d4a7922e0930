//! Row extraction: turning located table sections into typed line items.

mod factors;
mod meta;
mod rows;

pub use factors::{
    absorbing_labels, extract_factors, parse_factors_table, supplying_labels, FactorsExtraction,
    ABSORBING_COUNT, SUPPLYING_COUNT,
};
pub use meta::extract_week_ended;
pub use rows::{extract_rows, RowExtraction};
