//! HTML utilities for the release document.

mod text;
mod utils;

pub use text::{clean_label, normalize_label, parse_number};
pub use utils::{cell_texts, collect_text, contains_link, normalize_ws, select_rows};
