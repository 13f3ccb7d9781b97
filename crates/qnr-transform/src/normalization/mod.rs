//! Single-cell normalization.
//!
//! - **datetime**: timestamp parsing across the recipe's input formats
//! - **numeric**: numeric parsing, rounding and domain checks
//! - **categorical**: label-to-code mapping and "other" answers

pub mod categorical;
pub mod datetime;
pub mod numeric;

pub use categorical::{map_label, split_other};
pub use datetime::{normalize_datetime, parse_datetime};
pub use numeric::normalize_numeric;
