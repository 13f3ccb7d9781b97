//! Questionnaire cleaning processor.
//!
//! - **recipe**: TOML description of renames, label maps and derived columns
//! - **normalization**: datetime, numeric and label normalization of single cells
//! - **dedupe**: removal of repeated submissions
//! - **multi_select**: splitting multi-choice answers into indicator columns
//! - **pipeline**: `clean_table`, which runs every step in order

pub mod dedupe;
pub mod multi_select;
pub mod normalization;
pub mod pipeline;
pub mod recipe;

pub use dedupe::dedupe_rows;
pub use multi_select::split_multi_select;
pub use pipeline::{CLEANING_STEPS, CleaningOutcome, clean_table};
pub use recipe::{
    CleaningRecipe, LabelMap, MultiSelectSpec, OtherSpec, RecipeInfo, load_recipe, parse_recipe,
};
