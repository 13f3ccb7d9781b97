//! CLI library components for the questionnaire deliverable toolkit.

pub mod logging;
pub mod pipeline;
