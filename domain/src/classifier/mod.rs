//! Tier classifier
//!
//! Pure functions turning AI output into Action records:
//!
//! - [`classify_tier`]: risk tier of a literal command line
//! - [`extract_actions`]: fenced shell and structured blocks to Actions

pub mod extract;
pub mod tier;

pub use extract::{TOOL_ACTION_TAG, extract_actions};
pub use tier::classify_tier;
