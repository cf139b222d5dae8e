//! Evidence fusion
//!
//! Merges analyzer outputs into one finalized record per recording.
//! `engine` holds the precedence cascade, `special_cases` the two
//! category overrides, `thresholds` every confidence constant.

pub mod engine;
pub mod special_cases;
pub mod thresholds;

pub use engine::{FusionOutcome, MetadataFusionEngine};
pub use thresholds::ConfidenceThresholds;
