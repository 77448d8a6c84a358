//! Mixdown planning module
//!
//! This module turns discovered streams plus caller gains into a mix plan:
//! - Gain validation (positional correspondence, 0-200% range)
//! - Common sample rate / channel layout selection
//! - Per-stream scaling chains and the summing stage
//! - Rendering the plan as an engine filter graph

pub mod planner;

pub use planner::{plan_mix, validate_gains, MixPlan, MixTarget, StreamChain};
