//! Integration testing module
//!
//! Tests that span the inspector, planner, engine and orchestrator:
//! - Orchestration against a scripted engine and probe
//! - End-to-end mixes through the real ffmpeg binary, skipped when absent

pub mod fixtures;
