//! Validation engine module.
//!
//! Provides the session context, check orchestration and result aggregation.

pub mod context;
pub mod orchestrator;
pub mod result;
