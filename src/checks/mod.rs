//! Validation check implementations.
//!
//! Checks are organized by category:
//! - Integrity: INT-001 through INT-002
//! - Identifiers: ID-001 through ID-002
//! - Density: DEN-001
//! - Geometry: GEO-001 through GEO-003
//!
//! Every check is a pure function of the [`ValidationContext`], returning
//! a pass message or the [`Violation`] it found.
//!
//! [`ValidationContext`]: crate::engine::context::ValidationContext
//! [`Violation`]: crate::error::Violation

pub mod density;
pub mod geometry;
pub mod identifiers;
pub mod integrity;

/// Result of one check: a pass message or the violation found.
pub type CheckOutcome = Result<String, crate::error::Violation>;
