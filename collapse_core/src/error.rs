//! Construction-time validation errors.
//!
//! The engine itself has no error paths: degenerate inputs (zero-total
//! distributions, empty overlaps, repeated resolution) are defined no-ops.
//! These errors only come from the checked constructors.

use crate::coordinate::Coordinate;
use thiserror::Error;

/// Errors raised by `try_new` constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollapseError {
    /// Space dimensions must both be positive
    #[error("Invalid space dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Distribution weights must be non-negative
    #[error("Negative weight {weight} at {coordinate}")]
    NegativeWeight { coordinate: Coordinate, weight: f64 },

    /// Distribution weights must be finite
    #[error("Non-finite weight at {coordinate}")]
    NonFiniteWeight { coordinate: Coordinate },
}
