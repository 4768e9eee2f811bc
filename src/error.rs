//! Errors raised while building a skip list.
//!
//! Lookups, inserts and removals never fail; a missing key is `None`.
//! Only an invalid configuration is rejected.

use thiserror::Error;

/// Result type alias for skip list construction
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("max level must be at least 1, got {max_level}")]
    InvalidMaxLevel { max_level: usize },

    #[error("probability must lie strictly between 0 and 1, got {probability}")]
    InvalidProbability { probability: f64 },
}
