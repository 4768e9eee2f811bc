//! Construction parameters for a skip list.

use crate::error::{Error, Result};

/// Number of link levels when none is given.
pub const DEFAULT_MAX_LEVEL: usize = 18;

/// Height skew when none is given. `1/e` minimizes the expected number of
/// links followed per search.
pub const DEFAULT_PROBABILITY: f64 = 1.0 / std::f64::consts::E;

/// Height bound and skew factor of a skip list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipListConfig {
    /// Number of levels in the header; every element height lies in `1..=max_level`.
    pub max_level: usize,
    /// Chance that an element reaching level `i` also reaches level `i + 1`.
    pub probability: f64,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
        }
    }
}

impl SkipListConfig {
    /// Builds a validated configuration.
    pub fn new(max_level: usize, probability: f64) -> Result<Self> {
        let config = Self {
            max_level,
            probability,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            return Err(Error::InvalidMaxLevel {
                max_level: self.max_level,
            });
        }
        // written as a negation so NaN is rejected too
        if !(self.probability > 0.0 && self.probability < 1.0) {
            return Err(Error::InvalidProbability {
                probability: self.probability,
            });
        }
        Ok(())
    }
}
