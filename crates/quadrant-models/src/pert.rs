//! Three-point PERT estimate attached to a task.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Optimistic / most likely / pessimistic duration estimate.
///
/// Invariant: `0 < optimistic <= most_likely <= pessimistic`, all finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PertEstimate {
    pub optimistic: f64,
    pub most_likely: f64,
    pub pessimistic: f64,
}

impl PertEstimate {
    /// Creates a validated estimate.
    pub fn new(optimistic: f64, most_likely: f64, pessimistic: f64) -> Result<Self> {
        let estimate = Self {
            optimistic,
            most_likely,
            pessimistic,
        };
        estimate.validate()?;
        Ok(estimate)
    }

    /// Checks the ordering invariant.
    ///
    /// Deserialized values bypass `new`, so stored estimates are re-checked
    /// before use.
    pub fn validate(&self) -> Result<()> {
        let values = [self.optimistic, self.most_likely, self.pessimistic];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidEstimate(
                "values must be finite".to_string(),
            ));
        }
        if self.optimistic <= 0.0 {
            return Err(ModelError::InvalidEstimate(format!(
                "optimistic must be positive, got {}",
                self.optimistic
            )));
        }
        if self.optimistic > self.most_likely || self.most_likely > self.pessimistic {
            return Err(ModelError::InvalidEstimate(format!(
                "expected optimistic <= most_likely <= pessimistic, got {} / {} / {}",
                self.optimistic, self.most_likely, self.pessimistic
            )));
        }
        Ok(())
    }
}
