//! PERT three-point estimation.
//!
//! Expected duration is the weighted mean `(o + 4m + p) / 6`, standard
//! deviation `(p - o) / 6`. Sequential paths add expectations and
//! variances.

use quadrant_models::{ModelError, PertEstimate};
use serde::Serialize;

use crate::error::{Result, ScheduleError};

/// Expected duration of a single estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedDuration {
    pub expected: f64,
    pub std_dev: f64,
}

impl ExpectedDuration {
    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }

    /// `expected ± z·std_dev`, e.g. `z = 1.96` for roughly 95%.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (
            self.expected - z * self.std_dev,
            self.expected + z * self.std_dev,
        )
    }
}

/// Computes the PERT statistics for a three-point estimate.
pub fn estimate(optimistic: f64, most_likely: f64, pessimistic: f64) -> Result<ExpectedDuration> {
    let triple = PertEstimate::new(optimistic, most_likely, pessimistic).map_err(invalid)?;
    Ok(estimate_of(&triple))
}

/// Statistics of an already validated estimate.
pub fn estimate_of(triple: &PertEstimate) -> ExpectedDuration {
    let PertEstimate {
        optimistic: o,
        most_likely: m,
        pessimistic: p,
    } = *triple;
    ExpectedDuration {
        expected: (o + 4.0 * m + p) / 6.0,
        std_dev: (p - o) / 6.0,
    }
}

fn invalid(err: ModelError) -> ScheduleError {
    match err {
        ModelError::InvalidEstimate(msg) => ScheduleError::InvalidEstimate(msg),
        other => ScheduleError::Model(other),
    }
}

/// Aggregate of estimates performed one after another.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PathEstimate {
    pub expected: f64,
    pub variance: f64,
}

impl PathEstimate {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Extends the path with one more step.
    pub fn then(self, step: ExpectedDuration) -> Self {
        Self {
            expected: self.expected + step.expected,
            variance: self.variance + step.variance(),
        }
    }
}

/// Sums a chain of estimates into a path statistic.
pub fn path_estimate<'a>(steps: impl IntoIterator<Item = &'a PertEstimate>) -> Result<PathEstimate> {
    steps
        .into_iter()
        .try_fold(PathEstimate::default(), |acc, triple| -> Result<PathEstimate> {
            triple.validate().map_err(invalid)?;
            Ok(acc.then(estimate_of(triple)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_mean_is_exact() {
        let samples = [
            (1.0, 2.0, 3.0),
            (2.0, 4.0, 12.0),
            (0.5, 0.75, 10.25),
            (3.0, 3.0, 3.0),
            (1.0, 7.0, 7.0),
        ];
        for (o, m, p) in samples {
            let e = estimate(o, m, p).unwrap();
            assert_eq!(e.expected, (o + 4.0 * m + p) / 6.0);
            assert_eq!(e.std_dev, (p - o) / 6.0);
        }
    }

    #[test]
    fn test_known_values() {
        let e = estimate(2.0, 4.0, 12.0).unwrap();
        assert_eq!(e.expected, 5.0);
        assert!((e.std_dev - 10.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let grid = [1.0, 2.0, 3.5, 5.0, 8.0];

        // optimistic varies
        for w in grid.windows(2) {
            let a = estimate(w[0], 8.0, 10.0).unwrap();
            let b = estimate(w[1], 8.0, 10.0).unwrap();
            assert!(b.expected >= a.expected);
        }
        // most likely varies
        for w in grid.windows(2) {
            let a = estimate(1.0, w[0], 10.0).unwrap();
            let b = estimate(1.0, w[1], 10.0).unwrap();
            assert!(b.expected >= a.expected);
        }
        // pessimistic varies
        for w in grid.windows(2) {
            let a = estimate(1.0, 1.0, w[0]).unwrap();
            let b = estimate(1.0, 1.0, w[1]).unwrap();
            assert!(b.expected >= a.expected);
        }
    }

    #[test]
    fn test_invalid_triples() {
        assert!(matches!(
            estimate(0.0, 1.0, 2.0),
            Err(ScheduleError::InvalidEstimate(_))
        ));
        assert!(matches!(
            estimate(3.0, 2.0, 4.0),
            Err(ScheduleError::InvalidEstimate(_))
        ));
        assert!(matches!(
            estimate(1.0, 5.0, 4.0),
            Err(ScheduleError::InvalidEstimate(_))
        ));
    }

    #[test]
    fn test_confidence_interval() {
        let e = estimate(1.0, 4.0, 7.0).unwrap();
        let (lo, hi) = e.confidence_interval(2.0);
        assert_eq!(e.expected, 4.0);
        assert_eq!(e.std_dev, 1.0);
        assert_eq!((lo, hi), (2.0, 6.0));
    }

    #[test]
    fn test_path_estimate_sums() {
        let steps = [
            PertEstimate::new(1.0, 4.0, 7.0).unwrap(),
            PertEstimate::new(2.0, 2.0, 8.0).unwrap(),
        ];
        let path = path_estimate(&steps).unwrap();

        assert_eq!(path.expected, 4.0 + 3.0);
        assert_eq!(path.variance, 1.0 + 1.0);
        assert!((path.std_dev() - 2f64.sqrt()).abs() < 1e-12);

        let empty = path_estimate(&[]).unwrap();
        assert_eq!(empty, PathEstimate::default());
    }
}
