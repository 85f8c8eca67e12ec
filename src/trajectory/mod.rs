//! Precomputed orbit samples supplied by the transit engine

use std::fs;
use std::path::Path;

use log::warn;
use nalgebra::Point3;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::errors::{ensure_len, ensure_non_empty, Result, ViewError};

/// Sampled planet motion relative to the star
///
/// All arrays are sample-aligned. Positions are in stellar radii with the
/// star at the origin; `z > 0` is the far side of the star from the viewer.
///
/// In JSON a trajectory is an object of plain number arrays:
///
/// ```json
/// {"time": [0.0, 0.1], "x": [1.2, 1.1], "y": [0.0, 0.0], "z": [-3.0, -3.1],
///  "mean_anomaly": [0.0, 0.01], "flux": [1.0, 1.0]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryRecord", into = "TrajectoryRecord")]
pub struct Trajectory {
    /// Sample times in days
    pub time: Array1<f64>,
    /// Sky-projected x coordinate
    pub x: Array1<f64>,
    /// Sky-projected y coordinate
    pub y: Array1<f64>,
    /// Line-of-sight coordinate
    pub z: Array1<f64>,
    /// Mean anomaly in radians
    pub mean_anomaly: Array1<f64>,
    /// Normalized stellar flux
    pub flux: Array1<f64>,
}

/// Wire form of [`Trajectory`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TrajectoryRecord {
    time: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    mean_anomaly: Vec<f64>,
    flux: Vec<f64>,
}

impl TryFrom<TrajectoryRecord> for Trajectory {
    type Error = ViewError;

    fn try_from(record: TrajectoryRecord) -> Result<Self> {
        Trajectory::from_vecs(
            record.time,
            record.x,
            record.y,
            record.z,
            record.mean_anomaly,
            record.flux,
        )
    }
}

impl From<Trajectory> for TrajectoryRecord {
    fn from(trajectory: Trajectory) -> Self {
        Self {
            time: trajectory.time.to_vec(),
            x: trajectory.x.to_vec(),
            y: trajectory.y.to_vec(),
            z: trajectory.z.to_vec(),
            mean_anomaly: trajectory.mean_anomaly.to_vec(),
            flux: trajectory.flux.to_vec(),
        }
    }
}

/// Result of asking the transit engine for a trajectory
///
/// Orbits whose projected path never crosses the stellar disk are a normal
/// outcome, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "trajectory", rename_all = "snake_case")]
pub enum TransitOutcome {
    /// The planet transits; samples are available
    Transit(Trajectory),
    /// The planet never crosses the stellar disk
    NoTransit,
}

impl TransitOutcome {
    /// The trajectory, if the planet transits
    pub fn trajectory(&self) -> Option<&Trajectory> {
        match self {
            TransitOutcome::Transit(trajectory) => Some(trajectory),
            TransitOutcome::NoTransit => None,
        }
    }

    /// Whether the planet transits
    pub fn transits(&self) -> bool {
        matches!(self, TransitOutcome::Transit(_))
    }
}

impl Trajectory {
    /// Create a trajectory, checking that every array has the same length
    pub fn new(
        time: Array1<f64>,
        x: Array1<f64>,
        y: Array1<f64>,
        z: Array1<f64>,
        mean_anomaly: Array1<f64>,
        flux: Array1<f64>,
    ) -> Result<Self> {
        let trajectory = Self {
            time,
            x,
            y,
            z,
            mean_anomaly,
            flux,
        };
        trajectory.validate()?;
        Ok(trajectory)
    }

    /// Create a trajectory from plain vectors
    pub fn from_vecs(
        time: Vec<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        mean_anomaly: Vec<f64>,
        flux: Vec<f64>,
    ) -> Result<Self> {
        Self::new(
            Array1::from(time),
            Array1::from(x),
            Array1::from(y),
            Array1::from(z),
            Array1::from(mean_anomaly),
            Array1::from(flux),
        )
    }

    /// Parse a trajectory from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a trajectory from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check array alignment
    ///
    /// The fields are public, so a trajectory edited in place should be
    /// validated again before use.
    pub fn validate(&self) -> Result<()> {
        let n = self.time.len();
        ensure_non_empty("trajectory", n)?;
        ensure_len("x", n, self.x.len())?;
        ensure_len("y", n, self.y.len())?;
        ensure_len("z", n, self.z.len())?;
        ensure_len("mean_anomaly", n, self.mean_anomaly.len())?;
        ensure_len("flux", n, self.flux.len())?;

        let nan_positions = (0..n)
            .filter(|&i| self.x[i].is_nan() || self.y[i].is_nan() || self.z[i].is_nan())
            .count();
        if nan_positions > 0 {
            warn!(
                "Trajectory has {} of {} samples with NaN positions",
                nan_positions, n
            );
        }
        Ok(())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the trajectory holds no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Planet position at sample `index`
    pub fn position(&self, index: usize) -> Result<Point3<f64>> {
        self.check_index(index)?;
        Ok(Point3::new(self.x[index], self.y[index], self.z[index]))
    }

    /// Fails with [`ViewError::IndexOutOfRange`] past the last sample
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(ViewError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    /// Time covered from the first to the last sample
    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.time[self.len() - 1] - self.time[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory {
        Trajectory::from_vecs(
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, -1.0],
            vec![0.0, 0.1, 0.0],
            vec![0.5, -2.0, 0.5],
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.99, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_position() {
        let trajectory = sample();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.position(1).unwrap(), Point3::new(0.0, 0.1, -2.0));
        assert!(matches!(
            trajectory.position(3),
            Err(ViewError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(trajectory.span(), 2.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = Trajectory::from_vecs(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        );
        assert!(matches!(
            result,
            Err(ViewError::ShapeMismatch { name: "z", .. })
        ));
    }

    #[test]
    fn test_empty() {
        let result = Trajectory::from_vecs(vec![], vec![], vec![], vec![], vec![], vec![]);
        assert!(matches!(result, Err(ViewError::EmptyInput(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let trajectory = sample();
        let json = serde_json::to_string(&trajectory).unwrap();
        let parsed = Trajectory::from_json_str(&json).unwrap();
        assert_eq!(parsed, trajectory);
    }

    #[test]
    fn test_json_rejects_misaligned() {
        let json = r#"{"time": [0.0, 1.0], "x": [0.0], "y": [0.0, 0.0],
                       "z": [0.0, 0.0], "mean_anomaly": [0.0, 0.0], "flux": [1.0, 1.0]}"#;
        assert!(matches!(
            Trajectory::from_json_str(json),
            Err(ViewError::Json(_))
        ));
    }

    #[test]
    fn test_outcome() {
        let outcome = TransitOutcome::Transit(sample());
        assert!(outcome.transits());
        assert_eq!(outcome.trajectory().map(|t| t.len()), Some(3));

        let none = TransitOutcome::NoTransit;
        assert!(!none.transits());
        assert!(none.trajectory().is_none());

        let json = serde_json::to_string(&none).unwrap();
        let parsed: TransitOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TransitOutcome::NoTransit);
    }
}
