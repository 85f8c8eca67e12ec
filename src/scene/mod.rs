//! Framing of the sky view, the face-on inset and the animation
//!
//! All lengths are in stellar radii, centered on the star.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::arrays::{nan_max, nan_min};
use crate::constants::{
    MIN_HALF_HEIGHT, MIN_HALF_WIDTH, ORBIT_LINE_MIN_WIDTH, ORBIT_LINE_PERIOD_KNEE, RAD2DEG,
    RANGE_PADDING, SKY_ASPECT, SKY_WIDTH_FACTOR, TAU, VIEW_PADDING_RADII,
};
use crate::errors::{ensure_len, Result, ViewError};

/// Axis-aligned plot limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl ViewBounds {
    /// Create bounds from limits
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Horizontal extent
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Vertical extent
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Whether `(x, y)` lies inside the limits, edges included
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

/// Horizontal and vertical limits chosen by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedLimits {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
}

impl FixedLimits {
    /// Both axes fixed
    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

/// Limits around the planet at `(x, y)`
///
/// The star always fits (at least `[-2.5, 2.5] x [-2, 2]`) and the planet
/// keeps `padding_radii` planet radii of margin. Fixed limits win per axis.
pub fn frame_bounds(
    x: f64,
    y: f64,
    planet_radius: f64,
    padding_radii: f64,
    fixed: FixedLimits,
) -> ViewBounds {
    let margin = padding_radii * planet_radius;
    let (xmin, xmax) = fixed
        .x
        .unwrap_or(((-MIN_HALF_WIDTH).min(x - margin), MIN_HALF_WIDTH.max(x + margin)));
    let (ymin, ymax) = fixed
        .y
        .unwrap_or(((-MIN_HALF_HEIGHT).min(y - margin), MIN_HALF_HEIGHT.max(y + margin)));
    ViewBounds::new(xmin, xmax, ymin, ymax)
}

/// Limits that keep the whole orbit in view, NaN samples ignored
///
/// Fixed limits win per axis.
pub fn full_orbit_bounds(
    x: &Array1<f64>,
    y: &Array1<f64>,
    planet_radius: f64,
    fixed: FixedLimits,
) -> Result<ViewBounds> {
    ensure_len("y", x.len(), y.len())?;
    let margin = VIEW_PADDING_RADII * planet_radius;
    let (xmin, xmax) = match fixed.x {
        Some(limits) => limits,
        None => {
            let (lo, hi) = finite_extent(x, "x")?;
            ((-MIN_HALF_WIDTH).min(lo - margin), MIN_HALF_WIDTH.max(hi + margin))
        }
    };
    let (ymin, ymax) = match fixed.y {
        Some(limits) => limits,
        None => {
            let (lo, hi) = finite_extent(y, "y")?;
            ((-MIN_HALF_HEIGHT).min(lo - margin), MIN_HALF_HEIGHT.max(hi + margin))
        }
    };
    Ok(ViewBounds::new(xmin, xmax, ymin, ymax))
}

/// Limits of the face-on inset: the track's extent padded by 10% per axis
pub fn top_view_bounds(x: &Array1<f64>, y: &Array1<f64>) -> Result<ViewBounds> {
    ensure_len("y", x.len(), y.len())?;
    let (xlo, xhi) = finite_extent(x, "x")?;
    let (ylo, yhi) = finite_extent(y, "y")?;
    let xpad = RANGE_PADDING * (xhi - xlo);
    let ypad = RANGE_PADDING * (yhi - ylo);
    Ok(ViewBounds::new(xlo - xpad, xhi + xpad, ylo - ypad, yhi + ypad))
}

/// Symmetric limits of the sky plot, `(half_width, half_height)`
///
/// The half-width is 10% beyond the farthest sample from the star along x;
/// the plot is 3.2 times wider than tall.
pub fn sky_extent(x: &Array1<f64>) -> Result<(f64, f64)> {
    let (lo, hi) = finite_extent(x, "x")?;
    let half_width = SKY_WIDTH_FACTOR * hi.max(-lo);
    Ok((half_width, half_width / SKY_ASPECT))
}

/// Width of the orbit line for a given period in days
///
/// Long-period orbits are sampled sparsely near the star, so their line thins
/// from 1.0 at 30 days down to 0.3.
pub fn orbit_line_width(period: f64) -> f64 {
    if period < ORBIT_LINE_PERIOD_KNEE {
        1.0
    } else {
        (1.0 - (period - ORBIT_LINE_PERIOD_KNEE) / 100.0).max(ORBIT_LINE_MIN_WIDTH)
    }
}

/// Orbital inclination in degrees from the impact parameter and `a / R*`
pub fn inclination_degrees(impact_parameter: f64, a_rs: f64) -> Result<f64> {
    let ratio = impact_parameter / a_rs;
    if !(-1.0..=1.0).contains(&ratio) {
        return Err(ViewError::Domain(format!(
            "impact parameter {} exceeds semi-major axis {}",
            impact_parameter, a_rs
        )));
    }
    Ok(ratio.acos() * RAD2DEG)
}

fn finite_extent(values: &Array1<f64>, name: &str) -> Result<(f64, f64)> {
    match (nan_min(values), nan_max(values)) {
        (Some(lo), Some(hi)) => Ok((lo, hi)),
        _ => Err(ViewError::DegenerateOrbit(format!(
            "{} has no finite samples",
            name
        ))),
    }
}

/// One step of an animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFrame {
    /// Frame number
    pub step: usize,
    /// Mean anomaly of the planet in radians
    pub mean_anomaly: f64,
    /// Central longitude of the planet's surface map in degrees, `[-180, 180)`
    pub longitude: f64,
}

/// Orbital phase and surface rotation for each frame of an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationSchedule {
    /// Mean anomalies evenly spaced over `[0, 2pi)`
    pub mean_anomaly: Array1<f64>,
    /// Surface longitudes in degrees
    pub longitude: Array1<f64>,
}

impl AnimationSchedule {
    /// Schedule `nsteps` frames over one orbit
    ///
    /// The planet turns `days_per_year` times per orbit; a negative value
    /// spins it retrograde.
    pub fn new(nsteps: usize, days_per_year: f64) -> Result<Self> {
        if nsteps == 0 {
            return Err(ViewError::InvalidParameter(
                "an animation needs at least one frame".to_string(),
            ));
        }
        if !days_per_year.is_finite() {
            return Err(ViewError::InvalidParameter(format!(
                "days per year must be finite, got {}",
                days_per_year
            )));
        }

        let n = nsteps as f64;
        let mean_anomaly = (0..nsteps).map(|k| TAU * k as f64 / n).collect();
        let last = if nsteps > 1 { (nsteps - 1) as f64 } else { 1.0 };
        let longitude = (0..nsteps)
            .map(|k| {
                let turns = -days_per_year * k as f64 / last;
                turns.rem_euclid(1.0) * 360.0 - 180.0
            })
            .collect();

        Ok(Self {
            mean_anomaly,
            longitude,
        })
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.mean_anomaly.len()
    }

    /// Whether the schedule has no frames
    pub fn is_empty(&self) -> bool {
        self.mean_anomaly.is_empty()
    }

    /// Frames in order
    pub fn frames(&self) -> impl Iterator<Item = ScheduledFrame> + '_ {
        self.mean_anomaly
            .iter()
            .zip(self.longitude.iter())
            .enumerate()
            .map(|(step, (&mean_anomaly, &longitude))| ScheduledFrame {
                step,
                mean_anomaly,
                longitude,
            })
    }
}
