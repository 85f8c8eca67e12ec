//! Occlusion ordering between the planet, its trail and the star
//!
//! # Overview
//!
//! The renderer composes a frame from three kinds of circles: the limb
//! darkened star at the origin, the planet at its current sample, and a trail
//! of dots at earlier samples. This module decides which of those is in front
//! of which, and which orbit samples are hidden behind the stellar disk.
//!
//! Coordinates are sky-projected in stellar radii. The viewer looks along the
//! z axis from negative z, so a sample with `z < 0` lies between the viewer
//! and the star.
//!
//! # Main Components
//!
//! - [`nearest_phase_index`]: sample closest to a requested mean anomaly
//! - [`z_order_for`] / [`TrailLayer`]: layering of a trail dot
//! - [`StarLayer`]: layering of the star relative to the planet
//! - [`hidden_mask`] / [`MaskedTrack`]: samples behind the star
//! - [`face_on_planet_y`]: planet position in the degenerate face-on view
//! - [`trail_dots`]: the fading trail behind the planet

use log::{debug, trace};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::constants::{STAR_RADIUS, TAU, TRAIL_EXCLUSION_FACTOR};
use crate::errors::{ensure_len, ensure_non_empty, Result, ViewError};
use crate::trajectory::Trajectory;

/// Draw layer of a trail dot relative to the planet and the star
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailLayer {
    /// In front of the planet and of the star
    FrontOfPlanetAndStar,
    /// In front of the planet, behind the star
    FrontOfPlanetBehindStar,
    /// Behind the planet, in front of the star
    BehindPlanetFrontOfStar,
    /// Behind the planet and the star
    BehindPlanetAndStar,
}

impl TrailLayer {
    /// Numeric draw order; higher codes are painted later (on top)
    pub fn code(&self) -> i8 {
        match self {
            TrailLayer::FrontOfPlanetAndStar => 3,
            TrailLayer::FrontOfPlanetBehindStar => 1,
            TrailLayer::BehindPlanetFrontOfStar => -1,
            TrailLayer::BehindPlanetAndStar => -3,
        }
    }
}

/// Draw layer of the star relative to the planet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarLayer {
    /// The planet is in front, so the star is painted first
    BelowPlanet,
    /// The planet is behind, so the star is painted over it
    AbovePlanet,
}

impl StarLayer {
    /// Layer for the star given the planet's line-of-sight coordinate
    pub fn for_planet_depth(z_planet: f64) -> Self {
        if z_planet < 0.0 {
            StarLayer::BelowPlanet
        } else {
            StarLayer::AbovePlanet
        }
    }

    /// Numeric draw order, -2 or 2
    pub fn code(&self) -> i8 {
        match self {
            StarLayer::BelowPlanet => -2,
            StarLayer::AbovePlanet => 2,
        }
    }
}

/// Index whose mean anomaly, wrapped into `[0, 2pi)`, is closest to `target`
///
/// NaN entries are never selected. The lowest index wins ties.
pub fn nearest_phase_index(mean_anomaly: &Array1<f64>, target: f64) -> Result<usize> {
    ensure_non_empty("mean anomaly", mean_anomaly.len())?;
    if !target.is_finite() {
        return Err(ViewError::InvalidParameter(format!(
            "target mean anomaly must be finite, got {}",
            target
        )));
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, &m) in mean_anomaly.iter().enumerate() {
        let distance = ((m + TAU).rem_euclid(TAU) - target).abs();
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, _)| i).ok_or_else(|| {
        ViewError::DegenerateOrbit("every mean anomaly sample is NaN".to_string())
    })
}

/// Layer of a sample at depth `z_other` relative to a planet at `z_self`
///
/// `in_front_of_star` is normally `z_other < 0`; it is taken as a parameter
/// so callers can apply their own notion of the star's depth.
pub fn z_order_for(z_self: f64, z_other: f64, in_front_of_star: bool) -> TrailLayer {
    match (z_other < z_self, in_front_of_star) {
        (true, true) => TrailLayer::FrontOfPlanetAndStar,
        (true, false) => TrailLayer::FrontOfPlanetBehindStar,
        (false, true) => TrailLayer::BehindPlanetFrontOfStar,
        (false, false) => TrailLayer::BehindPlanetAndStar,
    }
}

/// Whether a sample is hidden behind the stellar disk
pub fn is_hidden(x: f64, y: f64, z: f64) -> bool {
    x * x + y * y < STAR_RADIUS * STAR_RADIUS && z > 0.0
}

/// Per-sample flags, `true` where the sample is hidden behind the star
pub fn hidden_mask(x: &Array1<f64>, y: &Array1<f64>, z: &Array1<f64>) -> Result<Array1<bool>> {
    let n = x.len();
    ensure_len("y", n, y.len())?;
    ensure_len("z", n, z.len())?;
    Ok((0..n).map(|i| is_hidden(x[i], y[i], z[i])).collect())
}

/// Per-sample flags, `true` where the sample can be seen
pub fn visibility_mask(x: &Array1<f64>, y: &Array1<f64>, z: &Array1<f64>) -> Result<Array1<bool>> {
    Ok(hidden_mask(x, y, z)?.mapv(|hidden| !hidden))
}

/// Depth classification of one sample against a reference sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcclusionSample {
    /// Sample index
    pub index: usize,
    /// Layer relative to the reference sample and the star
    pub layer: TrailLayer,
    /// Whether the sample is outside the region hidden by the star
    pub visible: bool,
}

/// Classify sample `index` against the planet at sample `reference`
pub fn classify(
    trajectory: &Trajectory,
    reference: usize,
    index: usize,
) -> Result<OcclusionSample> {
    trajectory.check_index(reference)?;
    trajectory.check_index(index)?;
    let (x, y, z) = (trajectory.x[index], trajectory.y[index], trajectory.z[index]);
    Ok(OcclusionSample {
        index,
        layer: z_order_for(trajectory.z[reference], z, z < 0.0),
        visible: !is_hidden(x, y, z),
    })
}

/// Orbit line with the samples behind the star blanked out
///
/// NaN in `x` and `y` tells a line renderer to break the path there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskedTrack {
    /// x with hidden samples set to NaN
    pub x: Array1<f64>,
    /// y with hidden samples set to NaN
    pub y: Array1<f64>,
    /// `true` where the sample was blanked
    pub hidden: Array1<bool>,
}

impl MaskedTrack {
    /// Mask a trajectory's sky track; the trajectory is not modified
    pub fn from_trajectory(trajectory: &Trajectory) -> Result<Self> {
        let hidden = hidden_mask(&trajectory.x, &trajectory.y, &trajectory.z)?;
        let blank = |values: &Array1<f64>| -> Array1<f64> {
            values
                .iter()
                .zip(hidden.iter())
                .map(|(&v, &h)| if h { f64::NAN } else { v })
                .collect()
        };
        let x = blank(&trajectory.x);
        let y = blank(&trajectory.y);
        debug!(
            "Masked {} of {} samples behind the star",
            hidden.iter().filter(|&&h| h).count(),
            hidden.len()
        );
        Ok(Self { x, y, hidden })
    }
}

/// Planet y in a face-on view of the orbit
///
/// Seen face-on, the orbit crosses `x = 0` twice. The planet sits at the
/// crossing with `y <= 0`. The search repeatedly takes the samples with the
/// smallest `|x|`; if the first of them has `y > 0` all of them are excluded
/// and the search continues. NaN samples never match.
///
/// Fails with [`ViewError::DegenerateOrbit`] when every sample is excluded.
pub fn face_on_planet_y(x: &Array1<f64>, y: &Array1<f64>) -> Result<f64> {
    ensure_len("y", x.len(), y.len())?;
    let mut excluded = vec![false; x.len()];
    let mut rounds = 0usize;

    loop {
        let closest = x
            .iter()
            .enumerate()
            .filter(|&(i, v)| !excluded[i] && !v.is_nan())
            .map(|(_, v)| v.abs())
            .fold(f64::INFINITY, f64::min);
        if closest == f64::INFINITY {
            return Err(ViewError::DegenerateOrbit(format!(
                "no sample with y <= 0 near x = 0 after {} eliminations",
                rounds
            )));
        }

        let ties: Vec<usize> = (0..x.len())
            .filter(|&i| !excluded[i] && x[i].abs() == closest)
            .collect();
        let candidate = y[ties[0]];
        if candidate <= 0.0 {
            if rounds > 0 {
                debug!(
                    "Face-on search eliminated {} crossing(s) before y = {}",
                    rounds, candidate
                );
            }
            return Ok(candidate);
        }

        trace!(
            "Face-on search excludes {} sample(s) at |x| = {}",
            ties.len(),
            closest
        );
        for i in ties {
            excluded[i] = true;
        }
        rounds += 1;
    }
}

/// One dot of the trail drawn behind the planet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailDot {
    /// Sample index the dot is drawn at
    pub index: usize,
    /// Dot center x
    pub x: f64,
    /// Dot center y
    pub y: f64,
    /// Layer relative to the planet and the star
    pub layer: TrailLayer,
    /// Opacity, growing toward the planet
    pub alpha: f64,
}

/// Trail of dots at the `ndots` samples preceding `current`
///
/// The trajectory must span exactly one orbit: indices before the first
/// sample wrap around to the end. Dots within `0.95 * planet_radius` of the
/// planet (3D distance) and dots with NaN positions are left out. The dot at
/// offset `k` from the start of the window has opacity
/// `max_alpha * (k / ndots)^2`.
pub fn trail_dots(
    trajectory: &Trajectory,
    current: usize,
    ndots: usize,
    planet_radius: f64,
    max_alpha: f64,
) -> Result<Vec<TrailDot>> {
    trajectory.check_index(current)?;
    let n = trajectory.len();
    if ndots > n {
        return Err(ViewError::InvalidParameter(format!(
            "trail of {} dots is longer than the {}-sample orbit",
            ndots, n
        )));
    }

    let planet = trajectory.position(current)?;
    let exclusion = TRAIL_EXCLUSION_FACTOR * planet_radius;
    let mut dots = Vec::with_capacity(ndots);

    for k in 0..ndots {
        let offset = current as isize - ndots as isize + k as isize;
        let index = offset.rem_euclid(n as isize) as usize;
        let position = trajectory.position(index)?;
        if !(position.x.is_finite() && position.y.is_finite() && position.z.is_finite()) {
            continue;
        }
        if nalgebra::distance(&position, &planet) <= exclusion {
            continue;
        }
        let fraction = k as f64 / ndots as f64;
        dots.push(TrailDot {
            index,
            x: position.x,
            y: position.y,
            layer: z_order_for(planet.z, position.z, position.z < 0.0),
            alpha: max_alpha * fraction * fraction,
        });
    }

    Ok(dots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::PI;

    #[test]
    fn test_nearest_phase_index() {
        let m = Array1::from(vec![0.0, PI / 2.0, PI, 3.0 * PI / 2.0]);
        assert_eq!(nearest_phase_index(&m, PI).unwrap(), 2);
        assert_eq!(nearest_phase_index(&m, 0.1).unwrap(), 0);
    }

    #[test]
    fn test_nearest_phase_index_wraps_negative() {
        // -pi/2 wraps to 3pi/2
        let m = Array1::from(vec![-PI / 2.0, 0.0, PI / 2.0]);
        assert_eq!(nearest_phase_index(&m, 3.0 * PI / 2.0).unwrap(), 0);
    }

    #[test]
    fn test_nearest_phase_index_ties() {
        let m = Array1::from(vec![1.0, 3.0, 1.0, 3.0]);
        assert_eq!(nearest_phase_index(&m, 2.0).unwrap(), 0);
        assert_eq!(nearest_phase_index(&m, 3.0).unwrap(), 1);
    }

    #[test]
    fn test_nearest_phase_index_errors() {
        assert!(matches!(
            nearest_phase_index(&Array1::zeros(0), 1.0),
            Err(ViewError::EmptyInput(_))
        ));
        let m = Array1::from(vec![f64::NAN, f64::NAN]);
        assert!(matches!(
            nearest_phase_index(&m, 1.0),
            Err(ViewError::DegenerateOrbit(_))
        ));
        let m = Array1::from(vec![0.0]);
        assert!(nearest_phase_index(&m, f64::NAN).is_err());
    }

    #[rstest]
    #[case(0.0, -1.0, true, 3)]
    #[case(0.0, -0.5, false, 1)]
    #[case(-2.0, -1.0, true, -1)]
    #[case(0.0, 1.0, false, -3)]
    #[case(0.0, 0.0, false, -3)]
    fn test_z_order_table(
        #[case] z_self: f64,
        #[case] z_other: f64,
        #[case] in_front: bool,
        #[case] expected: i8,
    ) {
        assert_eq!(z_order_for(z_self, z_other, in_front).code(), expected);
    }

    #[test]
    fn test_star_layer() {
        assert_eq!(StarLayer::for_planet_depth(-3.0).code(), -2);
        assert_eq!(StarLayer::for_planet_depth(0.0).code(), 2);
        assert_eq!(StarLayer::for_planet_depth(4.0), StarLayer::AbovePlanet);
    }

    #[rstest]
    #[case(0.0, 0.0, 1.0, true)]
    #[case(2.0, 0.0, 1.0, false)]
    #[case(0.0, 0.0, -1.0, false)]
    #[case(0.6, 0.6, 2.0, true)]
    #[case(1.0, 0.0, 2.0, false)]
    #[case(0.5, 0.0, 0.0, false)]
    fn test_is_hidden(#[case] x: f64, #[case] y: f64, #[case] z: f64, #[case] hidden: bool) {
        assert_eq!(is_hidden(x, y, z), hidden);
    }

    #[test]
    fn test_masks() {
        let x = Array1::from(vec![0.0, 2.0, 0.0]);
        let y = Array1::from(vec![0.0, 0.0, 0.0]);
        let z = Array1::from(vec![1.0, 1.0, -1.0]);
        let hidden = hidden_mask(&x, &y, &z).unwrap();
        assert_eq!(hidden.to_vec(), vec![true, false, false]);
        let visible = visibility_mask(&x, &y, &z).unwrap();
        assert_eq!(visible.to_vec(), vec![false, true, true]);

        let short = Array1::from(vec![0.0]);
        assert!(hidden_mask(&x, &short, &z).is_err());
    }

    #[test]
    fn test_masked_track_leaves_trajectory_intact() {
        let trajectory = Trajectory::from_vecs(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 2.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![1.0, 1.0, -1.0],
            vec![0.0, 1.0, 2.0],
            vec![1.0, 1.0, 0.99],
        )
        .unwrap();
        let track = MaskedTrack::from_trajectory(&trajectory).unwrap();
        assert!(track.x[0].is_nan());
        assert!(track.y[0].is_nan());
        assert_eq!(track.x[1], 2.0);
        assert_eq!(track.x[2], 0.0);
        assert_eq!(trajectory.x[0], 0.0);
    }

    #[test]
    fn test_face_on_planet_y() {
        let x = Array1::from(vec![0.01, -0.01, 0.0, 0.0]);
        let y = Array1::from(vec![1.0, 1.0, -1.0, 2.0]);
        assert_eq!(face_on_planet_y(&x, &y).unwrap(), -1.0);
    }

    #[test]
    fn test_face_on_planet_y_eliminates_far_crossing() {
        // Closest crossing is on the far side (y > 0) and must be skipped
        let x = Array1::from(vec![0.0, 0.3, -0.02, 0.02, f64::NAN]);
        let y = Array1::from(vec![5.0, -4.0, -5.0, 5.0, -1.0]);
        assert_eq!(face_on_planet_y(&x, &y).unwrap(), -5.0);
        // Input is not modified
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn test_face_on_planet_y_tie_group_eliminated_together() {
        let x = Array1::from(vec![0.0, 0.0, 0.5]);
        let y = Array1::from(vec![1.0, -1.0, -2.0]);
        // Both x = 0 samples go when the first of them is on the far side
        assert_eq!(face_on_planet_y(&x, &y).unwrap(), -2.0);
    }

    #[test]
    fn test_face_on_planet_y_degenerate() {
        let x = Array1::from(vec![f64::NAN, f64::NAN]);
        let y = Array1::from(vec![-1.0, -1.0]);
        assert!(matches!(
            face_on_planet_y(&x, &y),
            Err(ViewError::DegenerateOrbit(_))
        ));

        let x = Array1::from(vec![0.0, 0.1]);
        let y = Array1::from(vec![1.0, 2.0]);
        assert!(matches!(
            face_on_planet_y(&x, &y),
            Err(ViewError::DegenerateOrbit(_))
        ));
    }

    fn circular_orbit(n: usize, radius: f64) -> Trajectory {
        let phases: Vec<f64> = (0..n).map(|i| TAU * i as f64 / n as f64).collect();
        Trajectory::from_vecs(
            phases.iter().map(|p| p / TAU).collect(),
            phases.iter().map(|p| radius * p.sin()).collect(),
            vec![0.0; n],
            phases.iter().map(|p| -radius * p.cos()).collect(),
            phases.clone(),
            vec![1.0; n],
        )
        .unwrap()
    }

    #[test]
    fn test_classify() {
        let trajectory = circular_orbit(8, 3.0);
        // Sample 0 is in front of the star, sample 4 directly behind it
        let sample = classify(&trajectory, 0, 4).unwrap();
        assert_eq!(sample.layer, TrailLayer::BehindPlanetAndStar);
        assert!(!sample.visible);

        let sample = classify(&trajectory, 4, 0).unwrap();
        assert_eq!(sample.layer, TrailLayer::FrontOfPlanetAndStar);
        assert!(sample.visible);

        assert!(classify(&trajectory, 0, 8).is_err());
    }

    #[test]
    fn test_trail_dots_wrap_and_fade() {
        let trajectory = circular_orbit(8, 3.0);
        let dots = trail_dots(&trajectory, 1, 4, 0.1, 0.2).unwrap();

        let indices: Vec<usize> = dots.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![5, 6, 7, 0]);
        assert_eq!(dots[0].alpha, 0.0);
        assert_relative_eq!(dots[2].alpha, 0.2 * 0.25, epsilon = 1e-15);
        assert_relative_eq!(dots[3].alpha, 0.2 * 0.5625, epsilon = 1e-15);

        // Sample 5 is behind the star, the planet at sample 1 is in front
        assert_eq!(dots[0].layer, TrailLayer::BehindPlanetAndStar);
        // Sample 0 sits at z = -3, in front of the planet at z = -3 cos(pi/4)
        assert_eq!(dots[3].layer, TrailLayer::FrontOfPlanetAndStar);
    }

    #[test]
    fn test_trail_dots_skip_inside_planet() {
        let trajectory = circular_orbit(400, 3.0);
        // Neighbouring samples are ~0.047 apart; four back is ~0.19, inside 0.95 * 0.25
        let dots = trail_dots(&trajectory, 200, 4, 0.25, 0.2).unwrap();
        assert!(dots.is_empty());

        let dots = trail_dots(&trajectory, 200, 4, 0.01, 0.2).unwrap();
        assert_eq!(dots.len(), 4);
    }

    #[test]
    fn test_trail_dots_errors() {
        let trajectory = circular_orbit(8, 3.0);
        assert!(matches!(
            trail_dots(&trajectory, 8, 2, 0.1, 0.2),
            Err(ViewError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            trail_dots(&trajectory, 0, 9, 0.1, 0.2),
            Err(ViewError::InvalidParameter(_))
        ));
        assert!(trail_dots(&trajectory, 0, 0, 0.1, 0.2).unwrap().is_empty());
    }

    #[test]
    fn test_repeat_queries_bit_identical() {
        let n = 301;
        let phases: Vec<f64> = (0..n).map(|i| TAU * i as f64 / n as f64).collect();
        let x: Array1<f64> = phases.iter().map(|p| 4.0 * p.sin()).collect();
        let y: Array1<f64> = phases.iter().map(|p| -4.0 * p.cos()).collect();
        let x_before = x.clone();

        let first = face_on_planet_y(&x, &y).unwrap();
        let second = face_on_planet_y(&x, &y).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(first, -4.0);
        assert_eq!(x, x_before);

        let trajectory = circular_orbit(64, 0.5);
        let masks: Vec<Array1<bool>> = (0..3)
            .map(|_| hidden_mask(&trajectory.x, &trajectory.y, &trajectory.z).unwrap())
            .collect();
        assert_eq!(masks[0], masks[1]);
        assert_eq!(masks[1], masks[2]);
        assert!(masks[0].iter().any(|&h| h));
    }
}
