//! Composition of renderer-ready frame geometry
//!
//! A renderer draws a transit from the quantities computed here: where the
//! planet is, how the star is shaded and layered against it, which trail dots
//! to draw, and the folded light curve laid under the sky view. Nothing here
//! touches pixels.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::FrameConfig;
use crate::errors::{Result, ViewError};
use crate::lightcurve::{
    display_window, fold_into, trail_markers, FoldedLightCurve, LightCurveMarker,
    LightCurveWindow,
};
use crate::limbdark::{LimbDarkening, RadialProfile, StarRing};
use crate::occlusion::{
    face_on_planet_y, nearest_phase_index, trail_dots, MaskedTrack, StarLayer, TrailDot,
};
use crate::scene::{
    frame_bounds, full_orbit_bounds, orbit_line_width, sky_extent, top_view_bounds,
    AnimationSchedule, ViewBounds,
};
use crate::trajectory::{TransitOutcome, Trajectory};

/// The face-on inset shades the star with every 10th ring
const TOP_VIEW_RING_STRIDE: usize = 10;

/// Physical parameters of the star-planet system needed for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitSystem {
    /// Stellar limb darkening
    pub limb_darkening: LimbDarkening,
    /// Planet radius in stellar radii
    pub planet_radius: f64,
    /// Orbital period in days
    pub period: f64,
    /// Time of transit center in days
    #[serde(default)]
    pub t0: f64,
}

impl TransitSystem {
    /// Create a system with transit center at `t0 = 0`
    pub fn new(limb_darkening: LimbDarkening, planet_radius: f64, period: f64) -> Result<Self> {
        let system = Self {
            limb_darkening,
            planet_radius,
            period,
            t0: 0.0,
        };
        system.validate()?;
        Ok(system)
    }

    /// Set the time of transit center
    pub fn with_t0(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    /// Check the planet radius and the period
    pub fn validate(&self) -> Result<()> {
        if !(self.planet_radius > 0.0 && self.planet_radius < 1.0) {
            return Err(ViewError::InvalidParameter(format!(
                "planet radius must lie in (0, 1) stellar radii, got {}",
                self.planet_radius
            )));
        }
        if !(self.period.is_finite() && self.period > 0.0) {
            return Err(ViewError::InvalidParameter(format!(
                "period must be positive, got {}",
                self.period
            )));
        }
        Ok(())
    }
}

/// Trail dots and their common radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailOverlay {
    /// Dot radius in stellar radii
    pub dot_radius: f64,
    /// Dots, oldest first
    pub dots: Vec<TrailDot>,
}

/// Folded light curve aligned under the sky view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurveOverlay {
    /// Curve with its phase axis spanning the frame's horizontal limits
    pub curve: FoldedLightCurve,
    /// Passed samples to mark, the newest highlighted
    pub markers: Vec<LightCurveMarker>,
    /// Vertical limits of the light-curve panel
    pub flux_limits: Option<(f64, f64)>,
}

/// Everything needed to draw one frame of the sky view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Sample drawn in this frame
    pub index: usize,
    /// Requested mean anomaly
    pub mean_anomaly: f64,
    /// Central longitude of the planet's surface map in degrees
    pub longitude: f64,
    /// Planet center `[x, y, z]` in stellar radii
    pub planet: [f64; 3],
    /// Planet radius in stellar radii
    pub planet_radius: f64,
    /// Draw order of the star against the planet
    pub star_layer: StarLayer,
    /// Shaded star, limb first
    pub star_rings: Vec<StarRing>,
    /// Plot limits
    pub bounds: ViewBounds,
    /// Trail behind the planet, when enabled
    pub trail: Option<TrailOverlay>,
    /// Light curve panel, when enabled
    pub lightcurve: Option<LightCurveOverlay>,
}

/// Compose the frame showing the planet nearest to `mean_anomaly`
///
/// The trajectory should span exactly one orbit for trails to wrap correctly.
pub fn compose_frame(
    trajectory: &Trajectory,
    system: &TransitSystem,
    mean_anomaly: f64,
    config: &FrameConfig,
) -> Result<FrameGeometry> {
    let profile = system.limb_darkening.profile(config.profile_points)?;
    compose_with_profile(trajectory, system, mean_anomaly, 0.0, &profile, config)
}

fn compose_with_profile(
    trajectory: &Trajectory,
    system: &TransitSystem,
    mean_anomaly: f64,
    longitude: f64,
    profile: &RadialProfile,
    config: &FrameConfig,
) -> Result<FrameGeometry> {
    let index = nearest_phase_index(&trajectory.mean_anomaly, mean_anomaly)?;
    let planet = trajectory.position(index)?;
    trace!(
        "Frame at M = {:.4} uses sample {} at ({:.3}, {:.3}, {:.3})",
        mean_anomaly,
        index,
        planet.x,
        planet.y,
        planet.z
    );

    let bounds = if config.full_orbit_view() {
        full_orbit_bounds(
            &trajectory.x,
            &trajectory.y,
            system.planet_radius,
            config.fixed_limits,
        )?
    } else {
        frame_bounds(
            planet.x,
            planet.y,
            system.planet_radius,
            config.view_padding_radii,
            config.fixed_limits,
        )
    };

    let trail = if config.trail {
        let ndots = config.trail_dots.unwrap_or(trajectory.len() / 2);
        Some(TrailOverlay {
            dot_radius: config.trail_dot_radius,
            dots: trail_dots(
                trajectory,
                index,
                ndots,
                system.planet_radius,
                config.trail_max_alpha,
            )?,
        })
    } else {
        None
    };

    let lightcurve = if config.lightcurve {
        let curve = fold_into(
            &trajectory.time,
            &trajectory.flux,
            system.period,
            bounds.xmin,
            bounds.xmax,
        )?;
        let flux_limits = curve.flux_limits();
        Some(LightCurveOverlay {
            curve: curve.with_wrap_break(),
            markers: trail_markers(index, config.lightcurve_window)?,
            flux_limits,
        })
    } else {
        None
    };

    Ok(FrameGeometry {
        index,
        mean_anomaly,
        longitude,
        planet: [planet.x, planet.y, planet.z],
        planet_radius: system.planet_radius,
        star_layer: StarLayer::for_planet_depth(planet.z),
        star_rings: profile.rings(config.star_lightness, 1),
        bounds,
        trail,
        lightcurve,
    })
}

/// Compose every frame of an animation
///
/// The limb darkening profile is computed once and shared by all frames.
pub fn compose_animation(
    trajectory: &Trajectory,
    system: &TransitSystem,
    schedule: &AnimationSchedule,
    config: &FrameConfig,
) -> Result<Vec<FrameGeometry>> {
    let profile = system.limb_darkening.profile(config.profile_points)?;
    let frames = schedule
        .frames()
        .map(|frame| {
            compose_with_profile(
                trajectory,
                system,
                frame.mean_anomaly,
                frame.longitude,
                &profile,
                config,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("Composed {} animation frames", frames.len());
    Ok(frames)
}

/// Face-on inset of the orbit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopView {
    /// Inset limits
    pub bounds: ViewBounds,
    /// Planet y on the face-on orbit (x = 0)
    pub planet_y: f64,
    /// Coarsely shaded star, limb first
    pub star_rings: Vec<StarRing>,
}

/// Everything needed to draw the transit summary figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewGeometry {
    /// Transit light curve framing; `None` when the planet does not transit
    pub lightcurve: Option<LightCurveWindow>,
    /// Sky track with samples behind the star blanked
    pub track: MaskedTrack,
    /// Width of the orbit line
    pub orbit_line_width: f64,
    /// Sky plot `(half_width, half_height)`
    pub sky_extent: (f64, f64),
    /// Planet y where the sky track crosses x = 0 in front of the star
    pub planet_y: f64,
    /// Planet radius in stellar radii
    pub planet_radius: f64,
    /// Limb darkening curve for the inset
    pub profile: RadialProfile,
    /// Shaded star, limb first
    pub star_rings: Vec<StarRing>,
    /// Face-on inset
    pub top_view: TopView,
}

/// Compose the summary figure of a transit
///
/// `transit` holds the in-transit light curve, `orbit` one full orbit at the
/// true inclination, and `face_on` the same orbit seen face-on. Both tracks
/// must cross `x = 0` at some `y <= 0` in front of the star, otherwise the
/// planet cannot be placed and [`ViewError::DegenerateOrbit`] is returned.
pub fn compose_overview(
    transit: &TransitOutcome,
    orbit: &Trajectory,
    face_on: &Trajectory,
    system: &TransitSystem,
    config: &FrameConfig,
) -> Result<OverviewGeometry> {
    let lightcurve = match transit {
        TransitOutcome::Transit(samples) => {
            Some(display_window(&samples.time, &samples.flux, system.t0)?)
        }
        TransitOutcome::NoTransit => {
            debug!("No transit: overview omits the light curve window");
            None
        }
    };

    let profile = system.limb_darkening.profile(config.profile_points)?;
    let track = MaskedTrack::from_trajectory(orbit)?;
    let planet_y = face_on_planet_y(&track.x, &track.y)?;

    let top_view = TopView {
        bounds: top_view_bounds(&face_on.x, &face_on.y)?,
        planet_y: face_on_planet_y(&face_on.x, &face_on.y)?,
        star_rings: profile.rings(config.star_lightness, TOP_VIEW_RING_STRIDE),
    };

    Ok(OverviewGeometry {
        lightcurve,
        sky_extent: sky_extent(&track.x)?,
        orbit_line_width: orbit_line_width(system.period),
        planet_y,
        planet_radius: system.planet_radius,
        star_rings: profile.rings(config.star_lightness, 1),
        profile,
        track,
        top_view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TAU;
    use crate::occlusion::TrailLayer;
    use crate::scene::FixedLimits;
    use approx::assert_abs_diff_eq;

    /// Circular edge-on orbit of `n` samples starting at transit center
    fn orbit(n: usize, a_rs: f64, period: f64) -> Trajectory {
        let phases: Vec<f64> = (0..n).map(|i| TAU * i as f64 / n as f64).collect();
        let flux = phases
            .iter()
            .map(|p| {
                let x = a_rs * p.sin();
                let z = -a_rs * p.cos();
                if x.abs() < 1.0 && z < 0.0 {
                    0.99
                } else {
                    1.0
                }
            })
            .collect();
        Trajectory::from_vecs(
            phases.iter().map(|p| period * p / TAU).collect(),
            phases.iter().map(|p| a_rs * p.sin()).collect(),
            vec![-0.2; n],
            phases.iter().map(|p| -a_rs * p.cos()).collect(),
            phases.clone(),
            flux,
        )
        .unwrap()
    }

    fn system() -> TransitSystem {
        TransitSystem::new(LimbDarkening::default(), 0.1, 3.0).unwrap()
    }

    #[test]
    fn test_system_validation() {
        assert!(TransitSystem::new(LimbDarkening::default(), 1.2, 3.0).is_err());
        assert!(TransitSystem::new(LimbDarkening::default(), 0.1, -1.0).is_err());
        assert_eq!(system().with_t0(2.5).t0, 2.5);
    }

    #[test]
    fn test_compose_frame_in_transit() {
        let trajectory = orbit(100, 5.0, 3.0);
        let frame = compose_frame(&trajectory, &system(), 0.0, &FrameConfig::default()).unwrap();

        assert_eq!(frame.index, 0);
        assert_eq!(frame.star_layer, StarLayer::BelowPlanet);
        assert_abs_diff_eq!(frame.planet[2], -5.0, epsilon = 1e-12);
        assert_eq!(frame.star_rings.len(), 100);
        assert!(frame.trail.is_none());
        assert!(frame.lightcurve.is_none());
        // Full-orbit framing: x spans +-5 plus half a stellar radius of margin
        assert_abs_diff_eq!(frame.bounds.xmax, 5.5, epsilon = 1e-9);
    }

    #[test]
    fn test_compose_frame_behind_star() {
        let trajectory = orbit(100, 5.0, 3.0);
        let config = FrameConfig::default().with_follow_planet(true);
        let frame = compose_frame(&trajectory, &system(), std::f64::consts::PI, &config).unwrap();

        assert_eq!(frame.index, 50);
        assert_eq!(frame.star_layer, StarLayer::AbovePlanet);
        assert_eq!(frame.bounds, ViewBounds::new(-2.5, 2.5, -2.0, 2.0));
    }

    #[test]
    fn test_compose_frame_full_orbit_keeps_fixed_axis() {
        let trajectory = orbit(100, 5.0, 3.0);
        let config = FrameConfig::default().with_fixed_limits(FixedLimits {
            x: Some((-10.0, 10.0)),
            y: None,
        });
        assert!(config.full_orbit_view());
        let frame = compose_frame(&trajectory, &system(), 0.0, &config).unwrap();

        assert_eq!((frame.bounds.xmin, frame.bounds.xmax), (-10.0, 10.0));
        assert_eq!((frame.bounds.ymin, frame.bounds.ymax), (-2.0, 2.0));
    }

    #[test]
    fn test_compose_frame_with_trail_and_lightcurve() {
        let trajectory = orbit(200, 5.0, 3.0);
        let config = FrameConfig::default()
            .with_trail(true)
            .with_lightcurve(true)
            .with_lightcurve_window(20);
        let frame = compose_frame(&trajectory, &system(), 1.0, &config).unwrap();

        let trail = frame.trail.unwrap();
        assert!(!trail.dots.is_empty());
        assert!(trail.dots.len() <= 100);
        assert!(trail
            .dots
            .iter()
            .all(|d| d.alpha >= 0.0 && d.alpha < config.trail_max_alpha));
        assert!(trail
            .dots
            .iter()
            .any(|d| d.layer == TrailLayer::BehindPlanetAndStar));

        let lc = frame.lightcurve.unwrap();
        assert_eq!(lc.curve.len(), 200);
        let finite: Vec<f64> = lc.curve.phase.iter().copied().filter(|p| !p.is_nan()).collect();
        assert_eq!(finite.len(), 199);
        for p in finite {
            assert!(p >= frame.bounds.xmin - 1e-9 && p <= frame.bounds.xmax + 1e-9);
        }
        let last = lc.markers.last().unwrap();
        assert!(last.highlighted);
        assert_eq!(last.index + 1, frame.index);
        let (lo, hi) = lc.flux_limits.unwrap();
        assert!(lo < 0.99 && hi > 1.0);
    }

    #[test]
    fn test_compose_frame_nonlinear_fails() {
        let trajectory = orbit(10, 5.0, 3.0);
        let system = TransitSystem::new(LimbDarkening::Nonlinear, 0.1, 3.0).unwrap();
        assert!(matches!(
            compose_frame(&trajectory, &system, 0.0, &FrameConfig::default()),
            Err(ViewError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_compose_animation() {
        let trajectory = orbit(120, 5.0, 3.0);
        let schedule = AnimationSchedule::new(12, 2.0).unwrap();
        let frames =
            compose_animation(&trajectory, &system(), &schedule, &FrameConfig::default()).unwrap();

        assert_eq!(frames.len(), 12);
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..12).map(|k| k * 10).collect::<Vec<_>>());
        assert_eq!(frames[0].longitude, -180.0);
        assert_eq!(frames[3].longitude, schedule.longitude[3]);
    }

    #[test]
    fn test_compose_overview() {
        let orbit_samples = orbit(200, 5.0, 3.0);
        let face_on = Trajectory::from_vecs(
            (0..200).map(|i| i as f64).collect(),
            (0..200).map(|i| 5.0 * (TAU * i as f64 / 200.0).sin()).collect(),
            (0..200).map(|i| -5.0 * (TAU * i as f64 / 200.0).cos()).collect(),
            vec![0.0; 200],
            (0..200).map(|i| TAU * i as f64 / 200.0).collect(),
            vec![1.0; 200],
        )
        .unwrap();
        let transit = TransitOutcome::Transit(orbit_samples.clone());

        let overview = compose_overview(
            &transit,
            &orbit_samples,
            &face_on,
            &system(),
            &FrameConfig::default(),
        )
        .unwrap();

        assert_eq!(overview.planet_y, -0.2);
        assert_abs_diff_eq!(overview.top_view.planet_y, -5.0, epsilon = 1e-12);
        assert_eq!(overview.top_view.star_rings.len(), 10);
        assert_eq!(overview.orbit_line_width, 1.0);
        assert_abs_diff_eq!(overview.sky_extent.0, 5.5, epsilon = 1e-9);
        assert!(overview.track.hidden.iter().any(|&h| h));
        assert!(overview.lightcurve.unwrap().time_limits.is_some());

        let overview = compose_overview(
            &TransitOutcome::NoTransit,
            &orbit_samples,
            &face_on,
            &system(),
            &FrameConfig::default(),
        )
        .unwrap();
        assert!(overview.lightcurve.is_none());
    }
}
