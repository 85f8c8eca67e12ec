//! Constants module for transit visualization geometry

use std::f64::consts::PI;

// Angles
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;

// Star frame
/// Stellar radius in the sky-projected frame (all lengths are in stellar radii)
pub const STAR_RADIUS: f64 = 1.0;

// Trails
/// Trail dots closer than this fraction of the planet radius are not drawn
pub const TRAIL_EXCLUSION_FACTOR: f64 = 0.95;
/// Opacity of the most recent trail dot
pub const TRAIL_MAX_ALPHA: f64 = 0.2;
/// Radius of a trail dot in stellar radii
pub const TRAIL_DOT_RADIUS: f64 = 0.05;

// Light curve inset
/// Opacity ceiling for recently passed light-curve samples
pub const LIGHTCURVE_TRAIL_MAX_WEIGHT: f64 = 0.1;
/// Default number of light-curve samples that fade in behind the current one
pub const LIGHTCURVE_TRAIL_WINDOW: usize = 500;
/// Flux below `1 - FLUX_BASELINE_TOL` counts as in transit
pub const FLUX_BASELINE_TOL: f64 = 1.0e-8;
/// Time offset (days) of the unit-flux baseline samples added around a transit
pub const FLUX_BASELINE_PAD: f64 = 1.0e5;

// Shading and framing
/// Lightness of the star center relative to pure white
pub const STAR_LIGHTNESS: f64 = 0.95;
/// Default radial samples for limb darkening profiles
pub const DEFAULT_PROFILE_POINTS: usize = 100;
/// Fractional padding added to plotted ranges
pub const RANGE_PADDING: f64 = 0.1;
/// Smallest half-width of a frame, in stellar radii
pub const MIN_HALF_WIDTH: f64 = 2.5;
/// Smallest half-height of a frame, in stellar radii
pub const MIN_HALF_HEIGHT: f64 = 2.0;
/// Planet radii of margin kept around the planet in a frame
pub const VIEW_PADDING_RADII: f64 = 5.0;
/// Sky plot half-width as a multiple of the orbit extent
pub const SKY_WIDTH_FACTOR: f64 = 1.1;
/// Sky plot aspect ratio (width over height)
pub const SKY_ASPECT: f64 = 3.2;

// Orbit line
/// Periods (days) below this are drawn with a full-width orbit line
pub const ORBIT_LINE_PERIOD_KNEE: f64 = 30.0;
/// Thinnest orbit line width
pub const ORBIT_LINE_MIN_WIDTH: f64 = 0.3;
