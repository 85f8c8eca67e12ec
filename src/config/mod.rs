//! Frame composition settings

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PROFILE_POINTS, LIGHTCURVE_TRAIL_WINDOW, STAR_LIGHTNESS, TRAIL_DOT_RADIUS,
    TRAIL_MAX_ALPHA, VIEW_PADDING_RADII,
};
use crate::errors::{Result, ViewError};
use crate::scene::FixedLimits;

/// Settings shared by every frame of a rendering
///
/// Missing fields in a JSON document take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Radial samples in limb darkening profiles
    pub profile_points: usize,
    /// Draw a trail of dots behind the planet
    pub trail: bool,
    /// Dots in the trail; `None` uses half the orbit's samples
    pub trail_dots: Option<usize>,
    /// Trail dot radius in stellar radii
    pub trail_dot_radius: f64,
    /// Opacity of the newest trail dot
    pub trail_max_alpha: f64,
    /// Attach a folded light curve to each frame
    pub lightcurve: bool,
    /// Light-curve samples fading in behind the current one
    pub lightcurve_window: usize,
    /// Lightness of the star center
    pub star_lightness: f64,
    /// Frame each view around the planet instead of the whole orbit
    pub follow_planet: bool,
    /// Planet radii of margin around the planet
    pub view_padding_radii: f64,
    /// Caller-chosen plot limits
    pub fixed_limits: FixedLimits,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            profile_points: DEFAULT_PROFILE_POINTS,
            trail: false,
            trail_dots: None,
            trail_dot_radius: TRAIL_DOT_RADIUS,
            trail_max_alpha: TRAIL_MAX_ALPHA,
            lightcurve: false,
            lightcurve_window: LIGHTCURVE_TRAIL_WINDOW,
            star_lightness: STAR_LIGHTNESS,
            follow_planet: false,
            view_padding_radii: VIEW_PADDING_RADII,
            fixed_limits: FixedLimits::default(),
        }
    }
}

impl FrameConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FrameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Enable or disable the trail
    pub fn with_trail(mut self, trail: bool) -> Self {
        self.trail = trail;
        self
    }

    /// Set the number of trail dots
    pub fn with_trail_dots(mut self, dots: usize) -> Self {
        self.trail_dots = Some(dots);
        self
    }

    /// Enable or disable the light curve
    pub fn with_lightcurve(mut self, lightcurve: bool) -> Self {
        self.lightcurve = lightcurve;
        self
    }

    /// Set the light-curve trail window
    pub fn with_lightcurve_window(mut self, window: usize) -> Self {
        self.lightcurve_window = window;
        self
    }

    /// Set the number of radial profile samples
    pub fn with_profile_points(mut self, points: usize) -> Self {
        self.profile_points = points;
        self
    }

    /// Fix the plot limits
    pub fn with_fixed_limits(mut self, limits: FixedLimits) -> Self {
        self.fixed_limits = limits;
        self
    }

    /// Frame each view around the planet
    pub fn with_follow_planet(mut self, follow: bool) -> Self {
        self.follow_planet = follow;
        self
    }

    /// Whether frames show the whole orbit rather than the planet's surroundings
    ///
    /// Fixing both axes implies framing around the planet, with the fixed
    /// limits taking precedence.
    pub fn full_orbit_view(&self) -> bool {
        !(self.follow_planet || self.fixed_limits.is_complete())
    }

    /// Check settings that would make composition fail later
    pub fn validate(&self) -> Result<()> {
        if self.profile_points < 2 {
            return Err(ViewError::InvalidParameter(format!(
                "profile_points must be at least 2, got {}",
                self.profile_points
            )));
        }
        if self.lightcurve_window == 0 {
            return Err(ViewError::InvalidParameter(
                "lightcurve_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.star_lightness) {
            return Err(ViewError::InvalidParameter(format!(
                "star_lightness must lie in [0, 1], got {}",
                self.star_lightness
            )));
        }
        Ok(())
    }
}
