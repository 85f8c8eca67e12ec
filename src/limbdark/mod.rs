//! Limb darkening intensity model
//!
//! The stellar surface brightness is described by a quadratic law in
//! `mu = sqrt(1 - r^2)`, normalized so the disk-integrated flux is unity:
//!
//! ```text
//! I(r) = (1 - u1 (1 - mu) - u2 (1 - mu)^2) / (1 - u1/3 - u2/6) / pi
//! ```
//!
//! Coefficients may be given directly (`Quadratic`) or through the
//! Kipping (2013) triangular sampling parametrization (`Kipping`), which maps
//! the unit square `(q1, q2)` onto the physically allowed `(u1, u2)` region.
//!
//! ## Examples
//!
//! ```rust
//! use syzygy_view::limbdark::LimbDarkening;
//!
//! let ld = LimbDarkening::Quadratic { u1: 0.0, u2: 0.0 };
//! let i = ld.intensity(1.0).unwrap();
//! assert_eq!(i, 1.0 / std::f64::consts::PI);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PROFILE_POINTS, STAR_LIGHTNESS};
use crate::errors::{Result, ViewError};

/// Tag naming a limb darkening law, without coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimbDarkModel {
    Quadratic,
    Kipping,
    Nonlinear,
}

impl LimbDarkModel {
    /// Get the model's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            LimbDarkModel::Quadratic => "quadratic",
            LimbDarkModel::Kipping => "kipping",
            LimbDarkModel::Nonlinear => "nonlinear",
        }
    }
}

impl fmt::Display for LimbDarkModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LimbDarkModel {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quadratic" => Ok(LimbDarkModel::Quadratic),
            "kipping" => Ok(LimbDarkModel::Kipping),
            "nonlinear" => Ok(LimbDarkModel::Nonlinear),
            other => Err(ViewError::InvalidModel(other.to_string())),
        }
    }
}

/// Limb darkening law together with its coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum LimbDarkening {
    /// Quadratic law with coefficients `u1`, `u2`
    Quadratic { u1: f64, u2: f64 },
    /// Quadratic law reparametrized by `q1`, `q2` in `[0, 1]`
    Kipping { q1: f64, q2: f64 },
    /// Four-coefficient nonlinear law (no intensity formula yet)
    Nonlinear,
}

impl LimbDarkening {
    /// Build a law from a model tag and its two coefficients
    ///
    /// The coefficients are `(u1, u2)` for the quadratic law and `(q1, q2)`
    /// for the Kipping law; they are ignored for the nonlinear law.
    pub fn from_model(model: LimbDarkModel, a: f64, b: f64) -> Self {
        match model {
            LimbDarkModel::Quadratic => LimbDarkening::Quadratic { u1: a, u2: b },
            LimbDarkModel::Kipping => LimbDarkening::Kipping { q1: a, q2: b },
            LimbDarkModel::Nonlinear => LimbDarkening::Nonlinear,
        }
    }

    /// The tag of this law
    pub fn model(&self) -> LimbDarkModel {
        match self {
            LimbDarkening::Quadratic { .. } => LimbDarkModel::Quadratic,
            LimbDarkening::Kipping { .. } => LimbDarkModel::Kipping,
            LimbDarkening::Nonlinear => LimbDarkModel::Nonlinear,
        }
    }

    /// Equivalent quadratic coefficients `(u1, u2)`
    pub fn quadratic_coefficients(&self) -> Result<(f64, f64)> {
        match *self {
            LimbDarkening::Quadratic { u1, u2 } => {
                if u1.is_nan() || u2.is_nan() {
                    return Err(ViewError::Domain(format!(
                        "quadratic coefficients must be numbers, got u1={}, u2={}",
                        u1, u2
                    )));
                }
                Ok((u1, u2))
            }
            LimbDarkening::Kipping { q1, q2 } => {
                // NaN fails both range checks
                if !(0.0..=1.0).contains(&q1) || !(0.0..=1.0).contains(&q2) {
                    return Err(ViewError::Domain(format!(
                        "Kipping coefficients must lie in [0, 1], got q1={}, q2={}",
                        q1, q2
                    )));
                }
                Ok(quadratic_from_kipping(q1, q2))
            }
            LimbDarkening::Nonlinear => Err(ViewError::NotImplemented(
                "nonlinear limb darkening".to_string(),
            )),
        }
    }

    /// Disk normalization `1 - u1/3 - u2/6`, rejected when zero
    pub fn normalization(&self) -> Result<f64> {
        let (u1, u2) = self.quadratic_coefficients()?;
        let norm = 1.0 - u1 / 3.0 - u2 / 6.0;
        if norm == 0.0 {
            return Err(ViewError::Domain(format!(
                "normalization 1 - u1/3 - u2/6 vanishes for u1={}, u2={}",
                u1, u2
            )));
        }
        Ok(norm)
    }

    /// Surface intensity at projected radius `r` (stellar radii)
    ///
    /// Fails with [`ViewError::Domain`] when `r` lies outside `[0, 1]`.
    pub fn intensity(&self, r: f64) -> Result<f64> {
        let (u1, u2) = self.quadratic_coefficients()?;
        let norm = self.normalization()?;
        check_radius(r)?;
        Ok(quadratic_law(r, u1, u2, norm))
    }

    /// Surface intensity at every radius in `radii`
    ///
    /// Coefficients and normalization are resolved once for the whole batch.
    pub fn intensities(&self, radii: &Array1<f64>) -> Result<Array1<f64>> {
        let (u1, u2) = self.quadratic_coefficients()?;
        let norm = self.normalization()?;
        for &r in radii.iter() {
            check_radius(r)?;
        }
        Ok(radii.mapv(|r| quadratic_law(r, u1, u2, norm)))
    }

    /// Intensity relative to the disk center, `I(r) / I(0)`, on `n` radii
    /// evenly spaced from 0 to 1
    pub fn profile(&self, n: usize) -> Result<RadialProfile> {
        if n < 2 {
            return Err(ViewError::InvalidParameter(format!(
                "a radial profile needs at least 2 points, got {}",
                n
            )));
        }
        // k / (n - 1) keeps the last radius exactly on the limb
        let last = (n - 1) as f64;
        let radius: Array1<f64> = (0..n).map(|k| k as f64 / last).collect();
        let intensity = self.intensities(&radius)?;
        let center = intensity[0];
        if center == 0.0 {
            return Err(ViewError::Domain(
                "central intensity is zero; relative profile undefined".to_string(),
            ));
        }
        let relative = intensity / center;
        Ok(RadialProfile { radius, relative })
    }

    /// Profile on the default number of radii
    pub fn default_profile(&self) -> Result<RadialProfile> {
        self.profile(DEFAULT_PROFILE_POINTS)
    }
}

impl Default for LimbDarkening {
    fn default() -> Self {
        LimbDarkening::Quadratic { u1: 0.40, u2: 0.26 }
    }
}

/// Convert Kipping `(q1, q2)` to quadratic `(u1, u2)`
pub fn quadratic_from_kipping(q1: f64, q2: f64) -> (f64, f64) {
    let a = q1.sqrt();
    let b = 2.0 * q2;
    (a * b, a * (1.0 - b))
}

/// Convert quadratic `(u1, u2)` to Kipping `(q1, q2)`
///
/// `q2` is taken as zero when `u1 + u2 == 0`, where it is unconstrained.
pub fn kipping_from_quadratic(u1: f64, u2: f64) -> (f64, f64) {
    let sum = u1 + u2;
    let q1 = sum * sum;
    let q2 = if sum == 0.0 { 0.0 } else { u1 / (2.0 * sum) };
    (q1, q2)
}

fn check_radius(r: f64) -> Result<()> {
    if (0.0..=1.0).contains(&r) {
        Ok(())
    } else {
        Err(ViewError::Domain(format!(
            "radius {} lies outside the stellar disk [0, 1]",
            r
        )))
    }
}

fn quadratic_law(r: f64, u1: f64, u2: f64, norm: f64) -> f64 {
    let one_minus_mu = 1.0 - (1.0 - r * r).sqrt();
    (1.0 - u1 * one_minus_mu - u2 * one_minus_mu * one_minus_mu) / norm / PI
}

/// Limb darkening curve `I(r)/I(0)` sampled on a radial grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialProfile {
    /// Projected radii from 0 (center) to 1 (limb)
    pub radius: Array1<f64>,
    /// Intensity relative to the center at each radius
    pub relative: Array1<f64>,
}

/// One filled circle of a shaded stellar disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarRing {
    /// Ring radius in stellar radii
    pub radius: f64,
    /// Gray level, 0 = black, 1 = white
    pub level: f64,
}

impl RadialProfile {
    /// Number of radial samples
    pub fn len(&self) -> usize {
        self.radius.len()
    }

    /// Whether the profile holds no samples
    pub fn is_empty(&self) -> bool {
        self.radius.is_empty()
    }

    /// Concentric rings from the limb inwards, every `stride`-th sample
    ///
    /// Drawing the rings in order, each on top of the last, paints the
    /// limb-darkened disk. The gray level is `lightness * I(r)/I(0)`.
    pub fn rings(&self, lightness: f64, stride: usize) -> Vec<StarRing> {
        let stride = stride.max(1);
        self.radius
            .iter()
            .zip(self.relative.iter())
            .rev()
            .step_by(stride)
            .map(|(&radius, &rel)| StarRing {
                radius,
                level: lightness * rel,
            })
            .collect()
    }

    /// Rings at the default star lightness
    pub fn star_rings(&self) -> Vec<StarRing> {
        self.rings(STAR_LIGHTNESS, 1)
    }
}
