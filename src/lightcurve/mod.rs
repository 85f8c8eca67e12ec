//! Phase-folded light curves for display
//!
//! A light curve spanning many orbits is folded onto one period with the
//! transit centered, then its time axis is normalized to `[0, 1]` so it can be
//! laid under a frame of the sky view sharing the same horizontal axis.

use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::arrays::{nan_argmax, nan_argmin, nan_max, nan_min};
use crate::constants::{
    FLUX_BASELINE_PAD, FLUX_BASELINE_TOL, LIGHTCURVE_TRAIL_MAX_WEIGHT, RANGE_PADDING,
};
use crate::errors::{ensure_len, ensure_non_empty, Result, ViewError};

/// Light curve folded onto a single period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldedLightCurve {
    /// Folded time, normalized to `[0, 1]` or rescaled into a display range
    pub phase: Array1<f64>,
    /// Flux at each sample, in the original sample order
    pub flux: Array1<f64>,
}

/// Fold `flux(time)` on `period`, centering the flux minimum
///
/// 1. shift so the minimum-flux sample sits at `period / 2`
/// 2. wrap modulo `period`
/// 3. min-max normalize to `[0, 1]`
///
/// Fails with [`ViewError::DegenerateRange`] when the wrapped times all
/// coincide, e.g. a single sample.
pub fn fold(time: &Array1<f64>, flux: &Array1<f64>, period: f64) -> Result<FoldedLightCurve> {
    ensure_non_empty("time", time.len())?;
    ensure_len("flux", time.len(), flux.len())?;
    if !(period.is_finite() && period > 0.0) {
        return Err(ViewError::InvalidParameter(format!(
            "period must be positive, got {}",
            period
        )));
    }

    let center = nan_argmin(flux)
        .ok_or_else(|| ViewError::DegenerateRange("flux has no finite samples".to_string()))?;
    let reference = time[center];
    let wrapped = time.mapv(|t| wrap_time(t, reference, period));

    let (lo, hi) = match (nan_min(&wrapped), nan_max(&wrapped)) {
        (Some(lo), Some(hi)) if hi > lo => (lo, hi),
        (Some(lo), Some(_)) => {
            return Err(ViewError::DegenerateRange(format!(
                "folded times all equal {}",
                lo
            )))
        }
        _ => {
            return Err(ViewError::DegenerateRange(
                "time has no finite samples".to_string(),
            ))
        }
    };

    let phase = wrapped.mapv(|t| (t - lo) / (hi - lo));
    debug!(
        "Folded {} samples on period {} (minimum flux at sample {})",
        time.len(),
        period,
        center
    );
    Ok(FoldedLightCurve {
        phase,
        flux: flux.clone(),
    })
}

/// Time since `reference` shifted by half a period, wrapped into `[0, period)`
///
/// The reference itself maps to exactly `period / 2`.
fn wrap_time(t: f64, reference: f64, period: f64) -> f64 {
    (t - reference + period / 2.0).rem_euclid(period)
}

/// Fold and map the normalized phase onto `[target_min, target_max]`
pub fn fold_into(
    time: &Array1<f64>,
    flux: &Array1<f64>,
    period: f64,
    target_min: f64,
    target_max: f64,
) -> Result<FoldedLightCurve> {
    Ok(fold(time, flux, period)?.rescaled(target_min, target_max))
}

impl FoldedLightCurve {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.phase.len()
    }

    /// Whether the curve holds no samples
    pub fn is_empty(&self) -> bool {
        self.phase.is_empty()
    }

    /// Affine map of the phase axis from `[0, 1]` onto `[target_min, target_max]`
    pub fn rescaled(&self, target_min: f64, target_max: f64) -> Self {
        let span = target_max - target_min;
        Self {
            phase: self.phase.mapv(|p| p * span + target_min),
            flux: self.flux.clone(),
        }
    }

    /// Copy with the latest-phase sample blanked to NaN
    ///
    /// A line drawn through the samples in order would otherwise jump back
    /// across the plot where the fold wraps.
    pub fn with_wrap_break(&self) -> Self {
        let mut phase = self.phase.clone();
        if let Some(i) = nan_argmax(&phase) {
            phase[i] = f64::NAN;
        }
        Self {
            phase,
            flux: self.flux.clone(),
        }
    }

    /// Vertical display limits: the flux range padded by 10% on each side
    pub fn flux_limits(&self) -> Option<(f64, f64)> {
        padded_range(&self.flux, RANGE_PADDING)
    }
}

/// `(min - pad, max + pad)` with `pad = fraction * (max - min)`, NaN ignored
pub fn padded_range(values: &Array1<f64>, fraction: f64) -> Option<(f64, f64)> {
    let lo = nan_min(values)?;
    let hi = nan_max(values)?;
    let pad = fraction * (hi - lo);
    Some((lo - pad, hi + pad))
}

/// Opacity weight of sample `i` in a trail fading in over `window` samples
///
/// `0.1 * max(0, (i - (current - window)) / window)^2`: zero for samples more
/// than `window` behind `current`, approaching 0.1 just before it.
///
/// Only samples before `current` have a weight; `i >= current` fails with
/// [`ViewError::InvalidParameter`].
pub fn trail_weight(i: usize, current: usize, window: usize) -> Result<f64> {
    if window == 0 {
        return Err(ViewError::InvalidParameter(
            "trail window must hold at least one sample".to_string(),
        ));
    }
    if i >= current {
        return Err(ViewError::InvalidParameter(format!(
            "sample {} has not been passed at sample {}",
            i, current
        )));
    }
    let window = window as f64;
    let lag = (i as f64 - (current as f64 - window)) / window;
    let lag = lag.max(0.0);
    Ok(LIGHTCURVE_TRAIL_MAX_WEIGHT * lag * lag)
}

/// A light-curve sample drawn as a marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightCurveMarker {
    /// Sample index
    pub index: usize,
    /// Opacity
    pub weight: f64,
    /// Whether this is the sample just before the current one
    pub highlighted: bool,
}

/// Markers for the samples passed before `current`
///
/// The sample right before `current` is highlighted at full weight; earlier
/// samples fade by [`trail_weight`]. Markers with zero weight are left out.
pub fn trail_markers(current: usize, window: usize) -> Result<Vec<LightCurveMarker>> {
    let mut markers = Vec::new();
    for i in 0..current {
        if i + 1 == current {
            markers.push(LightCurveMarker {
                index: i,
                weight: 1.0,
                highlighted: true,
            });
            continue;
        }
        let weight = trail_weight(i, current, window)?;
        if weight > 0.0 {
            markers.push(LightCurveMarker {
                index: i,
                weight,
                highlighted: false,
            });
        }
    }
    Ok(markers)
}

/// Axis window framing a single transit in an unfolded light curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCurveWindow {
    /// Sample times offset by `t0`, with baseline samples at both ends
    pub time: Array1<f64>,
    /// Flux with unit baseline samples at both ends
    pub flux: Array1<f64>,
    /// Flux range padded by 10%, when the flux varies
    pub flux_limits: Option<(f64, f64)>,
    /// One transit duration either side of ingress and egress, when in transit
    pub time_limits: Option<(f64, f64)>,
}

/// Frame a transit for display
///
/// Unit-flux samples at `-1e5` and `1e5` days close the curve so it reaches
/// the baseline on both sides. Ingress is the first sample below
/// `1 - 1e-8`; egress is the first later sample back above it.
pub fn display_window(time: &Array1<f64>, flux: &Array1<f64>, t0: f64) -> Result<LightCurveWindow> {
    ensure_len("flux", time.len(), flux.len())?;

    let n = time.len() + 2;
    let mut padded_time = Array1::zeros(n);
    let mut padded_flux = Array1::ones(n);
    padded_time[0] = -FLUX_BASELINE_PAD;
    padded_time[n - 1] = FLUX_BASELINE_PAD;
    for i in 0..time.len() {
        padded_time[i + 1] = time[i] + t0;
        padded_flux[i + 1] = flux[i];
    }

    let (lo, hi) = match (nan_min(&padded_flux), nan_max(&padded_flux)) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => (1.0, 1.0),
    };
    let range = hi - lo;

    let mut flux_limits = None;
    let mut time_limits = None;
    if range > 0.0 {
        flux_limits = Some((lo - RANGE_PADDING * range, hi + RANGE_PADDING * range));

        let threshold = 1.0 - FLUX_BASELINE_TOL;
        let ingress = padded_flux.iter().position(|&f| f < threshold);
        if let Some(left) = ingress {
            // The closing baseline sample guarantees an egress
            let right = padded_flux
                .iter()
                .skip(left)
                .position(|&f| f > threshold)
                .map(|k| k + left)
                .unwrap_or(n - 1);
            let duration = padded_time[right] - padded_time[left];
            time_limits = Some((
                padded_time[left] - duration,
                padded_time[right] + duration,
            ));
        }
    }

    Ok(LightCurveWindow {
        time: padded_time,
        flux: padded_flux,
        flux_limits,
        time_limits,
    })
}
