//! NaN-aware reductions over sample arrays
//!
//! NaN marks "no value" in the sky tracks, so these skip NaN entries rather
//! than propagating them. Ties resolve to the lowest index.

use ndarray::Array1;

/// Index of the smallest non-NaN value, first occurrence on ties
pub fn nan_argmin(values: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the largest non-NaN value, first occurrence on ties
pub fn nan_argmax(values: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Smallest non-NaN value
pub fn nan_min(values: &Array1<f64>) -> Option<f64> {
    nan_argmin(values).map(|i| values[i])
}

/// Largest non-NaN value
pub fn nan_max(values: &Array1<f64>) -> Option<f64> {
    nan_argmax(values).map(|i| values[i])
}
