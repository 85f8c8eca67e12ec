//! Syzygy-view: derived geometry for visualizing star-planet transits
//!
//! This crate turns a sampled planetary trajectory into what a renderer needs
//! to draw a transit: limb-darkened stellar intensity, draw order of the planet,
//! its trail and the star, the face-on position of the planet, and a phase-folded
//! light curve with a fading trail of recent samples.
//!
//! The transit engine producing the trajectory lives elsewhere; see
//! [`trajectory::Trajectory`] for the sample layout this crate consumes.
//!
//! ```
//! use syzygy_view::LimbDarkening;
//!
//! let ld = LimbDarkening::Quadratic { u1: 0.40, u2: 0.26 };
//! let center = ld.intensity(0.0).unwrap();
//! let limb = ld.intensity(1.0).unwrap();
//! assert!(limb < center);
//! ```

pub mod arrays;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frames;
pub mod lightcurve;
pub mod limbdark;
pub mod occlusion;
pub mod scene;
pub mod trajectory;

// Re-export commonly used types
pub use config::FrameConfig;
pub use errors::{Result, ViewError};
pub use frames::{
    compose_animation, compose_frame, compose_overview, FrameGeometry, OverviewGeometry,
    TransitSystem,
};
pub use lightcurve::{fold, trail_weight, FoldedLightCurve};
pub use limbdark::{LimbDarkModel, LimbDarkening, RadialProfile};
pub use occlusion::{
    face_on_planet_y, nearest_phase_index, visibility_mask, z_order_for, TrailLayer,
};
pub use scene::{AnimationSchedule, ViewBounds};
pub use trajectory::{Trajectory, TransitOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_compose() {
        let n = 64;
        let phases: Vec<f64> = (0..n)
            .map(|i| constants::TAU * i as f64 / n as f64)
            .collect();
        let trajectory = Trajectory::from_vecs(
            phases.clone(),
            phases.iter().map(|p| 4.0 * p.sin()).collect(),
            vec![0.0; n],
            phases.iter().map(|p| -4.0 * p.cos()).collect(),
            phases.clone(),
            vec![1.0; n],
        )
        .unwrap();
        let system = TransitSystem::new(LimbDarkening::default(), 0.05, 2.0).unwrap();

        let frame = compose_frame(&trajectory, &system, 0.0, &FrameConfig::default()).unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.star_layer.code(), -2);
    }
}
