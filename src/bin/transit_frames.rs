//! Transit Frame Geometry Tool
//!
//! Loads a sampled trajectory and prints the geometry a renderer needs to draw
//! one frame, a full animation, or the transit overview figure, as JSON.
//!
//! Usage:
//!   cargo run --bin transit_frames -- --trajectory orbit.json --period 3.5 \
//!       --planet-radius 0.1 --phase 0.2
//!   cargo run --bin transit_frames -- --trajectory orbit.json --period 3.5 \
//!       --planet-radius 0.1 --overview --face-on face_on.json

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::{debug, info, LevelFilter};
use syzygy_view::{
    compose_animation, compose_frame, compose_overview, AnimationSchedule, FrameConfig,
    LimbDarkModel, LimbDarkening, Trajectory, TransitOutcome, TransitSystem, ViewError,
};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Transit Frame Geometry Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Computes renderer-ready geometry for star-planet transit frames",
    long_about = None
)]
struct Args {
    /// Trajectory JSON covering one orbit
    #[arg(short, long)]
    trajectory: PathBuf,

    /// Frame configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mean anomaly of the frame in radians
    #[arg(long, default_value_t = 0.0)]
    phase: f64,

    /// Orbital period in days
    #[arg(long)]
    period: f64,

    /// Planet radius in stellar radii
    #[arg(long)]
    planet_radius: f64,

    /// Time of transit center in days
    #[arg(long, default_value_t = 0.0)]
    t0: f64,

    /// Limb darkening law
    #[arg(long, default_value = "quadratic")]
    limb_darkening: LimbDarkModel,

    /// First limb darkening coefficient (u1 or q1)
    #[arg(long, default_value_t = 0.40)]
    ld_a: f64,

    /// Second limb darkening coefficient (u2 or q2)
    #[arg(long, default_value_t = 0.26)]
    ld_b: f64,

    /// Print the transit overview instead of a single frame
    #[arg(long, action = ArgAction::SetTrue)]
    overview: bool,

    /// Face-on trajectory JSON, required by --overview
    #[arg(long)]
    face_on: Option<PathBuf>,

    /// Transit light curve JSON (`{"outcome": ...}`); defaults to the trajectory
    #[arg(long)]
    transit: Option<PathBuf>,

    /// Print an animation of this many frames
    #[arg(long)]
    animate: Option<usize>,

    /// Planet rotations per orbit during an animation
    #[arg(long, default_value_t = 0.0)]
    days_per_year: f64,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn load_transit(args: &Args, trajectory: &Trajectory) -> Result<TransitOutcome> {
    match &args.transit {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&json)?)
        }
        None => Ok(TransitOutcome::Transit(trajectory.clone())),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => FrameConfig::from_json_file(path)?,
        None => FrameConfig::default(),
    };
    let limb_darkening = LimbDarkening::from_model(args.limb_darkening, args.ld_a, args.ld_b);
    let system =
        TransitSystem::new(limb_darkening, args.planet_radius, args.period)?.with_t0(args.t0);

    let trajectory = Trajectory::from_json_file(&args.trajectory)?;
    info!(
        "Loaded {} samples spanning {:.3} days from {}",
        trajectory.len(),
        trajectory.span(),
        args.trajectory.display()
    );

    let output = if args.overview {
        let face_on_path = args.face_on.as_ref().ok_or_else(|| {
            ViewError::InvalidParameter("--overview needs a --face-on trajectory".to_string())
        })?;
        let face_on = Trajectory::from_json_file(face_on_path)?;
        let transit = load_transit(&args, &trajectory)?;
        if !transit.transits() {
            info!("The planet does not transit");
        }
        let overview = compose_overview(&transit, &trajectory, &face_on, &system, &config)?;
        serde_json::to_string_pretty(&overview)?
    } else if let Some(nsteps) = args.animate {
        let schedule = AnimationSchedule::new(nsteps, args.days_per_year)?;
        let frames = compose_animation(&trajectory, &system, &schedule, &config)?;
        serde_json::to_string_pretty(&frames)?
    } else {
        let frame = compose_frame(&trajectory, &system, args.phase, &config)?;
        debug!("Frame uses sample {}", frame.index);
        serde_json::to_string_pretty(&frame)?
    };

    println!("{}", output);
    Ok(())
}
