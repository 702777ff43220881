#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::unnecessary_wraps)]
//! # Landing Environment Runtime
//!
//! Runs the episode loop at its configured rate against the in-process mock
//! simulator, with a scripted agent talking to it through an [`EnvHandle`]
//! from another thread and a synthetic camera feeding frames. Logs go to
//! stderr; the final episode status is printed to stdout as JSON.
//!
//! [`EnvHandle`]: episode::EnvHandle

mod agent;
mod frames;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use episode::{EpisodeLoop, Spawner};
use settings::EnvConfig;
use sim::{MockSim, Simulator};
use spatial::Pose3D;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// A new synthetic frame every this many ticks.
const FRAME_INTERVAL: u64 = 3;

#[derive(Parser, Debug)]
#[command(name = "landing_env", about = "Marker-landing environment with a mock simulator")]
struct Args {
    /// JSON file overriding the default environment settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks to run; 0 runs until the process is killed
    #[arg(long, default_value_t = 300)]
    ticks: u64,
    /// Seed for the respawn sampler and the demo agent
    #[arg(long)]
    seed: Option<u64>,
    /// Write the last derived camera frame to this PNG file
    #[arg(long)]
    frame_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EnvConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EnvConfig::default(),
    };
    let config = config.validate().context("invalid environment config")?;

    let mock = Arc::new(
        MockSim::new(config.vehicle_name.clone())
            .with_object(config.vehicle_name.clone(), Pose3D::default())
            .with_object(config.marker_name.clone(), Pose3D::default()),
    );
    let backend: Arc<dyn Simulator> = Arc::clone(&mock) as Arc<dyn Simulator>;

    let mut episode = EpisodeLoop::new(config.clone(), backend);
    if let Some(seed) = args.seed {
        episode = episode.with_spawner(Spawner::with_seed(&config, seed));
    }
    let handle = episode.handle();

    let stop = Arc::new(AtomicBool::new(false));
    let agent = agent::spawn(handle.clone(), Arc::clone(&stop), config.tick_period(), args.seed);

    let dt = config.tick_period().as_secs_f64();
    let max_ticks = (args.ticks > 0).then_some(args.ticks);
    let vehicle_name = config.vehicle_name.clone();
    let marker_name = config.marker_name.clone();

    let ran = episode.run_with(max_ticks, &stop, |report| {
        mock.advance(dt);
        if report.tick % FRAME_INTERVAL == 0 {
            if let (Some(vehicle), Some(marker)) = (mock.pose_of(&vehicle_name), mock.pose_of(&marker_name)) {
                let frame = frames::synthetic(&vehicle, &marker);
                if let Err(e) = handle.ingest_frame(frame) {
                    warn!("Synthetic frame rejected: {e}");
                }
            }
        }
    });

    stop.store(true, Ordering::Relaxed);
    let summary = agent.join().map_err(|_| anyhow!("demo agent thread panicked"))?;
    info!(
        "Ran {} ticks: {} episodes started, {} landings, {} commands sent",
        ran, summary.episodes, summary.landings, summary.commands
    );

    if let Some(path) = &args.frame_out {
        frames::save_matrix(&handle, &config.frame.crop, path)?;
        info!("Saved derived frame to {}", path.display());
    }

    println!("{}", serde_json::to_string(&handle.get_episode_status())?);
    Ok(())
}
