#![allow(dead_code)]

use episode::{EpisodeLoop, Spawner};
use settings::{EnvConfig, ValidatedConfig};
use sim::{MockSim, Simulator};
use spatial::{Pose3D, Vec3};
use std::sync::Arc;

pub const VEHICLE: &str = "quadrotor";
pub const MARKER: &str = "marker2";

pub fn at(x: f64, y: f64, z: f64) -> Pose3D {
    Pose3D::from_position(Vec3::new(x, y, z))
}

/// Mock world with the marker at the origin and the vehicle at `vehicle`.
pub fn world(vehicle: Pose3D) -> Arc<MockSim> {
    Arc::new(
        MockSim::new(VEHICLE)
            .with_object(VEHICLE, vehicle)
            .with_object(MARKER, Pose3D::default()),
    )
}

pub fn default_config() -> ValidatedConfig {
    EnvConfig::default().validate().unwrap()
}

/// Loop over `sim` with a seeded spawner.
pub fn episode_with(config: ValidatedConfig, sim: &Arc<MockSim>) -> EpisodeLoop {
    let spawner = Spawner::with_seed(&config, 42);
    let backend: Arc<dyn Simulator> = Arc::clone(sim) as Arc<dyn Simulator>;
    EpisodeLoop::new(config, backend).with_spawner(spawner)
}

pub fn episode(sim: &Arc<MockSim>) -> EpisodeLoop {
    episode_with(default_config(), sim)
}
