//! Random respawn poses for a new episode.

use settings::ValidatedConfig;
use spatial::{quaternion_from_euler, BoundingBox, Pose3D, Vec3};
use std::f64::consts::TAU;

/// Samples respawn poses above the marker.
///
/// Horizontal position is uniform over the flight box footprint. Altitude is
/// uniform over the open interval
/// `(landing_height + 1, respawn_height - landing_height)` above the marker,
/// so the vehicle never starts inside the landing volume nor pinned to the
/// ceiling. Heading is uniform over a full turn; the vehicle
/// always starts level.
pub struct Spawner {
    rng: fastrand::Rng,
    altitude: (f64, f64),
}

impl Spawner {
    /// Spawner seeded from system entropy.
    #[must_use]
    pub fn new(config: &ValidatedConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Reproducible spawner.
    #[must_use]
    pub fn with_seed(config: &ValidatedConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: &ValidatedConfig, rng: fastrand::Rng) -> Self {
        Self { rng, altitude: config.spawn_altitude_range() }
    }

    /// Altitudes above the marker this spawner samples from, exclusive at both ends.
    #[must_use]
    pub fn altitude_range(&self) -> (f64, f64) {
        self.altitude
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rng.f64()
    }

    fn open_uniform(&mut self, low: f64, high: f64) -> f64 {
        let rng = &mut self.rng;
        low + (high - low) * nonzero_draw(|| rng.f64())
    }

    pub fn generate(&mut self, marker: &Pose3D, flight: &BoundingBox) -> Pose3D {
        let m = marker.position;
        let h = flight.half_size();
        let (low, high) = self.altitude;

        let x = self.uniform(m.x - h, m.x + h);
        let y = self.uniform(m.y - h, m.y + h);
        let z = self.open_uniform(m.z + low, m.z + high);
        let yaw = self.uniform(0.0, TAU);

        Pose3D::new(Vec3::new(x, y, z), quaternion_from_euler(0.0, 0.0, yaw))
    }
}

/// First draw in `(0, 1)`; `draw` yields values in `[0, 1)`.
fn nonzero_draw(mut draw: impl FnMut() -> f64) -> f64 {
    loop {
        let t = draw();
        if t > 0.0 {
            return t;
        }
    }
}
