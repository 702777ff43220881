//! # Episode Loop
//!
//! The fixed-rate driver. Each tick runs, in this order:
//!
//! 1. query the vehicle and marker poses;
//! 2. rebuild the landing and flight boxes on the marker;
//! 3. score the tick and record the outcome;
//! 4. honour a pending reset by teleporting the vehicle to a fresh spawn pose;
//! 5. dispatch at most one actuation.
//!
//! Simulator calls are made without holding the context lock, so request
//! handlers are never blocked behind the simulator.

use crate::action::ActionSpeeds;
use crate::context::{EpisodeContext, SharedContext};
use crate::error::EpisodeError;
use crate::handle::EnvHandle;
use crate::reward::{RewardEngine, RewardOutcome};
use crate::spawner::Spawner;
use settings::{EnvConfig, ValidatedConfig};
use sim::{Actuation, Simulator};
use spatial::{BoundingBox, Pose3D, Twist};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use vision::FrameTransform;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Evaluated ticks so far, including this one if it was evaluated.
    pub tick: u64,
    pub outcome: Option<RewardOutcome>,
    pub respawn: Option<Pose3D>,
    pub actuation: Option<Actuation>,
    pub stale: bool,
}

pub struct EpisodeLoop {
    config: ValidatedConfig,
    sim: Arc<dyn Simulator>,
    spawner: Spawner,
    reward: RewardEngine,
    ctx: SharedContext,
}

impl EpisodeLoop {
    #[must_use]
    pub fn new(config: ValidatedConfig, sim: Arc<dyn Simulator>) -> Self {
        let speeds = ActionSpeeds {
            velocity: config.velocity,
            descend_velocity: config.descend_velocity,
        };
        let ctx = EpisodeContext::new(
            speeds,
            FrameTransform::new(&config.frame),
            config.degraded_after,
        )
        .shared();
        let spawner = Spawner::new(&config);
        let reward = RewardEngine::from_config(&config.reward);
        info!(
            "Episode loop ready: {} Hz, reward strategy `{}`",
            config.tick_rate_hz,
            reward.strategy_name()
        );
        Self { config, sim, spawner, reward, ctx }
    }

    /// Validate `config` and build the loop.
    ///
    /// # Errors
    /// Returns `EpisodeError::Config` for an invalid configuration.
    pub fn from_config(config: EnvConfig, sim: Arc<dyn Simulator>) -> Result<Self, EpisodeError> {
        Ok(Self::new(config.validate()?, sim))
    }

    #[must_use]
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: RewardEngine) -> Self {
        self.reward = reward;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    #[must_use]
    pub fn handle(&self) -> EnvHandle {
        EnvHandle::new(Arc::clone(&self.ctx))
    }

    fn query(&self, object: &str) -> Option<Pose3D> {
        match self.sim.get_pose(object) {
            Ok(pose) => Some(pose),
            Err(e) => {
                error!("Pose query for `{object}` failed: {e}");
                None
            }
        }
    }

    fn boxes(&self, marker: Pose3D) -> (BoundingBox, BoundingBox) {
        let landing = &self.config.landing_box;
        let flight = &self.config.flight_box;
        (
            BoundingBox::new(marker, landing.half_size, landing.height),
            BoundingBox::new(marker, flight.half_size, flight.height),
        )
    }

    pub fn tick(&mut self) -> TickReport {
        let vehicle = self.query(&self.config.vehicle_name);
        let marker = self.query(&self.config.marker_name);

        let mut ctx = self.ctx.lock();
        ctx.refresh_poses(vehicle, marker);
        let stale = ctx.status().stale;

        let mut outcome = None;
        let mut spawn_from = None;
        if let Some((vehicle, marker)) = ctx.cached_poses() {
            let (landing, flight) = self.boxes(marker);
            let result = self.reward.evaluate(&vehicle, &landing, &flight, ctx.state().last_action);
            ctx.record_evaluation(result, &vehicle, &marker);
            outcome = Some(result);

            if ctx.reset_pending() {
                let episode = ctx.begin_episode();
                info!("Starting episode {episode}");
                spawn_from = Some((marker, flight));
            }
        } else if ctx.reset_pending() {
            warn!("Reset deferred: no vehicle or marker pose known yet");
        }

        let actuation = ctx.take_actuation();
        let tick = ctx.status().tick;
        drop(ctx);

        let respawn = spawn_from.map(|(marker, flight)| {
            let pose = self.spawner.generate(&marker, &flight);
            if let Err(e) = self.sim.set_pose(&self.config.vehicle_name, pose, Twist::ZERO) {
                error!("Failed to respawn `{}`: {e}", self.config.vehicle_name);
            }
            pose
        });

        if let Some(actuation) = &actuation {
            if let Err(e) = self.sim.publish(actuation) {
                error!("Failed to publish {}: {e}", actuation.kind());
            }
        }

        debug!(tick, ?outcome, ?actuation, stale, "tick complete");
        TickReport { tick, outcome, respawn, actuation, stale }
    }

    /// Tick at the configured rate until `stop` is raised or `max_ticks`
    /// ticks have run. Returns the number of ticks run.
    pub fn run(&mut self, max_ticks: Option<u64>, stop: &AtomicBool) -> u64 {
        self.run_with(max_ticks, stop, |_| {})
    }

    /// Like [`EpisodeLoop::run`], calling `after_tick` once per tick.
    pub fn run_with(
        &mut self,
        max_ticks: Option<u64>,
        stop: &AtomicBool,
        mut after_tick: impl FnMut(&TickReport),
    ) -> u64 {
        let period = self.config.tick_period();
        let mut ticks = 0_u64;
        info!("Starting episode loop with period {:?}...", period);

        while !stop.load(Ordering::Relaxed) && max_ticks.map_or(true, |max| ticks < max) {
            let tick_start = Instant::now();

            let report = self.tick();
            after_tick(&report);
            ticks += 1;

            let elapsed = tick_start.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            } else {
                debug!("Tick {} overran its period by {:?}", ticks, elapsed - period);
            }
        }

        info!("Episode loop stopped after {} ticks.", ticks);
        ticks
    }
}
