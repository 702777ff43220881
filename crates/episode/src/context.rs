//! # Episode Context
//!
//! All state shared between the tick loop and the agent's request handlers
//! lives in one [`EpisodeContext`] behind a single lock. Fields are split by
//! writer: the loop records poses and reward outcomes, handlers queue
//! commands, resets and frames. Readers get whole snapshots
//! ([`EpisodeStatus`], [`RelativePose`]) so they can never observe half of a
//! tick.

use crate::action::{Action, ActionSpeeds};
use crate::arbiter::CommandArbiter;
use crate::error::EpisodeError;
use crate::reward::RewardOutcome;
use image::DynamicImage;
use parking_lot::Mutex;
use serde::Serialize;
use sim::Actuation;
use spatial::{Pose3D, Vec3};
use std::sync::Arc;
use tracing::{info, warn};
use vision::{FrameStore, FrameTransform, VisionError};

pub type SharedContext = Arc<Mutex<EpisodeContext>>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeState {
    pub done: bool,
    pub reward: f64,
    pub wrong_altitude: bool,
    pub reset_requested: bool,
    pub last_action: Option<Action>,
}

/// Snapshot of the episode as of the last completed tick.
///
/// `tick` is the number of evaluated ticks; zero means nothing has been
/// evaluated yet and the remaining fields hold their initial values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeStatus {
    pub tick: u64,
    pub episode: u64,
    pub done: bool,
    pub reward: f64,
    pub wrong_altitude: bool,
    pub vehicle_pose: Pose3D,
    /// The last tick reused cached poses because a query failed.
    pub stale: bool,
    /// Pose queries have been failing for a while.
    pub degraded: bool,
    /// A reset has been requested and not yet honoured.
    pub reset_pending: bool,
}

/// Vehicle position minus marker position, tagged with the tick it was
/// computed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelativePose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub tick: u64,
    /// Computed from cached poses because a query failed in that tick.
    pub stale: bool,
}

pub struct EpisodeContext {
    state: EpisodeState,
    arbiter: CommandArbiter,
    frames: FrameStore,
    vehicle_pose: Option<Pose3D>,
    marker_pose: Option<Pose3D>,
    relative: Vec3,
    tick: u64,
    episode: u64,
    stale: bool,
    failure_streak: u32,
    degraded_after: u32,
}

impl EpisodeContext {
    #[must_use]
    pub fn new(speeds: ActionSpeeds, transform: FrameTransform, degraded_after: u32) -> Self {
        Self {
            state: EpisodeState::default(),
            arbiter: CommandArbiter::new(speeds),
            frames: FrameStore::new(transform),
            vehicle_pose: None,
            marker_pose: None,
            relative: Vec3::ZERO,
            tick: 0,
            episode: 0,
            stale: false,
            failure_streak: 0,
            degraded_after,
        }
    }

    #[must_use]
    pub fn shared(self) -> SharedContext {
        Arc::new(Mutex::new(self))
    }

    // ---- reads ----

    #[must_use]
    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded_after > 0 && self.failure_streak >= self.degraded_after
    }

    #[must_use]
    pub fn status(&self) -> EpisodeStatus {
        EpisodeStatus {
            tick: self.tick,
            episode: self.episode,
            done: self.state.done,
            reward: self.state.reward,
            wrong_altitude: self.state.wrong_altitude,
            vehicle_pose: self.vehicle_pose.unwrap_or_default(),
            stale: self.stale,
            degraded: self.is_degraded(),
            reset_pending: self.state.reset_requested,
        }
    }

    /// # Errors
    /// `EpisodeError::NotReady` until the first tick has been evaluated.
    pub fn relative_pose(&self) -> Result<RelativePose, EpisodeError> {
        if self.tick == 0 {
            return Err(EpisodeError::NotReady);
        }
        Ok(RelativePose {
            x: self.relative.x,
            y: self.relative.y,
            z: self.relative.z,
            tick: self.tick,
            stale: self.stale,
        })
    }

    #[must_use]
    pub fn frame(&self) -> Option<&DynamicImage> {
        self.frames.raw()
    }

    #[must_use]
    pub fn frame_matrix(&self) -> Option<Vec<u8>> {
        self.frames.matrix()
    }

    // ---- request handler writes ----

    pub fn request_reset(&mut self, reset: bool) {
        self.state.reset_requested = reset;
    }

    pub fn send_command(&mut self, token: &str) -> Action {
        let action = self.arbiter.request_token(token);
        self.state.last_action = Some(action);
        action
    }

    /// # Errors
    /// Propagates the frame transform error; the raw frame is kept anyway.
    pub fn ingest_frame(&mut self, frame: DynamicImage) -> Result<(), VisionError> {
        self.frames.ingest(frame)
    }

    // ---- loop writes ----

    /// Merge this tick's pose queries into the cache. A failed query keeps
    /// the previous pose and marks the tick stale.
    pub(crate) fn refresh_poses(&mut self, vehicle: Option<Pose3D>, marker: Option<Pose3D>) {
        let fresh = vehicle.is_some() && marker.is_some();
        if let Some(pose) = vehicle {
            self.vehicle_pose = Some(pose);
        }
        if let Some(pose) = marker {
            self.marker_pose = Some(pose);
        }

        let was_degraded = self.is_degraded();
        if fresh {
            self.failure_streak = 0;
            if was_degraded {
                info!("Pose queries recovered");
            }
        } else {
            self.failure_streak = self.failure_streak.saturating_add(1);
            if !was_degraded && self.is_degraded() {
                warn!(
                    "Pose queries failed {} ticks in a row, reporting degraded status",
                    self.failure_streak
                );
            }
        }
        self.stale = !fresh;
    }

    pub(crate) fn cached_poses(&self) -> Option<(Pose3D, Pose3D)> {
        Some((self.vehicle_pose?, self.marker_pose?))
    }

    pub(crate) fn record_evaluation(&mut self, outcome: RewardOutcome, vehicle: &Pose3D, marker: &Pose3D) {
        self.state.done = outcome.done;
        self.state.reward = outcome.reward;
        self.state.wrong_altitude = outcome.wrong_altitude;
        self.relative = vehicle.relative_to(marker);
        self.tick += 1;
    }

    pub(crate) fn reset_pending(&self) -> bool {
        self.state.reset_requested
    }

    /// Consume the reset request and start a new episode. The outcome of
    /// the previous episode is cleared along with the last action.
    pub(crate) fn begin_episode(&mut self) -> u64 {
        self.state.reset_requested = false;
        self.state.done = false;
        self.state.reward = 0.0;
        self.state.wrong_altitude = false;
        self.state.last_action = None;
        self.episode += 1;
        self.episode
    }

    pub(crate) fn take_actuation(&mut self) -> Option<Actuation> {
        self.arbiter.dispatch()
    }
}
