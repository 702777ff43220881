#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Landing Episode Core
//!
//! Environment-side bookkeeping for an agent learning to land a simulated
//! quadrotor on a marker.
//!
//! ## Key Components
//!
//! -   **[`Spawner`]** picks a random, level respawn pose above the marker.
//! -   **[`RewardEngine`]** scores a tick from the vehicle pose and two boxes
//!     centred on the marker: a small landing box nested inside a tall flight
//!     box. The policy is a [`RewardStrategy`] chosen by configuration.
//! -   **[`CommandArbiter`]** turns action tokens into actuations and releases
//!     at most one per tick.
//! -   **[`EpisodeLoop`]** is the fixed-rate driver tying these together
//!     against a [`sim::Simulator`].
//! -   **[`EnvHandle`]** is the request/response surface for the agent, and
//!     [`LockstepEnv`] wraps the loop as a step/reset [`Env`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = settings::EnvConfig::default().validate()?;
//! let mut episode = EpisodeLoop::new(config, Arc::new(my_simulator));
//! let agent = episode.handle();
//! std::thread::spawn(move || {
//!     agent.request_reset(true);
//!     agent.send_command("descend");
//! });
//! episode.run(None, &stop);
//! ```

pub mod action;
pub mod arbiter;
pub mod context;
pub mod env;
pub mod error;
pub mod handle;
pub mod reward;
pub mod runner;
pub mod spawner;

pub use action::{Action, ActionSpeeds, Direction};
pub use arbiter::CommandArbiter;
pub use context::{EpisodeContext, EpisodeState, EpisodeStatus, RelativePose, SharedContext};
pub use env::{Env, LockstepEnv};
pub use error::EpisodeError;
pub use handle::{CommandAck, EnvHandle};
pub use reward::{LandOnlyReward, RewardEngine, RewardInput, RewardOutcome, RewardStrategy, ShapedReward};
pub use runner::{EpisodeLoop, TickReport};
pub use spawner::Spawner;
