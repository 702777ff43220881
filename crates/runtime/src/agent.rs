//! Scripted demo agent.
//!
//! Talks to the loop only through an [`EnvHandle`], the way a remote learner
//! would: read the relative pose, centre over the marker, descend, land, and
//! ask for a reset once the episode is over. A small share of commands is
//! picked at random so that the out-of-bounds paths get exercised too.

use episode::{Action, EnvHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Horizontal offset under which the agent stops correcting.
const CENTRED: f64 = 0.3;
/// Height above the marker at which the agent commits to landing.
const LANDING_HEIGHT: f64 = 1.0;
const EXPLORE_PROBABILITY: f64 = 0.05;

#[derive(Debug, Default, Clone, Copy)]
pub struct AgentSummary {
    pub episodes: u64,
    pub landings: u64,
    pub commands: u64,
}

pub fn spawn(
    handle: EnvHandle,
    stop: Arc<AtomicBool>,
    period: Duration,
    seed: Option<u64>,
) -> JoinHandle<AgentSummary> {
    std::thread::spawn(move || {
        let mut rng = seed.map_or_else(fastrand::Rng::new, |s| fastrand::Rng::with_seed(s ^ 0x5eed));
        let mut summary = AgentSummary::default();
        let mut scored_episode = 0_u64;

        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(period);
            let status = handle.get_episode_status();
            if status.reset_pending {
                continue;
            }

            if status.episode == 0 || status.done {
                if status.done && status.episode != scored_episode {
                    scored_episode = status.episode;
                    if status.reward > 0.0 {
                        summary.landings += 1;
                        info!("Episode {} landed on the marker", status.episode);
                    } else {
                        info!("Episode {} ended with reward {:.2}", status.episode, status.reward);
                    }
                }
                handle.request_reset(true);
                summary.episodes += 1;
                continue;
            }

            let Ok(relative) = handle.get_relative_pose() else {
                continue;
            };

            let action = if rng.f64() < EXPLORE_PROBABILITY {
                Action::ALL[rng.usize(..Action::ALL.len())]
            } else {
                choose(relative.x, relative.y, relative.z)
            };
            let ack = handle.send_command(action.token());
            debug!(?ack, tick = relative.tick, "agent command");
            summary.commands += 1;
        }

        summary
    })
}

fn choose(x: f64, y: f64, z: f64) -> Action {
    let token = if x > CENTRED {
        "backward"
    } else if x < -CENTRED {
        "forward"
    } else if y > CENTRED {
        "right"
    } else if y < -CENTRED {
        "left"
    } else if z > LANDING_HEIGHT {
        "descend"
    } else {
        "land"
    };
    Action::parse(token)
}
