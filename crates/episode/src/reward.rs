//! Reward shaping and episode termination.
//!
//! A [`RewardStrategy`] scores one tick from the vehicle pose, the two boxes
//! centred on the marker, and the last action the agent asked for. The
//! strategy is picked from configuration; [`RewardEngine`] just holds it.

use crate::action::Action;
use serde::Serialize;
use settings::{RewardConfig, RewardVariant};
use spatial::{BoundingBox, Pose3D};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardOutcome {
    pub reward: f64,
    pub done: bool,
    pub wrong_altitude: bool,
}

impl RewardOutcome {
    #[must_use]
    pub const fn terminal(reward: f64) -> Self {
        Self { reward, done: true, wrong_altitude: false }
    }

    #[must_use]
    pub const fn running(reward: f64) -> Self {
        Self { reward, done: false, wrong_altitude: false }
    }
}

pub struct RewardInput<'a> {
    pub vehicle: &'a Pose3D,
    pub landing: &'a BoundingBox,
    pub flight: &'a BoundingBox,
    pub last_action: Option<Action>,
}

impl RewardInput<'_> {
    fn landing_commanded(&self) -> bool {
        self.last_action == Some(Action::Land)
    }

    /// Horizontal distance to the marker as a fraction of the flight box
    /// half-size.
    fn normalized_offset(&self) -> f64 {
        let center = self.flight.center().position;
        self.vehicle.position.horizontal_distance(&center) / self.flight.half_size()
    }
}

pub trait RewardStrategy: Send {
    fn evaluate(&self, input: &RewardInput<'_>) -> RewardOutcome;

    fn name(&self) -> &'static str;
}

/// Dense policy.
///
/// Leaving the flight box ends the episode (unless built with
/// [`ShapedReward::unbounded`]), landing inside the landing box succeeds,
/// hovering inside the landing box below the operating altitude without
/// landing is penalised, and every other tick earns a small negative reward
/// proportional to the horizontal distance from the marker.
pub struct ShapedReward {
    coeffs: RewardConfig,
    terminate_outside: bool,
}

impl ShapedReward {
    #[must_use]
    pub fn bounded(coeffs: RewardConfig) -> Self {
        Self { coeffs, terminate_outside: true }
    }

    #[must_use]
    pub fn unbounded(coeffs: RewardConfig) -> Self {
        Self { coeffs, terminate_outside: false }
    }
}

impl RewardStrategy for ShapedReward {
    fn evaluate(&self, input: &RewardInput<'_>) -> RewardOutcome {
        let position = input.vehicle.position;

        if self.terminate_outside && !input.flight.contains(&position) {
            return RewardOutcome::terminal(self.coeffs.out_of_bounds);
        }

        if input.landing.contains(&position) {
            if input.landing_commanded() {
                return RewardOutcome::terminal(self.coeffs.success);
            }
            let altitude = position.z - input.landing.base();
            if altitude < self.coeffs.min_operating_altitude {
                return RewardOutcome {
                    reward: self.coeffs.wrong_altitude,
                    done: false,
                    wrong_altitude: true,
                };
            }
        }

        RewardOutcome::running(-self.coeffs.shaping_scale * input.normalized_offset())
    }

    fn name(&self) -> &'static str {
        if self.terminate_outside {
            "standard"
        } else {
            "unbounded"
        }
    }
}

/// Sparse policy: nothing happens until the agent lands or flies away.
pub struct LandOnlyReward {
    coeffs: RewardConfig,
}

impl LandOnlyReward {
    #[must_use]
    pub fn new(coeffs: RewardConfig) -> Self {
        Self { coeffs }
    }
}

impl RewardStrategy for LandOnlyReward {
    fn evaluate(&self, input: &RewardInput<'_>) -> RewardOutcome {
        let position = input.vehicle.position;
        if !input.flight.contains(&position) {
            return RewardOutcome::terminal(self.coeffs.out_of_bounds);
        }
        if input.landing_commanded() {
            return if input.landing.contains(&position) {
                RewardOutcome::terminal(self.coeffs.success)
            } else {
                RewardOutcome::terminal(self.coeffs.failed_landing)
            };
        }
        RewardOutcome::running(0.0)
    }

    fn name(&self) -> &'static str {
        "land_only"
    }
}

pub struct RewardEngine {
    strategy: Box<dyn RewardStrategy>,
}

impl RewardEngine {
    #[must_use]
    pub fn from_config(config: &RewardConfig) -> Self {
        let coeffs = config.clone();
        let strategy: Box<dyn RewardStrategy> = match config.variant {
            RewardVariant::Standard => Box::new(ShapedReward::bounded(coeffs)),
            RewardVariant::Unbounded => Box::new(ShapedReward::unbounded(coeffs)),
            RewardVariant::LandOnly => Box::new(LandOnlyReward::new(coeffs)),
        };
        Self { strategy }
    }

    #[must_use]
    pub fn with_strategy(strategy: Box<dyn RewardStrategy>) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    #[must_use]
    pub fn evaluate(
        &self,
        vehicle: &Pose3D,
        landing: &BoundingBox,
        flight: &BoundingBox,
        last_action: Option<Action>,
    ) -> RewardOutcome {
        self.strategy.evaluate(&RewardInput { vehicle, landing, flight, last_action })
    }
}
