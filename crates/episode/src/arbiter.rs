//! Per-tick command arbitration.
//!
//! Requests may arrive at any rate between ticks, but the vehicle receives at
//! most one actuation per tick. Pending requests are kept per class; within a
//! class the latest request wins, across classes the priority is
//! take-off, then land, then move.

use crate::action::{Action, ActionSpeeds};
use sim::Actuation;
use spatial::Twist;

#[derive(Debug, Default)]
pub struct CommandArbiter {
    speeds: ActionSpeeds,
    take_off: bool,
    land: bool,
    movement: Option<Twist>,
}

impl CommandArbiter {
    #[must_use]
    pub fn new(speeds: ActionSpeeds) -> Self {
        Self { speeds, take_off: false, land: false, movement: None }
    }

    /// Queue an action for the next dispatch.
    pub fn request(&mut self, action: Action) {
        match action {
            Action::TakeOff => self.take_off = true,
            Action::Land => self.land = true,
            Action::Move(direction) => self.movement = Some(direction.twist(&self.speeds)),
        }
    }

    /// Parse `token` fail-soft and queue the result.
    pub fn request_token(&mut self, token: &str) -> Action {
        let action = Action::parse(token);
        self.request(action);
        action
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.take_off || self.land || self.movement.is_some()
    }

    /// Take the highest-priority pending command and drop everything else.
    pub fn dispatch(&mut self) -> Option<Actuation> {
        let actuation = if self.take_off {
            Some(Actuation::TakeOff)
        } else if self.land {
            Some(Actuation::Land)
        } else {
            self.movement.map(Actuation::Velocity)
        };
        self.take_off = false;
        self.land = false;
        self.movement = None;
        actuation
    }
}
