//! Discrete action vocabulary understood by the environment.

use serde::{Deserialize, Serialize};
use spatial::{Twist, Vec3};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Forward,
    Backward,
    LeftForward,
    RightForward,
    LeftBackward,
    RightBackward,
    Ascend,
    Descend,
    RotateLeft,
    RotateRight,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move(Direction),
    TakeOff,
    Land,
}

/// Speeds used when turning a move into a velocity command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSpeeds {
    pub velocity: f64,
    pub descend_velocity: f64,
}

impl Default for ActionSpeeds {
    fn default() -> Self {
        Self { velocity: 0.5, descend_velocity: 0.2 }
    }
}

impl Direction {
    /// Velocity for this direction. Body axes: forward is +x, left is +y,
    /// up is +z, and a left rotation is a positive yaw rate.
    #[must_use]
    pub fn twist(self, speeds: &ActionSpeeds) -> Twist {
        let v = speeds.velocity;
        let (linear, yaw_rate) = match self {
            Direction::Left => (Vec3::new(0.0, v, 0.0), 0.0),
            Direction::Right => (Vec3::new(0.0, -v, 0.0), 0.0),
            Direction::Forward => (Vec3::new(v, 0.0, 0.0), 0.0),
            Direction::Backward => (Vec3::new(-v, 0.0, 0.0), 0.0),
            Direction::LeftForward => (Vec3::new(v, v, 0.0), 0.0),
            Direction::RightForward => (Vec3::new(v, -v, 0.0), 0.0),
            Direction::LeftBackward => (Vec3::new(-v, v, 0.0), 0.0),
            Direction::RightBackward => (Vec3::new(-v, -v, 0.0), 0.0),
            Direction::Ascend => (Vec3::new(0.0, 0.0, v), 0.0),
            Direction::Descend => (Vec3::new(0.0, 0.0, -speeds.descend_velocity), 0.0),
            Direction::RotateLeft => (Vec3::ZERO, v),
            Direction::RotateRight => (Vec3::ZERO, -v),
            Direction::Stop => (Vec3::ZERO, 0.0),
        };
        Twist::new(linear, Vec3::new(0.0, 0.0, yaw_rate))
    }
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::Move(Direction::Left),
        Action::Move(Direction::Right),
        Action::Move(Direction::Forward),
        Action::Move(Direction::Backward),
        Action::Move(Direction::LeftForward),
        Action::Move(Direction::RightForward),
        Action::Move(Direction::LeftBackward),
        Action::Move(Direction::RightBackward),
        Action::Move(Direction::Ascend),
        Action::Move(Direction::Descend),
        Action::Move(Direction::RotateLeft),
        Action::Move(Direction::RotateRight),
        Action::Move(Direction::Stop),
        Action::TakeOff,
        Action::Land,
    ];

    /// Strict parse; `None` for anything outside the vocabulary.
    #[must_use]
    pub fn try_parse(token: &str) -> Option<Action> {
        let action = match token.trim() {
            "left" => Action::Move(Direction::Left),
            "right" => Action::Move(Direction::Right),
            "forward" => Action::Move(Direction::Forward),
            "backward" => Action::Move(Direction::Backward),
            "left_forward" => Action::Move(Direction::LeftForward),
            "right_forward" => Action::Move(Direction::RightForward),
            "left_backward" => Action::Move(Direction::LeftBackward),
            "right_backward" => Action::Move(Direction::RightBackward),
            "ascend" => Action::Move(Direction::Ascend),
            "descend" => Action::Move(Direction::Descend),
            "rotate_left" => Action::Move(Direction::RotateLeft),
            "rotate_right" => Action::Move(Direction::RotateRight),
            "stop" => Action::Move(Direction::Stop),
            "takeoff" | "take_off" => Action::TakeOff,
            "land" => Action::Land,
            _ => return None,
        };
        Some(action)
    }

    /// Fail-soft parse: unknown tokens become a stop.
    #[must_use]
    pub fn parse(token: &str) -> Action {
        Self::try_parse(token).unwrap_or_else(|| {
            warn!("Unrecognized command `{token}`, treating it as stop");
            Action::Move(Direction::Stop)
        })
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Action::Move(Direction::Left) => "left",
            Action::Move(Direction::Right) => "right",
            Action::Move(Direction::Forward) => "forward",
            Action::Move(Direction::Backward) => "backward",
            Action::Move(Direction::LeftForward) => "left_forward",
            Action::Move(Direction::RightForward) => "right_forward",
            Action::Move(Direction::LeftBackward) => "left_backward",
            Action::Move(Direction::RightBackward) => "right_backward",
            Action::Move(Direction::Ascend) => "ascend",
            Action::Move(Direction::Descend) => "descend",
            Action::Move(Direction::RotateLeft) => "rotate_left",
            Action::Move(Direction::RotateRight) => "rotate_right",
            Action::Move(Direction::Stop) => "stop",
            Action::TakeOff => "takeoff",
            Action::Land => "land",
        }
    }
}
