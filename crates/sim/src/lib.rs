#![deny(clippy::all, clippy::pedantic)]
//! # Simulator Boundary
//!
//! The environment never talks to a physics engine directly. Everything it
//! needs from the simulator goes through the [`Simulator`] trait: reading an
//! object's pose, teleporting an object, and publishing one of the three
//! actuation messages the vehicle understands.
//!
//! Backends implement the trait for whatever transport they sit on. The
//! `mock` feature provides [`MockSim`], an in-process backend with crude
//! kinematics and failure injection, used by the tests and the demo runtime.

use spatial::{Pose3D, Twist};
use thiserror::Error;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockSim;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("unknown object `{0}`")]
    UnknownObject(String),
    #[error("simulator unavailable: {0}")]
    Unavailable(String),
    #[error("failed to publish {0}")]
    PublishFailed(&'static str),
}

/// The single command sent to the vehicle in a control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Actuation {
    TakeOff,
    Land,
    Velocity(Twist),
}

impl Actuation {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Actuation::TakeOff => "takeoff",
            Actuation::Land => "land",
            Actuation::Velocity(_) => "velocity",
        }
    }
}

pub trait Simulator: Send + Sync + 'static {
    /// Latest pose of the named object in the world frame.
    ///
    /// # Errors
    /// Returns `SimError` when the object is unknown or the simulator cannot
    /// be reached.
    fn get_pose(&self, object: &str) -> Result<Pose3D, SimError>;

    /// Teleport the named object. `twist` is the velocity it keeps afterwards,
    /// normally [`Twist::ZERO`].
    ///
    /// # Errors
    /// Returns `SimError` when the object is unknown or the simulator cannot
    /// be reached.
    fn set_pose(&self, object: &str, pose: Pose3D, twist: Twist) -> Result<(), SimError>;

    /// # Errors
    /// Returns `SimError::PublishFailed` if the message could not be sent.
    fn publish_velocity(&self, command: Twist) -> Result<(), SimError>;

    /// # Errors
    /// Returns `SimError::PublishFailed` if the message could not be sent.
    fn publish_takeoff(&self) -> Result<(), SimError>;

    /// # Errors
    /// Returns `SimError::PublishFailed` if the message could not be sent.
    fn publish_land(&self) -> Result<(), SimError>;

    /// Route an [`Actuation`] to the matching publish call.
    ///
    /// # Errors
    /// Propagates the error of the underlying publish call.
    fn publish(&self, actuation: &Actuation) -> Result<(), SimError> {
        match actuation {
            Actuation::TakeOff => self.publish_takeoff(),
            Actuation::Land => self.publish_land(),
            Actuation::Velocity(twist) => self.publish_velocity(*twist),
        }
    }
}
