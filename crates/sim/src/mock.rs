use crate::{Actuation, SimError, Simulator};
use parking_lot::Mutex;
use spatial::{quaternion_from_euler, yaw_of, Pose3D, Twist};
use std::collections::HashMap;
use tracing::debug;

/// Altitude a take-off climbs to above the ground.
const TAKEOFF_ALTITUDE: f64 = 1.0;

struct MockState {
    poses: HashMap<String, Pose3D>,
    velocity: Twist,
    airborne: bool,
    published: Vec<Actuation>,
    failing_queries: usize,
    unavailable: bool,
}

/// In-process simulator.
///
/// Objects are plain named poses. One of them is the vehicle, which
/// [`MockSim::advance`] moves with the last published velocity while it is
/// airborne. Every actuation is recorded so tests can inspect exactly what
/// was sent.
pub struct MockSim {
    vehicle: String,
    ground_level: f64,
    state: Mutex<MockState>,
}

impl MockSim {
    #[must_use]
    pub fn new(vehicle: impl Into<String>) -> Self {
        Self {
            vehicle: vehicle.into(),
            ground_level: 0.0,
            state: Mutex::new(MockState {
                poses: HashMap::new(),
                velocity: Twist::ZERO,
                airborne: false,
                published: Vec::new(),
                failing_queries: 0,
                unavailable: false,
            }),
        }
    }

    #[must_use]
    pub fn with_object(self, name: impl Into<String>, pose: Pose3D) -> Self {
        self.place(name, pose);
        self
    }

    /// Put (or move) an object without going through `set_pose`.
    pub fn place(&self, name: impl Into<String>, pose: Pose3D) {
        self.state.lock().poses.insert(name.into(), pose);
    }

    /// Pose as stored, bypassing failure injection.
    #[must_use]
    pub fn pose_of(&self, name: &str) -> Option<Pose3D> {
        self.state.lock().poses.get(name).copied()
    }

    #[must_use]
    pub fn published(&self) -> Vec<Actuation> {
        self.state.lock().published.clone()
    }

    pub fn clear_published(&self) {
        self.state.lock().published.clear();
    }

    /// Make the next `count` pose queries fail.
    pub fn fail_next_queries(&self, count: usize) {
        self.state.lock().failing_queries = count;
    }

    /// Make every call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    #[must_use]
    pub fn is_airborne(&self) -> bool {
        self.state.lock().airborne
    }

    /// Integrate the vehicle's motion over `dt` seconds.
    ///
    /// Linear velocity is applied in the world frame, angular z rotates the
    /// heading. The vehicle cannot sink below the ground.
    pub fn advance(&self, dt: f64) {
        let mut state = self.state.lock();
        if !state.airborne {
            return;
        }
        let velocity = state.velocity;
        let ground = self.ground_level;
        if let Some(pose) = state.poses.get_mut(&self.vehicle) {
            pose.position = pose.position + velocity.linear * dt;
            pose.position.z = pose.position.z.max(ground);
            let yaw = yaw_of(pose.orientation) + velocity.angular.z * dt;
            pose.orientation = quaternion_from_euler(0.0, 0.0, yaw);
        }
    }

    fn check_available(state: &MockState) -> Result<(), SimError> {
        if state.unavailable {
            Err(SimError::Unavailable("mock simulator switched off".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Simulator for MockSim {
    fn get_pose(&self, object: &str) -> Result<Pose3D, SimError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        if state.failing_queries > 0 {
            state.failing_queries -= 1;
            return Err(SimError::Unavailable(format!("injected failure querying `{object}`")));
        }
        state
            .poses
            .get(object)
            .copied()
            .ok_or_else(|| SimError::UnknownObject(object.to_string()))
    }

    fn set_pose(&self, object: &str, pose: Pose3D, twist: Twist) -> Result<(), SimError> {
        let mut state = self.state.lock();
        Self::check_available(&state)?;
        if !state.poses.contains_key(object) {
            return Err(SimError::UnknownObject(object.to_string()));
        }
        state.poses.insert(object.to_string(), pose);
        if object == self.vehicle {
            state.velocity = twist;
            state.airborne = pose.position.z > self.ground_level;
        }
        debug!(object, ?pose, "mock pose set");
        Ok(())
    }

    fn publish_velocity(&self, command: Twist) -> Result<(), SimError> {
        let mut state = self.state.lock();
        if state.unavailable {
            return Err(SimError::PublishFailed("velocity"));
        }
        state.velocity = command;
        state.published.push(Actuation::Velocity(command));
        Ok(())
    }

    fn publish_takeoff(&self) -> Result<(), SimError> {
        let mut state = self.state.lock();
        if state.unavailable {
            return Err(SimError::PublishFailed("takeoff"));
        }
        state.published.push(Actuation::TakeOff);
        state.airborne = true;
        state.velocity = Twist::ZERO;
        let floor = self.ground_level + TAKEOFF_ALTITUDE;
        if let Some(pose) = state.poses.get_mut(&self.vehicle) {
            pose.position.z = pose.position.z.max(floor);
        }
        Ok(())
    }

    fn publish_land(&self) -> Result<(), SimError> {
        let mut state = self.state.lock();
        if state.unavailable {
            return Err(SimError::PublishFailed("land"));
        }
        state.published.push(Actuation::Land);
        state.airborne = false;
        state.velocity = Twist::ZERO;
        let ground = self.ground_level;
        if let Some(pose) = state.poses.get_mut(&self.vehicle) {
            pose.position.z = ground;
        }
        Ok(())
    }
}
