//! Orientation utilities
//!
//! Conversions between Euler angles and the quaternions exchanged with the
//! simulator. `glam` does the actual math.

use crate::types::Quaternion;
use glam::{DQuat, EulerRot};

/// Build a quaternion from roll, pitch and yaw in radians.
///
/// Rotations are applied yaw first (about z), then pitch (about y), then roll
/// (about x), the usual aerospace convention.
#[must_use]
pub fn quaternion_from_euler(roll: f64, pitch: f64, yaw: f64) -> Quaternion {
    DQuat::from_euler(EulerRot::ZYX, yaw, pitch, roll).into()
}

/// Heading about the vertical axis, in `(-π, π]`.
#[must_use]
pub fn yaw_of(orientation: Quaternion) -> f64 {
    let q: DQuat = orientation.into();
    let (yaw, _pitch, _roll) = q.normalize().to_euler(EulerRot::ZYX);
    yaw
}
