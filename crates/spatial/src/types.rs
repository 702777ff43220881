use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Distance in the x/y plane, ignoring altitude.
    #[must_use]
    pub fn horizontal_distance(&self, other: &Vec3) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Orientation as reported by the simulator. Not normalized here; whoever
/// produces the quaternion owns that.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<glam::DQuat> for Quaternion {
    fn from(q: glam::DQuat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::DQuat {
    fn from(q: Quaternion) -> Self {
        glam::DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose3D {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl Pose3D {
    #[must_use]
    pub const fn new(position: Vec3, orientation: Quaternion) -> Self {
        Self { position, orientation }
    }

    /// Pose at `position` with identity orientation.
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self { position, orientation: Quaternion::IDENTITY }
    }

    /// Position of `self` expressed relative to `reference`'s position.
    /// Orientation is not taken into account.
    #[must_use]
    pub fn relative_to(&self, reference: &Pose3D) -> Vec3 {
        self.position - reference.position
    }
}

/// Linear and angular velocity. The simulator expects a zero twist when an
/// object is teleported.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Twist {
    pub const ZERO: Self = Self { linear: Vec3::ZERO, angular: Vec3::ZERO };

    #[must_use]
    pub const fn new(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}
