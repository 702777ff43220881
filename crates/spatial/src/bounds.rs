//! Axis-aligned volumes anchored on a pose.
//!
//! A box has its base at the anchor's altitude and extends upward by
//! `height`; horizontally it spans `half_size` on each side of the anchor.
//! Horizontal bounds are inclusive, the vertical range is half-open
//! `[base, base + height)`.

use crate::types::{Pose3D, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    center: Pose3D,
    half_size: f64,
    height: f64,
}

impl BoundingBox {
    /// Create a box anchored at `center`.
    ///
    /// `half_size` and `height` must be positive; configuration validation
    /// guarantees this before any box is built.
    #[must_use]
    pub fn new(center: Pose3D, half_size: f64, height: f64) -> Self {
        debug_assert!(half_size > 0.0, "half_size must be positive");
        debug_assert!(height > 0.0, "height must be positive");
        Self { center, half_size, height }
    }

    /// Re-anchor the box, typically on the marker's latest pose.
    pub fn set_dimension(&mut self, center: Pose3D, half_size: f64, height: f64) {
        *self = Self::new(center, half_size, height);
    }

    #[must_use]
    pub fn center(&self) -> &Pose3D {
        &self.center
    }

    #[must_use]
    pub fn half_size(&self) -> f64 {
        self.half_size
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Lowest altitude inside the box.
    #[must_use]
    pub fn base(&self) -> f64 {
        self.center.position.z
    }

    /// First altitude above the box.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.center.position.z + self.height
    }

    #[must_use]
    pub fn contains(&self, point: &Vec3) -> bool {
        let c = &self.center.position;
        (point.x - c.x).abs() <= self.half_size
            && (point.y - c.y).abs() <= self.half_size
            && point.z >= self.base()
            && point.z < self.top()
    }

    /// True when every point of `inner` is also a point of `self`.
    #[must_use]
    pub fn encloses(&self, inner: &BoundingBox) -> bool {
        let c = &self.center.position;
        let ic = &inner.center.position;
        ic.x - inner.half_size >= c.x - self.half_size
            && ic.x + inner.half_size <= c.x + self.half_size
            && ic.y - inner.half_size >= c.y - self.half_size
            && ic.y + inner.half_size <= c.y + self.half_size
            && inner.base() >= self.base()
            && inner.top() <= self.top()
    }
}
