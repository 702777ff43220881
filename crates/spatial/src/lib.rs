#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Spatial Primitives
//!
//! Geometry shared by every other crate of the landing environment.
//!
//! The simulator reports object poses as a position plus an orientation
//! quaternion. Episode bookkeeping only ever needs a handful of operations on
//! top of that: relative positions, horizontal distances, and containment in
//! the axis-aligned volumes that hang above the landing marker.
//!
//! ## Key Components
//!
//! -   **Poses:** [`Vec3`], [`Quaternion`], [`Pose3D`] and [`Twist`] live in
//!     the [`types`] module. They are plain `Copy` values so a tick can take
//!     an immutable snapshot of the world without borrowing anything.
//! -   **Volumes:** [`BoundingBox`] in the [`bounds`] module is anchored at a
//!     pose and re-centred every tick on the marker.
//! -   **Orientation helpers:** the [`transform`] module converts yaw/pitch/
//!     roll angles into quaternions through `glam`.
//!
//! ## Usage
//!
//! ```rust
//! use spatial::{BoundingBox, Pose3D, Vec3};
//!
//! let marker = Pose3D::from_position(Vec3::new(1.0, 2.0, 0.0));
//! let landing = BoundingBox::new(marker, 0.75, 1.5);
//! assert!(landing.contains(&Vec3::new(1.5, 2.0, 1.0)));
//! assert!(!landing.contains(&Vec3::new(1.5, 2.0, 1.5)));
//! ```

pub mod bounds;
pub mod transform;
pub mod types;

pub use bounds::BoundingBox;
pub use transform::{quaternion_from_euler, yaw_of};
pub use types::{Pose3D, Quaternion, Twist, Vec3};
