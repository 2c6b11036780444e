//! Geometry primitives shared by the whole pipeline.
//!
//! Positions and direction vectors are `glam::DVec3` in millimeters. The
//! cluster membership of a point is *not* part of the geometry; clustering
//! passes keep their own tag vectors keyed by point index.

pub mod aabb;
pub mod normals;
pub mod point;
pub mod timestamp;

// Re-exports
pub use aabb::Aabb;
pub use normals::{acute_angle, estimate_normals, rotation_to_z, unit_mean};
pub use point::{approx_eq, LidarPoint};
pub use timestamp::Timestamp;
