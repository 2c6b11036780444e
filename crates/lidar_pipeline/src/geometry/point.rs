//! Raw scanner points.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// A single decoded LiDAR return.
///
/// The timestamp drives frame windowing in the ingest state machine; the
/// reflectivity (0-255) gates whether the point is kept at all.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct LidarPoint {
  pub timestamp: Timestamp,
  pub reflectivity: u8,
  /// Position in millimeters.
  pub position: DVec3,
}

impl LidarPoint {
  pub fn new(timestamp: Timestamp, reflectivity: u8, position: DVec3) -> Self {
    Self {
      timestamp,
      reflectivity,
      position,
    }
  }
}

/// Component-wise near-equality to machine epsilon.
///
/// Positions that went through the same arithmetic are compared with this
/// rather than bitwise equality.
#[inline]
pub fn approx_eq(a: DVec3, b: DVec3) -> bool {
  (a.x - b.x).abs() <= f64::EPSILON
    && (a.y - b.y).abs() <= f64::EPSILON
    && (a.z - b.z).abs() <= f64::EPSILON
}
