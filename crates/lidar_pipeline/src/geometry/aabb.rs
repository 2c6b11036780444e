//! Axis-aligned bounding boxes with cached extents.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box described by its corners and cached `delta`.
///
/// Boxes compare by volume: a face's rotated box and an object's overall
/// box are ranked by how much space they enclose, not where they sit.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Aabb {
  min: DVec3,
  max: DVec3,
  delta: DVec3,
}

impl Aabb {
  /// Create a box from min and max corners.
  pub fn new(min: DVec3, max: DVec3) -> Self {
    Self {
      min,
      max,
      delta: max - min,
    }
  }

  /// Create a box spanning `[0, delta]` on each axis.
  pub fn from_extents(delta: DVec3) -> Self {
    Self {
      min: DVec3::ZERO,
      max: delta,
      delta,
    }
  }

  /// Tight box around a point set. An empty set yields the zero box.
  pub fn from_points(points: &[DVec3]) -> Self {
    let mut iter = points.iter();
    let Some(&first) = iter.next() else {
      return Self::default();
    };
    let (mut min, mut max) = (first, first);
    for &p in iter {
      min = min.min(p);
      max = max.max(p);
    }
    Self::new(min, max)
  }

  /// Tight box around a point set after applying `rot` to every point.
  pub fn from_rotated_points(points: &[DVec3], rot: &DMat3) -> Self {
    let mut iter = points.iter();
    let Some(&first) = iter.next() else {
      return Self::default();
    };
    let first = *rot * first;
    let (mut min, mut max) = (first, first);
    for &p in iter {
      let p = *rot * p;
      min = min.min(p);
      max = max.max(p);
    }
    Self::new(min, max)
  }

  pub fn min(&self) -> DVec3 {
    self.min
  }

  pub fn max(&self) -> DVec3 {
    self.max
  }

  /// Per-axis extents (`max - min`).
  pub fn delta(&self) -> DVec3 {
    self.delta
  }

  /// Enclosed volume.
  pub fn volume(&self) -> f64 {
    self.delta.x * self.delta.y * self.delta.z
  }
}

impl PartialEq for Aabb {
  fn eq(&self, other: &Self) -> bool {
    self.volume() == other.volume()
  }
}

impl PartialOrd for Aabb {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    self.volume().partial_cmp(&other.volume())
  }
}

#[cfg(test)]
#[path = "aabb_test.rs"]
mod aabb_test;
