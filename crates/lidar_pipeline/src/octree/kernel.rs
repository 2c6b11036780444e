//! Query kernels: the shape of an octree neighborhood.

use glam::DVec3;

/// Shape of a neighborhood query, placed at a query center.
#[derive(Debug, Clone, PartialEq)]
pub enum Kernel {
  /// Euclidean ball: `||p - center|| <= radius`.
  Sphere { radius: f64 },
  /// Axis-aligned cube: every coordinate within `radius` of the center.
  Cube { radius: f64 },
  /// Oriented cylinder: within `radius` radially of the axis line and
  /// within `half_height` axially on either side of the center. The axis
  /// must be a unit vector.
  Cylinder {
    axis: DVec3,
    radius: f64,
    half_height: f64,
  },
}

impl Kernel {
  /// Axis-aligned envelope of the kernel, used for tree pruning.
  pub fn envelope(&self, center: DVec3) -> (DVec3, DVec3) {
    let extent = match *self {
      Kernel::Sphere { radius } | Kernel::Cube { radius } => DVec3::splat(radius),
      Kernel::Cylinder {
        axis,
        radius,
        half_height,
      } => {
        // Per axis: the disc contributes radius*sqrt(1 - a²), the height
        // contributes half_height*|a|.
        let a = axis.abs();
        DVec3::new(
          radius * (1.0 - a.x * a.x).max(0.0).sqrt() + half_height * a.x,
          radius * (1.0 - a.y * a.y).max(0.0).sqrt() + half_height * a.y,
          radius * (1.0 - a.z * a.z).max(0.0).sqrt() + half_height * a.z,
        )
      }
    };
    (center - extent, center + extent)
  }

  /// Exact membership test for a point relative to the query center.
  #[inline]
  pub fn contains(&self, center: DVec3, p: DVec3) -> bool {
    let d = p - center;
    match *self {
      Kernel::Sphere { radius } => d.length_squared() <= radius * radius,
      Kernel::Cube { radius } => d.abs().max_element() <= radius,
      Kernel::Cylinder {
        axis,
        radius,
        half_height,
      } => {
        let axial = d.dot(axis);
        if axial.abs() > half_height {
          return false;
        }
        (d - axial * axis).length_squared() <= radius * radius
      }
    }
  }
}
