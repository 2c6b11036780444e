//! Per-point surface normal estimation and direction utilities.
//!
//! Normals come from a PCA plane fit: the covariance of a point's
//! neighborhood is eigendecomposed and the eigenvector of the smallest
//! eigenvalue is the surface normal. The sign of that eigenvector is
//! arbitrary, so every consumer in this crate treats directions modulo sign.

use glam::{DMat3, DQuat, DVec3};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use rayon::prelude::*;

use crate::config::NormalParams;
use crate::octree::{Kernel, Octree};

/// Estimate a unit normal for every point, in parallel.
///
/// Points with fewer than `params.min_neighbors` neighbors inside the
/// `params.radius` sphere get the zero vector, meaning "unknown".
pub fn estimate_normals(points: &[DVec3], octree: &Octree, params: &NormalParams) -> Vec<DVec3> {
  let kernel = Kernel::Sphere {
    radius: params.radius,
  };

  points
    .par_iter()
    .map(|&p| {
      let neighbors = octree.search(p, &kernel);
      if neighbors.len() < params.min_neighbors {
        return DVec3::ZERO;
      }

      let mut centroid = Vector3::zeros();
      for &i in &neighbors {
        let q = points[i as usize];
        centroid += Vector3::new(q.x, q.y, q.z);
      }
      centroid /= neighbors.len() as f64;

      let mut cov = Matrix3::zeros();
      for &i in &neighbors {
        let q = points[i as usize];
        let d = Vector3::new(q.x, q.y, q.z) - centroid;
        cov += d * d.transpose();
      }
      cov /= neighbors.len() as f64;

      // The eigenvector of the smallest eigenvalue spans the direction of
      // least spread, i.e. the plane normal.
      let eigen = SymmetricEigen::new(cov);
      let mut min_idx = 0;
      for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
          min_idx = i;
        }
      }
      let n = eigen.eigenvectors.column(min_idx);
      DVec3::new(n[0], n[1], n[2]).normalize_or_zero()
    })
    .collect()
}

/// Sign-folded unit mean of a direction collection.
///
/// Each vector is flipped into the hemisphere of the running sum before
/// accumulation, so the ± ambiguity of eigen-based normals cannot cancel
/// the mean. Empty or degenerate input yields the zero vector.
pub fn unit_mean(vectors: &[DVec3]) -> DVec3 {
  let mut sum = DVec3::ZERO;
  for &v in vectors {
    if sum.dot(v) < 0.0 {
      sum -= v;
    } else {
      sum += v;
    }
  }
  sum.normalize_or_zero()
}

/// Sign-agnostic angle between two directions, folded into `[0, π/2]`.
///
/// Returns `π/2` (maximally incoherent) for zero-length input.
#[inline]
pub fn acute_angle(a: DVec3, b: DVec3) -> f64 {
  let denom = a.length() * b.length();
  if denom == 0.0 {
    return std::f64::consts::FRAC_PI_2;
  }
  (a.dot(b).abs() / denom).clamp(0.0, 1.0).acos()
}

/// Rotation matrix mapping the unit direction `n` onto +Z.
///
/// Used to express a face in its own plane: rotate the face points, take
/// the axis-aligned box, and its Z extent becomes the face thickness.
pub fn rotation_to_z(n: DVec3) -> DMat3 {
  DMat3::from_quat(DQuat::from_rotation_arc(n.normalize(), DVec3::Z))
}

#[cfg(test)]
#[path = "normals_test.rs"]
mod normals_test;
