//! Tuning parameters for the characterization pipeline.
//!
//! All distances are in millimeters, all angles in radians. The defaults
//! target tabletop-scale scenes a few meters from the sensor; every knob is
//! a free parameter.

use serde::{Deserialize, Serialize};

use crate::octree::OctreeParams;

/// Parameters for the spatial DBSCAN pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
  /// Neighborhood radius for density connectivity (mm).
  pub proximity: f64,
  /// Minimum neighborhood size (including the query point) for a core point.
  pub min_points: usize,
}

impl Default for ClusterParams {
  fn default() -> Self {
    Self {
      proximity: 50.0,
      min_points: 10,
    }
  }
}

/// Parameters for the normal-coherent DBSCAN pass that extracts faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceParams {
  /// Neighborhood radius for face connectivity (mm).
  pub proximity: f64,
  /// Minimum coherent neighborhood size for a face core point.
  pub min_points: usize,
  /// Maximum angle between a seed normal and a candidate normal (rad).
  pub max_normal_angle: f64,
  /// Maximum angle between the running mean normal and a candidate (rad).
  pub max_mean_angle: f64,
  /// Stricter mean-only threshold that admits a candidate even when the
  /// pair test fails (rad).
  pub max_mean_angle_single: f64,
}

impl Default for FaceParams {
  fn default() -> Self {
    Self {
      proximity: 25.0,
      min_points: 10,
      max_normal_angle: 30f64.to_radians(),
      max_mean_angle: 30f64.to_radians(),
      max_mean_angle_single: 15f64.to_radians(),
    }
  }
}

/// Parameters for per-point surface normal estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
  /// Radius of the neighborhood sphere used for the covariance fit (mm).
  pub radius: f64,
  /// Minimum neighborhood size below which the normal is left unknown.
  /// Must be at least 3 for the plane fit to be meaningful.
  pub min_neighbors: usize,
}

impl Default for NormalParams {
  fn default() -> Self {
    Self {
      radius: 20.0,
      min_neighbors: 4,
    }
  }
}

/// Tolerances for object-to-model comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareParams {
  /// Maximum in-plane extent delta for a face pair to count as similar (mm).
  pub max_extent_delta: f64,
  /// Maximum thickness delta for a face pair to count as similar (mm).
  pub max_thickness_delta: f64,
  /// Maximum per-axis delta between the overall bounding boxes (mm).
  pub max_bbox_delta: f64,
}

impl Default for CompareParams {
  fn default() -> Self {
    Self {
      max_extent_delta: 10.0,
      max_thickness_delta: 10.0,
      max_bbox_delta: 20.0,
    }
  }
}

/// Aggregated configuration for the full pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
  pub cluster: ClusterParams,
  pub face: FaceParams,
  pub normal: NormalParams,
  pub octree: OctreeParams,
  pub compare: CompareParams,
}

impl PipelineConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_cluster(mut self, cluster: ClusterParams) -> Self {
    self.cluster = cluster;
    self
  }

  pub fn with_face(mut self, face: FaceParams) -> Self {
    self.face = face;
    self
  }

  pub fn with_normal(mut self, normal: NormalParams) -> Self {
    self.normal = normal;
    self
  }

  pub fn with_octree(mut self, octree: OctreeParams) -> Self {
    self.octree = octree;
    self
  }

  pub fn with_compare(mut self, compare: CompareParams) -> Self {
    self.compare = compare;
    self
  }
}
