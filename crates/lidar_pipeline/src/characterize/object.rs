//! Characterized objects and the finalization pipeline.

use std::time::Instant;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::{cluster, extract_faces};
use crate::config::PipelineConfig;
use crate::geometry::{estimate_normals, rotation_to_z, Aabb};
use crate::octree::Octree;

/// A near-planar surface of an object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Face {
  /// Member indices into the owning object's point buffer, sorted
  /// ascending, no duplicates.
  pub indices: Vec<u32>,
  /// Unit mean normal of the face.
  pub normal: DVec3,
  /// Box of the face points rotated so `normal` aligns with +Z: X/Y extents
  /// are the in-plane rectangle, the Z extent is the thickness.
  pub bbox: Aabb,
}

impl Face {
  /// In-plane area (product of the two in-plane extents).
  pub fn area(&self) -> f64 {
    let d = self.bbox.delta();
    d.x * d.y
  }

  /// Out-of-plane extent.
  pub fn thickness(&self) -> f64 {
    self.bbox.delta().z
  }

  /// The two in-plane extents, smaller first. Comparisons use this so a
  /// face rotated 90° in its own plane still matches.
  pub fn sorted_extents(&self) -> [f64; 2] {
    let d = self.bbox.delta();
    if d.x <= d.y {
      [d.x, d.y]
    } else {
      [d.y, d.x]
    }
  }
}

/// An object distilled from one capture frame: the points of its dominant
/// cluster, the planar faces found among them, and the overall box.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterizedObject {
  pub points: Vec<DVec3>,
  pub faces: Vec<Face>,
  pub bbox: Aabb,
}

/// A reference instance kept for comparison. Structurally identical to a
/// characterized object.
pub type Model = CharacterizedObject;

/// Per-stage timings and counts from one finalization run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterizeStats {
  pub input_points: usize,
  pub kept_points: usize,
  pub face_count: usize,
  pub cluster_us: u64,
  pub normals_us: u64,
  pub faces_us: u64,
  pub total_us: u64,
}

/// Distill a captured point buffer into a characterized object.
///
/// Returns `None` when spatial clustering finds no cluster at all (nothing
/// dense enough in the frame); the caller may retry with a new frame.
pub fn characterize(points: Vec<DVec3>, config: &PipelineConfig) -> Option<CharacterizedObject> {
  characterize_timed(points, config).0
}

/// Same as [`characterize`] but returns per-stage timings.
pub fn characterize_timed(
  points: Vec<DVec3>,
  config: &PipelineConfig,
) -> (Option<CharacterizedObject>, CharacterizeStats) {
  let total_start = Instant::now();
  let mut stats = CharacterizeStats {
    input_points: points.len(),
    ..Default::default()
  };

  if points.is_empty() {
    return (None, stats);
  }

  // Stage 1: isolate the object as the largest spatial cluster.
  let stage_start = Instant::now();
  let octree = Octree::build(&points, &config.octree);
  let clustering = cluster(&points, &octree, &config.cluster);
  stats.cluster_us = stage_start.elapsed().as_micros() as u64;

  let Some(largest) = clustering.largest() else {
    debug!(input = points.len(), "no object cluster in frame");
    return (None, stats);
  };

  let mut member_indices = clustering.clusters[largest].clone();
  member_indices.sort_unstable();
  let kept: Vec<DVec3> = member_indices
    .iter()
    .map(|&i| points[i as usize])
    .collect();
  stats.kept_points = kept.len();

  // Stage 2: per-point normals over the retained set. Cluster tags from
  // stage 1 do not carry over; the face pass starts from a clean slate.
  let stage_start = Instant::now();
  let octree = Octree::build(&kept, &config.octree);
  let normals = estimate_normals(&kept, &octree, &config.normal);
  stats.normals_us = stage_start.elapsed().as_micros() as u64;

  // Stage 3: faces and their rotated boxes.
  let stage_start = Instant::now();
  let face_clusters = extract_faces(&kept, &octree, &normals, &config.face);
  let faces: Vec<Face> = face_clusters
    .into_iter()
    .map(|fc| {
      let rot = rotation_to_z(fc.normal);
      let face_points: Vec<DVec3> = fc.indices.iter().map(|&i| kept[i as usize]).collect();
      let bbox = Aabb::from_rotated_points(&face_points, &rot);
      Face {
        indices: fc.indices,
        normal: fc.normal,
        bbox,
      }
    })
    .collect();
  stats.faces_us = stage_start.elapsed().as_micros() as u64;
  stats.face_count = faces.len();

  let bbox = Aabb::from_points(&kept);
  stats.total_us = total_start.elapsed().as_micros() as u64;

  debug!(
    kept = stats.kept_points,
    faces = stats.face_count,
    total_us = stats.total_us,
    "object characterized"
  );

  (
    Some(CharacterizedObject {
      points: kept,
      faces,
      bbox,
    }),
    stats,
  )
}

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;
