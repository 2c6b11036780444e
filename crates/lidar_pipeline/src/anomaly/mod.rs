//! Object-to-model comparison and anomaly reporting.
//!
//! Faces are matched greedily: object faces in descending area order each
//! claim the unclaimed model face with the closest dimensions. In-plane
//! extents are compared sorted, so a face rotated a quarter turn within its
//! own plane still matches its counterpart. The greedy assignment is a
//! heuristic; reports stay meaningful even when it is not globally optimal.

use serde::Serialize;
use tracing::debug;

use crate::characterize::{CharacterizedObject, Face, Model};
use crate::config::CompareParams;

/// Comparison of the two overall bounding boxes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoxComparison {
  pub object_extents: glam::DVec3,
  pub model_extents: glam::DVec3,
  /// Per-axis absolute extent difference.
  pub extent_delta: glam::DVec3,
  pub similar: bool,
}

/// One matched object/model face pair.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceComparison {
  pub object_face: usize,
  pub model_face: usize,
  pub object_area: f64,
  pub model_area: f64,
  /// Absolute differences of the sorted in-plane extents.
  pub extent_delta: [f64; 2],
  /// Absolute difference of the out-of-plane extents.
  pub thickness_delta: f64,
  /// All deltas within the configured tolerances.
  pub similar: bool,
}

/// Aggregate result of comparing an object against a model.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyReport {
  /// True iff both sides have faces, every face found a partner, and every
  /// pair is individually similar.
  pub similar: bool,
  pub general: BoxComparison,
  /// `model face count - object face count`.
  pub delta_faces: i64,
  /// Matched pairs, ordered by object face index.
  pub face_comparisons: Vec<FaceComparison>,
  /// Model faces no object face claimed.
  pub unmatched_model_faces: Vec<usize>,
  /// Object faces left over when the model ran out of faces.
  pub unmatched_object_faces: Vec<usize>,
}

/// Compare a characterized object against a model.
pub fn compare(object: &CharacterizedObject, model: &Model, params: &CompareParams) -> AnomalyReport {
  let general = compare_boxes(object, model, params);

  // Largest object faces pick first.
  let mut order: Vec<usize> = (0..object.faces.len()).collect();
  order.sort_by(|&a, &b| {
    object.faces[b]
      .area()
      .partial_cmp(&object.faces[a].area())
      .unwrap_or(std::cmp::Ordering::Equal)
      .then(a.cmp(&b))
  });

  let mut claimed = vec![false; model.faces.len()];
  let mut face_comparisons = Vec::new();
  let mut unmatched_object_faces = Vec::new();

  for oi in order {
    let Some(mi) = closest_unclaimed(&object.faces[oi], &model.faces, &claimed) else {
      unmatched_object_faces.push(oi);
      continue;
    };
    claimed[mi] = true;
    face_comparisons.push(compare_faces(oi, mi, &object.faces[oi], &model.faces[mi], params));
  }

  face_comparisons.sort_by_key(|p| p.object_face);
  unmatched_object_faces.sort_unstable();
  let unmatched_model_faces: Vec<usize> = claimed
    .iter()
    .enumerate()
    .filter(|&(_, &c)| !c)
    .map(|(i, _)| i)
    .collect();

  let delta_faces = model.faces.len() as i64 - object.faces.len() as i64;
  let similar = !object.faces.is_empty()
    && delta_faces == 0
    && unmatched_model_faces.is_empty()
    && unmatched_object_faces.is_empty()
    && face_comparisons.iter().all(|p| p.similar);

  debug!(
    similar,
    delta_faces,
    face_comparisons = face_comparisons.len(),
    "anomaly comparison finished"
  );

  AnomalyReport {
    similar,
    general,
    delta_faces,
    face_comparisons,
    unmatched_model_faces,
    unmatched_object_faces,
  }
}

fn compare_boxes(
  object: &CharacterizedObject,
  model: &Model,
  params: &CompareParams,
) -> BoxComparison {
  let object_extents = object.bbox.delta();
  let model_extents = model.bbox.delta();
  let extent_delta = (object_extents - model_extents).abs();
  BoxComparison {
    object_extents,
    model_extents,
    extent_delta,
    similar: extent_delta.max_element() <= params.max_bbox_delta,
  }
}

/// Dimensional distance between two faces over their sorted in-plane
/// extents.
fn face_distance(a: &Face, b: &Face) -> f64 {
  let ea = a.sorted_extents();
  let eb = b.sorted_extents();
  (ea[0] - eb[0]).abs() + (ea[1] - eb[1]).abs()
}

/// Index of the dimensionally closest unclaimed model face; ties keep the
/// lowest index.
fn closest_unclaimed(face: &Face, model_faces: &[Face], claimed: &[bool]) -> Option<usize> {
  let mut best: Option<(usize, f64)> = None;
  for (mi, mf) in model_faces.iter().enumerate() {
    if claimed[mi] {
      continue;
    }
    let d = face_distance(face, mf);
    if best.map_or(true, |(_, bd)| d < bd) {
      best = Some((mi, d));
    }
  }
  best.map(|(mi, _)| mi)
}

fn compare_faces(
  oi: usize,
  mi: usize,
  of: &Face,
  mf: &Face,
  params: &CompareParams,
) -> FaceComparison {
  let oe = of.sorted_extents();
  let me = mf.sorted_extents();
  let extent_delta = [(oe[0] - me[0]).abs(), (oe[1] - me[1]).abs()];
  let thickness_delta = (of.thickness() - mf.thickness()).abs();
  let similar = extent_delta[0] <= params.max_extent_delta
    && extent_delta[1] <= params.max_extent_delta
    && thickness_delta <= params.max_thickness_delta;

  FaceComparison {
    object_face: oi,
    model_face: mi,
    object_area: of.area(),
    model_area: mf.area(),
    extent_delta,
    thickness_delta,
    similar,
  }
}
