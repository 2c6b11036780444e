//! Normal-coherent DBSCAN: splits an object into planar faces.

use glam::DVec3;

use super::ClusterTag;
use crate::config::FaceParams;
use crate::geometry::{acute_angle, unit_mean};
use crate::octree::{Kernel, Octree};

/// A cluster of points deemed coplanar.
pub struct FaceCluster {
  /// Member indices into the clustered slice, sorted ascending, no
  /// duplicates.
  pub indices: Vec<u32>,
  /// Sign-folded unit mean of the members' normals.
  pub normal: DVec3,
}

/// Cluster points whose normals agree with their neighborhood.
///
/// Same worklist skeleton as the spatial variant, but a candidate neighbor
/// only counts when its normal passes the angular test against the seed's
/// normal and the expanding cluster's running mean normal. Points with an
/// unknown (zero) normal neither seed nor join faces.
///
/// `normals` must be parallel to `points`; the `octree` must index `points`.
pub fn extract_faces(
  points: &[DVec3],
  octree: &Octree,
  normals: &[DVec3],
  params: &FaceParams,
) -> Vec<FaceCluster> {
  debug_assert_eq!(points.len(), normals.len());

  let mut tags = vec![ClusterTag::Unclassified; points.len()];
  let mut faces = Vec::new();

  for i in 0..points.len() {
    if tags[i] != ClusterTag::Unclassified || normals[i] == DVec3::ZERO {
      continue;
    }
    let id = faces.len() as u32;
    if let Some(face) = expand_face(i as u32, id, points, octree, normals, params, &mut tags) {
      faces.push(face);
    }
  }

  faces
}

fn expand_face(
  seed: u32,
  id: u32,
  points: &[DVec3],
  octree: &Octree,
  normals: &[DVec3],
  params: &FaceParams,
  tags: &mut [ClusterTag],
) -> Option<FaceCluster> {
  // The running mean starts as the seed's own normal. Seeding counts only
  // the still-claimable coherent neighbors; the expansion check below uses
  // the full coherent count.
  let (_, candidates) = coherent_neighbors(
    seed,
    normals[seed as usize],
    points,
    octree,
    normals,
    params,
    tags,
  );
  if candidates.len() < params.min_points {
    tags[seed as usize] = ClusterTag::Noise;
    return None;
  }

  let mut members = Vec::with_capacity(candidates.len());
  let mut member_normals = Vec::with_capacity(candidates.len());
  let mut queue = Vec::with_capacity(candidates.len());
  for &n in &candidates {
    tags[n as usize] = ClusterTag::Member(id);
    members.push(n);
    member_normals.push(normals[n as usize]);
    if n != seed {
      queue.push(n);
    }
  }

  let mut head = 0;
  while head < queue.len() {
    let current = queue[head];
    head += 1;

    // Recomputed over everything absorbed so far.
    let mean = unit_mean(&member_normals);

    let (count, candidates) =
      coherent_neighbors(current, mean, points, octree, normals, params, tags);
    if count < params.min_points {
      continue;
    }
    for &n in &candidates {
      let was_unclassified = tags[n as usize] == ClusterTag::Unclassified;
      tags[n as usize] = ClusterTag::Member(id);
      members.push(n);
      member_normals.push(normals[n as usize]);
      if was_unclassified {
        queue.push(n);
      }
    }
  }

  members.sort_unstable();
  members.dedup();

  let normal = unit_mean(&member_normals);
  Some(FaceCluster {
    indices: members,
    normal,
  })
}

/// Neighborhood of `center` filtered by the two-part angular test.
///
/// Returns the count of coherent neighbors (claimed or not, for the density
/// threshold) and the still-claimable ones. A candidate passes when either
/// the pair test holds (close to both the center's normal and the mean) or
/// it is within the stricter mean-only threshold.
fn coherent_neighbors(
  center: u32,
  mean: DVec3,
  points: &[DVec3],
  octree: &Octree,
  normals: &[DVec3],
  params: &FaceParams,
  tags: &[ClusterTag],
) -> (usize, Vec<u32>) {
  let kernel = Kernel::Sphere {
    radius: params.proximity,
  };
  let center_normal = normals[center as usize];

  let mut count = 0;
  let mut claimable = Vec::new();
  for i in octree.search(points[center as usize], &kernel) {
    let nq = normals[i as usize];
    if nq == DVec3::ZERO {
      continue;
    }
    let mean_angle = acute_angle(mean, nq);
    let pair = acute_angle(center_normal, nq) <= params.max_normal_angle
      && mean_angle <= params.max_mean_angle;
    if pair || mean_angle <= params.max_mean_angle_single {
      count += 1;
      if tags[i as usize].is_unassigned() {
        claimable.push(i);
      }
    }
  }

  (count, claimable)
}

#[cfg(test)]
#[path = "planar_test.rs"]
mod planar_test;
