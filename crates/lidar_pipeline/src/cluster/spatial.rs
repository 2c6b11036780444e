//! Spatial DBSCAN over raw positions.

use glam::DVec3;

use super::ClusterTag;
use crate::config::ClusterParams;
use crate::octree::{Kernel, Octree};

/// Result of a spatial clustering pass.
pub struct SpatialClustering {
  /// Clusters as index lists into the clustered slice, in discovery order.
  pub clusters: Vec<Vec<u32>>,
  /// Final tag per point, parallel to the clustered slice.
  pub tags: Vec<ClusterTag>,
}

impl SpatialClustering {
  /// Index of the largest cluster by point count; ties keep the earlier
  /// cluster id.
  pub fn largest(&self) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in self.clusters.iter().enumerate() {
      if best.map_or(true, |b| c.len() > self.clusters[b].len()) {
        best = Some(i);
      }
    }
    best
  }
}

/// Standard DBSCAN with a non-recursive seed-expansion worklist.
///
/// Iteration follows the array order of `points`, which makes cluster id
/// assignment deterministic for a fixed input order. The `octree` must have
/// been built over the same slice.
pub fn cluster(points: &[DVec3], octree: &Octree, params: &ClusterParams) -> SpatialClustering {
  let mut tags = vec![ClusterTag::Unclassified; points.len()];
  let mut clusters = Vec::new();

  for i in 0..points.len() {
    if tags[i] != ClusterTag::Unclassified {
      continue;
    }
    let id = clusters.len() as u32;
    if let Some(members) = expand_cluster(i as u32, id, points, octree, params, &mut tags) {
      clusters.push(members);
    }
  }

  SpatialClustering { clusters, tags }
}

/// Grow one cluster from `seed`. Returns `None` (tagging the seed as noise)
/// when the seed's neighborhood is below the density threshold.
fn expand_cluster(
  seed: u32,
  id: u32,
  points: &[DVec3],
  octree: &Octree,
  params: &ClusterParams,
  tags: &mut [ClusterTag],
) -> Option<Vec<u32>> {
  let kernel = Kernel::Sphere {
    radius: params.proximity,
  };

  // Seeding counts only still-unassigned neighbors: a neighborhood padded
  // with members of an adjacent, already-formed cluster is not dense on its
  // own. The expansion check below uses the raw count instead.
  let seeds: Vec<u32> = octree
    .search(points[seed as usize], &kernel)
    .into_iter()
    .filter(|&n| tags[n as usize].is_unassigned())
    .collect();
  if seeds.len() < params.min_points {
    tags[seed as usize] = ClusterTag::Noise;
    return None;
  }

  // Every seed joins the cluster; everything except the seed point itself
  // goes on the worklist for further expansion.
  let mut members = Vec::with_capacity(seeds.len());
  let mut queue = Vec::with_capacity(seeds.len());
  for &n in &seeds {
    tags[n as usize] = ClusterTag::Member(id);
    members.push(n);
    if n != seed {
      queue.push(n);
    }
  }

  let mut head = 0;
  while head < queue.len() {
    let current = queue[head];
    head += 1;

    let neighbors = octree.search(points[current as usize], &kernel);
    if neighbors.len() < params.min_points {
      // Border point: belongs to the cluster but does not expand it.
      continue;
    }
    for &n in &neighbors {
      match tags[n as usize] {
        ClusterTag::Unclassified => {
          tags[n as usize] = ClusterTag::Member(id);
          members.push(n);
          queue.push(n);
        }
        // Noise points get re-tagged into the cluster but are known to be
        // below threshold, so they never enter the worklist.
        ClusterTag::Noise => {
          tags[n as usize] = ClusterTag::Member(id);
          members.push(n);
        }
        ClusterTag::Member(_) => {}
      }
    }
  }

  Some(members)
}

#[cfg(test)]
#[path = "spatial_test.rs"]
mod spatial_test;
