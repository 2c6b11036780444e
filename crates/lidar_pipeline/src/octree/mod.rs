//! Octree spatial index over a fixed point slice.
//!
//! The tree is built once from a contiguous slice of positions and is
//! immutable afterwards. Leaves hold `u32` indices into the source slice
//! (together with a copy of each position, so queries never touch the
//! original buffer); query results are therefore plain indices, and the
//! tree stays valid regardless of where the caller keeps the points.
//!
//! # Module Structure
//!
//! - [`kernel`]: `Kernel` - sphere / cube / cylinder query shapes
//! - [`node`]: internal arena node representation and cube math

pub mod kernel;
pub mod node;

// Re-exports
pub use kernel::Kernel;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use node::{child_center, cube_overlaps, octant, Node, NodeKind, NO_CHILD};

/// Subdivision limits for octree construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OctreeParams {
  /// A node holding more points than this subdivides (if still allowed).
  pub max_points_per_leaf: usize,
  /// Nodes at or below this half-extent (mm) stay leaves. Must be positive;
  /// this is what bounds recursion when many points coincide.
  pub min_half_extent: f64,
}

impl Default for OctreeParams {
  fn default() -> Self {
    Self {
      max_points_per_leaf: 32,
      min_half_extent: 10.0,
    }
  }
}

/// Recursive axis-aligned cube subdivision over a point slice.
pub struct Octree {
  nodes: Vec<Node>,
  /// Positions paired with their index in the source slice, reordered so
  /// every leaf owns a contiguous range.
  entries: Vec<(DVec3, u32)>,
  root: u32,
}

impl Octree {
  /// Build the index over `points`. An empty slice yields an empty tree.
  pub fn build(points: &[DVec3], params: &OctreeParams) -> Self {
    let mut entries: Vec<(DVec3, u32)> = points
      .iter()
      .enumerate()
      .map(|(i, &p)| (p, i as u32))
      .collect();

    if entries.is_empty() {
      return Self {
        nodes: Vec::new(),
        entries,
        root: NO_CHILD,
      };
    }

    // Root cube: centered on the tight box, wide enough for the largest axis.
    let (mut min, mut max) = (entries[0].0, entries[0].0);
    for &(p, _) in &entries[1..] {
      min = min.min(p);
      max = max.max(p);
    }
    let center = (min + max) * 0.5;
    let half = ((max - min) * 0.5)
      .max_element()
      .max(params.min_half_extent);

    let mut nodes = Vec::new();
    let len = entries.len();
    let root = build_node(&mut nodes, &mut entries, 0, len, center, half, params);
    Self {
      nodes,
      entries,
      root,
    }
  }

  /// Number of indexed points.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Indices of all points inside `kernel` placed at `center`.
  ///
  /// Recursive descent pruned by the kernel's axis-aligned envelope; exact
  /// membership is tested per point at the leaves. Result order is
  /// unspecified. An empty tree returns an empty result.
  pub fn search(&self, center: DVec3, kernel: &Kernel) -> Vec<u32> {
    let mut results = Vec::new();
    if self.nodes.is_empty() {
      return results;
    }

    let (env_min, env_max) = kernel.envelope(center);
    let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
    stack.push(self.root);

    while let Some(idx) = stack.pop() {
      let node = &self.nodes[idx as usize];
      if !cube_overlaps(node.center, node.half_extent, env_min, env_max) {
        continue;
      }
      match &node.kind {
        NodeKind::Leaf { start, len } => {
          let range = *start as usize..(*start + *len) as usize;
          for &(p, i) in &self.entries[range] {
            if kernel.contains(center, p) {
              results.push(i);
            }
          }
        }
        NodeKind::Branch { children } => {
          for &child in children {
            if child != NO_CHILD {
              stack.push(child);
            }
          }
        }
      }
    }

    results
  }
}

/// Build one node over `entries[start..end]`, recursing into octants while
/// the occupancy threshold is exceeded and the extent allows it.
fn build_node(
  nodes: &mut Vec<Node>,
  entries: &mut Vec<(DVec3, u32)>,
  start: usize,
  end: usize,
  center: DVec3,
  half: f64,
  params: &OctreeParams,
) -> u32 {
  let idx = nodes.len() as u32;

  if end - start <= params.max_points_per_leaf || half <= params.min_half_extent {
    nodes.push(Node {
      center,
      half_extent: half,
      kind: NodeKind::Leaf {
        start: start as u32,
        len: (end - start) as u32,
      },
    });
    return idx;
  }

  // Partition the range by octant code, then recurse per non-empty octant.
  entries[start..end].sort_unstable_by_key(|&(p, _)| octant(center, p));

  let mut bounds = [start; 9];
  let mut cursor = start;
  for code in 0..8 {
    while cursor < end && octant(center, entries[cursor].0) == code {
      cursor += 1;
    }
    bounds[code + 1] = cursor;
  }

  // Placeholder first so children get stable indices after this node.
  nodes.push(Node {
    center,
    half_extent: half,
    kind: NodeKind::Branch {
      children: [NO_CHILD; 8],
    },
  });

  let mut children = [NO_CHILD; 8];
  for code in 0..8 {
    let (s, e) = (bounds[code], bounds[code + 1]);
    if s < e {
      children[code] = build_node(
        nodes,
        entries,
        s,
        e,
        child_center(center, half, code),
        half * 0.5,
        params,
      );
    }
  }

  nodes[idx as usize] = Node {
    center,
    half_extent: half,
    kind: NodeKind::Branch { children },
  };
  idx
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
