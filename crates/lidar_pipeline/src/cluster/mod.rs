//! Density-based clustering over point slices.
//!
//! Two variants share the same worklist skeleton:
//!
//! - [`spatial::cluster`]: plain DBSCAN over positions, used to isolate an
//!   object from leftover scene content
//! - [`planar::extract_faces`]: normal-coherent DBSCAN that additionally
//!   requires angular agreement with the expanding cluster's running mean
//!   normal, used to split an object into planar faces
//!
//! Cluster membership is algorithm-local state: each pass allocates its own
//! tag vector keyed by point index and the point buffer itself is never
//! marked.

pub mod planar;
pub mod spatial;

// Re-exports
pub use planar::{extract_faces, FaceCluster};
pub use spatial::{cluster, SpatialClustering};

/// Per-point label assigned during a single clustering pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ClusterTag {
  /// Not yet visited.
  #[default]
  Unclassified,
  /// Rejected: no dense neighborhood reached this point. A noise point may
  /// still be absorbed later if some core point's neighborhood covers it.
  Noise,
  /// Final cluster assignment.
  Member(u32),
}

impl ClusterTag {
  /// True while the point can still be claimed by an expanding cluster.
  #[inline]
  pub fn is_unassigned(&self) -> bool {
    matches!(self, ClusterTag::Unclassified | ClusterTag::Noise)
  }
}
