//! lidar_pipeline - Framework-independent LiDAR object characterization
//!
//! This crate turns a stream of timestamped LiDAR points into characterized
//! objects and compares them against reference models. The pipeline is:
//!
//! ```text
//! ┌─────────┐    ┌────────────┐    ┌──────────┐    ┌───────┐    ┌─────────┐
//! │ Scanner ├───►│ Background ├───►│ Spatial  ├───►│ Face  ├───►│ Anomaly │
//! │ stream  │    │ subtraction│    │ DBSCAN   │    │ DBSCAN│    │ report  │
//! └─────────┘    └────────────┘    └──────────┘    └───────┘    └─────────┘
//!      │           octree query     largest cluster  normals +    greedy face
//!  LidarPoint       vs. frozen      kept, rest       coherence    matching
//!                   background      discarded        clustering
//! ```
//!
//! # Features
//!
//! - **Octree neighbor queries**: sphere / cube / cylinder kernels over an
//!   immutable point slice, results as indices
//! - **Two-stage DBSCAN**: spatial clustering, then normal-coherent
//!   clustering that extracts planar faces
//! - **Streaming ingest**: a state machine fed by a scanner callback with
//!   timestamp-driven frame windows
//! - **Anomaly comparison**: per-face and aggregate similarity reports
//!   between an object and a persisted model
//!
//! All coordinates are in millimeters.

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{ClusterParams, CompareParams, FaceParams, NormalParams, PipelineConfig};
pub use error::{PipelineError, Result};

// Geometry primitives: points, timestamps, bounding boxes, normals
pub mod geometry;
pub use geometry::{Aabb, LidarPoint, Timestamp};

// Spatial index over a fixed point slice
pub mod octree;
pub use octree::{Kernel, Octree, OctreeParams};

// Density-based clustering (spatial and normal-coherent variants)
pub mod cluster;
pub use cluster::{ClusterTag, FaceCluster, SpatialClustering};

// Streaming characterizer state machine and object finalization
pub mod characterize;
pub use characterize::{
  CharacterizeStats, CharacterizedObject, Face, IngestParams, Model, ObjectCharacterizer,
};

// Object-to-model anomaly comparison
pub mod anomaly;
pub use anomaly::{compare, AnomalyReport, BoxComparison, FaceComparison};

// Scanner abstraction (consumed; backends live in lidar_scanner)
pub mod scanner;
pub use scanner::{PauseHandle, PointConsumer, ScanCode, Scanner};
