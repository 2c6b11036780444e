use glam::DVec3;

use super::*;
use crate::config::{ClusterParams, FaceParams, NormalParams, PipelineConfig};

fn test_config() -> PipelineConfig {
  PipelineConfig::default()
    .with_cluster(ClusterParams {
      proximity: 50.0,
      min_points: 10,
    })
    .with_normal(NormalParams {
      // Tight enough that only a cube's shared-edge rows pick up mixed
      // normals; everything one row in stays axis-aligned.
      radius: 8.0,
      min_neighbors: 4,
    })
    .with_face(FaceParams {
      proximity: 12.0,
      min_points: 8,
      max_normal_angle: 30f64.to_radians(),
      max_mean_angle: 30f64.to_radians(),
      max_mean_angle_single: 15f64.to_radians(),
    })
}

use crate::characterize::test_utils::cube_shell;

#[test]
fn test_empty_input_yields_none() {
  assert!(characterize(Vec::new(), &test_config()).is_none());
}

#[test]
fn test_sparse_points_yield_none() {
  let points: Vec<DVec3> = (0..20)
    .map(|i| DVec3::new(i as f64 * 1000.0, 0.0, 0.0))
    .collect();
  let (obj, stats) = characterize_timed(points, &test_config());
  assert!(obj.is_none());
  assert_eq!(stats.input_points, 20);
  assert_eq!(stats.kept_points, 0);
}

#[test]
fn test_planar_slab_is_one_face() {
  // 400 coplanar points in the XY plane.
  let mut points = Vec::new();
  for i in 0..20 {
    for j in 0..20 {
      points.push(DVec3::new(i as f64 * 5.0, j as f64 * 5.0, 0.0));
    }
  }

  let obj = characterize(points, &test_config()).expect("slab should characterize");
  assert_eq!(obj.points.len(), 400);
  assert_eq!(obj.faces.len(), 1);

  let face = &obj.faces[0];
  assert!(
    face.normal.z.abs() > 0.999,
    "slab normal should be ±Z, got {:?}",
    face.normal
  );
  assert!(face.thickness() < 1e-9, "slab thickness should be ~0");
  assert!(obj.bbox.delta().z < 1e-9);
}

#[test]
fn test_cube_shell_has_six_faces() {
  let edge = 100.0;
  let obj = characterize(cube_shell(edge), &test_config()).expect("cube should characterize");

  // The whole shell is one spatial cluster, so the overall box is exact.
  assert!((obj.bbox.volume() - edge * edge * edge).abs() < 1e-6);

  assert_eq!(obj.faces.len(), 6, "a cube has six planar faces");
  for face in &obj.faces {
    let [a, b] = face.sorted_extents();
    // Edge and corner points carry mixed normals and may be left out, so
    // the in-plane extents land just short of the full edge length.
    assert!(a > edge * 0.8 && a <= edge + 1e-9, "extent {} out of range", a);
    assert!(b > edge * 0.8 && b <= edge + 1e-9, "extent {} out of range", b);
    assert!(face.thickness() < 1.0, "face thickness {} too large", face.thickness());
  }

  // Normals: one ± pair per axis.
  let mut axis_hits = [0usize; 3];
  for face in &obj.faces {
    let n = face.normal.abs();
    let axis = if n.x > 0.9 {
      0
    } else if n.y > 0.9 {
      1
    } else {
      assert!(n.z > 0.9, "face normal {:?} not axis-aligned", face.normal);
      2
    };
    axis_hits[axis] += 1;
  }
  assert_eq!(axis_hits, [2, 2, 2]);
}

#[test]
fn test_largest_cluster_wins() {
  // A 300-point slab and a 100-point slab far apart: only the larger one
  // survives finalization.
  let mut points = Vec::new();
  for i in 0..20 {
    for j in 0..15 {
      points.push(DVec3::new(i as f64 * 5.0, j as f64 * 5.0, 0.0));
    }
  }
  for i in 0..10 {
    for j in 0..10 {
      points.push(DVec3::new(5000.0 + i as f64 * 5.0, j as f64 * 5.0, 0.0));
    }
  }

  let (obj, stats) = characterize_timed(points, &test_config());
  let obj = obj.expect("larger slab should characterize");
  assert_eq!(obj.points.len(), 300);
  assert_eq!(stats.input_points, 400);
  assert_eq!(stats.kept_points, 300);
  assert!(obj.points.iter().all(|p| p.x < 4000.0));
}

#[test]
fn test_face_area_and_extent_order() {
  let face = Face {
    indices: vec![0, 1, 2],
    normal: DVec3::Z,
    bbox: crate::geometry::Aabb::from_extents(DVec3::new(40.0, 10.0, 0.5)),
  };
  assert_eq!(face.area(), 400.0);
  assert_eq!(face.thickness(), 0.5);
  assert_eq!(face.sorted_extents(), [10.0, 40.0]);
}
