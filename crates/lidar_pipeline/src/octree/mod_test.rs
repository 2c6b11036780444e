use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn random_points(n: usize, extent: f64, seed: u64) -> Vec<DVec3> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..n)
    .map(|_| {
      DVec3::new(
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
      )
    })
    .collect()
}

/// Ground truth by linear scan.
fn brute_force(points: &[DVec3], center: DVec3, kernel: &Kernel) -> Vec<u32> {
  points
    .iter()
    .enumerate()
    .filter(|&(_, &p)| kernel.contains(center, p))
    .map(|(i, _)| i as u32)
    .collect()
}

fn assert_same_set(mut got: Vec<u32>, mut expected: Vec<u32>) {
  got.sort_unstable();
  expected.sort_unstable();
  assert_eq!(got, expected);
}

#[test]
fn test_empty_tree() {
  let octree = Octree::build(&[], &OctreeParams::default());
  assert!(octree.is_empty());
  assert!(octree
    .search(DVec3::ZERO, &Kernel::Sphere { radius: 1000.0 })
    .is_empty());
}

#[test]
fn test_sphere_search_matches_linear_scan() {
  let points = random_points(2000, 1000.0, 7);
  let octree = Octree::build(&points, &OctreeParams::default());
  assert_eq!(octree.len(), points.len());

  let mut rng = StdRng::seed_from_u64(13);
  for _ in 0..50 {
    let center = DVec3::new(
      rng.gen_range(0.0..1000.0),
      rng.gen_range(0.0..1000.0),
      rng.gen_range(0.0..1000.0),
    );
    let kernel = Kernel::Sphere {
      radius: rng.gen_range(10.0..250.0),
    };
    assert_same_set(
      octree.search(center, &kernel),
      brute_force(&points, center, &kernel),
    );
  }
}

#[test]
fn test_cube_and_cylinder_match_linear_scan() {
  let points = random_points(1500, 500.0, 99);
  let octree = Octree::build(&points, &OctreeParams::default());

  let center = DVec3::splat(250.0);
  let cube = Kernel::Cube { radius: 80.0 };
  assert_same_set(
    octree.search(center, &cube),
    brute_force(&points, center, &cube),
  );

  let cylinder = Kernel::Cylinder {
    axis: DVec3::new(1.0, 2.0, -0.5).normalize(),
    radius: 60.0,
    half_height: 120.0,
  };
  assert_same_set(
    octree.search(center, &cylinder),
    brute_force(&points, center, &cylinder),
  );
}

#[test]
fn test_query_outside_cloud_returns_empty() {
  let points = random_points(500, 100.0, 3);
  let octree = Octree::build(&points, &OctreeParams::default());
  let hits = octree.search(DVec3::splat(10_000.0), &Kernel::Sphere { radius: 50.0 });
  assert!(hits.is_empty());
}

#[test]
fn test_coincident_points_terminate_and_are_found() {
  // All points identical: subdivision cannot separate them, so the
  // min-half-extent floor must stop recursion.
  let points = vec![DVec3::new(5.0, 5.0, 5.0); 500];
  let octree = Octree::build(&points, &OctreeParams::default());
  let hits = octree.search(DVec3::splat(5.0), &Kernel::Sphere { radius: 0.1 });
  assert_eq!(hits.len(), 500);
}

#[test]
fn test_single_point() {
  let points = vec![DVec3::new(1.0, 2.0, 3.0)];
  let octree = Octree::build(&points, &OctreeParams::default());
  assert_eq!(
    octree.search(DVec3::new(1.0, 2.0, 3.0), &Kernel::Sphere { radius: 0.0 }),
    vec![0]
  );
}

#[test]
fn test_results_are_indices_into_source_order() {
  let points = vec![
    DVec3::new(0.0, 0.0, 0.0),
    DVec3::new(100.0, 0.0, 0.0),
    DVec3::new(0.5, 0.0, 0.0),
  ];
  let octree = Octree::build(&points, &OctreeParams::default());
  let mut hits = octree.search(DVec3::ZERO, &Kernel::Sphere { radius: 1.0 });
  hits.sort_unstable();
  assert_eq!(hits, vec![0, 2]);
}
