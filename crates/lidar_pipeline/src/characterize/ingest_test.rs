use glam::DVec3;

use crate::characterize::test_utils::{concat_streams, stream_at_1khz, ReplayScanner};
use super::*;
use crate::config::{ClusterParams, FaceParams, NormalParams, PipelineConfig};
use crate::error::PipelineError;
use crate::geometry::{LidarPoint, Timestamp};

fn slab(origin: DVec3, nx: usize, ny: usize) -> Vec<DVec3> {
  let mut points = Vec::with_capacity(nx * ny);
  for i in 0..nx {
    for j in 0..ny {
      points.push(origin + DVec3::new(i as f64 * 5.0, j as f64 * 5.0, 0.0));
    }
  }
  points
}

fn test_config() -> PipelineConfig {
  PipelineConfig::default()
    .with_cluster(ClusterParams {
      proximity: 50.0,
      min_points: 10,
    })
    .with_normal(NormalParams {
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

fn characterizer(
  points: Vec<LidarPoint>,
  params: IngestParams,
) -> ObjectCharacterizer<ReplayScanner> {
  let mut c = ObjectCharacterizer::new(ReplayScanner::new(points), params, test_config());
  c.init().expect("replay scanner init");
  c
}

#[test]
fn test_background_window_cut_by_timestamps() {
  // 100 points at 1 kHz; a 50 ms window keeps t = 0..=50 ms (51 points).
  // The point that crosses the deadline is dropped with the rest.
  let positions: Vec<DVec3> = (0..100).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
  let mut c = characterizer(
    stream_at_1khz(&positions),
    IngestParams {
      back_frame_ms: 50,
      ..Default::default()
    },
  );

  let count = c.define_background().unwrap();
  assert_eq!(count, 51);
  assert!(c.has_background());
}

#[test]
fn test_eof_ends_background_cleanly() {
  let positions: Vec<DVec3> = (0..20).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
  let mut c = characterizer(
    stream_at_1khz(&positions),
    IngestParams {
      back_frame_ms: 60_000,
      ..Default::default()
    },
  );

  // Stream ends long before the window would.
  let count = c.define_background().unwrap();
  assert_eq!(count, 20);
}

#[test]
fn test_define_object_without_background_errors() {
  let mut c = characterizer(stream_at_1khz(&[DVec3::ZERO]), IngestParams::default());
  match c.define_object() {
    Err(PipelineError::EmptyBackground) => {}
    other => panic!("expected EmptyBackground, got {:?}", other.map(|_| ())),
  }
}

#[test]
fn test_reflectivity_filter_drops_points() {
  let positions: Vec<DVec3> = (0..40).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
  let mut points = stream_at_1khz(&positions);
  for (i, p) in points.iter_mut().enumerate() {
    if i % 2 == 0 {
      p.reflectivity = 10;
    }
  }

  let mut c = characterizer(
    points,
    IngestParams {
      back_frame_ms: 60_000,
      min_reflectivity: 50,
      ..Default::default()
    },
  );
  assert_eq!(c.define_background().unwrap(), 20);
}

#[test]
fn test_background_subtraction_absorbs_replayed_frame() {
  // The replay scanner rewinds at EOF, so the object phase sees exactly the
  // background frame again; everything lands within back_distance.
  let positions = slab(DVec3::ZERO, 20, 20);
  let mut c = characterizer(
    stream_at_1khz(&positions),
    IngestParams {
      back_frame_ms: 60_000,
      obj_frame_ms: 60_000,
      back_distance_m: 0.05,
      ..Default::default()
    },
  );

  assert_eq!(c.define_background().unwrap(), 400);
  let result = c.define_object().unwrap();
  assert!(result.is_none(), "replayed frame must be fully absorbed");
}

#[test]
fn test_back_distance_sensitivity() {
  // The object frame is the background slab shifted by 30 mm: a 50 mm
  // subtraction radius swallows it, a 10 mm radius does not.
  let background = slab(DVec3::ZERO, 20, 20);
  let shifted = slab(DVec3::new(0.0, 0.0, 30.0), 20, 20);
  let stream = concat_streams(&[&background, &shifted]);

  for (back_distance_m, expect_object) in [(0.05, false), (0.01, true)] {
    let mut c = characterizer(
      stream.clone(),
      IngestParams {
        back_frame_ms: 399,
        obj_frame_ms: 60_000,
        back_distance_m,
        ..Default::default()
      },
    );
    assert_eq!(c.define_background().unwrap(), 400);

    let result = c.define_object().unwrap();
    assert_eq!(
      result.is_some(),
      expect_object,
      "back_distance {back_distance_m} m"
    );
  }
}

#[test]
fn test_new_object_survives_background_subtraction() {
  // One continuous stream: a background clump first, then a slab somewhere
  // else. The background window cuts after 50 ms; the object phase resumes
  // mid-stream and sees the slab.
  let background = slab(DVec3::ZERO, 20, 3);
  let object = slab(DVec3::new(5000.0, 0.0, 0.0), 20, 20);
  let stream = concat_streams(&[&background, &object]);

  let mut c = characterizer(
    stream,
    IngestParams {
      back_frame_ms: 50,
      obj_frame_ms: 60_000,
      back_distance_m: 0.05,
      ..Default::default()
    },
  );

  let captured = c.define_background().unwrap();
  assert_eq!(captured, 51, "background window keeps t = 0..=50 ms");

  let object = c
    .define_object()
    .unwrap()
    .expect("slab should be detected as an object");
  assert_eq!(object.points.len(), 400);
  assert!(object.points.iter().all(|p| p.x >= 4000.0));
  assert_eq!(object.faces.len(), 1);
}

#[test]
fn test_wait_discards_points() {
  let positions: Vec<DVec3> = (0..30).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
  let mut c = characterizer(stream_at_1khz(&positions), IngestParams::default());

  c.wait(10).unwrap();
  assert!(!c.has_background(), "discarded points must not become state");
}

#[test]
fn test_setters_update_params() {
  let mut c = characterizer(Vec::new(), IngestParams::default());
  c.set_obj_frame(250);
  c.set_back_frame(750);
  c.set_min_reflectivity(42);
  c.set_back_distance(0.2);
  c.set_chrono(true);

  let p = c.params();
  assert_eq!(p.obj_frame_ms, 250);
  assert_eq!(p.back_frame_ms, 750);
  assert_eq!(p.min_reflectivity, 42);
  assert_eq!(p.back_distance_m, 0.2);
  assert!(p.chrono);
}

#[test]
fn test_stop_is_idempotent() {
  let mut c = characterizer(stream_at_1khz(&[DVec3::ZERO]), IngestParams::default());
  c.stop();
  c.stop();
}

#[test]
fn test_out_of_order_timestamp_does_not_end_frame() {
  // A stray earlier timestamp saturates to zero elapsed and stays inside
  // the window.
  let points = vec![
    LidarPoint::new(Timestamp::from_nanos(10_000_000), 255, DVec3::ZERO),
    LidarPoint::new(Timestamp::from_nanos(1_000_000), 255, DVec3::X),
    LidarPoint::new(Timestamp::from_nanos(11_000_000), 255, DVec3::Y),
  ];

  let mut c = characterizer(
    points,
    IngestParams {
      back_frame_ms: 60_000,
      ..Default::default()
    },
  );
  assert_eq!(c.define_background().unwrap(), 3);
}
