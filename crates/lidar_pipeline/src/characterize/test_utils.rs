//! Test utilities for characterizer tests.
//!
//! Provides an in-memory replay scanner and point-stream fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use glam::DVec3;

use crate::error::Result;
use crate::geometry::{LidarPoint, Timestamp};
use crate::scanner::{PauseHandle, PointConsumer, ScanCode, Scanner};

// =============================================================================
// Replay scanner
// =============================================================================

/// Replays a fixed point list on its own thread, honoring the pause flag
/// between points. After end-of-stream the cursor rewinds, so the next
/// `scan` replays from the start.
pub struct ReplayScanner {
  points: Arc<Vec<LidarPoint>>,
  consumer: Arc<Mutex<Option<Arc<dyn PointConsumer>>>>,
  pause: PauseHandle,
  cursor: Arc<AtomicUsize>,
  handle: Option<JoinHandle<()>>,
}

impl ReplayScanner {
  pub fn new(points: Vec<LidarPoint>) -> Self {
    Self {
      points: Arc::new(points),
      consumer: Arc::new(Mutex::new(None)),
      pause: PauseHandle::new(),
      cursor: Arc::new(AtomicUsize::new(0)),
      handle: None,
    }
  }

  fn join_worker(&mut self) {
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }
}

impl Scanner for ReplayScanner {
  fn init(&mut self) -> Result<()> {
    Ok(())
  }

  fn scan(&mut self) -> Result<()> {
    self.join_worker();

    let consumer = self
      .consumer
      .lock()
      .unwrap()
      .clone()
      .expect("consumer must be set before scan");
    let points = Arc::clone(&self.points);
    let pause = self.pause.clone();
    let cursor = Arc::clone(&self.cursor);
    pause.resume();

    self.handle = Some(std::thread::spawn(move || {
      let mut i = cursor.load(Ordering::Acquire);
      while i < points.len() {
        if pause.is_paused() {
          cursor.store(i, Ordering::Release);
          return;
        }
        consumer.on_point(points[i]);
        i += 1;
      }
      cursor.store(0, Ordering::Release);
      consumer.on_scan_end(ScanCode::Eof);
    }));
    Ok(())
  }

  fn stop(&mut self) {
    self.pause.pause();
    self.join_worker();
  }

  fn set_consumer(&mut self, consumer: Arc<dyn PointConsumer>) {
    *self.consumer.lock().unwrap() = Some(consumer);
  }

  fn pause_handle(&self) -> PauseHandle {
    self.pause.clone()
  }
}

impl Drop for ReplayScanner {
  fn drop(&mut self) {
    self.pause.pause();
    self.join_worker();
  }
}

// =============================================================================
// Stream fixtures
// =============================================================================

/// 20x20x20 grid on the six faces of a cube with the given edge length,
/// shared edge points deduplicated.
pub fn cube_shell(edge: f64) -> Vec<DVec3> {
  const N: usize = 20;
  let step = edge / (N - 1) as f64;
  let key_of = |p: DVec3| {
    (
      (p.x * 1000.0).round() as i64,
      (p.y * 1000.0).round() as i64,
      (p.z * 1000.0).round() as i64,
    )
  };

  let mut seen = std::collections::HashSet::new();
  let mut points = Vec::new();
  for i in 0..N {
    for j in 0..N {
      let (a, b) = (i as f64 * step, j as f64 * step);
      for p in [
        DVec3::new(a, b, 0.0),
        DVec3::new(a, b, edge),
        DVec3::new(a, 0.0, b),
        DVec3::new(a, edge, b),
        DVec3::new(0.0, a, b),
        DVec3::new(edge, a, b),
      ] {
        if seen.insert(key_of(p)) {
          points.push(p);
        }
      }
    }
  }
  points
}

/// One point per millisecond at the given positions, full reflectivity.
pub fn stream_at_1khz(positions: &[DVec3]) -> Vec<LidarPoint> {
  positions
    .iter()
    .enumerate()
    .map(|(i, &p)| LidarPoint::new(Timestamp::from_nanos(i as u64 * 1_000_000), 255, p))
    .collect()
}

/// Concatenate streams, continuing the 1 kHz clock across segments.
pub fn concat_streams(segments: &[&[DVec3]]) -> Vec<LidarPoint> {
  let positions: Vec<DVec3> = segments.iter().flat_map(|s| s.iter().copied()).collect();
  stream_at_1khz(&positions)
}
