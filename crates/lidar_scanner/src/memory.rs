//! In-memory replay scanner.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use lidar_pipeline::error::Result;
use lidar_pipeline::geometry::LidarPoint;
use lidar_pipeline::scanner::{PauseHandle, PointConsumer, ScanCode, Scanner};

/// Replays a fixed point list on its own thread.
///
/// The pause flag is honored between points; a pause keeps the cursor so
/// the next `scan` resumes mid-stream, while end-of-stream rewinds it.
pub struct MemoryScanner {
  points: Arc<Vec<LidarPoint>>,
  consumer: Arc<Mutex<Option<Arc<dyn PointConsumer>>>>,
  pause: PauseHandle,
  cursor: Arc<AtomicUsize>,
  handle: Option<JoinHandle<()>>,
}

impl MemoryScanner {
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

impl Scanner for MemoryScanner {
  fn init(&mut self) -> Result<()> {
    Ok(())
  }

  fn scan(&mut self) -> Result<()> {
    self.join_worker();

    let Some(consumer) = self.consumer.lock().unwrap().clone() else {
      return Err(lidar_pipeline::PipelineError::ScannerInit(
        "scan requested before a consumer was set".into(),
      ));
    };
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

impl Drop for MemoryScanner {
  fn drop(&mut self) {
    self.pause.pause();
    self.join_worker();
  }
}
