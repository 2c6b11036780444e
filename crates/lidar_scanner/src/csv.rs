//! CSV replay scanner.
//!
//! Streams a recorded capture with one point per line:
//!
//! ```text
//! timestamp_ns,x_mm,y_mm,z_mm,reflectivity
//! ```
//!
//! Lines that do not parse (headers, comments, truncated tails) are
//! skipped silently, matching the pipeline's per-point error policy.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use glam::DVec3;
use tracing::{debug, warn};

use lidar_pipeline::error::{PipelineError, Result};
use lidar_pipeline::geometry::{LidarPoint, Timestamp};
use lidar_pipeline::scanner::{PauseHandle, PointConsumer, ScanCode, Scanner};

/// Streams a CSV capture from disk on its own reader thread.
///
/// The file handle is held from `init` until `stop`. At end-of-file the
/// reader seeks back to the start, so a later `scan` replays the capture.
pub struct CsvScanner {
  path: PathBuf,
  file: Arc<Mutex<Option<BufReader<File>>>>,
  consumer: Arc<Mutex<Option<Arc<dyn PointConsumer>>>>,
  pause: PauseHandle,
  handle: Option<JoinHandle<()>>,
}

impl CsvScanner {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      file: Arc::new(Mutex::new(None)),
      consumer: Arc::new(Mutex::new(None)),
      pause: PauseHandle::new(),
      handle: None,
    }
  }

  fn join_worker(&mut self) {
    if let Some(handle) = self.handle.take() {
      let _ = handle.join();
    }
  }
}

impl Scanner for CsvScanner {
  fn init(&mut self) -> Result<()> {
    let file = File::open(&self.path)
      .map_err(|e| PipelineError::ScannerInit(format!("{}: {e}", self.path.display())))?;
    *self.file.lock().unwrap() = Some(BufReader::new(file));
    debug!(path = %self.path.display(), "csv scanner ready");
    Ok(())
  }

  fn scan(&mut self) -> Result<()> {
    self.join_worker();

    let Some(consumer) = self.consumer.lock().unwrap().clone() else {
      return Err(PipelineError::ScannerInit(
        "scan requested before a consumer was set".into(),
      ));
    };
    if self.file.lock().unwrap().is_none() {
      return Err(PipelineError::ScannerRead("scanner is stopped".into()));
    }

    let file = Arc::clone(&self.file);
    let pause = self.pause.clone();
    pause.resume();

    self.handle = Some(std::thread::spawn(move || {
      let mut guard = file.lock().unwrap();
      let Some(reader) = guard.as_mut() else {
        return;
      };

      let mut line = String::new();
      loop {
        if pause.is_paused() {
          // Keep the file position; the next scan resumes here.
          return;
        }
        line.clear();
        match reader.read_line(&mut line) {
          Ok(0) => {
            // Rewind so the next session can replay the capture.
            let _ = reader.seek(SeekFrom::Start(0));
            drop(guard);
            consumer.on_scan_end(ScanCode::Eof);
            return;
          }
          Ok(_) => {
            if let Some(point) = parse_line(&line) {
              consumer.on_point(point);
            }
          }
          Err(e) => {
            warn!("csv read failed: {e}");
            drop(guard);
            consumer.on_scan_end(ScanCode::Error);
            return;
          }
        }
      }
    }));
    Ok(())
  }

  fn stop(&mut self) {
    self.pause.pause();
    self.join_worker();
    *self.file.lock().unwrap() = None;
  }

  fn set_consumer(&mut self, consumer: Arc<dyn PointConsumer>) {
    *self.consumer.lock().unwrap() = Some(consumer);
  }

  fn pause_handle(&self) -> PauseHandle {
    self.pause.clone()
  }
}

impl Drop for CsvScanner {
  fn drop(&mut self) {
    self.pause.pause();
    self.join_worker();
  }
}

/// Parse one capture line. Returns `None` for anything malformed.
fn parse_line(line: &str) -> Option<LidarPoint> {
  let line = line.trim();
  if line.is_empty() || line.starts_with('#') {
    return None;
  }

  let mut fields = line.split(',').map(str::trim);
  let timestamp = fields.next()?.parse::<u64>().ok()?;
  let x = fields.next()?.parse::<f64>().ok()?;
  let y = fields.next()?.parse::<f64>().ok()?;
  let z = fields.next()?.parse::<f64>().ok()?;
  let reflectivity = fields.next()?.parse::<u8>().ok()?;

  Some(LidarPoint::new(
    Timestamp::from_nanos(timestamp),
    reflectivity,
    DVec3::new(x, y, z),
  ))
}
