//! Scanner abstraction consumed by the characterizer.
//!
//! A scanner pushes decoded points from its own execution context into a
//! [`PointConsumer`]. Backends (CSV replay, in-memory replay) live in the
//! `lidar_scanner` crate; this module only defines the seam.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::geometry::LidarPoint;

/// Why a scan run ended (delivered through [`PointConsumer::on_scan_end`]).
///
/// A pause requested by the consumer is not an end: the backend simply
/// stops delivering and `scan` can be called again to resume.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScanCode {
  /// The stream is exhausted. Expected; terminates a phase cleanly.
  Eof,
  /// The backend failed mid-stream.
  Error,
}

/// Shared pause flag honored by scanner backends between record boundaries.
///
/// The characterizer holds a clone and flips it from inside the point
/// callback when a frame deadline is reached; the backend checks it between
/// points and stops delivering.
#[derive(Clone, Debug, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn pause(&self) {
    self.0.store(true, Ordering::Release);
  }

  pub fn resume(&self) {
    self.0.store(false, Ordering::Release);
  }

  pub fn is_paused(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

/// Receiver side of the point stream.
pub trait PointConsumer: Send + Sync {
  /// Called once per decoded point, on the scanner's thread. Must return
  /// quickly.
  fn on_point(&self, point: LidarPoint);

  /// Called when a scan run ends for a reason other than a pause.
  fn on_scan_end(&self, code: ScanCode);
}

/// A push-source of timestamped LiDAR points.
pub trait Scanner {
  /// Acquire backend resources (open files, connect to the device).
  fn init(&mut self) -> Result<()>;

  /// Begin or resume delivering points to the consumer on the scanner's
  /// own execution context. Non-blocking; delivery ends at EOF, on error,
  /// or when the pause handle is raised.
  fn scan(&mut self) -> Result<()>;

  /// Request a pause at the next record boundary.
  fn pause(&self) {
    self.pause_handle().pause();
  }

  /// Release backend resources. The scanner cannot be restarted afterwards.
  fn stop(&mut self);

  /// Install the consumer that receives every decoded point.
  fn set_consumer(&mut self, consumer: Arc<dyn PointConsumer>);

  /// The pause flag this backend honors.
  fn pause_handle(&self) -> PauseHandle;
}
