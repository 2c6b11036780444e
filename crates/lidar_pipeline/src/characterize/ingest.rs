//! Ingest state machine: scanner callback on one side, blocking phase
//! drivers on the other.
//!
//! The scanner thread only ever does an atomic phase load plus a guarded
//! buffer append per point; clustering and octree construction happen on
//! the caller's thread after the scanner has been paused, so the two sides
//! never touch the buffers concurrently.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::DVec3;
use tracing::{debug, info, warn};

use super::object::{characterize, characterize_timed, CharacterizedObject};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::geometry::{LidarPoint, Timestamp};
use crate::octree::{Kernel, Octree};
use crate::scanner::{PauseHandle, PointConsumer, ScanCode, Scanner};

/// User-facing ingest parameters. Durations are wall-clock milliseconds as
/// configured, converted to nanoseconds against point timestamps; the
/// background distance is meters as configured, millimeters as applied.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestParams {
  /// Duration of an object capture frame (ms).
  pub obj_frame_ms: u64,
  /// Duration of the background capture frame (ms).
  pub back_frame_ms: u64,
  /// Points below this reflectivity are dropped on arrival.
  pub min_reflectivity: u8,
  /// A point within this distance (m) of any background point is treated
  /// as background during object capture.
  pub back_distance_m: f64,
  /// Collect and log per-stage timings during finalization.
  pub chrono: bool,
}

impl Default for IngestParams {
  fn default() -> Self {
    Self {
      obj_frame_ms: 1000,
      back_frame_ms: 5000,
      min_reflectivity: 0,
      back_distance_m: 0.05,
      chrono: false,
    }
  }
}

/// Characterizer phases. `Stopped` is both the initial and the resting
/// state; every phase transitions back to it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
enum Phase {
  Stopped = 0,
  Background = 1,
  Object = 2,
  Discard = 3,
}

impl Phase {
  fn from_u8(v: u8) -> Self {
    match v {
      1 => Phase::Background,
      2 => Phase::Object,
      3 => Phase::Discard,
      _ => Phase::Stopped,
    }
  }
}

/// Why a phase ended.
enum PhaseEnd {
  /// A point timestamp crossed the frame window.
  Deadline,
  /// The scanner stream ended mid-phase.
  Scan(ScanCode),
}

/// The frozen background: its points and the index used to subtract them.
struct BackgroundMap {
  points: Vec<DVec3>,
  octree: Octree,
}

/// State written by the scanner callback, read by the phase drivers.
struct PhaseBuffers {
  window_ns: u64,
  min_reflectivity: u8,
  back_distance_mm: f64,
  first: Option<Timestamp>,
  points: Vec<DVec3>,
  background: Option<BackgroundMap>,
}

/// Shared ingest half: implements [`PointConsumer`] for the scanner thread.
struct Ingest {
  phase: AtomicU8,
  buffers: Mutex<PhaseBuffers>,
  done_tx: Sender<PhaseEnd>,
  pause: PauseHandle,
}

impl Ingest {
  /// End the running phase: back to `Stopped`, scanner paused, driver
  /// woken. Callable from either side.
  fn finish(&self, end: PhaseEnd) {
    self.phase.store(Phase::Stopped as u8, Ordering::Release);
    self.pause.pause();
    let _ = self.done_tx.try_send(end);
  }
}

impl PointConsumer for Ingest {
  fn on_point(&self, p: LidarPoint) {
    let phase = Phase::from_u8(self.phase.load(Ordering::Acquire));
    if phase == Phase::Stopped {
      return;
    }

    let mut buf = self.buffers.lock().unwrap();
    if p.reflectivity < buf.min_reflectivity {
      return;
    }

    let first = *buf.first.get_or_insert(p.timestamp);
    if p.timestamp.nanos_since(first) > buf.window_ns {
      // The crossing point itself is outside the frame.
      drop(buf);
      self.finish(PhaseEnd::Deadline);
      return;
    }

    match phase {
      Phase::Background => buf.points.push(p.position),
      Phase::Object => {
        let near_background = buf.background.as_ref().is_some_and(|bg| {
          !bg
            .octree
            .search(
              p.position,
              &Kernel::Sphere {
                radius: buf.back_distance_mm,
              },
            )
            .is_empty()
        });
        if !near_background {
          buf.points.push(p.position);
        }
      }
      Phase::Discard | Phase::Stopped => {}
    }
  }

  fn on_scan_end(&self, code: ScanCode) {
    if Phase::from_u8(self.phase.load(Ordering::Acquire)) != Phase::Stopped {
      debug!(?code, "scan ended mid-phase");
      self.finish(PhaseEnd::Scan(code));
    }
  }
}

/// Streaming object characterizer over a scanner backend.
///
/// `define_background` and `define_object` block the calling thread until
/// the frame window elapses (measured in point timestamps, evaluated inside
/// the callback) or the scanner stream ends.
pub struct ObjectCharacterizer<S: Scanner> {
  scanner: S,
  ingest: Arc<Ingest>,
  done_rx: Receiver<PhaseEnd>,
  params: IngestParams,
  config: PipelineConfig,
}

impl<S: Scanner> ObjectCharacterizer<S> {
  pub fn new(scanner: S, params: IngestParams, config: PipelineConfig) -> Self {
    let (done_tx, done_rx) = bounded(1);
    let pause = scanner.pause_handle();
    let ingest = Arc::new(Ingest {
      phase: AtomicU8::new(Phase::Stopped as u8),
      buffers: Mutex::new(PhaseBuffers {
        window_ns: 0,
        min_reflectivity: 0,
        back_distance_mm: 0.0,
        first: None,
        points: Vec::new(),
        background: None,
      }),
      done_tx,
      pause,
    });
    Self {
      scanner,
      ingest,
      done_rx,
      params,
      config,
    }
  }

  /// Initialize the scanner backend and hook up the point callback.
  pub fn init(&mut self) -> Result<()> {
    self.scanner.init()?;
    self.scanner.set_consumer(self.ingest.clone());
    Ok(())
  }

  /// Capture the background frame and freeze it into a spatial index.
  ///
  /// Blocks until the window elapses. Returns the number of background
  /// points captured.
  pub fn define_background(&mut self) -> Result<usize> {
    self.run_phase(Phase::Background, self.params.back_frame_ms * 1_000_000)?;

    let mut buf = self.ingest.buffers.lock().unwrap();
    let points = std::mem::take(&mut buf.points);
    let count = points.len();
    let octree = Octree::build(&points, &self.config.octree);
    buf.background = Some(BackgroundMap { points, octree });

    info!(points = count, "background frozen");
    Ok(count)
  }

  /// Capture an object frame, subtract the background, and characterize
  /// what remains.
  ///
  /// Blocks until the window elapses. `Ok(None)` means the frame held no
  /// cluster dense enough to be an object; the caller may retry.
  pub fn define_object(&mut self) -> Result<Option<CharacterizedObject>> {
    if self.ingest.buffers.lock().unwrap().background.is_none() {
      return Err(PipelineError::EmptyBackground);
    }

    self.run_phase(Phase::Object, self.params.obj_frame_ms * 1_000_000)?;

    let points = std::mem::take(&mut self.ingest.buffers.lock().unwrap().points);
    debug!(points = points.len(), "object frame captured");

    if self.params.chrono {
      let (object, stats) = characterize_timed(points, &self.config);
      info!(
        input = stats.input_points,
        kept = stats.kept_points,
        faces = stats.face_count,
        cluster_us = stats.cluster_us,
        normals_us = stats.normals_us,
        faces_us = stats.faces_us,
        total_us = stats.total_us,
        "characterization timings"
      );
      Ok(object)
    } else {
      Ok(characterize(points, &self.config))
    }
  }

  /// Discard incoming points for the given window.
  pub fn wait(&mut self, milliseconds: u64) -> Result<()> {
    self.run_phase(Phase::Discard, milliseconds * 1_000_000)?;
    Ok(())
  }

  /// Force the machine to `Stopped` and release the scanner. Any
  /// in-progress frame is truncated.
  pub fn stop(&mut self) {
    self.ingest.phase.store(Phase::Stopped as u8, Ordering::Release);
    self.scanner.pause();
    self.scanner.stop();
  }

  /// Arm a phase, start the scanner, and block until the phase ends.
  fn run_phase(&mut self, phase: Phase, window_ns: u64) -> Result<()> {
    {
      let mut buf = self.ingest.buffers.lock().unwrap();
      buf.window_ns = window_ns;
      buf.min_reflectivity = self.params.min_reflectivity;
      buf.back_distance_mm = self.params.back_distance_m * 1000.0;
      buf.first = None;
      buf.points.clear();
    }
    // A previous phase may have ended right at its deadline and left an
    // unread completion behind.
    while self.done_rx.try_recv().is_ok() {}

    self.ingest.phase.store(phase as u8, Ordering::Release);
    if let Err(e) = self.scanner.scan() {
      self.ingest.phase.store(Phase::Stopped as u8, Ordering::Release);
      return Err(e);
    }

    // Frames are cut by point timestamps; the wall clock only bounds a
    // scanner that stalls without delivering an end-of-stream.
    let grace = Duration::from_nanos(window_ns).saturating_mul(2) + Duration::from_secs(1);
    match self.done_rx.recv_timeout(grace) {
      Ok(PhaseEnd::Scan(ScanCode::Error)) => Err(PipelineError::ScannerRead(
        "scanner reported an error mid-phase".into(),
      )),
      Ok(_) => Ok(()),
      Err(_) => {
        warn!("phase window never reached; truncating frame");
        self.ingest.finish(PhaseEnd::Deadline);
        while self.done_rx.try_recv().is_ok() {}
        Ok(())
      }
    }
  }

  // ===========================================================================
  // Parameter access
  // ===========================================================================

  pub fn set_obj_frame(&mut self, ms: u64) {
    self.params.obj_frame_ms = ms;
  }

  pub fn set_back_frame(&mut self, ms: u64) {
    self.params.back_frame_ms = ms;
  }

  pub fn set_min_reflectivity(&mut self, min: u8) {
    self.params.min_reflectivity = min;
  }

  pub fn set_back_distance(&mut self, meters: f64) {
    self.params.back_distance_m = meters;
  }

  pub fn set_chrono(&mut self, chrono: bool) {
    self.params.chrono = chrono;
  }

  pub fn params(&self) -> &IngestParams {
    &self.params
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// True once a background has been captured and frozen.
  pub fn has_background(&self) -> bool {
    self.ingest.buffers.lock().unwrap().background.is_some()
  }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod ingest_test;
