//! Monotonic scanner timestamps.

use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Timestamp of a scanned point, split into seconds and nanoseconds.
///
/// The nanosecond part is always normalized to `[0, 1e9)`; constructors
/// carry any excess into the seconds part. Ordering follows time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Timestamp {
  secs: u64,
  nanos: u32,
}

impl Timestamp {
  /// Create a timestamp, normalizing nanosecond overflow into seconds.
  pub fn new(secs: u64, nanos: u64) -> Self {
    Self {
      secs: secs + nanos / NANOS_PER_SEC,
      nanos: (nanos % NANOS_PER_SEC) as u32,
    }
  }

  /// Create a timestamp from a raw nanosecond count.
  pub fn from_nanos(nanos: u64) -> Self {
    Self::new(0, nanos)
  }

  /// Total nanoseconds since the epoch of the stream.
  pub fn as_nanos(&self) -> u64 {
    self.secs * NANOS_PER_SEC + self.nanos as u64
  }

  pub fn secs(&self) -> u64 {
    self.secs
  }

  pub fn subsec_nanos(&self) -> u32 {
    self.nanos
  }

  /// Nanoseconds elapsed since `earlier`, saturating at zero if the stream
  /// delivered out of order.
  pub fn nanos_since(&self, earlier: Timestamp) -> u64 {
    self.as_nanos().saturating_sub(earlier.as_nanos())
  }
}
