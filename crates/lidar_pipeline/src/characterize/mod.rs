//! Streaming object characterization.
//!
//! [`ObjectCharacterizer`] owns a scanner and a small state machine fed by
//! the scanner callback. A characterization session is:
//!
//! 1. `define_background()` - capture a frame of the empty scene and freeze
//!    it into a spatial index
//! 2. `define_object()` - capture a frame, drop everything near the frozen
//!    background, and distill the rest into a [`CharacterizedObject`]
//! 3. optionally `wait(ms)` between the two to discard points while the
//!    scene settles
//!
//! Frame windows are cut by point timestamps, not wall time: a frame ends
//! with the first point whose timestamp exceeds the first accepted point's
//! timestamp by the configured duration.

pub mod ingest;
pub mod object;

// Test utilities
#[cfg(test)]
pub mod test_utils;

// Re-exports
pub use ingest::{IngestParams, ObjectCharacterizer};
pub use object::{
  characterize, characterize_timed, CharacterizeStats, CharacterizedObject, Face, Model,
};
