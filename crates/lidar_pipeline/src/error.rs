//! Error types for the characterization pipeline.

/// Errors surfaced by the ingest state machine and scanner integration.
///
/// Per-point conditions (low reflectivity, degenerate normals) are filtered
/// locally and never reach this type; a missing object cluster is an
/// `Ok(None)` result, not an error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  /// The scanner backend failed to initialize.
  #[error("scanner initialization failed: {0}")]
  ScannerInit(String),

  /// The scanner backend failed while delivering points.
  #[error("scanner read failed: {0}")]
  ScannerRead(String),

  /// `define_object` was requested before any background was captured.
  #[error("no background captured before object definition")]
  EmptyBackground,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
