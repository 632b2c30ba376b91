//! Error types for `vitae-core`.

use thiserror::Error;

use crate::session::Operation;

#[derive(Debug, Error)]
pub enum Error {
  // ── Local validation ────────────────────────────────────────────────────
  #[error("malformed field address {path:?}: {reason}")]
  MalformedAddress { path: String, reason: &'static str },

  #[error("unknown field: {0}")]
  UnknownField(String),

  #[error("{what} index {index} out of range (len {len})")]
  IndexOutOfRange {
    what:  &'static str,
    index: usize,
    len:   usize,
  },

  #[error("cannot remove {0}: at least one must remain")]
  FloorViolation(&'static str),

  #[error("{0}")]
  Validation(String),

  #[error("{0} is already in progress")]
  Busy(Operation),

  // ── Collaborators ───────────────────────────────────────────────────────
  #[error("collaborator error: {0}")]
  Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// `true` for errors raised before any collaborator was contacted.
  pub fn is_local(&self) -> bool {
    !matches!(self, Self::Collaborator(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
