//! Error types for `gradebook-core`, and the classification every store
//! backend's error type must expose.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid grade code: {0}")]
  InvalidGradeCode(i64),

  #[error("unknown grade symbol: {0:?}")]
  UnknownGradeSymbol(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad failure classes a caller can branch on without knowing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// An update or delete keyed by identity matched no row.
  NotFound,
  /// A foreign key or check constraint rejected the write.
  ConstraintViolation,
  /// A stored value could not be decoded (e.g. an unknown grade code).
  InvalidData,
  /// The backing storage failed: I/O, connectivity, or engine errors.
  Storage,
}

/// Implemented by the error type of every [`crate::store::RecordsStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}
