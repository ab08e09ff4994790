//! Error types for the gradebook CSV feeds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A roster record with fewer than two fields. `line` is 1-based.
  #[error("malformed record on line {line}: expected `full name, group`")]
  MalformedRecord { line: u64 },

  #[error("subject file has no subject name")]
  MissingSubjectName,

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
