//! Error type for `gradebook-store-sqlite`.

use gradebook_core::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An update or delete keyed by identity matched no row.
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: i64 },

  /// A foreign key or check constraint rejected the write.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("core error: {0}")]
  Core(#[from] gradebook_core::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg))
        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Error::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
      }
      other => Error::Database(other),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self {
    Error::from(tokio_rusqlite::Error::Rusqlite(err))
  }
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
      Error::Core(_) | Error::DateParse(_) => ErrorKind::InvalidData,
      Error::Database(_) => ErrorKind::Storage,
    }
  }
}
