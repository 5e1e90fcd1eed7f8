//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (not found, duplicate, transient
//! lock contention) instead of downcasting opaque boxes.

use std::fmt;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Coarse classification of a [`StorageError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    AlreadyExists,
    /// Busy or locked database; safe to retry.
    Unavailable,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::AlreadyExists => "already_exists",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row missing, or soft-deleted where only live rows count.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller input rejected before touching the database.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unique constraint violation.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Database busy or locked past the busy timeout.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    /// No pooled connection became free in time.
    #[error("connection pool exhausted: {0}")]
    Pool(#[from] r2d2::Error),

    /// Any other SQL failure.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// Row data could not be decoded into a domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StorageError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Which error kind this is.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match *self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Unavailable(_) | Self::Pool(_) => ErrorKind::Unavailable,
            Self::Database(_) | Self::DataCorruption { .. } => ErrorKind::Internal,
        }
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unavailable)
    }

    /// Whether this error is a not-found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound)
    }
}

/// Custom `From<rusqlite::Error>`, NOT blanket `#[from]`.
///
/// - unique / primary key violations → `AlreadyExists`
/// - `SQLITE_BUSY` / `SQLITE_LOCKED` → `Unavailable`
/// - everything else → `Database`
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        let (code, extended_code) = match &err {
            rusqlite::Error::SqliteFailure(e, _) => (Some(e.code), e.extended_code),
            _ => (None, 0),
        };
        match code {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Self::Unavailable(err),
            Some(ErrorCode::ConstraintViolation)
                if extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::AlreadyExists(err.to_string())
            },
            _ => Self::Database(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn busy_maps_to_transient_unavailable() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_BUSY));
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(err.is_transient());
    }

    #[test]
    fn check_violation_is_internal() {
        let err = StorageError::from(sqlite_failure(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn not_found_display() {
        let err = StorageError::not_found("observation", 42);
        assert_eq!(err.to_string(), "not found: observation with id 42");
        assert!(err.is_not_found());
    }
}
