//! Storage error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;

/// Storage layer failure.
#[derive(Debug, Clone, Display, Error)]
pub enum StoreError {
    /// Could not open a connection to the database.
    #[display("connection failed: {_0}")]
    Connection(#[error(not(source))] String),
    /// A query failed.
    #[display("query failed: {_0}")]
    Query(#[error(not(source))] String),
    /// An insert hit a unique index (duplicate daily puzzle slot or daily
    /// attempt).
    #[display("unique constraint violated: {_0}")]
    UniqueViolation(#[error(not(source))] String),
    /// A stored JSON column or enum string failed to parse.
    #[display("corrupt stored value: {_0}")]
    Corrupt(#[error(not(source))] String),
}

impl StoreError {
    /// Whether this error is a unique-index violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}
