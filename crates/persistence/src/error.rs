// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors raised by the career store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The database rejected a statement.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// The database could not be opened.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Migrations could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// No audit event carries the requested id.
    #[error("Event not found: {0}")]
    EventNotFound(i64),
    /// A stored row could not be turned back into a domain value.
    #[error("Row reconstruction error: {0}")]
    ReconstructionError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// `PRAGMA foreign_keys` did not stick on the connection.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    /// A compare-and-set update matched no row: the entity changed or
    /// vanished since it was loaded.
    #[error("Concurrent modification of {entity} {id}")]
    Conflict { entity: &'static str, id: String },
    #[error("Not found: {0}")]
    NotFound(String),
}

impl PersistenceError {
    pub(crate) fn conflict(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if retrying from a fresh load may succeed.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        if matches!(err, diesel::result::Error::NotFound) {
            Self::NotFound(String::from("Record not found"))
        } else {
            Self::DatabaseError(err.to_string())
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
