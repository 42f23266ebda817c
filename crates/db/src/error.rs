//! Mapping of database failures onto [`StoreError`].

use fuelcast_engine::StoreError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// Failure translating between rows and domain values.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A stored value no longer parses into its domain type.
    #[error("Corrupt {table} row {id}: {reason}")]
    CorruptRow {
        /// Table the row came from.
        table: &'static str,
        /// Primary key of the row.
        id: Uuid,
        /// What failed to parse.
        reason: String,
    },

    /// A JSON column could not be encoded or decoded.
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MappingError {
    pub(crate) fn corrupt(table: &'static str, id: Uuid, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            id,
            reason: reason.into(),
        }
    }
}

impl From<MappingError> for StoreError {
    fn from(err: MappingError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Classifies a database error.
///
/// Unique violations become `Duplicate`, foreign key violations and
/// updates that matched no row become `Missing`.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let DbErr::RecordNotUpdated = err {
        return StoreError::Missing("record to update".to_string());
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Duplicate(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::Missing(detail),
        _ => StoreError::Backend(err.to_string()),
    }
}
