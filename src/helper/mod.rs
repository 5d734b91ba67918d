//! The publishing consistency engine.
//!
//! Every mutating operation runs the same pipeline: the ownership guard, a
//! field or completeness check, the write, then the operation's post-mutation
//! hooks, all inside one write transaction.

pub mod cascade_helpers;
pub mod chapter_helpers;
pub mod completeness_helpers;
pub mod course_helpers;
pub mod ownership_helpers;
pub mod public_helpers;
pub mod sanitization_helpers;
pub mod video_helpers;

use crate::models::db_operations::DbError;
use crate::DbPool;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("You must be logged in to perform this action")]
    Unauthenticated,
    #[error("You are not the owner of this course")]
    NotOwner,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    IncompleteForPublish(String),
    #[error("Video host error: {0}")]
    ExternalService(#[from] video_helpers::VideoHostError),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<DbError> for ActionError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => ActionError::NotFound(what),
            DbError::Rusqlite(e) => ActionError::Persistence(e.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ActionError {
    fn from(e: rusqlite::Error) -> Self {
        ActionError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for ActionError {
    fn from(e: r2d2::Error) -> Self {
        ActionError::Persistence(format!("connection pool: {}", e))
    }
}

impl ActionError {
    /// The message shown to the caller. Faults are collapsed into one retryable-looking message.
    pub fn user_message(&self) -> String {
        match self {
            ActionError::ExternalService(_) | ActionError::Persistence(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ActionError::ExternalService(_) | ActionError::Persistence(_))
    }
}

pub(crate) fn get_conn(pool: &DbPool) -> Result<PooledConnection<SqliteConnectionManager>, ActionError> {
    Ok(pool.get()?)
}

/// Takes the write lock up front so the guard and the mutation see the same state.
pub(crate) fn write_transaction(conn: &mut Connection) -> Result<Transaction<'_>, ActionError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Trims and rejects empty input with `"<label> is required"`.
pub(crate) fn require_text(value: &str, label: &str) -> Result<String, ActionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::Validation(format!("{} is required", label)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod test_support;
