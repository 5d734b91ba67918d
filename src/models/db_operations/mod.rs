pub mod categories_db_operations;
pub mod chapters_db_operations;
pub mod courses_db_operations;
pub mod video_assets_db_operations;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    /// Carries the entity kind ("Chapter"), which is what callers show to users.
    #[error("Item not found in database: {0}")]
    NotFound(String),
}
