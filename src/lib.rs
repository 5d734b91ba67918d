use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
pub type DbPool = Pool<SqliteConnectionManager>;

use crate::helper::video_helpers::VideoHost;

/// Shared, request-independent collaborators. Holds no mutable state: every
/// operation re-reads what it needs from the store.
pub struct AppState {
    pub video_host: Arc<dyn VideoHost>,
}

pub mod config;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
