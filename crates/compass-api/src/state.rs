//! Application state shared across handlers

use compass_auth::AuthService;
use compass_db::Database;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connections
    pub db: Arc<Database>,
    /// Authentication service
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: Arc<Database>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }
}
