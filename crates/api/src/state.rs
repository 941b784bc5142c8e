use std::sync::Arc;

use autochrone_core::repository::Repository;

use crate::auth::token::TokenAuthority;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator (PostgreSQL in production, in-memory in tests).
    pub repo: Arc<dyn Repository>,
    pub config: Arc<ServerConfig>,
    /// Token authority holding the signing key loaded at startup.
    pub tokens: Arc<TokenAuthority>,
}
