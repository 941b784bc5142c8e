//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use super::project;
use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /                        -> register
/// GET    /{username}              -> get_by_username
///        /{username}/projects/... -> see routes::project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::register))
        .route("/{username}", get(user::get_by_username))
        .nest("/{username}/projects", project::router())
}
