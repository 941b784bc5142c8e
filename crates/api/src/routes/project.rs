//! Route definitions for `/users/{username}/projects`.

use axum::routing::{get, post};
use axum::Router;

use super::sprint;
use crate::handlers::{guest, project};
use crate::state::AppState;

/// Routes mounted at `/users/{username}/projects`.
///
/// ```text
/// GET    /                                 -> list
/// POST   /                                 -> create
/// GET    /{project}                        -> get_by_slug
/// PUT    /{project}                        -> update
/// DELETE /{project}                        -> delete
/// POST   /{project}/join-invite/{invite}   -> guest::join_invite
///        /{project}/sprints/...            -> see routes::sprint
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{project}",
            get(project::get_by_slug)
                .put(project::update)
                .delete(project::delete),
        )
        .route(
            "/{project}/join-invite/{invite}",
            post(guest::join_invite),
        )
        .nest("/{project}/sprints", sprint::router())
}
