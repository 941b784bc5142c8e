//! Route definitions for `/users/{username}/projects/{project}/sprints`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{guest, sprint};
use crate::state::AppState;

/// Routes mounted at `/users/{username}/projects/{project}/sprints`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /by-date                 -> list_by_date
/// GET    /{sprint}                -> get_by_slug
/// PUT    /{sprint}                -> update
/// DELETE /{sprint}                -> delete
/// GET    /{sprint}/next-sprint    -> next_sprint
/// POST   /{sprint}/next-sprint    -> get_or_create_next_sprint
/// GET    /{sprint}/milestone      -> milestone
/// POST   /{sprint}/open           -> guest::open
/// GET    /{sprint}/guests         -> guest::list_guests
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sprint::list).post(sprint::create))
        .route("/by-date", get(sprint::list_by_date))
        .route(
            "/{sprint}",
            get(sprint::get_by_slug)
                .put(sprint::update)
                .delete(sprint::delete),
        )
        .route(
            "/{sprint}/next-sprint",
            get(sprint::next_sprint).post(sprint::get_or_create_next_sprint),
        )
        .route("/{sprint}/milestone", get(sprint::milestone))
        .route("/{sprint}/open", post(guest::open))
        .route("/{sprint}/guests", get(guest::list_guests))
}
