pub mod auth;
pub mod health;
pub mod project;
pub mod sprint;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy ("auth" = `basic`-scope token issued to `{username}`):
///
/// ```text
/// /auth/login                                          login (public)
///
/// /users                                               register (POST)
/// /users/{username}                                    profile (GET)
///
/// /users/{username}/projects                           list, create (auth)
/// /users/{username}/projects/{project}                 get, update (auth), delete (auth)
/// /users/{username}/projects/{project}/join-invite/{invite}
///                                                      join as guest (POST, auth)
///
/// /users/{username}/projects/{project}/sprints         list, create (auth)
/// /users/{username}/projects/{project}/sprints/by-date grouped by UTC day
/// .../sprints/{sprint}                                 get, update (auth), delete (auth)
/// .../sprints/{sprint}/next-sprint                     lookup (GET), get-or-create (POST, auth)
/// .../sprints/{sprint}/milestone                       milestone summary
/// .../sprints/{sprint}/open                            open to guests (POST, auth)
/// .../sprints/{sprint}/guests                          guest sprints
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
}
