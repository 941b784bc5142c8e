pub mod auth;
pub mod guest;
pub mod lookup;
pub mod project;
pub mod sprint;
pub mod user;

use axum::http::header::LOCATION;
use axum::http::{HeaderName, StatusCode};
use axum::Json;

/// `201 Created` with a `Location` header and the new resource as body.
pub type Created<T> = (StatusCode, [(HeaderName, String); 1], Json<T>);

pub fn created<T>(location: String, body: T) -> Created<T> {
    (StatusCode::CREATED, [(LOCATION, location)], Json(body))
}

pub fn project_location(username: &str, project_slug: &str) -> String {
    format!("/api/v1/users/{username}/projects/{project_slug}")
}

pub fn sprint_location(username: &str, project_slug: &str, sprint_slug: &str) -> String {
    format!(
        "{}/sprints/{sprint_slug}",
        project_location(username, project_slug)
    )
}
