//! Handlers for sharing sprints with guests.

use autochrone_core::error::CoreError;
use autochrone_core::guest;
use autochrone_core::sprint::Sprint;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{created, lookup, sprint_location, Created};
use crate::error::AppResult;
use crate::middleware::scope::RequireBasic;
use crate::state::AppState;

/// Request body for `POST .../open`.
#[derive(Debug, Default, Deserialize)]
pub struct OpenRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub invite_slug: String,
    pub invite_comment: String,
    /// Slug of the host sprint.
    pub sprint: String,
}

/// POST /api/v1/users/{username}/projects/{project}/sprints/{sprint}/open
///
/// Hands out a new invite; earlier invites stay valid.
pub async fn open(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug, sprint_slug)): Path<(String, String, String)>,
    Json(input): Json<OpenRequest>,
) -> AppResult<(StatusCode, Json<InviteResponse>)> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let host = lookup::sprint(&state, &project, &sprint_slug).await?;

    let invite_slug =
        guest::open_to_guests(state.repo.as_ref(), &host, &input.comment, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            invite_slug,
            invite_comment: input.comment,
            sprint: host.slug,
        }),
    ))
}

/// GET /api/v1/users/{username}/projects/{project}/sprints/{sprint}/guests
pub async fn list_guests(
    State(state): State<AppState>,
    Path((username, project_slug, sprint_slug)): Path<(String, String, String)>,
) -> AppResult<Json<Vec<Sprint>>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    let host = lookup::sprint(&state, &project, &sprint_slug).await?;
    Ok(Json(guest::guest_sprints(state.repo.as_ref(), &host).await?))
}

/// POST /api/v1/users/{username}/projects/{project}/join-invite/{invite}
///
/// Copies the host sprint's timing into a new sprint on the caller's project.
pub async fn join_invite(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug, invite_slug)): Path<(String, String, String)>,
) -> AppResult<Created<Sprint>> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let host = state
        .repo
        .sprint_by_invite_slug(&invite_slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Invite", &invite_slug))?;

    let sprint = guest::new_guest_sprint(state.repo.as_ref(), &project, &host, Utc::now()).await?;

    Ok(created(
        sprint_location(&auth.user.username, &project.slug, &sprint.slug),
        sprint,
    ))
}
