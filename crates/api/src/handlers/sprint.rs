//! Handlers for `/users/{username}/projects/{project}/sprints`, including
//! chaining and milestone figures.

use autochrone_core::chain::{self, NextSprint};
use autochrone_core::error::CoreError;
use autochrone_core::milestone::{self, MilestoneSummary};
use autochrone_core::project::{group_by_date, DateSprints};
use autochrone_core::sprint::{parse_time_start, Sprint, SprintUpdate};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::{created, lookup, sprint_location, Created};
use crate::error::AppResult;
use crate::middleware::scope::RequireBasic;
use crate::state::AppState;

/// Request body for `POST .../sprints`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSprintRequest {
    /// RFC 3339 or `YYYY-MM-DDTHH:MM:SS±HHMM`.
    pub time_start: String,
    /// Minutes.
    pub duration: i32,
    /// Trailing break in minutes; omitted means a single sprint.
    #[serde(rename = "break", default)]
    pub pomodoro_break: i32,
}

/// Request body for `POST .../next-sprint`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextSprintRequest {
    /// Only needed when no successor exists yet.
    pub time_start: Option<String>,
}

type ProjectPath = Path<(String, String)>;
type SprintPath = Path<(String, String, String)>;

/// GET /api/v1/users/{username}/projects/{project}/sprints
pub async fn list(
    State(state): State<AppState>,
    Path((username, project_slug)): ProjectPath,
) -> AppResult<Json<Vec<Sprint>>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    Ok(Json(state.repo.sprints_by_project(project.id).await?))
}

/// GET /api/v1/users/{username}/projects/{project}/sprints/by-date
pub async fn list_by_date(
    State(state): State<AppState>,
    Path((username, project_slug)): ProjectPath,
) -> AppResult<Json<Vec<DateSprints>>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    let sprints = state.repo.sprints_by_project(project.id).await?;
    Ok(Json(group_by_date(&sprints)))
}

/// POST /api/v1/users/{username}/projects/{project}/sprints
pub async fn create(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug)): ProjectPath,
    Json(input): Json<CreateSprintRequest>,
) -> AppResult<Created<Sprint>> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let time_start = parse_time_start(&input.time_start)?;

    let sprint = chain::create_sprint(
        state.repo.as_ref(),
        &project,
        time_start,
        input.duration,
        input.pomodoro_break,
    )
    .await?;

    Ok(created(
        sprint_location(&auth.user.username, &project.slug, &sprint.slug),
        sprint,
    ))
}

/// GET /api/v1/users/{username}/projects/{project}/sprints/{sprint}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path((username, project_slug, sprint_slug)): SprintPath,
) -> AppResult<Json<Sprint>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    Ok(Json(lookup::sprint(&state, &project, &sprint_slug).await?))
}

/// PUT /api/v1/users/{username}/projects/{project}/sprints/{sprint}
///
/// Only word count, milestone flag and comment change. Concurrent updates
/// overwrite each other.
pub async fn update(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug, sprint_slug)): SprintPath,
    Json(input): Json<SprintUpdate>,
) -> AppResult<Json<Sprint>> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let mut sprint = lookup::sprint(&state, &project, &sprint_slug).await?;
    if input.word_count < 0 {
        return Err(CoreError::Validation("word count must not be negative".into()).into());
    }

    sprint.apply(input);
    if !state.repo.update_sprint(&sprint).await? {
        return Err(CoreError::not_found("Sprint", &sprint.slug).into());
    }
    tracing::info!(
        sprint_slug = %sprint.slug,
        word_count = sprint.word_count,
        is_milestone = sprint.is_milestone,
        "Sprint updated"
    );
    Ok(Json(sprint))
}

/// DELETE /api/v1/users/{username}/projects/{project}/sprints/{sprint}
pub async fn delete(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug, sprint_slug)): SprintPath,
) -> AppResult<StatusCode> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let sprint = lookup::sprint(&state, &project, &sprint_slug).await?;
    if state.repo.delete_sprint(sprint.id).await? {
        tracing::info!(sprint_slug = %sprint.slug, "Sprint deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Sprint", &sprint.slug).into())
    }
}

/// GET /api/v1/users/{username}/projects/{project}/sprints/{sprint}/next-sprint
///
/// 404 until a successor exists, and always for a single sprint.
pub async fn next_sprint(
    State(state): State<AppState>,
    Path((username, project_slug, sprint_slug)): SprintPath,
) -> AppResult<Json<Sprint>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    let sprint = lookup::sprint(&state, &project, &sprint_slug).await?;
    Ok(Json(chain::find_next_sprint(state.repo.as_ref(), &sprint).await?))
}

/// POST /api/v1/users/{username}/projects/{project}/sprints/{sprint}/next-sprint
///
/// Returns the existing successor with 200, or creates it with 201.
pub async fn get_or_create_next_sprint(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug, sprint_slug)): SprintPath,
    Json(input): Json<NextSprintRequest>,
) -> AppResult<Response> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    let sprint = lookup::sprint(&state, &project, &sprint_slug).await?;
    let candidate = input
        .time_start
        .as_deref()
        .map(parse_time_start)
        .transpose()?;

    let response = match chain::get_or_create_next_sprint(state.repo.as_ref(), &sprint, candidate)
        .await?
    {
        NextSprint::Existing(next) => Json(next).into_response(),
        NextSprint::Created(next) => created(
            sprint_location(&auth.user.username, &project.slug, &next.slug),
            next,
        )
        .into_response(),
    };
    Ok(response)
}

/// GET /api/v1/users/{username}/projects/{project}/sprints/{sprint}/milestone
pub async fn milestone(
    State(state): State<AppState>,
    Path((username, project_slug, sprint_slug)): SprintPath,
) -> AppResult<Json<MilestoneSummary>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    let sprint = lookup::sprint(&state, &project, &sprint_slug).await?;
    Ok(Json(
        milestone::milestone_summary(state.repo.as_ref(), &sprint).await?,
    ))
}
