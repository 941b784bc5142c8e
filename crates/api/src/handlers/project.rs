//! Handlers for `/users/{username}/projects`.

use autochrone_core::error::CoreError;
use autochrone_core::project::{parse_date, Project, ProjectDetails, ProjectWithSprints};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{created, lookup, project_location, Created};
use crate::error::AppResult;
use crate::middleware::scope::RequireBasic;
use crate::state::AppState;

/// Request body for creating or replacing a project.
///
/// On update the slug may be omitted; if present it must equal the path slug.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    pub slug: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_start: String,
    /// `YYYY-MM-DD`.
    pub date_end: String,
    #[serde(default)]
    pub word_count_start: i32,
    pub word_count_goal: i32,
}

impl ProjectInput {
    fn into_details(self, slug: String) -> Result<ProjectDetails, CoreError> {
        let details = ProjectDetails {
            name: self.name.trim().to_string(),
            slug,
            date_start: parse_date(&self.date_start)?,
            date_end: parse_date(&self.date_end)?,
            word_count_start: self.word_count_start,
            word_count_goal: self.word_count_goal,
        };
        details.validate()?;
        Ok(details)
    }
}

/// GET /api/v1/users/{username}/projects
pub async fn list(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<Project>>> {
    let owner = lookup::user(&state, &username).await?;
    let projects = state.repo.projects_by_owner(owner.id).await?;
    Ok(Json(projects))
}

/// POST /api/v1/users/{username}/projects
pub async fn create(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Json(mut input): Json<ProjectInput>,
) -> AppResult<Created<Project>> {
    let slug = input
        .slug
        .take()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| CoreError::Validation("project slug is required".into()))?;
    let details = input.into_details(slug)?;

    let project = state.repo.insert_project(auth.user.id, &details).await?;
    tracing::info!(
        user_id = auth.user.id,
        project_id = project.id,
        project_slug = %project.slug,
        "Project created"
    );

    Ok(created(
        project_location(&auth.user.username, &project.slug),
        project,
    ))
}

/// GET /api/v1/users/{username}/projects/{project}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path((username, project_slug)): Path<(String, String)>,
) -> AppResult<Json<ProjectWithSprints>> {
    let (_, project) = lookup::user_project(&state, &username, &project_slug).await?;
    let sprints = state.repo.sprints_by_project(project.id).await?;
    Ok(Json(ProjectWithSprints { project, sprints }))
}

/// PUT /api/v1/users/{username}/projects/{project}
pub async fn update(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug)): Path<(String, String)>,
    Json(mut input): Json<ProjectInput>,
) -> AppResult<Json<Project>> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    if let Some(slug) = input.slug.take() {
        if slug.trim() != project.slug {
            return Err(CoreError::Validation(format!(
                "project slug is immutable (path '{}', body '{slug}')",
                project.slug
            ))
            .into());
        }
    }
    let details = input.into_details(project.slug.clone())?;

    let updated = state
        .repo
        .update_project(project.id, &details)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", &project.slug))?;
    tracing::info!(project_id = updated.id, "Project updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/users/{username}/projects/{project}
///
/// Removes the project together with all of its sprints.
pub async fn delete(
    RequireBasic(auth): RequireBasic,
    State(state): State<AppState>,
    Path((_, project_slug)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let project = lookup::project(&state, &auth.user, &project_slug).await?;
    if state.repo.delete_project(project.id).await? {
        tracing::info!(project_id = project.id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("Project", &project.slug).into())
    }
}
