//! Path-segment resolution shared by the handlers.
//!
//! Every miss is a [`CoreError::NotFound`] naming what was looked up.

use autochrone_core::error::CoreError;
use autochrone_core::project::Project;
use autochrone_core::sprint::Sprint;
use autochrone_core::user::User;

use crate::error::AppResult;
use crate::state::AppState;

pub async fn user(state: &AppState, username: &str) -> AppResult<User> {
    let user = state
        .repo
        .user_by_username(username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?;
    Ok(user)
}

pub async fn project(state: &AppState, owner: &User, slug: &str) -> AppResult<Project> {
    let project = state
        .repo
        .project_by_slug(owner.id, slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", format!("{}/{slug}", owner.username)))?;
    Ok(project)
}

/// Resolve `{username}/{project}` in one go.
pub async fn user_project(
    state: &AppState,
    username: &str,
    project_slug: &str,
) -> AppResult<(User, Project)> {
    let owner = user(state, username).await?;
    let project = project(state, &owner, project_slug).await?;
    Ok((owner, project))
}

/// A sprint slug is global, but it only resolves under its own project.
pub async fn sprint(state: &AppState, project: &Project, slug: &str) -> AppResult<Sprint> {
    match state.repo.sprint_by_slug(slug).await? {
        Some(sprint) if sprint.project_id == project.id => Ok(sprint),
        _ => Err(CoreError::not_found("Sprint", slug).into()),
    }
}
