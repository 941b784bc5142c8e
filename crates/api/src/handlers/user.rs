//! Handlers for the `/users` resource: registration and public profile.

use autochrone_core::error::CoreError;
use autochrone_core::project::Project;
use autochrone_core::types::DbId;
use autochrone_core::user::NewUser;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{created, lookup, Created};
use crate::auth::password::{check_new_password, hash_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm: String,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub username: String,
    pub projects: Vec<Project>,
}

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Created<UserProfile>> {
    let username = input.username.trim();
    if username.is_empty() || username.contains('/') {
        return Err(CoreError::Validation(format!("invalid username '{username}'")).into());
    }
    check_new_password(&input.password, &input.confirm).map_err(CoreError::Validation)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = state
        .repo
        .insert_user(&NewUser::new(username, password_hash))
        .await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(created(
        format!("/api/v1/users/{}", user.username),
        UserProfile {
            id: user.id,
            username: user.username,
            projects: Vec::new(),
        },
    ))
}

/// GET /api/v1/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let user = lookup::user(&state, &username).await?;
    let projects = state.repo.projects_by_owner(user.id).await?;
    Ok(Json(UserProfile {
        id: user.id,
        username: user.username,
        projects,
    }))
}
