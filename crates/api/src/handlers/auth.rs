//! Handlers for the `/auth` resource.

use autochrone_core::error::CoreError;
use autochrone_core::scope::SCOPE_BASIC;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A `basic`-scope token for the authenticated user.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/v1/auth/login
///
/// Exchange username + password for a token. Unknown users and wrong
/// passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    };

    let user = state
        .repo
        .user_by_username(&input.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(username = %user.username, "Login rejected");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user, SCOPE_BASIC)?;
    tracing::info!(username = %user.username, scope = SCOPE_BASIC, "Token issued");

    Ok(Json(LoginResponse { token }))
}
