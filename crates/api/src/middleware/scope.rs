//! Scope-checked access to a user's resources.
//!
//! The user is resolved from the `{username}` path segment, the token is
//! checked against that user's current allow-list, and the token must have
//! been issued to that same user.

use std::collections::HashMap;

use autochrone_core::error::CoreError;
use autochrone_core::scope::SCOPE_BASIC;
use autochrone_core::user::User;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::auth::BearerToken;
use crate::auth::token::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// The path user, authenticated.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub claims: Claims,
}

/// Authorize the request for `scope` on behalf of the `{username}` path user.
pub async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    scope: &str,
) -> Result<AuthUser, AppError> {
    let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

    let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    let username = params
        .get("username")
        .ok_or_else(|| AppError::InternalError("route has no {username} segment".into()))?;

    let user = state
        .repo
        .user_by_username(username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?;

    let claims = state.tokens.check_scope(&user, &token, scope)?;
    if claims.username != user.username {
        tracing::warn!(
            path_user = %user.username,
            token_user = %claims.username,
            "Token presented for another user's resources"
        );
        return Err(AppError::Core(CoreError::Forbidden(
            "Token was not issued to this user".into(),
        )));
    }

    Ok(AuthUser { user, claims })
}

/// Requires a `basic`-scope token issued to the path user.
///
/// ```ignore
/// async fn create(RequireBasic(auth): RequireBasic) -> AppResult<Json<()>> {
///     tracing::info!(username = %auth.user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireBasic(pub AuthUser);

impl FromRequestParts<AppState> for RequireBasic {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, SCOPE_BASIC).await.map(RequireBasic)
    }
}
