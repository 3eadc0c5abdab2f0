//! Auth Routes
//!
//! - POST /api/auth/register - Create an account
//! - POST /api/auth/login - Exchange credentials for a bearer token
//! - GET /api/auth/me - The account behind the token

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::models::{LoginRequest, RegisterRequest, TokenResponse, User};
use crate::sandbox::error::{SandboxError, SandboxResult};
use crate::sandbox::state::SandboxState;
use crate::validation::validate_email;

/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<SandboxState>>,
    Json(req): Json<RegisterRequest>,
) -> SandboxResult<Json<User>> {
    let email = req.email.trim();
    validate_email(email).map_err(|e| SandboxError::Unprocessable(e.to_string()))?;

    let user = state
        .create_account(req.name.trim(), email, &req.password, req.role)
        .await?;
    Ok(Json(user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<SandboxState>>,
    Json(req): Json<LoginRequest>,
) -> SandboxResult<Json<TokenResponse>> {
    let access_token = state.login(req.email.trim(), &req.password).await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<SandboxState>>,
    headers: HeaderMap,
) -> SandboxResult<Json<User>> {
    Ok(Json(state.authenticate(&headers).await?))
}
