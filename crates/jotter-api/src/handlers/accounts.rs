//! Signup, login, logout and password change endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use jotter_core::{RevokeOutcome, SignupRequest};

use crate::extract::{AuthSession, Credentials, JsonBody};
use crate::{ApiError, AppState};

/// Request body for login.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for changing the caller's password.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Register a new account.
///
/// # Returns
/// - 201 Created with the new user (no password hash)
/// - 400 Bad Request if a field fails validation
/// - 409 Conflict if the username or email is taken
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut uow = state.store.begin().await?;
    let user = state.accounts.signup(uow.as_mut(), &req).await?;
    uow.commit().await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

/// Exchange email and password for a bearer token.
///
/// # Returns
/// - 200 OK with `{token}`
/// - 401 Unauthorized with the same message for unknown email and wrong password
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut uow = state.store.begin().await?;
    let token = state
        .accounts
        .login(uow.as_mut(), &req.email, &req.password)
        .await?;
    uow.commit().await?;
    Ok(Json(json!({ "token": token })))
}

/// Revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<Json<Value>, ApiError> {
    let mut uow = state.store.begin().await?;
    let outcome = state
        .accounts
        .logout(uow.as_mut(), credentials.header())
        .await?;
    uow.commit().await?;

    let message = match outcome {
        RevokeOutcome::Revoked => "Successfully logged out",
        RevokeOutcome::AlreadyRevoked => "Token already revoked (logged out)",
    };
    Ok(Json(json!({ "message": message })))
}

/// Change the caller's password. Tokens issued earlier stay valid.
pub async fn change_password(
    State(state): State<AppState>,
    credentials: Credentials,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut session = AuthSession::open(&state, &credentials).await?;
    state
        .accounts
        .change_password(
            session.uow.as_mut(),
            session.user_id,
            &req.old_password,
            &req.new_password,
        )
        .await?;
    session.commit().await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
