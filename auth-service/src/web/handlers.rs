//! Authentication endpoint handlers.
//!
//! Handlers only extract the request, hand it to [`AuthService`] and shape
//! the response. Validation and provider calls live in the service.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::{AuthService, ConfirmEmailRequest, LoginRequest, RegisterRequest};
use crate::cognito::AuthTokens;
use crate::error::AuthError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Unwrap a JSON body, turning a malformed payload into a validation error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AuthError::Validation(vec![format!("body: {}", rejection.body_text())])
    })
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<StatusCode, AuthError> {
    let request = json_body(payload)?;
    let group = state.auth.register(request).await?;

    info!(group = %group, "http_register_success");
    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthTokens>, AuthError> {
    let request = json_body(payload)?;
    let tokens = state.auth.login(request).await?;

    Ok(Json(tokens))
}

pub async fn confirm_email(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmEmailRequest>, JsonRejection>,
) -> Result<StatusCode, AuthError> {
    let request = json_body(payload)?;
    state.auth.confirm_email(request).await?;

    Ok(StatusCode::OK)
}
