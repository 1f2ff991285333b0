use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::TokenResponse;
use crate::server::response::ApiError;
use crate::service::{AccountDetails, LoginRequest};

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountDetails>,
) -> impl IntoResponse {
    let token = state.users().signup(req)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let token = state.users().login(req)?;

    Ok::<_, ApiError>(Json(TokenResponse { token }))
}
