use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireOwner;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::UserPatch;

pub async fn get_owner(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let user = state.users().get(principal.user_id, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn update_owner(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UserPatch>,
) -> impl IntoResponse {
    let user = state.users().update(principal.user_id, req, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_owner(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.users().delete(principal.user_id, &principal)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
