use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireOwner;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};
use crate::service::{NewPet, PetPatch};

pub async fn list_pets(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let pets = state.pets().list_own(&principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pets)))
}

pub async fn create_pet(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewPet>,
) -> impl IntoResponse {
    let pet = state.pets().create(req, &principal)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(pet))))
}

pub async fn get_pet(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let pet = state.pets().get(id, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pet)))
}

pub async fn update_pet(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<PetPatch>,
) -> impl IntoResponse {
    let pet = state.pets().update(id, req, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pet)))
}

pub async fn delete_pet(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.pets().delete(id, &principal)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
