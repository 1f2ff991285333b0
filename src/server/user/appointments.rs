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
use crate::service::{AppointmentPatch, NewAppointment};

pub async fn list_appointments(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let appointments = state.appointments().upcoming_for_owner(&principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(appointments)))
}

pub async fn create_appointment(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewAppointment>,
) -> impl IntoResponse {
    let booked = state.appointments().create(req, &principal)?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(booked))))
}

pub async fn get_appointment(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let appointment = state.appointments().get(id, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(appointment)))
}

pub async fn update_appointment(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AppointmentPatch>,
) -> impl IntoResponse {
    let appointment = state.appointments().update(id, req, &principal)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(appointment)))
}

pub async fn delete_appointment(
    RequireOwner(principal): RequireOwner,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.appointments().delete(id, &principal)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
