use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};

use crate::auth::RequireStaff;
use crate::server::AppState;
use crate::server::dto::PaginationParams;
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse, paginate,
};

pub fn staff_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pets", get(list_pets))
        .route("/appointments/upcoming", get(upcoming_appointments))
        .route("/appointments/today", get(todays_appointments))
}

async fn list_pets(
    RequireStaff(staff): RequireStaff,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let cursor = params.cursor.unwrap_or(0);

    let pets = state.pets().list_all(&staff, cursor, DEFAULT_PAGE_SIZE + 1)?;

    let (pets, next_cursor, has_more) = paginate(pets, DEFAULT_PAGE_SIZE as usize, |p| p.id);

    Ok::<_, ApiError>(Json(PaginatedResponse::new(pets, next_cursor, has_more)))
}

async fn upcoming_appointments(
    RequireStaff(staff): RequireStaff,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let appointments = state.appointments().upcoming(&staff)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(appointments)))
}

async fn todays_appointments(
    RequireStaff(staff): RequireStaff,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let appointments = state.appointments().today(&staff)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(appointments)))
}
