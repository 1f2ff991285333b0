mod accounts;
mod appointments;
mod owners;
mod pets;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route(
            "/owners",
            get(owners::get_owner)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        )
        // Pets
        .route("/pets", get(pets::list_pets).post(pets::create_pet))
        .route(
            "/pets/{id}",
            get(pets::get_pet)
                .put(pets::update_pet)
                .delete(pets::delete_pet),
        )
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
}
