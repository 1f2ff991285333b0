use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::staff::staff_router;
use super::user::user_router;
use crate::auth::{CredentialVerifier, PasswordManager};
use crate::service::{AppointmentService, BusinessHours, PetService, UserService};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub credentials: CredentialVerifier,
    pub passwords: PasswordManager,
    pub hours: BusinessHours,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, credentials: CredentialVerifier, hours: BusinessHours) -> Self {
        Self {
            store,
            credentials,
            passwords: PasswordManager::new(),
            hours,
        }
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.store.as_ref(), &self.passwords, &self.credentials)
    }

    pub fn pets(&self) -> PetService<'_> {
        PetService::new(self.store.as_ref())
    }

    /// Appointment service with its clock set to the current time.
    pub fn appointments(&self) -> AppointmentService<'_> {
        AppointmentService::new(self.store.as_ref(), self.hours)
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1/staff", staff_router())
        .nest("/api/v1", user_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
