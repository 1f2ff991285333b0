use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::gate::{ForbiddenError, RouteClass, authorize};
use super::helpers::extract_bearer_token;
use super::token::CredentialError;
use crate::server::AppState;
use crate::types::Principal;

/// Extractor that requires any authenticated principal.
pub struct RequireOwner(pub Principal);

/// Extractor that requires a staff or admin principal.
pub struct RequireStaff(pub Principal);

/// Extractor that requires an admin principal.
pub struct RequireAdmin(pub Principal);

#[derive(Debug)]
pub enum AuthError {
    Unauthenticated(CredentialError),
    Forbidden(ForbiddenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Unauthenticated(e) => (StatusCode::UNAUTHORIZED, format!("Unauthorized: {e}")),
            AuthError::Forbidden(e) => (StatusCode::FORBIDDEN, format!("Forbidden: {e}")),
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"petclinic\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireOwner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_principal(parts, state, RouteClass::OwnerOrAbove)?;
        Ok(RequireOwner(principal))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireStaff {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_principal(parts, state, RouteClass::StaffOrAbove)?;
        Ok(RequireStaff(principal))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let principal = extract_principal(parts, state, RouteClass::AdminOnly)?;
        Ok(RequireAdmin(principal))
    }
}

fn extract_principal(
    parts: &Parts,
    state: &AppState,
    route: RouteClass,
) -> Result<Principal, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let principal = extract_bearer_token(auth_header)
        .and_then(|raw| state.credentials.decode(raw))
        .map_err(|e| {
            tracing::debug!("Rejected credential: {e}");
            AuthError::Unauthenticated(e)
        })?;

    authorize(route, &principal).map_err(|e| {
        tracing::debug!(
            user_id = principal.user_id,
            role = %principal.role,
            "Role gate denied: {e}"
        );
        AuthError::Forbidden(e)
    })?;

    Ok(principal)
}
