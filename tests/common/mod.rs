#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use petclinic::auth::CredentialVerifier;
use petclinic::server::{AppState, create_router};
use petclinic::service::{AccountDetails, BusinessHours};
use petclinic::store::{SqliteStore, Store};
use petclinic::types::Role;

const SECRET: &[u8] = b"integration-test-secret-0123456789";

pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = SqliteStore::in_memory().expect("open store");
        store.initialize().expect("initialize store");

        let state = Arc::new(AppState::new(
            Arc::new(store),
            CredentialVerifier::new(SECRET, Duration::hours(1)),
            BusinessHours::default(),
        ));
        let router = create_router(state.clone());

        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Response {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Response {
        self.request(Method::POST, path, Some(token), Some(body))
            .await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Response {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Response {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    /// Signs up an owner through the API and returns its credential.
    pub async fn signup(&self, username: &str) -> String {
        let resp = self
            .request(
                Method::POST,
                "/api/v1/signup",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "password": "password123",
                    "name": username,
                    "email": format!("{username}@example.com"),
                    "contact": "555-0100",
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "signup {username}: {}", resp.body);
        resp.body["token"].as_str().expect("token").to_string()
    }

    /// Creates an account with `role` directly and returns its credential.
    pub fn user_with_role(&self, username: &str, role: Role) -> String {
        let user = self
            .state
            .users()
            .register(
                AccountDetails {
                    username: username.to_string(),
                    password: "password123".to_string(),
                    name: username.to_string(),
                    email: format!("{username}@example.com"),
                    contact: String::new(),
                },
                role,
            )
            .expect("register user");
        self.state.credentials.issue(&user).expect("issue credential")
    }

    pub async fn create_pet(&self, token: &str, name: &str) -> i64 {
        let resp = self
            .post("/api/v1/pets", token, serde_json::json!({"name": name, "species": "dog"}))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
        resp.body["data"]["id"].as_i64().expect("pet id")
    }
}

/// A bookable slot at `hour:minute` UTC on a day well in the future.
pub fn future_slot(days_ahead: i64, hour: u32, minute: u32) -> DateTime<Utc> {
    let day = Utc::now() + Duration::days(days_ahead);
    Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), hour, minute, 0)
        .single()
        .expect("valid slot")
}

pub fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
