mod common;

use axum::http::{Method, StatusCode, header};
use chrono::{DateTime, Utc};
use serde_json::json;

use common::{TestApp, future_slot, rfc3339};
use petclinic::types::Role;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let resp = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!("OK"));
}

#[tokio::test]
async fn test_signup_and_login() {
    let app = TestApp::new();
    app.signup("anna").await;

    let resp = app
        .request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({"username": "anna", "password": "password123"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let token = resp.body["token"].as_str().unwrap().to_string();

    let me = app.get("/api/v1/owners", &token).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["username"], "anna");
    assert_eq!(me.body["data"]["role"], "owner");
    assert!(me.body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = TestApp::new();
    app.signup("anna").await;

    let resp = app
        .request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({"username": "anna", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"], "invalid credentials");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new();

    let resp = app
        .request(
            Method::POST,
            "/api/v1/signup",
            None,
            Some(json!({"username": "anna", "password": "short", "name": "A", "email": "a@b.c", "contact": "1"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    app.signup("anna").await;
    let resp = app
        .request(
            Method::POST,
            "/api/v1/signup",
            None,
            Some(json!({"username": "anna", "password": "password123", "name": "A", "email": "x@b.c", "contact": "1"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "username already exists");
}

#[tokio::test]
async fn test_missing_credential_is_401_with_challenge() {
    let app = TestApp::new();
    let resp = app.request(Method::GET, "/api/v1/pets", None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.headers.contains_key(header::WWW_AUTHENTICATE));
    assert!(resp.body["data"].is_null());

    let resp = app.get("/api/v1/pets", "garbage").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gates() {
    let app = TestApp::new();
    let owner = app.signup("anna").await;
    let staff = app.user_with_role("sam", Role::Staff);
    let admin = app.user_with_role("root", Role::Admin);

    for path in [
        "/api/v1/staff/pets",
        "/api/v1/staff/appointments/upcoming",
        "/api/v1/staff/appointments/today",
    ] {
        assert_eq!(app.get(path, &owner).await.status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(app.get(path, &staff).await.status, StatusCode::OK, "{path}");
        assert_eq!(app.get(path, &admin).await.status, StatusCode::OK, "{path}");
    }

    assert_eq!(
        app.get("/api/v1/admin/users", &staff).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get("/api/v1/admin/users", &admin).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_pet_ownership() {
    let app = TestApp::new();
    let anna = app.signup("anna").await;
    let bob = app.signup("bob").await;
    let staff = app.user_with_role("sam", Role::Staff);

    let rex = app.create_pet(&anna, "Rex").await;
    let path = format!("/api/v1/pets/{rex}");

    assert_eq!(app.get(&path, &anna).await.status, StatusCode::OK);
    assert_eq!(app.get(&path, &bob).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&path, &staff).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/api/v1/pets/9999", &bob).await.status,
        StatusCode::NOT_FOUND
    );

    let resp = app.put(&path, &bob, json!({"name": "Stolen"})).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .put(&path, &anna, json!({"breed": "beagle", "name": ""}))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["name"], "Rex");
    assert_eq!(resp.body["data"]["breed"], "beagle");

    let own = app.get("/api/v1/pets", &bob).await;
    assert_eq!(own.body["data"], json!([]));

    let all = app.get("/api/v1/staff/pets", &staff).await;
    assert_eq!(all.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(all.body["has_more"], false);

    assert_eq!(app.delete(&path, &bob).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.delete(&path, &anna).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&path, &anna).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_appointment_booking_flow() {
    let app = TestApp::new();
    let anna = app.signup("anna").await;
    let bob = app.signup("bob").await;
    let admin = app.user_with_role("root", Role::Admin);

    let rex = app.create_pet(&anna, "Rex").await;
    let tom = app.create_pet(&bob, "Tom").await;
    let slot = future_slot(3, 10, 0);

    let resp = app
        .post(
            "/api/v1/appointments",
            &anna,
            json!({"slot": rfc3339(slot), "reason": "checkup", "pet_id": rex}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    let id = resp.body["data"]["id"].as_i64().unwrap();
    assert_eq!(resp.body["data"]["pet"]["name"], "Rex");

    // Bob cannot book Anna's pet, even at a free slot.
    let resp = app
        .post(
            "/api/v1/appointments",
            &bob,
            json!({"slot": rfc3339(future_slot(3, 11, 0)), "pet_id": rex}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    // Same slot for another pet conflicts.
    let resp = app
        .post(
            "/api/v1/appointments",
            &bob,
            json!({"slot": rfc3339(slot), "pet_id": tom}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["error"],
        format!("slot already booked by appointment {id}")
    );

    let path = format!("/api/v1/appointments/{id}");
    assert_eq!(app.get(&path, &admin).await.status, StatusCode::OK);
    assert_eq!(app.get(&path, &bob).await.status, StatusCode::FORBIDDEN);

    let resp = app.put(&path, &anna, json!({"reason": "vaccination"})).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.body["data"]["reason"], "vaccination");
    let stored: DateTime<Utc> = resp.body["data"]["slot"].as_str().unwrap().parse().unwrap();
    assert_eq!(stored, slot);

    let own = app.get("/api/v1/appointments", &anna).await;
    assert_eq!(own.body["data"].as_array().unwrap().len(), 1);
    let own = app.get("/api/v1/appointments", &bob).await;
    assert_eq!(own.body["data"], json!([]));

    let upcoming = app.get("/api/v1/staff/appointments/upcoming", &admin).await;
    assert_eq!(upcoming.body["data"][0]["id"], id);

    assert_eq!(app.delete(&path, &anna).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&path, &admin).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_slots() {
    let app = TestApp::new();
    let anna = app.signup("anna").await;
    let rex = app.create_pet(&anna, "Rex").await;

    let cases = [
        (future_slot(-2, 10, 0), "invalid appointment slot: past"),
        (future_slot(2, 8, 30), "invalid appointment slot: outside business hours"),
        (future_slot(2, 17, 0), "invalid appointment slot: outside business hours"),
        (future_slot(2, 10, 45), "invalid appointment slot: not on a half-hour boundary"),
    ];

    for (slot, message) in cases {
        let resp = app
            .post(
                "/api/v1/appointments",
                &anna,
                json!({"slot": rfc3339(slot), "pet_id": rex}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{slot}");
        assert_eq!(resp.body["error"], message, "{slot}");
    }

    let resp = app
        .post(
            "/api/v1/appointments",
            &anna,
            json!({"slot": rfc3339(future_slot(2, 10, 0)), "pet_id": 4242}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_account_management() {
    let app = TestApp::new();
    let anna = app.signup("anna").await;
    app.signup("bob").await;

    let resp = app.put("/api/v1/owners", &anna, json!({"username": "bob"})).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .put("/api/v1/owners", &anna, json!({"name": "Anna B", "contact": ""}))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["name"], "Anna B");
    assert_eq!(resp.body["data"]["contact"], "555-0100");

    assert_eq!(
        app.delete("/api/v1/owners", &anna).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get("/api/v1/owners", &anna).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_admin_user_management() {
    let app = TestApp::new();
    let admin = app.user_with_role("root", Role::Admin);

    let resp = app
        .post(
            "/api/v1/admin/users",
            &admin,
            json!({
                "username": "sam",
                "password": "password123",
                "name": "Sam",
                "email": "sam@example.com",
                "contact": "",
                "role": "staff",
            }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    assert_eq!(resp.body["data"]["role"], "staff");
    let id = resp.body["data"]["id"].as_i64().unwrap();

    let list = app.get("/api/v1/admin/users", &admin).await;
    assert_eq!(list.body["data"].as_array().unwrap().len(), 2);

    let path = format!("/api/v1/admin/users/{id}");
    assert_eq!(app.get(&path, &admin).await.body["data"]["username"], "sam");
    assert_eq!(app.delete(&path, &admin).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get(&path, &admin).await.status, StatusCode::NOT_FOUND);
}
