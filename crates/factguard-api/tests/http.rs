//! End-to-end tests against the full router, driven with `oneshot` over an
//! in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use factguard_api::{AppState, AppStateInner, Settings, router};
use factguard_db::Database;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
        let mut settings = Settings::new("integration-test-secret");
        settings.hash_memory_kib = 1024;
        settings.hash_iterations = 1;
        settings.admin_emails = vec![ADMIN_EMAIL.into()];

        let state: AppState = Arc::new(AppStateInner::new(db, &settings).expect("state"));
        Self {
            router: router(state.clone()),
            state,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn signup(&self, username: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/signup",
                None,
                Some(json!({ "username": username, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().expect("token").to_owned()
    }
}

fn detection(title: &str) -> Value {
    json!({
        "title": title,
        "content": "Body text of the article",
        "models": ["bert", "roberta"],
        "confidence": 0.87,
        "true_probabilities": [0.1, 0.25],
        "fake_probabilities": [0.9, 0.75],
        "predictions": ["fake", "fake"],
        "final_prediction": "fake",
        "date": "2024-05-01T10:00:00Z",
    })
}

fn claim(query: &str) -> Value {
    json!({
        "query": query,
        "claims": ["The moon is cheese"],
        "ratings": ["False"],
        "links": ["https://example.org/moon"],
        "language": "en",
        "date": "2024-05-02T08:30:00Z",
    })
}

#[tokio::test]
async fn signup_token_identifies_the_new_user() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, body) = app.send("GET", "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = TestApp::new();
    app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, body) = app
        .send(
            "POST",
            "/signup",
            None,
            Some(json!({ "username": "other", "email": "alice@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn email_probes() {
    let app = TestApp::new();
    app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, body) = app
        .send("GET", "/check-email?email=alice@example.com", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);

    let (status, body) = app
        .send("GET", "/check-email?email=bob@example.com", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);

    let (status, _) = app
        .send("GET", "/check-login-email?email=bob@example.com", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", "/check-email", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_outcomes() {
    let app = TestApp::new();
    app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, body) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");

    let (status, _) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "Secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("POST", "/login", None, Some(json!({ "email": "alice@example.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_token_is_forbidden_and_bad_token_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/detections", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "No token provided");

    let (status, _) = app
        .send("GET", "/detections", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn alice_detection_lifecycle() {
    let app = TestApp::new();
    app.signup("alice", "alice@example.com", "Secret1").await;
    let (_, body) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Secret1" })),
        )
        .await;
    let token = body["token"].as_str().unwrap().to_owned();

    let (status, created) = app
        .send("POST", "/detections", Some(&token), Some(detection("A")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();
    assert!(id.starts_with("FGD"));

    let (status, body) = app
        .send("POST", "/detections", Some(&token), Some(detection("A")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate detection. Already exists.");

    let uri = format!("/detections/{id}");
    let (status, body) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dedup_is_per_owner() {
    let app = TestApp::new();
    let alice = app.signup("alice", "alice@example.com", "Secret1").await;
    let bob = app.signup("bob", "bob@example.com", "Secret2").await;

    let (status, _) = app
        .send("POST", "/detections", Some(&alice), Some(detection("Shared")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .send("POST", "/detections", Some(&bob), Some(detection("Shared")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn detection_arrays_round_trip() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let (_, created) = app
        .send("POST", "/detections", Some(&token), Some(detection("Arrays")))
        .await;
    let uri = format!("/detections/{}", created["id"].as_str().unwrap());

    let (status, fetched) = app.send("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["models"], json!(["bert", "roberta"]));
    assert_eq!(fetched["true_probabilities"], json!([0.1, 0.25]));
    assert_eq!(fetched["fake_probabilities"], json!([0.9, 0.75]));
    assert_eq!(fetched["predictions"], json!(["fake", "fake"]));
    assert_eq!(fetched["final_prediction"], "fake");

    let (_, listed) = app.send("GET", "/detections", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0], fetched);
}

#[tokio::test]
async fn mismatched_model_vectors_are_rejected() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let mut body = detection("Short");
    body["predictions"] = json!(["fake"]);
    let (status, _) = app
        .send("POST", "/detections", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn claims_over_the_cap_are_rejected_and_not_stored() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let mut body = claim("Too many");
    body["claims"] = json!(["a", "b", "c", "d"]);
    body["ratings"] = json!(["False", "False", "True", "False"]);
    body["links"] = json!(["l1", "l2", "l3", "l4"]);
    let (status, _) = app.send("POST", "/claims", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = app.send("GET", "/claims", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (status, created) = app
        .send("POST", "/claims", Some(&token), Some(claim("Moon")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_str().unwrap().starts_with("FGV"));

    let (status, _) = app
        .send("POST", "/claims", Some(&token), Some(claim("Moon")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn other_owners_resources_look_missing() {
    let app = TestApp::new();
    let alice = app.signup("alice", "alice@example.com", "Secret1").await;
    let bob = app.signup("bob", "bob@example.com", "Secret2").await;

    let (_, created) = app
        .send("POST", "/claims", Some(&alice), Some(claim("Private")))
        .await;
    let uri = format!("/claims/{}", created["id"].as_str().unwrap());

    let (status, _) = app.send("GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn account_deletion_cascades_and_revokes_the_token() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;
    let caller = app.state.tokens.verify(&token).unwrap();

    app.send("POST", "/detections", Some(&token), Some(detection("One")))
        .await;
    app.send("POST", "/detections", Some(&token), Some(detection("Two")))
        .await;
    app.send("POST", "/claims", Some(&token), Some(claim("Moon")))
        .await;
    assert_eq!(app.state.detections.count_for_owner(caller.id).unwrap(), 2);

    let (status, body) = app.send("DELETE", "/delete-account", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deleted successfully.");

    let (status, _) = app.send("GET", "/detections", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(app.state.db.get_user_by_id(caller.id).unwrap().is_none());
    assert_eq!(app.state.detections.count_for_owner(caller.id).unwrap(), 0);
    assert_eq!(app.state.claims.count_for_owner(caller.id).unwrap(), 0);
}

#[tokio::test]
async fn password_reset_rules() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, _) = app
        .send(
            "POST",
            "/reset-password",
            Some(&token),
            Some(json!({ "oldPassword": "Secret1", "newPassword": "Secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/reset-password",
            Some(&token),
            Some(json!({ "oldPassword": "wrong", "newPassword": "Secret2" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            "POST",
            "/reset-password",
            Some(&token),
            Some(json!({ "oldPassword": "Secret1", "newPassword": "Secret2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully.");

    let (status, _) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Secret2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "Secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_update_changes_profile() {
    let app = TestApp::new();
    let token = app.signup("alice", "alice@example.com", "Secret1").await;

    let (status, _) = app
        .send(
            "POST",
            "/account-update",
            Some(&token),
            Some(json!({ "name": "Alice B", "email": "ab@example.com", "political_leaning": "left" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = app.send("GET", "/profile", Some(&token), None).await;
    assert_eq!(profile["username"], "Alice B");
    assert_eq!(profile["email"], "ab@example.com");
    assert_eq!(profile["political_leaning"], "left");
}

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = TestApp::new();
    let user = app.signup("alice", "alice@example.com", "Secret1").await;
    let admin = app.signup("root", ADMIN_EMAIL, "Secret9").await;

    let (status, _) = app.send("GET", "/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.send("GET", "/admin/profile", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.send("POST", "/detections", Some(&user), Some(detection("Counted")))
        .await;

    let (status, overview) = app.send("GET", "/admin/profile", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["email"], ADMIN_EMAIL);
    assert_eq!(overview["users"], 2);
    assert_eq!(overview["detections"], 1);
    assert_eq!(overview["claims"], 0);

    let (status, users) = app.send("GET", "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let alice_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "alice@example.com")
        .and_then(|u| u["id"].as_i64())
        .unwrap();

    let uri = format!("/users/{alice_id}");
    let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", "/profile", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
