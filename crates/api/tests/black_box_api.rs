//! Black-box tests against the real HTTP surface: the same router as
//! production, bound to an ephemeral port, driven with a plain HTTP client.

use millworks_infra::AuthConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

const ADMIN_EMAIL: &str = "admin@millworks.test";
const ADMIN_PASSWORD: &str = "bootstrap-password";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app =
            millworks_api::app::build_app(AuthConfig::default(), ADMIN_EMAIL, ADMIN_PASSWORD)
                .await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn login(&self, client: &reqwest::Client, email: &str, password: &str) -> String {
        let res = client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Look up a role id by its normalized name via the admin API.
    async fn role_id(&self, client: &reqwest::Client, admin_token: &str, name: &str) -> String {
        let res = client
            .get(format!("{}/roles", self.base_url))
            .bearer_auth(admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = res.json().await.unwrap();
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["name"] == name)
            .unwrap_or_else(|| panic!("role '{name}' not seeded"))["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register a user through the admin surface and return its id.
    async fn register_user(
        &self,
        client: &reqwest::Client,
        admin_token: &str,
        email: &str,
        password: &str,
        role_id: &str,
    ) -> String {
        let res = client
            .post(format!("{}/auth/register", self.base_url))
            .bearer_auth(admin_token)
            .json(&json!({
                "email": email,
                "password": password,
                "displayName": "Test Subject",
                "role": role_id,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = res.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport & token handling
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public_and_everything_else_is_not() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for path in ["/auth/me", "/users", "/roles", "/permissions"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}

#[tokio::test]
async fn login_returns_token_and_sanitized_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], json!(ADMIN_EMAIL));
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_missing_fields_is_a_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_both_401() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for (email, password) in [(ADMIN_EMAIL, "wrong"), ("ghost@millworks.test", "whatever")] {
        let res = client
            .post(format!("{}/auth/login", srv.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn cookie_transport_works_and_header_wins() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Cookie alone authenticates.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .header(reqwest::header::COOKIE, format!("token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A garbage header loses the request even when a valid cookie rides along:
    // the header takes precedence.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth("garbage-token")
        .header(reqwest::header::COOKIE, format!("token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_and_malformed_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    #[derive(serde::Serialize)]
    struct Claims {
        sub: String,
        iat: i64,
        exp: i64,
    }

    let now = chrono::Utc::now().timestamp();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: uuid::Uuid::now_v7().to_string(),
            iat: now,
            exp: now + 3600,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .unwrap();

    for token in ["not.a.jwt", forged.as_str()] {
        let res = client
            .get(format!("{}/auth/me", srv.base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .post(format!("{}/auth/logout", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization pipeline
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn manager_permission_matrix() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let manager_role = srv.role_id(&client, &admin_token, "manager").await;
    let staff_role = srv.role_id(&client, &admin_token, "staff").await;

    srv.register_user(
        &client,
        &admin_token,
        "manager@millworks.test",
        "manager-password",
        &manager_role,
    )
    .await;
    let subject_id = srv
        .register_user(
            &client,
            &admin_token,
            "subject@millworks.test",
            "subject-password",
            &staff_role,
        )
        .await;

    let manager_token = srv
        .login(&client, "manager@millworks.test", "manager-password")
        .await;

    // Manager holds update_user: the update route answers 200.
    let res = client
        .put(format!("{}/users/{}", srv.base_url, subject_id))
        .bearer_auth(&manager_token)
        .json(&json!({ "displayName": "Renamed Subject" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Manager lacks delete_user: 403 (not 500), naming the permission.
    let res = client
        .delete(format!("{}/users/{}", srv.base_url, subject_id))
        .bearer_auth(&manager_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("delete_user"));

    // Registration is gated on create_user, which managers lack.
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .bearer_auth(&manager_token)
        .json(&json!({
            "email": "sneaky@millworks.test",
            "password": "whatever-long",
            "displayName": "Sneaky",
            "role": staff_role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_update_persists_a_pointer_and_authorization_still_works() {
    // Changing a user's role stores a bare reference; the very next request
    // must exercise the resolver's repair path and still authorize correctly.
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let staff_role = srv.role_id(&client, &admin_token, "staff").await;
    let manager_role = srv.role_id(&client, &admin_token, "manager").await;
    let user_id = srv
        .register_user(
            &client,
            &admin_token,
            "mobile@millworks.test",
            "mobile-password",
            &staff_role,
        )
        .await;

    // Promote to manager (persisted as a pointer).
    let res = client
        .put(format!("{}/users/{}", srv.base_url, user_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "role": manager_role }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let token = srv
        .login(&client, "mobile@millworks.test", "mobile-password")
        .await;
    let res = client
        .get(format!("{}/users", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    // Manager holds read_user; the repaired session must grant it.
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn deactivated_user_cannot_login_or_reuse_a_session() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let staff_role = srv.role_id(&client, &admin_token, "staff").await;
    let user_id = srv
        .register_user(
            &client,
            &admin_token,
            "leaver@millworks.test",
            "leaver-password",
            &staff_role,
        )
        .await;
    let old_token = srv
        .login(&client, "leaver@millworks.test", "leaver-password")
        .await;

    let res = client
        .put(format!("{}/users/{}", srv.base_url, user_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Correct password, deactivated account: 401.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "leaver@millworks.test", "password": "leaver-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A still-unexpired token no longer resolves to a session.
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&old_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_locks_after_repeated_failures() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let staff_role = srv.role_id(&client, &admin_token, "staff").await;
    srv.register_user(
        &client,
        &admin_token,
        "lockme@millworks.test",
        "lockme-password",
        &staff_role,
    )
    .await;

    for _ in 0..5 {
        let res = client
            .post(format!("{}/auth/login", srv.base_url))
            .json(&json!({ "email": "lockme@millworks.test", "password": "wrong" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Correct password inside the lock window: still 401, and the message
    // names the lockout rather than the credentials.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "lockme@millworks.test", "password": "lockme-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("locked"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Referential integrity & protected records
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn staffed_role_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .post(format!("{}/roles", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "displayName": "Night Shift", "priority": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let role_id = body["data"]["id"].as_str().unwrap().to_string();

    srv.register_user(
        &client,
        &admin_token,
        "night@millworks.test",
        "night-password",
        &role_id,
    )
    .await;

    let res = client
        .delete(format!("{}/roles/{}", srv.base_url, role_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Role survives.
    let res = client
        .get(format!("{}/roles/{}", srv.base_url, role_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn system_records_are_immutable_where_it_matters() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let manager_role = srv.role_id(&client, &admin_token, "manager").await;

    // Deleting a system role: 403.
    let res = client
        .delete(format!("{}/roles/{}", srv.base_url, manager_role))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Stripping a system role's permissions: 403.
    let res = client
        .put(format!("{}/roles/{}", srv.base_url, manager_role))
        .bearer_auth(&admin_token)
        .json(&json!({ "permissions": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Deleting a seeded system permission: conflict.
    let res = client
        .get(format!("{}/permissions", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let permission_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "create_user")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .delete(format!("{}/permissions/{}", srv.base_url, permission_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn self_deactivation_and_self_deletion_are_blocked() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let my_id = body["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .put(format!("{}/users/{}", srv.base_url, my_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!("{}/users/{}", srv.base_url, my_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// Password management & misc
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn password_update_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Wrong current password: 401.
    let res = client
        .put(format!("{}/auth/updatepassword", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "currentPassword": "wrong", "newPassword": "a-new-long-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Policy violation: 400.
    let res = client
        .put(format!("{}/auth/updatepassword", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Success returns a fresh, working token.
    let res = client
        .put(format!("{}/auth/updatepassword", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "a-new-long-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let fresh = body["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(fresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fresh_login = srv
        .login(&client, ADMIN_EMAIL, "a-new-long-password")
        .await;
    assert!(!fresh_login.is_empty());
}

#[tokio::test]
async fn duplicate_registration_names_the_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let staff_role = srv.role_id(&client, &admin_token, "staff").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "whatever-long",
            "displayName": "Clone",
            "role": staff_role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn registration_with_dangling_role_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": "orphan@millworks.test",
            "password": "whatever-long",
            "displayName": "Orphan",
            "role": uuid::Uuid::now_v7().to_string(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whoami_adapts_to_anonymous_and_authenticated_callers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], json!(false));

    let token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], json!(true));
    assert_eq!(body["role"], json!("super-admin"));
}

#[tokio::test]
async fn role_hierarchy_is_ordered_by_priority() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin_token = srv.login(&client, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let res = client
        .get(format!("{}/roles/hierarchy", srv.base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["super-admin", "manager", "staff"]);
}

#[tokio::test]
async fn forgot_password_is_acknowledged_but_inert() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/forgotpassword", srv.base_url))
        .json(&json!({ "email": ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
}
