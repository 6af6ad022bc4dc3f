//! Integration tests for the admin and user authentication endpoints

mod common;

use axum::http::StatusCode;
use portfolio_backend::auth::JwtService;
use portfolio_shared::models::Role;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_admin_login_success() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": common::ADMIN_EMAIL,
        "password": common::ADMIN_PASSWORD,
    });

    let (status, response) = app.post("/api/admin/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    let token = response["token"].as_str().unwrap();
    let refresh_token = response["refreshToken"].as_str().unwrap();
    assert!(!token.is_empty());
    assert!(!refresh_token.is_empty());
    assert_ne!(token, refresh_token);
    assert_eq!(response["user"]["role"], "admin");

    let jwt = JwtService::new(common::JWT_SECRET, 3600, 86400);
    let claims = jwt.validate_access_token(token).expect("decodable access token");
    assert_eq!(claims.email, common::ADMIN_EMAIL);
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_admin_login_failures_are_indistinguishable() {
    let app = common::TestApp::new().await;

    let wrong_password = json!({
        "email": common::ADMIN_EMAIL,
        "password": "not-the-password",
    });
    let unknown_email = json!({
        "email": "nobody@example.com",
        "password": "not-the-password",
    });

    let (status_a, body_a) = app.post("/api/admin/login", &wrong_password.to_string()).await;
    let (status_b, body_b) = app.post("/api/admin/login", &unknown_email.to_string()).await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_verify_login_flow() {
    let app = common::TestApp::new().await;

    let email = format!("flow_{}@example.com", uuid::Uuid::new_v4());
    let signup = json!({
        "name": "Flow Tester",
        "email": email,
        "password": common::USER_PASSWORD,
    });

    let (status, _) = app.post("/api/user/signup", &signup.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Login is refused until the address is verified
    let login = json!({ "email": email, "password": common::USER_PASSWORD });
    let (status, _) = app.post("/api/user/login", &login.to_string()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = app.verification_token(&email).await;
    let (status, _) = app.get(&format!("/api/user/verify-email/{token}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = app.post("/api/user/login", &login.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["user"]["role"], "user");
    assert_eq!(response["user"]["email"], email);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_duplicate_email() {
    let app = common::TestApp::new().await;

    let email = format!("duplicate_{}@example.com", uuid::Uuid::new_v4());
    let body = json!({
        "name": "First",
        "email": email,
        "password": common::USER_PASSWORD,
    });

    let (status, _) = app.post("/api/user/signup", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post("/api/user/signup", &body.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_verify_email_unknown_token() {
    let app = common::TestApp::new().await;

    let (status, _) = app
        .get("/api/user/verify-email/0000000000000000000000000000000000000000000000000000000000000000")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_verification_token_is_single_use() {
    let app = common::TestApp::new().await;

    let email = format!("single_use_{}@example.com", uuid::Uuid::new_v4());
    let signup = json!({
        "name": "Single Use",
        "email": email,
        "password": common::USER_PASSWORD,
    });
    app.post("/api/user/signup", &signup.to_string()).await;

    let token = app.verification_token(&email).await;
    let (status, _) = app.get(&format!("/api/user/verify-email/{token}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/user/verify-email/{token}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_resend_verification_is_enumeration_safe() {
    let app = common::TestApp::new().await;

    let email = format!("resend_{}@example.com", uuid::Uuid::new_v4());
    let signup = json!({
        "name": "Resend",
        "email": email,
        "password": common::USER_PASSWORD,
    });
    app.post("/api/user/signup", &signup.to_string()).await;

    let known = json!({ "email": email });
    let unknown = json!({ "email": "ghost@example.com" });

    let (status_a, body_a) = app
        .post("/api/user/resend-verification", &known.to_string())
        .await;
    let (status_b, body_b) = app
        .post("/api/user/resend-verification", &unknown.to_string())
        .await;

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_resend_verification_rotates_token() {
    let app = common::TestApp::new().await;

    let email = format!("rotate_{}@example.com", uuid::Uuid::new_v4());
    let signup = json!({
        "name": "Rotate",
        "email": email,
        "password": common::USER_PASSWORD,
    });
    app.post("/api/user/signup", &signup.to_string()).await;

    let first = app.verification_token(&email).await;
    let body = json!({ "email": email });
    app.post("/api/user/resend-verification", &body.to_string())
        .await;
    let second = app.verification_token(&email).await;

    assert_ne!(first, second);

    // The superseded token no longer verifies
    let (status, _) = app.get(&format!("/api/user/verify-email/{first}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&format!("/api/user/verify-email/{second}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_returns_new_access_token() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;

    let body = json!({ "refreshToken": user.refresh_token });
    let (status, response) = app.post("/api/user/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!response["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_second_login_invalidates_first_refresh_token() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;
    let relogin = app.login_user(&user.email, common::USER_PASSWORD).await;

    let stale = json!({ "refreshToken": user.refresh_token });
    let (status, _) = app.post("/api/user/refresh", &stale.to_string()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let current = json!({ "refreshToken": relogin.refresh_token });
    let (status, _) = app.post("/api/user/refresh", &current.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_revokes_refresh_token() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;

    let (status, _) = app.post_auth("/api/user/logout", "{}", &user.token).await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({ "refreshToken": user.refresh_token });
    let (status, _) = app.post("/api/user/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_admin_refresh_rejects_user_token() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;

    let body = json!({ "refreshToken": user.refresh_token });
    let (status, _) = app.post("/api/admin/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_admin_logout_and_refresh_cycle() {
    let app = common::TestApp::new().await;
    let (access, refresh) = app.admin_tokens().await;

    let body = json!({ "refreshToken": refresh });
    let (status, _) = app.post("/api/admin/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post_auth("/api/admin/logout", "{}", &access).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.post("/api/admin/refresh", &body.to_string()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_me_returns_profile() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;

    let (status, response) = app.get_auth("/api/user/me", &user.token).await;

    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["email"], user.email);
    assert_eq!(response["id"], user.id);
    assert_eq!(response["emailVerified"], true);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_update_roundtrip() {
    let app = common::TestApp::new().await;
    let user = app.create_verified_user().await;

    let body = json!({
        "name": "Renamed User",
        "bio": "Writes backends.",
        "skills": ["rust", "sql"],
        "socialLinks": { "github": "https://github.com/renamed" },
    });

    let (status, response) = app
        .put_auth("/api/user/profile", &body.to_string(), &user.token)
        .await;

    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["name"], "Renamed User");
    assert_eq!(response["bio"], "Writes backends.");
    assert_eq!(response["skills"], json!(["rust", "sql"]));
    assert_eq!(response["socialLinks"]["github"], "https://github.com/renamed");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_me_requires_user_role() {
    let app = common::TestApp::new().await;
    let (access, _) = app.admin_tokens().await;

    let (status, _) = app.get_auth("/api/user/me", &access).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
