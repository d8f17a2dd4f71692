//! Tests for account and login handlers.

use super::*;
use crate::domain::error::{ADMIN_ONLY_MESSAGE, NO_USER_MESSAGE};
use crate::domain::login_service::INVALID_CREDENTIALS_MESSAGE;
use crate::domain::ports::TokenService;
use crate::test_support::{TestBackend, api_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const ADMIN_EMAIL: &str = "admin@example.org";
const ADMIN_PASSWORD: &str = "admin-password";

#[fixture]
fn backend() -> TestBackend {
    TestBackend::new()
}

async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

#[rstest]
#[actix_web::test]
async fn login_returns_token_and_profile(backend: TestBackend) {
    backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/auth")
        .set_json(json!({ "email": "  Admin@Example.org", "password": ADMIN_PASSWORD }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let token = body.get("token").and_then(Value::as_str).expect("token");
    let principal = backend.tokens.verify(token).expect("token verifies");
    assert_eq!(principal.role.as_str(), "ADMIN");
    assert_eq!(
        body.pointer("/user/email").and_then(Value::as_str),
        Some(ADMIN_EMAIL)
    );
    assert!(body.pointer("/user/password").is_none());
    assert!(body.pointer("/user/passwordHash").is_none());
}

#[rstest]
#[case(ADMIN_EMAIL, "wrong-password")]
#[case("nobody@example.org", ADMIN_PASSWORD)]
#[case("not-an-address", ADMIN_PASSWORD)]
#[actix_web::test]
async fn bad_credentials_share_one_answer(
    backend: TestBackend,
    #[case] email: &str,
    #[case] password: &str,
) {
    backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/auth")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(INVALID_CREDENTIALS_MESSAGE)
    );
    assert_eq!(body.get("code").and_then(Value::as_str), Some("unauthorized"));
}

#[rstest]
#[case(json!({ "email": " ", "password": "x" }), "email", "empty_email")]
#[case(json!({ "email": "ada@example.org" }), "password", "empty_password")]
#[actix_web::test]
async fn blank_login_fields_are_rejected(
    backend: TestBackend,
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/auth")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    assert_eq!(body.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_body_is_a_bad_request(backend: TestBackend) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/auth")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
}

#[rstest]
#[actix_web::test]
async fn signup_creates_a_user_account(backend: TestBackend) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "email": "Grace@Example.org",
            "name": "Grace Hopper",
            "password": "cobol-1959"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(
        body.get("email").and_then(Value::as_str),
        Some("grace@example.org")
    );
    assert_eq!(body.get("role").and_then(Value::as_str), Some("USER"));
}

#[rstest]
#[actix_web::test]
async fn signup_with_taken_email_conflicts(backend: TestBackend) {
    backend
        .seed_user("grace@example.org", "Grace", "cobol-1959")
        .await;
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "email": "grace@example.org",
            "name": "Another Grace",
            "password": "different-1"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("duplicate_email")
    );
}

#[rstest]
#[case(json!({ "email": "x@y.z", "name": "", "password": "long-enough" }), "name", "empty_name")]
#[case(json!({ "email": "x@y.z", "name": "X", "password": "short" }), "password", "password_too_short")]
#[case(json!({ "email": "nope", "name": "X", "password": "long-enough" }), "email", "invalid_email")]
#[actix_web::test]
async fn signup_validates_fields(
    backend: TestBackend,
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/users")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    assert_eq!(body.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[rstest]
#[actix_web::test]
async fn current_user_without_token_names_the_missing_user(backend: TestBackend) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::get().uri("/api/users/me").to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(NO_USER_MESSAGE)
    );
}

#[rstest]
#[actix_web::test]
async fn profile_update_changes_name_only(backend: TestBackend) {
    let user = backend
        .seed_user("grace@example.org", "Grace", "cobol-1959")
        .await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/users/me")
        .insert_header(backend.bearer_for(&user))
        .set_json(json!({ "name": "Rear Admiral Hopper" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body.get("name").and_then(Value::as_str),
        Some("Rear Admiral Hopper")
    );
    assert_eq!(
        body.get("email").and_then(Value::as_str),
        Some("grace@example.org")
    );
}

#[rstest]
#[actix_web::test]
async fn listing_users_is_admin_only(backend: TestBackend) {
    let admin = backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let user = backend
        .seed_user("grace@example.org", "Grace", "cobol-1959")
        .await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    let as_user = actix_test::TestRequest::get()
        .uri("/api/users")
        .insert_header(backend.bearer_for(&user))
        .to_request();
    let response = actix_test::call_service(&app, as_user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(ADMIN_ONLY_MESSAGE)
    );

    let as_admin = actix_test::TestRequest::get()
        .uri("/api/users")
        .insert_header(backend.bearer_for(&admin))
        .to_request();
    let users: Vec<UserResponse> = actix_test::call_and_read_body_json(&app, as_admin).await;
    let emails: Vec<&str> = users.iter().map(|user| user.email.as_str()).collect();
    assert_eq!(emails, [ADMIN_EMAIL, "grace@example.org"]);
}

#[rstest]
#[actix_web::test]
async fn admin_deletes_an_account(backend: TestBackend) {
    let admin = backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let user = backend
        .seed_user("grace@example.org", "Grace", "cobol-1959")
        .await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/users/{}", user.id))
        .insert_header(backend.bearer_for(&admin))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let again = actix_test::TestRequest::delete()
        .uri(&format!("/api/users/{}", user.id))
        .insert_header(backend.bearer_for(&admin))
        .to_request();
    let response = actix_test::call_service(&app, again).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("self")]
#[case("not-a-uuid")]
#[actix_web::test]
async fn admin_delete_rejects_bad_targets(backend: TestBackend, #[case] target: &str) {
    let admin = backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;
    let target = if target == "self" {
        admin.id.to_string()
    } else {
        target.to_owned()
    };

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/users/{target}"))
        .insert_header(backend.bearer_for(&admin))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn repeated_failed_logins_are_throttled(backend: TestBackend) {
    backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;
    let attempt = |password: &str| {
        actix_test::TestRequest::post()
            .uri("/api/auth")
            .set_json(json!({ "email": ADMIN_EMAIL, "password": password }))
            .to_request()
    };

    for _ in 0..crate::outbound::security::DEFAULT_MAX_FAILURES {
        let response = actix_test::call_service(&app, attempt("wrong-password")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Locked: even the right password is refused until the window passes.
    let response = actix_test::call_service(&app, attempt(ADMIN_PASSWORD)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(
        response
            .headers()
            .contains_key(actix_web::http::header::RETRY_AFTER)
    );
    let body = json_body(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("too_many_requests")
    );
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("too_many_attempts")
    );
}

#[rstest]
#[actix_web::test]
async fn throttling_is_per_address(backend: TestBackend) {
    backend.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let app = actix_test::init_service(api_app(backend.state.clone())).await;

    for _ in 0..crate::outbound::security::DEFAULT_MAX_FAILURES {
        let request = actix_test::TestRequest::post()
            .uri("/api/auth")
            .set_json(json!({ "email": "ghost@example.org", "password": "guess" }))
            .to_request();
        actix_test::call_service(&app, request).await;
    }

    let request = actix_test::TestRequest::post()
        .uri("/api/auth")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn anonymous_profile_update_with_bad_body_names_the_missing_user(backend: TestBackend) {
    let app = actix_test::init_service(api_app(backend.state)).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/users/me")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body.get("error").and_then(Value::as_str),
        Some(NO_USER_MESSAGE)
    );
}
