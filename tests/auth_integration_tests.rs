use axum::{
    Router,
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use fleet_gate::{AppConfig, AppState, Credential, auth::credential_from_headers, create_router};
use std::{fs, path::PathBuf};
use tower::ServiceExt;

// --- Helper Functions ---

const INDEX_HTML: &str = "<!doctype html><title>fleet</title>";

/// Writes a minimal dashboard bundle into a per-test temp directory.
fn dashboard_bundle(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fleet-gate-{}-{}", std::process::id(), name));
    fs::create_dir_all(dir.join("assets")).unwrap();
    fs::write(dir.join("index.html"), INDEX_HTML).unwrap();
    fs::write(dir.join("assets").join("app.js"), "console.log('fleet')").unwrap();
    dir
}

fn create_app(name: &str) -> Router {
    let config = AppConfig {
        static_dir: dashboard_bundle(name),
        ..AppConfig::default()
    };
    create_router(AppState::new(config))
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// --- Credential extraction ---

#[tokio::test]
async fn test_credential_from_cookies() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_static("theme=dark; token=abc123; role=admin"),
    );

    let credential = Credential::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(credential, Credential::new(Some("abc123"), Some("admin")));
}

#[tokio::test]
async fn test_credential_without_cookie_header() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let credential = Credential::from_request_parts(&mut parts, &()).await.unwrap();

    assert_eq!(credential, Credential::anonymous());
    assert!(!credential.has_token());
}

#[test]
fn test_credential_partial_and_empty_values() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_static("token=; role=operator"),
    );

    let credential = credential_from_headers(&parts.headers);

    assert_eq!(credential.token, None);
    assert_eq!(credential.role_str(), Some("operator"));
}

#[test]
fn test_credential_across_multiple_cookie_headers() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts
        .headers
        .append(header::COOKIE, header::HeaderValue::from_static("token=first"));
    parts.headers.append(
        header::COOKIE,
        header::HeaderValue::from_static("token=second; role=super_admin"),
    );

    let credential = credential_from_headers(&parts.headers);

    assert_eq!(credential, Credential::new(Some("first"), Some("super_admin")));
}

#[test]
fn test_cookie_names_must_match_exactly() {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_static("access_token=x; Role=admin; malformed"),
    );

    assert_eq!(credential_from_headers(&parts.headers), Credential::anonymous());
}

// --- Edge router through the full HTTP stack ---

#[tokio::test]
async fn test_anonymous_protected_request_is_redirected_to_login() {
    let app = create_app("anon-protected");

    let response = app.oneshot(get("/client/admin/trucks", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/auth/login"));
}

#[tokio::test]
async fn test_anonymous_login_page_is_served() {
    let app = create_app("anon-login");

    let response = app.oneshot(get("/auth/login", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(location(&response), None);
    assert_eq!(body_text(response).await, INDEX_HTML);
}

#[tokio::test]
async fn test_signed_in_user_is_sent_from_login_to_dashboard() {
    let app = create_app("signed-in-login");

    let response = app
        .oneshot(get("/auth/login", Some("token=t; role=operator")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/client/operator/dashboard"));
}

#[tokio::test]
async fn test_signed_in_user_reaches_own_area() {
    let app = create_app("own-area");

    let response = app
        .oneshot(get("/client/operator/dashboard", Some("token=t; role=operator")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, INDEX_HTML);
}

#[tokio::test]
async fn test_signed_in_user_cannot_enter_other_role_area() {
    let app = create_app("other-area");

    let response = app
        .oneshot(get("/client/super_admin/expenses", Some("token=t; role=admin")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/client/admin/dashboard"));
}

#[tokio::test]
async fn test_unknown_role_lands_on_auth_dashboard() {
    let app = create_app("unknown-role");

    let response = app
        .clone()
        .oneshot(get("/client/admin", Some("token=t; role=driver")))
        .await
        .unwrap();
    assert_eq!(location(&response), Some("/auth/dashboard"));

    // Following the redirect settles instead of bouncing.
    let response = app
        .oneshot(get("/auth/dashboard", Some("token=t; role=driver")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_assets_bypass_the_gate() {
    let app = create_app("ungated");

    let health = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_text(health).await, "ok");

    let asset = app.oneshot(get("/assets/app.js", None)).await.unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(location(&asset), None);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = create_app("request-id");

    let response = app.oneshot(get("/client/admin", None)).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
