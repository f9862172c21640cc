use super::*;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use tower::ServiceExt;

use crate::services::identity::SessionTokens;
use crate::state::AppState;
use crate::state::test_helpers::{StubIdentity, dummy_user, test_app_state, test_app_state_with_policy};

fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "root" }))
        .route("/dashboard", get(|| async { "home" }))
        .route("/dashboard/orders", get(|| async { "orders" }))
        .route("/login", get(|| async { "login" }))
        .layer(middleware::from_fn_with_state(state, access_gate))
}

fn request(path: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(COOKIE, cookies);
    }
    builder.body(Body::empty()).unwrap()
}

const SESSION_COOKIES: &str = "od_access=at-test; od_refresh=rt-test";

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

// =============================================================================
// classify / decide — the decision table itself
// =============================================================================

#[test]
fn classify_login_prefix() {
    assert_eq!(classify("/login"), RouteClass::Login);
    assert_eq!(classify("/login/reset"), RouteClass::Login);
}

#[test]
fn classify_everything_else_is_protected() {
    assert_eq!(classify("/"), RouteClass::Protected);
    assert_eq!(classify("/dashboard"), RouteClass::Protected);
    assert_eq!(classify("/api/orders"), RouteClass::Protected);
}

#[test]
fn decide_matches_the_decision_table() {
    assert_eq!(decide(RouteClass::Protected, false), Decision::RedirectToLogin);
    assert_eq!(decide(RouteClass::Protected, true), Decision::Allow);
    assert_eq!(decide(RouteClass::Login, false), Decision::Allow);
    assert_eq!(decide(RouteClass::Login, true), Decision::RedirectToHome);
}

#[test]
fn degraded_allows_root_and_login_only() {
    assert_eq!(degraded_decision("/"), Decision::Allow);
    assert_eq!(degraded_decision("/login"), Decision::Allow);
    assert_eq!(degraded_decision("/dashboard"), Decision::RedirectToLogin);
    assert_eq!(degraded_decision("/api/orders"), Decision::RedirectToLogin);
}

#[test]
fn provider_error_policy_parse() {
    assert_eq!(ProviderErrorPolicy::parse("allow"), Some(ProviderErrorPolicy::Allow));
    assert_eq!(ProviderErrorPolicy::parse("deny-all"), Some(ProviderErrorPolicy::DenyAll));
    assert_eq!(ProviderErrorPolicy::parse("DENY_ALL"), Some(ProviderErrorPolicy::DenyAll));
    assert_eq!(ProviderErrorPolicy::parse("closed"), None);
}

// =============================================================================
// middleware — anonymous traffic
// =============================================================================

#[tokio::test]
async fn protected_path_without_session_redirects_to_login() {
    let state = test_app_state(Some(Arc::new(StubIdentity::anonymous())));
    let response = test_router(state)
        .oneshot(request("/dashboard/orders", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), LOGIN_PATH);
}

#[tokio::test]
async fn protected_path_with_dead_session_redirects_to_login() {
    // Cookies present, but the provider reports nobody behind them.
    let state = test_app_state(Some(Arc::new(StubIdentity::anonymous())));
    let response = test_router(state)
        .oneshot(request("/dashboard/orders", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), LOGIN_PATH);
}

#[tokio::test]
async fn login_path_without_session_is_allowed() {
    let state = test_app_state(Some(Arc::new(StubIdentity::anonymous())));
    let response = test_router(state).oneshot(request("/login", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// middleware — authenticated traffic
// =============================================================================

#[tokio::test]
async fn protected_path_with_valid_session_is_allowed() {
    let state = test_app_state(Some(Arc::new(StubIdentity::signed_in())));
    let response = test_router(state)
        .oneshot(request("/dashboard", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_path_with_valid_session_redirects_home() {
    let state = test_app_state(Some(Arc::new(StubIdentity::signed_in())));
    let response = test_router(state)
        .oneshot(request("/login", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), HOME_PATH);
}

// =============================================================================
// middleware — provider failure policies
// =============================================================================

#[tokio::test]
async fn provider_error_fails_open_by_default() {
    let state = test_app_state(Some(Arc::new(StubIdentity::unreachable())));
    let response = test_router(state)
        .oneshot(request("/dashboard", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn provider_error_with_deny_all_redirects_to_login() {
    let state = test_app_state_with_policy(
        Some(Arc::new(StubIdentity::unreachable())),
        ProviderErrorPolicy::DenyAll,
    );
    let response = test_router(state)
        .oneshot(request("/dashboard", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), LOGIN_PATH);
}

#[tokio::test]
async fn deny_all_keeps_login_page_reachable() {
    let state = test_app_state_with_policy(
        Some(Arc::new(StubIdentity::unreachable())),
        ProviderErrorPolicy::DenyAll,
    );
    let response = test_router(state)
        .oneshot(request("/login", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// middleware — missing configuration (degraded mode)
// =============================================================================

#[tokio::test]
async fn degraded_mode_allows_login_and_root() {
    let state = test_app_state(None);
    let router = test_router(state);

    let login = router.clone().oneshot(request("/login", None)).await.unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let root = router.oneshot(request("/", None)).await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
}

#[tokio::test]
async fn degraded_mode_redirects_everything_else() {
    let state = test_app_state(None);
    let response = test_router(state)
        .oneshot(request("/dashboard/orders", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), LOGIN_PATH);
}

// =============================================================================
// middleware — refreshed token propagation
// =============================================================================

fn refreshing_stub() -> StubIdentity {
    StubIdentity {
        user: Some(dummy_user()),
        refreshed: Some(SessionTokens { access: "at-rotated".into(), refresh: Some("rt-rotated".into()) }),
        fail: false,
    }
}

#[tokio::test]
async fn refreshed_tokens_land_on_pass_through_response() {
    let state = test_app_state(Some(Arc::new(refreshing_stub())));
    let response = test_router(state)
        .oneshot(request("/dashboard", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("od_access=at-rotated")), "{cookies:?}");
    assert!(cookies.iter().any(|c| c.starts_with("od_refresh=rt-rotated")), "{cookies:?}");
}

#[tokio::test]
async fn refreshed_tokens_land_on_redirect_response() {
    // Signed-in user hits /login while their pair rotates: the redirect
    // itself must carry the new cookies or the rotation is lost.
    let state = test_app_state(Some(Arc::new(refreshing_stub())));
    let response = test_router(state)
        .oneshot(request("/login", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), HOME_PATH);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("od_access=at-rotated")), "{cookies:?}");
}

#[tokio::test]
async fn unrotated_session_adds_no_cookie_headers() {
    let state = test_app_state(Some(Arc::new(StubIdentity::signed_in())));
    let response = test_router(state)
        .oneshot(request("/dashboard", Some(SESSION_COOKIES)))
        .await
        .unwrap();

    assert!(set_cookies(&response).is_empty());
}
