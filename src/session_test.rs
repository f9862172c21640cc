use super::*;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

fn jar_with_cookie_header(value: &str) -> CookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, value.parse().unwrap());
    CookieJar::from_headers(&headers)
}

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_SESSION_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_SESSION_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_SESSION_EB_INVALID_411__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_SESSION_EB_SURELY_UNSET_903__"), None);
}

// =============================================================================
// cookie_secure — the https inference itself, not the shared env globals.
// =============================================================================

#[test]
fn cookie_secure_https_inference_logic() {
    assert!("https://id.example.com".starts_with("https://"));
    assert!(!"http://localhost:9999".starts_with("https://"));
}

// =============================================================================
// tokens_from_jar
// =============================================================================

#[test]
fn tokens_from_empty_jar_is_none() {
    let jar = CookieJar::new();
    assert!(tokens_from_jar(&jar).is_none());
}

#[test]
fn tokens_from_jar_reads_both_cookies() {
    let jar = jar_with_cookie_header("od_access=at-1; od_refresh=rt-1");
    let tokens = tokens_from_jar(&jar).unwrap();
    assert_eq!(tokens.access, "at-1");
    assert_eq!(tokens.refresh.as_deref(), Some("rt-1"));
}

#[test]
fn tokens_from_jar_access_only() {
    let jar = jar_with_cookie_header("od_access=at-2");
    let tokens = tokens_from_jar(&jar).unwrap();
    assert_eq!(tokens.access, "at-2");
    assert!(tokens.refresh.is_none());
}

#[test]
fn refresh_without_access_is_not_a_session() {
    let jar = jar_with_cookie_header("od_refresh=rt-3");
    assert!(tokens_from_jar(&jar).is_none());
}

#[test]
fn empty_access_value_is_not_a_session() {
    let jar = jar_with_cookie_header("od_access=; od_refresh=rt-4");
    assert!(tokens_from_jar(&jar).is_none());
}

#[test]
fn empty_refresh_value_is_dropped() {
    let jar = jar_with_cookie_header("od_access=at-5; od_refresh=");
    let tokens = tokens_from_jar(&jar).unwrap();
    assert!(tokens.refresh.is_none());
}

// =============================================================================
// write_tokens / clear_tokens
// =============================================================================

#[test]
fn write_tokens_sets_both_cookies() {
    let tokens = SessionTokens { access: "at-6".into(), refresh: Some("rt-6".into()) };
    let jar = write_tokens(CookieJar::new(), &tokens);

    let access = jar.get(ACCESS_COOKIE).unwrap();
    assert_eq!(access.value(), "at-6");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.path(), Some("/"));

    let refresh = jar.get(REFRESH_COOKIE).unwrap();
    assert_eq!(refresh.value(), "rt-6");
    assert!(refresh.max_age().is_some());
}

#[test]
fn write_tokens_without_refresh_leaves_refresh_cookie_alone() {
    let tokens = SessionTokens { access: "at-7".into(), refresh: None };
    let jar = write_tokens(CookieJar::new(), &tokens);
    assert!(jar.get(ACCESS_COOKIE).is_some());
    assert!(jar.get(REFRESH_COOKIE).is_none());
}

#[test]
fn write_then_read_round_trips() {
    let tokens = SessionTokens { access: "at-8".into(), refresh: Some("rt-8".into()) };
    let jar = write_tokens(CookieJar::new(), &tokens);
    let restored = tokens_from_jar(&jar).unwrap();
    assert_eq!(restored, tokens);
}

#[test]
fn clear_tokens_expires_both() {
    let tokens = SessionTokens { access: "at-9".into(), refresh: Some("rt-9".into()) };
    let jar = clear_tokens(write_tokens(CookieJar::new(), &tokens));

    let access = jar.get(ACCESS_COOKIE).unwrap();
    assert_eq!(access.value(), "");
    assert_eq!(access.max_age(), Some(Duration::ZERO));
}
