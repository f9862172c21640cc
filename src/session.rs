//! Session cookie carrier — reads and writes the provider token pair.
//!
//! TRADE-OFFS
//! ==========
//! Tokens are opaque to this service; cookies are the only place they live.
//! The access cookie is session-scoped while the refresh cookie gets a
//! long max-age, so a browser restart still lands on the transparent-refresh
//! path instead of the login page.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::services::identity::SessionTokens;

pub const ACCESS_COOKIE: &str = "od_access";
pub const REFRESH_COOKIE: &str = "od_refresh";

const REFRESH_COOKIE_DAYS: i64 = 30;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Whether session cookies should carry the `Secure` flag.
/// `COOKIE_SECURE` wins when set; otherwise inferred from the provider URL.
pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("IDENTITY_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

/// Read the token pair from the request jar. `None` when there is no access
/// token at all; a refresh token alone is not a session.
#[must_use]
pub fn tokens_from_jar(jar: &CookieJar) -> Option<SessionTokens> {
    let access = jar.get(ACCESS_COOKIE).map(Cookie::value).unwrap_or_default();
    if access.is_empty() {
        return None;
    }

    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    Some(SessionTokens { access: access.to_owned(), refresh })
}

/// Write a token pair onto the jar. The returned jar must end up on the
/// response, whichever branch produces it.
#[must_use]
pub fn write_tokens(jar: CookieJar, tokens: &SessionTokens) -> CookieJar {
    let jar = jar.add(session_cookie(ACCESS_COOKIE, tokens.access.clone()));
    match &tokens.refresh {
        Some(refresh) => {
            let mut cookie = session_cookie(REFRESH_COOKIE, refresh.clone());
            cookie.set_max_age(Duration::days(REFRESH_COOKIE_DAYS));
            jar.add(cookie)
        }
        None => jar,
    }
}

/// Expire both session cookies.
#[must_use]
pub fn clear_tokens(jar: CookieJar) -> CookieJar {
    let expired = |name: &'static str| {
        let mut cookie = session_cookie(name, String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie
    };
    jar.add(expired(ACCESS_COOKIE)).add(expired(REFRESH_COOKIE))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
