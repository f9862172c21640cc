//! Auth routes — the login surface and session endpoints.
//!
//! DESIGN
//! ======
//! Credentials never touch this service's database: `POST /login` forwards
//! them to the identity provider and stores the returned token pair in
//! HttpOnly cookies. The gate (`crate::gate`) keeps signed-in users away
//! from these pages; these handlers only run for anonymous traffic (or, for
//! `/logout` and `/api/auth/me`, behind the gate's allow).

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::gate::{CurrentUser, HOME_PATH, LOGIN_PATH};
use crate::services::identity::{GrantResult, IdentityUser};
use crate::session;
use crate::state::AppState;

/// `GET /login` — render the login form, or a configuration notice when no
/// identity provider is wired up (degraded mode keeps this page reachable
/// exactly so this notice can be seen).
pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    if state.identity.is_none() {
        return Html(render_config_notice());
    }
    Html(render_login_form(None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub(crate) fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    Some(normalized)
}

/// `POST /login` — exchange credentials with the provider, set session
/// cookies, redirect to the dashboard. Failures re-render the form with an
/// inline message; nothing is ever thrown past this handler.
pub async fn login_submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let Some(identity) = state.identity.clone() else {
        return Html(render_config_notice()).into_response();
    };

    let Some(email) = normalize_email(&form.email) else {
        return Html(render_login_form(Some("Enter a valid email address."))).into_response();
    };
    if form.password.is_empty() {
        return Html(render_login_form(Some("Enter a password."))).into_response();
    }

    match identity.sign_in(&email, &form.password).await {
        Ok(GrantResult::Granted(granted)) => {
            let jar = session::write_tokens(jar, &granted.tokens);
            (jar, Redirect::temporary(HOME_PATH)).into_response()
        }
        Ok(GrantResult::Rejected) => Html(render_login_form(Some("Invalid email or password."))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "sign-in against identity provider failed");
            Html(render_login_form(Some("Sign-in is temporarily unavailable. Try again shortly."))).into_response()
        }
    }
}

/// `POST /logout` — best-effort provider sign-out, clear cookies, back to
/// the login page.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let (Some(identity), Some(tokens)) = (state.identity.clone(), session::tokens_from_jar(&jar)) {
        let _ = identity.sign_out(&tokens.access).await;
    }

    let jar = session::clear_tokens(jar);
    (jar, Redirect::temporary(LOGIN_PATH)).into_response()
}

/// `GET /api/auth/me` — identity the gate established for this request.
pub async fn me(current: Option<axum::Extension<CurrentUser>>) -> Result<Json<IdentityUser>, StatusCode> {
    match current {
        Some(axum::Extension(CurrentUser(user))) => Ok(Json(user)),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

// =============================================================================
// PAGES
// =============================================================================

// Error strings rendered here are all our own; no request input is echoed.
pub(crate) fn render_login_form(error: Option<&str>) -> String {
    let error_block = error.map_or(String::new(), |msg| format!(r#"<p class="error">{msg}</p>"#));
    format!(
        r#"<!doctype html>
<html>
<head><title>orderdesk — sign in</title></head>
<body>
<h1>orderdesk</h1>
{error_block}
<form method="post" action="/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Sign in</button>
</form>
</body>
</html>
"#
    )
}

pub(crate) fn render_config_notice() -> String {
    r"<!doctype html>
<html>
<head><title>orderdesk — not configured</title></head>
<body>
<h1>orderdesk</h1>
<p>The identity provider is not configured. Set <code>IDENTITY_URL</code> and
<code>IDENTITY_API_KEY</code>, then restart the service.</p>
</body>
</html>
"
    .to_owned()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
