//! Access gate — the single checkpoint every request passes through.
//!
//! ARCHITECTURE
//! ============
//! The gate classifies the request path, asks the identity provider who is
//! behind the session cookies (rotating the token pair when it is renewable),
//! and resolves to exactly one decision: let the request through, send it to
//! the login page, or steer an already-signed-in user away from it. The gate
//! never surfaces an error to the router; every failure path collapses into
//! one of those three decisions.
//!
//! TRADE-OFFS
//! ==========
//! Provider failures follow a named policy: `allow` keeps the dashboard up
//! when the provider is down, `deny-all` keeps it closed. With no provider
//! configured at all, only the login page and the root stay reachable so the
//! login page can say what is wrong instead of redirect-looping.
//!
//! A rotated token pair must land on whichever response wins, redirect or
//! pass-through. The jar is therefore attached after the decision, never
//! inside a branch.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::services::identity::IdentityUser;
use crate::session;
use crate::state::AppState;

/// Prefix that marks the unauthenticated surface.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated users land when steered away from the login page.
pub const HOME_PATH: &str = "/dashboard";

// =============================================================================
// CLASSIFICATION & DECISION
// =============================================================================

/// Static per-request path class. Two classes only: the login surface and
/// everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Login,
    Protected,
}

/// The gate's output. Computed fresh per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

/// What the gate does when the identity provider cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderErrorPolicy {
    /// Fail open: let the request through unauthenticated.
    #[default]
    Allow,
    /// Treat every session as absent; only the login surface stays reachable.
    DenyAll,
}

impl ProviderErrorPolicy {
    /// Parse `GATE_ON_PROVIDER_ERROR` (`allow` | `deny-all`, default `allow`).
    /// Unknown values fall back to `allow` with a warning rather than
    /// refusing to boot.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("GATE_ON_PROVIDER_ERROR").ok().as_deref() {
            None => Self::Allow,
            Some(raw) => Self::parse(raw).unwrap_or_else(|| {
                tracing::warn!(value = raw, "unknown GATE_ON_PROVIDER_ERROR, using allow");
                Self::Allow
            }),
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "deny-all" | "deny_all" => Some(Self::DenyAll),
            _ => None,
        }
    }
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if path.starts_with(LOGIN_PATH) {
        RouteClass::Login
    } else {
        RouteClass::Protected
    }
}

/// The decision table. Unauthenticated traffic reaches only the login
/// surface; authenticated traffic reaches everything but it.
#[must_use]
pub fn decide(class: RouteClass, authenticated: bool) -> Decision {
    match (class, authenticated) {
        (RouteClass::Protected, false) => Decision::RedirectToLogin,
        (RouteClass::Protected, true) | (RouteClass::Login, false) => Decision::Allow,
        (RouteClass::Login, true) => Decision::RedirectToHome,
    }
}

/// Routing when no identity provider is configured: the login surface and the
/// root stay reachable so the login page can render a configuration notice;
/// everything else is sent to it.
#[must_use]
pub fn degraded_decision(path: &str) -> Decision {
    if path == "/" || classify(path) == RouteClass::Login {
        Decision::Allow
    } else {
        Decision::RedirectToLogin
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// Identity established by the gate, available to handlers via extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub IdentityUser);

/// Router-wide middleware. Applied after all routes so every request passes
/// through it exactly once.
pub async fn access_gate(State(state): State<AppState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    let Some(identity) = state.identity.clone() else {
        return match degraded_decision(&path) {
            Decision::Allow => next.run(req).await,
            _ => Redirect::temporary(LOGIN_PATH).into_response(),
        };
    };

    let tokens = session::tokens_from_jar(&jar);

    // One provider round-trip, skipped when there is no session to check.
    // The provider may hand back a rotated token pair as a side effect.
    let (user, refreshed) = match &tokens {
        None => (None, None),
        Some(tokens) => match identity.current_user(tokens).await {
            Ok(check) => (check.user, check.refreshed),
            Err(e) => match state.on_provider_error {
                ProviderErrorPolicy::Allow => {
                    tracing::error!(error = %e, path = %path, "identity check failed, failing open");
                    return next.run(req).await;
                }
                ProviderErrorPolicy::DenyAll => {
                    tracing::error!(error = %e, path = %path, "identity check failed, denying");
                    (None, None)
                }
            },
        },
    };

    let decision = decide(classify(&path), user.is_some());

    if decision == Decision::Allow {
        if let Some(user) = user {
            req.extensions_mut().insert(CurrentUser(user));
        }
    }

    // Rotated cookies ride on whichever response the decision produced.
    let jar = match &refreshed {
        Some(tokens) => session::write_tokens(jar, tokens),
        None => jar,
    };

    let response = match decision {
        Decision::Allow => next.run(req).await,
        Decision::RedirectToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        Decision::RedirectToHome => Redirect::temporary(HOME_PATH).into_response(),
    };

    (jar, response).into_response()
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
