//! Identity provider client — session verification, sign-in, sign-out.
//!
//! DESIGN
//! ======
//! Identity lives in a hosted provider, not in this service: the crate never
//! mints or validates tokens itself. `IdentityClient` is a thin HTTP wrapper
//! over the provider's REST surface. Verification may transparently rotate an
//! expired-but-renewable token pair; callers must propagate the returned
//! replacement pair or users get silently logged out.
//!
//! The gate depends on the `IdentityProvider` trait rather than the concrete
//! client so tests can substitute a stub provider.

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// TYPES
// =============================================================================

/// Opaque access/refresh token pair carried in request cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: Option<String>,
}

/// Identity reported by the provider for a verified session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Outcome of a verification call. `refreshed` is `Some` when the provider
/// rotated the token pair as a side effect; the new pair must reach the
/// client's cookies regardless of what response the request produces.
#[derive(Debug, Clone)]
pub struct IdentityCheck {
    pub user: Option<IdentityUser>,
    pub refreshed: Option<SessionTokens>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The HTTP request to the provider failed to complete.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider returned a non-success status outside the expected set.
    #[error("provider response error: status {status}")]
    Status { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("provider response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// The provider surface this service depends on: session verification for
/// the gate, credential exchange and revocation for the login routes. A
/// trait so tests can substitute a stub provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Report the identity behind a token pair, rotating it if renewable.
    async fn current_user(&self, tokens: &SessionTokens) -> Result<IdentityCheck, IdentityError>;

    /// Exchange credentials for a session (password grant). Bad credentials
    /// are `Ok(GrantResult::Rejected)`, not an error.
    async fn sign_in(&self, email: &str, password: &str) -> Result<GrantResult, IdentityError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access: &str) -> Result<(), IdentityError>;
}

// =============================================================================
// CONFIG
// =============================================================================

/// Identity provider endpoint configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub url: String,
    pub api_key: String,
}

impl IdentityConfig {
    /// Load from `IDENTITY_URL` and `IDENTITY_API_KEY`.
    /// Returns `None` if either is missing (the gate degrades, see `gate`).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("IDENTITY_URL").ok()?;
        let api_key = std::env::var("IDENTITY_API_KEY").ok()?;
        if url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        Some(Self { url: normalize_base_url(&url), api_key })
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

// =============================================================================
// CLIENT
// =============================================================================

/// Reqwest-backed provider client.
pub struct IdentityClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityClient {
    /// Build a client with bounded timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn fetch_user(&self, access: &str) -> Result<Option<IdentityUser>, IdentityError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.config.url))
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {access}"))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        match status {
            200 => Ok(Some(parse_user(&body)?)),
            // Expired or revoked token: not an error, just no identity.
            401 | 403 => Ok(None),
            _ => Err(IdentityError::Status { status, body }),
        }
    }

    async fn grant(&self, grant_type: &str, payload: serde_json::Value) -> Result<GrantResult, IdentityError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token?grant_type={grant_type}", self.config.url))
            .header("apikey", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if status != 200 {
            return Ok(GrantResult::Rejected);
        }

        parse_grant(&body).map(GrantResult::Granted)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for IdentityClient {
    async fn current_user(&self, tokens: &SessionTokens) -> Result<IdentityCheck, IdentityError> {
        if let Some(user) = self.fetch_user(&tokens.access).await? {
            return Ok(IdentityCheck { user: Some(user), refreshed: None });
        }

        // Access token is dead. If a refresh token is present, rotate the
        // pair once; the grant response carries the identity directly.
        let Some(refresh) = tokens.refresh.as_deref() else {
            return Ok(IdentityCheck { user: None, refreshed: None });
        };

        match self
            .grant("refresh_token", serde_json::json!({ "refresh_token": refresh }))
            .await?
        {
            GrantResult::Rejected => Ok(IdentityCheck { user: None, refreshed: None }),
            GrantResult::Granted(session) => Ok(IdentityCheck {
                user: Some(session.user),
                refreshed: Some(session.tokens),
            }),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<GrantResult, IdentityError> {
        self.grant("password", serde_json::json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_out(&self, access: &str) -> Result<(), IdentityError> {
        // Best-effort: the provider response body is ignored.
        self.http
            .post(format!("{}/auth/v1/logout", self.config.url))
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {access}"))
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES & PARSING
// =============================================================================

/// A granted session: who signed in and the token pair to store.
#[derive(Debug, Clone)]
pub struct GrantedSession {
    pub user: IdentityUser,
    pub tokens: SessionTokens,
}

/// Outcome of a token grant: the provider either issued a session or
/// rejected the credentials/refresh token.
#[derive(Debug, Clone)]
pub enum GrantResult {
    Granted(GrantedSession),
    Rejected,
}

#[derive(Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    user: UserResponse,
}

fn parse_user(json: &str) -> Result<IdentityUser, IdentityError> {
    let user: UserResponse = serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))?;
    Ok(IdentityUser { id: user.id, email: user.email })
}

fn parse_grant(json: &str) -> Result<GrantedSession, IdentityError> {
    let token: TokenResponse = serde_json::from_str(json).map_err(|e| IdentityError::Parse(e.to_string()))?;
    Ok(GrantedSession {
        user: IdentityUser { id: token.user.id, email: token.user.email },
        tokens: SessionTokens { access: token.access_token, refresh: token.refresh_token },
    })
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
