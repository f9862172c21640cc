mod db;
mod gate;
mod routes;
mod services;
mod session;
mod state;

use std::sync::Arc;

use services::identity::{IdentityClient, IdentityConfig, IdentityProvider};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Identity provider is non-fatal: without it the gate runs degraded and
    // only the login page and root stay reachable.
    let identity: Option<Arc<dyn IdentityProvider>> = match IdentityConfig::from_env() {
        Some(config) => match IdentityClient::new(config) {
            Ok(client) => {
                tracing::info!("identity provider configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity client build failed — gate running degraded");
                None
            }
        },
        None => {
            tracing::warn!("IDENTITY_URL/IDENTITY_API_KEY not set — gate running degraded");
            None
        }
    };

    let state = state::AppState::new(pool, identity, gate::ProviderErrorPolicy::from_env());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "orderdesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
