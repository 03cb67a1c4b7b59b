use std::sync::Arc;

use probation_teams_api::auth::TokenVerifier;
use probation_teams_api::config;
use probation_teams_api::database::{DatabaseManager, PgLduStore};
use probation_teams_api::handlers::{self, AppState};
use probation_teams_api::services::LocalDeliveryUnitService;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_PUBLIC_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config::config();
    tracing::info!("Starting probation-teams-api in {:?} mode", config.environment);

    let verifier = match &config.security.jwt_public_key {
        Some(pem) => TokenVerifier::from_public_key_pem(pem)
            .unwrap_or_else(|e| panic!("invalid JWT_PUBLIC_KEY: {}", e)),
        None => {
            tracing::warn!("JWT_PUBLIC_KEY not configured; all requests are anonymous");
            TokenVerifier::disabled()
        }
    };

    let pool = DatabaseManager::connect()
        .await
        .unwrap_or_else(|e| panic!("database connection failed: {}", e));
    DatabaseManager::migrate(&pool)
        .await
        .unwrap_or_else(|e| panic!("database migration failed: {}", e));

    let state = AppState {
        service: LocalDeliveryUnitService::new(Arc::new(PgLduStore::new(pool))),
        verifier: Arc::new(verifier),
    };
    let app = handlers::router(state);

    // Allow deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("probation-teams-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
