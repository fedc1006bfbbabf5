use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use bizdesk_api::app::{self, AppState};
use bizdesk_api::auth::TokenVerifier;
use bizdesk_api::config::{config, AppConfig};
use bizdesk_api::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bizdesk_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting BizDesk API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET (or JWT_SECRET) must be set");
    }
    let verifier = TokenVerifier::new(&config.security.jwt_secret)?;

    let pool = DatabaseManager::connect(&config.database)?;
    if config.database.run_migrations {
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            tracing::error!("Migrations failed, continuing with existing schema: {}", e);
        }
    }

    let state = AppState::from_pool(pool, verifier, config.security.auth_cookie.clone());
    let app = with_transport_layers(app::router(state), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("BizDesk API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn with_transport_layers(router: Router, config: &AppConfig) -> Router {
    let mut router = router.layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_is_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
