use std::net::SocketAddr;
use std::sync::Arc;

use agora_api::auth::{JwksVerifier, SecretVerifier, TokenVerifier};
use agora_api::config::{LogFormat, ServerConfig};
use agora_api::router::build_app_router;
use agora_api::state::AppState;
use agora_db::{ForumStore, MemoryStore, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Issuer and audience used with `AUTH_HS256_SECRET` when none are configured.
const LOCAL_ISSUER: &str = "agora-local/";
const LOCAL_AUDIENCE: &str = "agora";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agora_api=debug,agora_db=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store: Arc<dyn ForumStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = agora_db::create_pool(url, config.database_max_connections)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            agora_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            agora_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // --- Token verification ---
    let verifier: Arc<dyn TokenVerifier> = match config.auth.hs256_secret.as_deref() {
        Some(secret) => {
            tracing::warn!("AUTH_HS256_SECRET set, verifying HS256 tokens with a shared secret");
            Arc::new(SecretVerifier::new(
                secret,
                config.auth.issuer.as_deref().unwrap_or(LOCAL_ISSUER),
                config.auth.audience.as_deref().unwrap_or(LOCAL_AUDIENCE),
            ))
        }
        None => Arc::new(JwksVerifier::from_config(&config.auth)),
    };

    // --- Router ---
    let state = AppState {
        store,
        verifier,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
