use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_session_api::audit::{EventLogger, MemoryEventStorage};
use taskboard_session_api::auth::MemoryCredentialDirectory;
use taskboard_session_api::clock::{Clock, SystemClock};
use taskboard_session_api::config::{self, AppConfig};
use taskboard_session_api::handlers;
use taskboard_session_api::handlers::auth::AuthState;
use taskboard_session_api::middleware::session_guard_middleware;
use taskboard_session_api::session::{MemorySessionStore, SessionGuardState, SessionStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_session_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load application configuration
    let config = match config::load_config_with_fallback() {
        Ok(config) => {
            tracing::info!("✓ Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::warn!("⚠ {}. Falling back to built-in defaults.", e);
            Arc::new(AppConfig::default())
        }
    };

    // Provision the credential directory from config
    let mut directory = MemoryCredentialDirectory::new();
    for user in &config.users {
        directory.add_user_with_hash(&user.username, &user.password_hash, user.role);
    }
    if directory.is_empty() {
        tracing::warn!("No users provisioned in configuration; login will reject all credentials");
    }

    // Collaborators shared by the guard and the auth handlers
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events = EventLogger::new(Arc::new(MemoryEventStorage::new()));

    let guard_state = SessionGuardState::new(
        store.clone(),
        events.clone(),
        clock.clone(),
        config.session.clone(),
    );

    let auth_state = AuthState {
        store,
        events,
        clock,
        verifier: Arc::new(directory),
        config: config.session.clone(),
    };

    // Every route behind the guard middleware gets the full lifecycle
    // check: timeout, rotation, fingerprint
    let protected = Router::new()
        .route("/api/v1/dashboard", get(handlers::dashboard::overview))
        .layer(axum_middleware::from_fn_with_state(
            guard_state,
            session_guard_middleware,
        ));

    let app = Router::new()
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .with_state(auth_state)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .unwrap_or_else(|e| panic!("Invalid bind_addr '{}': {}", config.bind_addr, e));

    tracing::info!("🚀 Starting Taskboard session API on {}", addr);
    tracing::info!(
        "📋 Session lifetime: {}s, rotation interval: {}s",
        config.session.session_lifetime_secs,
        config.session.rotation_interval_secs
    );

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
