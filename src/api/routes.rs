//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth;
use super::tasks as tasks_api;
use super::types::HealthResponse;
use super::users as users_api;
use crate::account::AccountService;
use crate::config::Config;
use crate::store::{create_stores, Stores};
use crate::task::TaskService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tasks: TaskService,
    pub accounts: AccountService,
    /// Whether the configured store survives restarts
    pub persistent: bool,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        let persistent = stores.tasks.is_persistent();
        Self {
            tasks: TaskService::new(stores.tasks, stores.accounts.clone()),
            accounts: AccountService::new(stores.accounts, config.auth.password_iterations),
            config,
            persistent,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .nest("/api/tasks", tasks_api::routes())
        .nest("/api/users", users_api::routes())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let stores = create_stores(config.store_type, config.data_dir.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open {} store: {}", config.store_type.as_str(), e))?;
    if !stores.tasks.is_persistent() {
        tracing::warn!("Using in-memory store; data is lost on restart");
    }

    let state = Arc::new(AppState::new(config.clone(), stores));
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dev_mode: state.config.dev_mode,
        store: state.config.store_type.as_str().to_string(),
        persistent: state.persistent,
    })
}

/// In-memory state with cheap password hashing.
#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    use crate::store::{InMemoryStore, StoreType};
    use std::path::PathBuf;

    let mut config = Config::new(PathBuf::from("unused"), StoreType::Memory);
    config.auth.password_iterations = 10;
    let store = Arc::new(InMemoryStore::new());
    let stores = Stores {
        accounts: store.clone(),
        tasks: store,
    };
    Arc::new(AppState::new(config, stores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_store() {
        let Json(health) = health(State(test_state())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.store, "memory");
        assert!(!health.persistent);
    }

    #[test]
    fn test_router_builds() {
        let _router: Router = router(test_state());
    }
}
