//! Web server module.

mod handlers;
mod render;
mod session;

pub use session::SessionStore;

use crate::config::MonitorConfig;
use crate::fetch::HttpSource;

use axum::{routing::get, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: MonitorConfig,
    pub source: Arc<HttpSource>,
    pub sessions: SessionStore,
}

/// Web server for the monitor dashboard.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: MonitorConfig, source: Arc<HttpSource>) -> Self {
        Self {
            state: AppState {
                config,
                source,
                sessions: SessionStore::new(),
            },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Pages
            .route("/", get(handlers::handle_dashboard))
            .route("/debug", get(handlers::handle_debug))
            .route("/login", get(handlers::handle_login_page).post(handlers::handle_login))
            .route("/logout", post(handlers::handle_logout))
            // API endpoints
            .route("/api/status", get(handlers::handle_api_status))
            // Static assets
            .route("/favicon.ico", get(handlers::handle_favicon))
            .route("/static/{*path}", get(handlers::handle_static))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
