use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::catalog::Catalog;
use crate::chat::{ChatService, ReplyDelay};
use crate::config::WertigoConfig;
use crate::map::MapSettings;
use crate::recommend::Responder;
use crate::{api, pages};

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub chat: ChatService,
    pub map: MapSettings,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog, config: &WertigoConfig) -> Self {
        let catalog = Arc::new(catalog);
        let chat = ChatService::new(
            Arc::clone(&catalog),
            Arc::new(Responder::default()),
            ReplyDelay::from(&config.chat),
        )
        .with_session_ttl(config.chat.session_ttl());
        Self {
            catalog,
            chat,
            map: MapSettings::from(&config.map),
        }
    }
}

/// Page routes, `/api` and the not-found fallback
pub fn app(state: AppState, config: &WertigoConfig) -> Router {
    let mut app = Router::new()
        .merge(pages::router())
        .nest("/api", api::router())
        .fallback(pages::not_found)
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    if config.server.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.with_state(state)
}

pub async fn run(config: &WertigoConfig, catalog: Catalog) -> Result<()> {
    let state = AppState::new(catalog, config);
    let sweeper = state.chat.spawn_sweeper();
    let router = app(state, config);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://localhost:{}", config.server.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    sweeper.abort();
    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
