use std::sync::Arc;
use anyhow::Result;
use axum::Router;
use tracing::info;
use crate::config::settings::SettingsConfig;
use crate::notice::dispatcher::NoticeDispatcher;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::provider::http::HttpWeixinApi;
use crate::server::notice::NoticeState;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub notice_state: NoticeState,
}

impl AppState {
    pub fn new(
        metrics: &Metrics,
        dispatcher: Arc<NoticeDispatcher<HttpWeixinApi>>,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            notice_state: NoticeState::new(dispatcher),
        }
    }
}

/// Notice route plus, when enabled, the metrics route.
pub async fn app(
    settings_config: &SettingsConfig,
    dispatcher: Arc<NoticeDispatcher<HttpWeixinApi>>,
) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, dispatcher);

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.notice_state.router())
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn start(
    settings_config: &SettingsConfig,
    dispatcher: Arc<NoticeDispatcher<HttpWeixinApi>>,
) -> Result<()> {
    let app = app(settings_config, dispatcher).await;

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    info!("listening on {}", listener.local_addr()?);

    let metrics = get_metrics().await;
    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
