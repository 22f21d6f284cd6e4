// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::datasource_service::DataSourceService;
use crate::application::report_service::ReportService;
use crate::application::settings_service::SettingsService;
use crate::infrastructure::api_client::ApiClient;
use crate::infrastructure::auth::TokenStore;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::local_store::LocalStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_datasource, clear_cache, clear_token, create_report, dashboard_view,
    datasources_auto_refresh, datasources_view, get_settings, health_check, probe_backend,
    refresh_dashboard, refresh_datasources, refresh_reports, reports_auto_refresh, reports_view,
    save_settings, save_token,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nebula_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Persisted client state and the auth context built on it
    let store = Arc::new(LocalStore::open(&app_config.storage.path)?);
    let tokens = TokenStore::new(store, app_config.api.demo_token.clone());

    // Backend client (infrastructure layer)
    let client = Arc::new(ApiClient::new(
        &app_config.api.base_url,
        tokens.clone(),
        app_config.api.timeout(),
    )?);

    // Page services (application layer)
    let state = Arc::new(AppState {
        dashboard: DashboardService::new(client.clone(), app_config.dashboard.clone()),
        datasources: DataSourceService::new(client.clone(), app_config.polling.datasources()),
        reports: ReportService::new(client.clone(), app_config.polling.reports()),
        settings: SettingsService::new(client.clone(), tokens),
    });
    state.mount().await;

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/views/dashboard", get(dashboard_view))
        .route("/views/dashboard/refresh", post(refresh_dashboard))
        .route("/views/datasources", get(datasources_view))
        .route("/views/datasources/refresh", post(refresh_datasources))
        .route("/views/datasources/auto-refresh", put(datasources_auto_refresh))
        .route("/datasources", post(add_datasource))
        .route("/views/reports", get(reports_view))
        .route("/views/reports/refresh", post(refresh_reports))
        .route("/views/reports/auto-refresh", put(reports_auto_refresh))
        .route("/reports", post(create_report))
        .route("/settings", get(get_settings).post(save_settings))
        .route("/settings/probe", post(probe_backend))
        .route("/auth/token", put(save_token).delete(clear_token))
        .route("/cache/clear", post(clear_cache))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!(
        "Starting nebula-dashboard on {} against {}",
        addr,
        app_config.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.unmount().await;
    tracing::info!("Pollers stopped, bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
