// HTTP request handlers
use crate::application::analytics_repository::ProbeReport;
use crate::application::dashboard_service::DashboardView;
use crate::application::datasource_service::DataSourcesView;
use crate::application::report_service::ReportsView;
use crate::domain::filter::RecordFilter;
use crate::domain::record::{DataSource, Report};
use crate::domain::settings::Settings;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A failed backend call, reported to the display layer as 502
pub struct HandlerError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for HandlerError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        let body = ErrorBody {
            error: format!("{:#}", self.0),
        };
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DataSourceQuery {
    #[serde(default)]
    pub search: String,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl DataSourceQuery {
    fn filter(&self) -> RecordFilter {
        RecordFilter::new(self.search.as_str())
            .with("status", self.status.as_deref())
            .with("type", self.kind.as_deref())
    }
}

#[derive(Deserialize)]
pub struct NewDataSource {
    pub name: String,
}

#[derive(Default, Deserialize)]
pub struct NewReport {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct AutoRefresh {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Default, Deserialize)]
pub struct ProbeBody {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct ClearedCache {
    pub removed: usize,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn dashboard_view(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

/// Reload the dashboard. A failure shows up as the view's error banner.
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    if let Err(e) = state.dashboard.load().await {
        tracing::warn!("Dashboard refresh failed: {:#}", e);
    }
    Json(state.dashboard.view().await)
}

pub async fn datasources_view(
    Query(query): Query<DataSourceQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<DataSourcesView> {
    Json(state.datasources.view(&query.filter()).await)
}

pub async fn refresh_datasources(
    Query(query): Query<DataSourceQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<DataSourcesView> {
    if let Err(e) = state.datasources.page().refresh().await {
        tracing::warn!("Data source refresh failed: {:#}", e);
    }
    Json(state.datasources.view(&query.filter()).await)
}

pub async fn datasources_auto_refresh(
    Query(query): Query<DataSourceQuery>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AutoRefresh>,
) -> Json<DataSourcesView> {
    state.datasources.page().set_auto_refresh(body.enabled).await;
    Json(state.datasources.view(&query.filter()).await)
}

pub async fn add_datasource(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewDataSource>,
) -> Result<(StatusCode, Json<Option<DataSource>>), HandlerError> {
    match state.datasources.add(&body.name).await? {
        Some(created) => Ok((StatusCode::CREATED, Json(Some(created)))),
        None => Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(None))),
    }
}

pub async fn reports_view(State(state): State<Arc<AppState>>) -> Json<ReportsView> {
    Json(state.reports.view().await)
}

pub async fn refresh_reports(State(state): State<Arc<AppState>>) -> Json<ReportsView> {
    if let Err(e) = state.reports.page().refresh().await {
        tracing::warn!("Report refresh failed: {:#}", e);
    }
    Json(state.reports.view().await)
}

pub async fn reports_auto_refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AutoRefresh>,
) -> Json<ReportsView> {
    state.reports.page().set_auto_refresh(body.enabled).await;
    Json(state.reports.view().await)
}

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NewReport>>,
) -> Result<(StatusCode, Json<Report>), HandlerError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let report = state.reports.create(body.title.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, HandlerError> {
    Ok(Json(state.settings.load().await?))
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, HandlerError> {
    Ok(Json(state.settings.save(&settings).await?))
}

pub async fn save_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TokenBody>,
) -> Result<StatusCode, HandlerError> {
    if state.settings.save_token(&body.token)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::UNPROCESSABLE_ENTITY)
    }
}

pub async fn clear_token(State(state): State<Arc<AppState>>) -> Result<StatusCode, HandlerError> {
    state.settings.clear_token()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<Json<ClearedCache>, HandlerError> {
    let removed = state.settings.clear_cache()?;
    Ok(Json(ClearedCache { removed }))
}

pub async fn probe_backend(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ProbeBody>>,
) -> Json<ProbeReport> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    Json(state.settings.probe(body.token.as_deref()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::datasource_service::DataSourceService;
    use crate::application::report_service::ReportService;
    use crate::application::settings_service::SettingsService;
    use crate::infrastructure::api_client::ApiClient;
    use crate::infrastructure::auth::TokenStore;
    use crate::infrastructure::config::DashboardConfig;
    use crate::infrastructure::local_store::LocalStore;
    use crate::infrastructure::local_store::tests::scratch_path;
    use axum::Router;
    use axum::routing::get;
    use std::time::Duration;
    use tempfile::TempDir;

    const SOURCES: &str = r#"[
        {"id": 1, "name": "Stripe", "type": "api", "status": "connected"},
        {"id": 2, "name": "Postgres", "type": "db", "status": "connected"},
        {"id": 3, "name": "HubSpot", "type": "api", "status": "connected"}
    ]"#;

    /// App state whose client talks to a local stand-in backend
    async fn state_with_backend() -> (TempDir, Arc<AppState>) {
        let backend = Router::new().route("/api/datasources/", get(|| async { SOURCES }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        let (dir, path) = scratch_path();
        let tokens = TokenStore::new(Arc::new(LocalStore::open(&path).unwrap()), None);
        let client = Arc::new(
            ApiClient::new(&format!("http://{addr}"), tokens.clone(), Duration::from_secs(5)).unwrap(),
        );
        let state = Arc::new(AppState {
            dashboard: DashboardService::new(client.clone(), DashboardConfig::default()),
            datasources: DataSourceService::new(client.clone(), Duration::from_secs(4)),
            reports: ReportService::new(client.clone(), Duration::from_secs(3)),
            settings: SettingsService::new(client, tokens),
        });
        (dir, state)
    }

    fn api_only() -> DataSourceQuery {
        DataSourceQuery {
            kind: Some("api".to_string()),
            ..DataSourceQuery::default()
        }
    }

    #[test]
    fn test_query_builds_filter() {
        let query = DataSourceQuery {
            search: "stripe".to_string(),
            status: Some("all".to_string()),
            kind: Some("".to_string()),
        };
        let filter = query.filter();

        assert_eq!(filter.query, "stripe");
        assert_eq!(filter.equals.get("status").map(String::as_str), Some("all"));
        assert!(!filter.equals.contains_key("type"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_callers_filter() {
        let (_dir, state) = state_with_backend().await;

        let Json(view) = refresh_datasources(Query(api_only()), State(state.clone())).await;

        assert_eq!(view.rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(view.total, 3);
        state.unmount().await;
    }

    #[tokio::test]
    async fn test_auto_refresh_toggle_keeps_callers_filter() {
        let (_dir, state) = state_with_backend().await;
        state.datasources.page().reload().await.unwrap();

        let Json(view) = datasources_auto_refresh(
            Query(api_only()),
            State(state.clone()),
            Json(AutoRefresh { enabled: false }),
        )
        .await;

        assert!(!view.auto_refresh);
        assert_eq!(view.rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        state.unmount().await;
    }
}
