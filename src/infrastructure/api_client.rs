// REST API client for the analytics backend
use crate::application::analytics_repository::{
    AnalyticsRepository, ProbeReport, RecordRepository, SettingsRepository,
};
use crate::domain::analytics::Kpis;
use crate::domain::record::Record;
use crate::domain::series::SeriesPoint;
use crate::domain::settings::Settings;
use crate::infrastructure::auth::TokenStore;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Longest response body excerpt carried in an error
const ERROR_BODY_LIMIT: usize = 140;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
    tokens: TokenStore,
}

impl ApiClient {
    /// `base_url` is the backend root; every call goes under `<base_url>/api`
    pub fn new(base_url: &str, tokens: TokenStore, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: format!("{}/api", base_url.trim_end_matches('/')),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Request with the bearer header from `token`, or from the token store
    fn authorized(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");

        match token.map(str::to_string).or_else(|| self.tokens.get_token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let (client, request) = request.build_split();
        let request = request.map_err(|source| ApiError::Transport {
            url: String::new(),
            source,
        })?;
        let url = request.url().to_string();

        tracing::debug!("{} {}", request.method(), url);
        let response = client
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.authorized(Method::GET, path, None)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.authorized(Method::POST, path, None).json(body))
            .await
    }
}

#[async_trait]
impl AnalyticsRepository for ApiClient {
    async fn kpis(&self) -> anyhow::Result<Kpis> {
        Ok(self.get("/analytics/kpis/").await?)
    }

    async fn trend(&self, days: u32) -> anyhow::Result<Vec<SeriesPoint>> {
        let request = self
            .authorized(Method::GET, "/analytics/trend/", None)
            .query(&[("days", days)]);
        let points: Option<Vec<SeriesPoint>> = self.execute(request).await?;
        Ok(points.unwrap_or_default())
    }

    async fn top_products(&self) -> anyhow::Result<Vec<SeriesPoint>> {
        let points: Option<Vec<SeriesPoint>> = self.get("/analytics/top-products/").await?;
        Ok(points.unwrap_or_default())
    }

    async fn distribution(&self) -> anyhow::Result<Vec<SeriesPoint>> {
        let points: Option<Vec<SeriesPoint>> = self.get("/analytics/distribution/").await?;
        Ok(points.unwrap_or_default())
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for ApiClient {
    async fn list(&self) -> anyhow::Result<Vec<R>> {
        let rows: Option<Vec<R>> = self.get(R::ENDPOINT).await?;
        Ok(rows.unwrap_or_default())
    }

    async fn create(&self, draft: &R::Draft) -> anyhow::Result<R> {
        Ok(self.post(R::ENDPOINT, draft).await?)
    }
}

#[async_trait]
impl SettingsRepository for ApiClient {
    async fn load_settings(&self) -> anyhow::Result<Settings> {
        Ok(self.get("/settings/").await?)
    }

    async fn save_settings(&self, settings: &Settings) -> anyhow::Result<Settings> {
        Ok(self.post("/settings/", settings).await?)
    }

    async fn probe(&self, token: Option<&str>) -> ProbeReport {
        let started = Instant::now();
        let request = self.authorized(Method::GET, "/analytics/kpis/", token);
        let result = self.execute::<serde_json::Value>(request).await;
        let ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(_) => ProbeReport::ok(ms),
            Err(ApiError::Status { status, body }) => {
                ProbeReport::failed(ms, format!("{}: {}", status, body))
            }
            Err(e) => ProbeReport::failed(ms, e.to_string()),
        }
    }
}
