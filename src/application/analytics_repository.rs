// Repository traits for the analytics backend
use crate::domain::analytics::Kpis;
use crate::domain::record::Record;
use crate::domain::series::SeriesPoint;
use crate::domain::settings::Settings;
use async_trait::async_trait;
use serde::Serialize;

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Headline KPIs
    async fn kpis(&self) -> anyhow::Result<Kpis>;

    /// Daily revenue for the last `days` days, oldest first
    async fn trend(&self, days: u32) -> anyhow::Result<Vec<SeriesPoint>>;

    /// Best-selling products by revenue, highest first
    async fn top_products(&self) -> anyhow::Result<Vec<SeriesPoint>>;

    /// Revenue by region
    async fn distribution(&self) -> anyhow::Result<Vec<SeriesPoint>>;
}

/// A backend collection that can be listed and appended to
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<R>>;

    async fn create(&self, draft: &R::Draft) -> anyhow::Result<R>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load_settings(&self) -> anyhow::Result<Settings>;

    /// Save and return the settings as echoed by the backend
    async fn save_settings(&self, settings: &Settings) -> anyhow::Result<Settings>;

    /// Time a KPI request, optionally with a token that is not stored yet
    async fn probe(&self, token: Option<&str>) -> ProbeReport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub status: ProbeStatus,
    pub ms: u64,
    pub error: String,
}

impl ProbeReport {
    pub fn ok(ms: u64) -> Self {
        Self {
            status: ProbeStatus::Ok,
            ms,
            error: String::new(),
        }
    }

    pub fn failed(ms: u64, error: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            ms,
            error: error.into(),
        }
    }
}
