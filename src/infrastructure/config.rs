use config::ConfigBuilder;
use config::builder::DefaultState;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub polling: PollingConfig,
    pub dashboard: DashboardConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Fallback bearer token used when none has been saved locally
    #[serde(default)]
    pub demo_token: Option<String>,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    pub datasources_secs: u64,
    pub reports_secs: u64,
}

impl PollingConfig {
    pub fn datasources(&self) -> Duration {
        Duration::from_secs(self.datasources_secs.max(1))
    }

    pub fn reports(&self) -> Duration {
        Duration::from_secs(self.reports_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub trend_days: u32,
    pub moving_average_window: usize,
    pub spark_points: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trend_days: 30,
            moving_average_window: 7,
            spark_points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Defaults, then `config/nebula.*` if present, then `NEBULA__*` env vars
/// Built-in values for every key, before any file or environment source
fn with_defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("api.base_url", "http://127.0.0.1:8000")?
        .set_default("api.timeout_secs", 10)?
        .set_default("storage.path", "nebula_state.toml")?
        .set_default("polling.datasources_secs", 4)?
        .set_default("polling.reports_secs", 3)?
        .set_default("dashboard.trend_days", 30)?
        .set_default("dashboard.moving_average_window", 7)?
        .set_default("dashboard.spark_points", 10)?
        .set_default("server.bind", "0.0.0.0:8080")
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = with_defaults()?
        .add_source(config::File::with_name("config/nebula").required(false))
        .add_source(config::Environment::with_prefix("NEBULA").separator("__"))
        .build()?;

    into_app_config(settings)
}

fn into_app_config(settings: config::Config) -> anyhow::Result<AppConfig> {
    let mut app: AppConfig = settings.try_deserialize()?;
    app.api.demo_token = app.api.demo_token.filter(|t| !t.trim().is_empty());
    Ok(app)
}
