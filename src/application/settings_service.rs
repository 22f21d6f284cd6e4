// Settings service - Workspace settings, bearer token and local cache
use crate::application::analytics_repository::{ProbeReport, SettingsRepository};
use crate::domain::settings::Settings;
use crate::infrastructure::auth::TokenStore;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
    tokens: TokenStore,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepository>, tokens: TokenStore) -> Self {
        Self { repository, tokens }
    }

    pub async fn load(&self) -> anyhow::Result<Settings> {
        self.repository
            .load_settings()
            .await
            .context("Failed to load settings")
    }

    /// Save and adopt whatever the backend echoes back
    pub async fn save(&self, settings: &Settings) -> anyhow::Result<Settings> {
        let saved = self
            .repository
            .save_settings(settings)
            .await
            .context("Failed to save settings")?;
        tracing::info!("Settings saved for {}", saved.org_name);
        Ok(saved)
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get_token()
    }

    /// Returns false when the token is blank and nothing was stored
    pub fn save_token(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.tokens.set_token(token)?)
    }

    pub fn clear_token(&self) -> anyhow::Result<()> {
        Ok(self.tokens.clear_token()?)
    }

    pub fn clear_cache(&self) -> anyhow::Result<usize> {
        Ok(self.tokens.clear_cache()?)
    }

    /// Check the backend answers, optionally with a token not saved yet
    pub async fn probe(&self, token: Option<&str>) -> ProbeReport {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let report = self.repository.probe(token).await;
        tracing::info!("Backend probe: {:?} in {}ms", report.status, report.ms);
        report
    }
}
