// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::datasource_service::DataSourceService;
use crate::application::report_service::ReportService;
use crate::application::settings_service::SettingsService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: DashboardService,
    pub datasources: DataSourceService,
    pub reports: ReportService,
    pub settings: SettingsService,
}

impl AppState {
    /// Initial load of every page; polled pages arm their pollers
    pub async fn mount(&self) {
        let (dashboard, _, _) = tokio::join!(
            self.dashboard.load(),
            self.datasources.page().mount(),
            self.reports.page().mount(),
        );
        if let Err(e) = dashboard {
            tracing::warn!("Dashboard not loaded at startup: {:#}", e);
        }
    }

    /// Cancel every live poller
    pub async fn unmount(&self) {
        self.datasources.page().unmount().await;
        self.reports.page().unmount().await;
    }
}
