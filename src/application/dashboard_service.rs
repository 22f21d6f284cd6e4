// Dashboard service - Loads the analytics overview and derives its charts
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::analytics::Kpis;
use crate::domain::hierarchy::{TreeNode, to_hierarchy};
use crate::domain::series::{
    AveragedPoint, NormalizedPoint, SeriesPoint, moving_average, normalize_to_percentage, tail,
};
use crate::infrastructure::config::DashboardConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const PALETTE: [&str; 7] = [
    "#7C3AED", "#38B2AC", "#49BFB7", "#3D9BCB", "#225C8E", "#A78BFA", "#60A5FA",
];

fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub kpis: Option<Kpis>,
    pub trend: Vec<SeriesPoint>,
    pub top_products: Vec<SeriesPoint>,
    pub distribution: Vec<SeriesPoint>,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredPoint {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// Render-ready dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub kpis: Option<Kpis>,
    pub trend: Vec<AveragedPoint>,
    pub spark: Vec<SeriesPoint>,
    pub top_products: Vec<ColoredPoint>,
    pub radar: Vec<NormalizedPoint>,
    pub regions: TreeNode,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn AnalyticsRepository>,
    config: DashboardConfig,
    data: Arc<RwLock<DashboardData>>,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn AnalyticsRepository>, config: DashboardConfig) -> Self {
        Self {
            repository,
            config,
            data: Arc::new(RwLock::new(DashboardData::default())),
        }
    }

    /// Fetch all four panels concurrently. Either all of them are replaced
    /// or, on any failure, none are and the error banner is set.
    pub async fn load(&self) -> anyhow::Result<()> {
        let result = tokio::try_join!(
            self.repository.kpis(),
            self.repository.trend(self.config.trend_days),
            self.repository.top_products(),
            self.repository.distribution(),
        );

        let mut data = self.data.write().await;
        match result {
            Ok((kpis, trend, top_products, distribution)) => {
                tracing::debug!(
                    "Dashboard loaded: {} trend points, {} products, {} regions",
                    trend.len(),
                    top_products.len(),
                    distribution.len()
                );
                *data = DashboardData {
                    kpis: Some(kpis),
                    trend,
                    top_products,
                    distribution,
                    error: None,
                    loaded_at: Some(Utc::now()),
                };
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error loading dashboard: {:#}", e);
                data.error = Some(
                    "Could not load the data (check the token and the backend).".to_string(),
                );
                Err(e)
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let data = self.data.read().await;
        build_view(&data, &self.config)
    }
}

pub fn build_view(data: &DashboardData, config: &DashboardConfig) -> DashboardView {
    let top_products = data
        .top_products
        .iter()
        .enumerate()
        .map(|(i, p)| ColoredPoint {
            label: p.label.clone(),
            value: p.value,
            color: palette_color(i),
        })
        .collect();

    let mut regions = to_hierarchy("regions", &data.distribution, |p| p.label.clone(), |p| p.value);
    regions.children = regions
        .children
        .into_iter()
        .enumerate()
        .map(|(i, node)| node.with_fill(palette_color(i)))
        .collect();

    DashboardView {
        kpis: data.kpis.clone(),
        trend: moving_average(&data.trend, config.moving_average_window),
        spark: tail(&data.trend, config.spark_points).to_vec(),
        top_products,
        radar: normalize_to_percentage(&data.top_products),
        regions,
        error: data.error.clone(),
        loaded_at: data.loaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeAnalytics {
        fail: AtomicBool,
    }

    #[async_trait]
    impl AnalyticsRepository for FakeAnalytics {
        async fn kpis(&self) -> anyhow::Result<Kpis> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("401 Unauthorized");
            }
            Ok(Kpis {
                revenue_mtd: 125_000.0,
                active_users: 4200,
                conv_rate: 3.1,
                tickets_open: 87,
            })
        }

        async fn trend(&self, days: u32) -> anyhow::Result<Vec<SeriesPoint>> {
            Ok((1..=days)
                .map(|d| SeriesPoint::new(format!("Oct {d:02}"), d as f64))
                .collect())
        }

        async fn top_products(&self) -> anyhow::Result<Vec<SeriesPoint>> {
            Ok(vec![SeriesPoint::new("Pro", 400.0), SeriesPoint::new("Lite", 100.0)])
        }

        async fn distribution(&self) -> anyhow::Result<Vec<SeriesPoint>> {
            Ok(vec![SeriesPoint::new("BR", 300.0), SeriesPoint::new("US", 0.0)])
        }
    }

    fn service(fail: bool) -> (Arc<FakeAnalytics>, DashboardService) {
        let repo = Arc::new(FakeAnalytics {
            fail: AtomicBool::new(fail),
        });
        let service = DashboardService::new(repo.clone(), DashboardConfig::default());
        (repo, service)
    }

    #[tokio::test]
    async fn test_view_derives_every_panel() {
        let (_, service) = service(false);
        service.load().await.unwrap();
        let view = service.view().await;

        assert_eq!(view.kpis.as_ref().map(|k| k.tickets_open), Some(87));
        assert_eq!(view.trend.len(), 30);
        assert_eq!(view.trend[0].moving_average, 1.0);
        assert_eq!(view.trend[29].moving_average, 27.0);
        assert_eq!(view.spark.len(), 10);
        assert_eq!(view.spark[0].label, "Oct 21");
        assert_eq!(view.top_products[1].color, PALETTE[1]);
        assert_eq!(view.radar[1].norm, 25.0);
        assert_eq!(view.regions.children[1].size, Some(1.0));
        assert_eq!(view.regions.children[0].fill.as_deref(), Some(PALETTE[0]));
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_panels() {
        let (repo, service) = service(false);
        service.load().await.unwrap();

        repo.fail.store(true, Ordering::SeqCst);
        assert!(service.load().await.is_err());

        let view = service.view().await;
        assert!(view.error.is_some());
        assert!(view.kpis.is_some());
        assert_eq!(view.trend.len(), 30);
    }

    #[tokio::test]
    async fn test_first_load_failure_shows_empty_dashboard() {
        let (_, service) = service(true);
        assert!(service.load().await.is_err());

        let view = service.view().await;
        assert!(view.kpis.is_none());
        assert!(view.trend.is_empty());
        assert!(view.regions.children.is_empty());
        assert!(view.error.is_some());
    }
}
