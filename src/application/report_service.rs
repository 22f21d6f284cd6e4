// Report service - Generated report status and creation
use crate::application::analytics_repository::RecordRepository;
use crate::application::datasource_service::{StatusSlice, status_slices};
use crate::application::poller::PollerState;
use crate::application::record_page::{PageSnapshot, RecordPage};
use crate::domain::aggregate::{Bucket, StatusBuckets, count_by};
use crate::domain::record::{REPORT_STATUSES, Record, Report, ReportDraft};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ReportsView {
    pub rows: Vec<Report>,
    pub counts: StatusBuckets,
    pub slices: Vec<StatusSlice>,
    pub bars: Vec<Bucket>,
    pub total: usize,
    pub loading: bool,
    pub auto_refresh: bool,
    pub polling: PollerState,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ReportService {
    page: Arc<RecordPage<Report>>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn RecordRepository<Report>>, poll_every: Duration) -> Self {
        Self {
            page: RecordPage::new("reports", REPORT_STATUSES, repository, poll_every),
        }
    }

    pub fn page(&self) -> &Arc<RecordPage<Report>> {
        &self.page
    }

    /// Queue a report; the created row goes on top and polling restarts
    pub async fn create(&self, title: Option<&str>) -> anyhow::Result<Report> {
        let draft = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => ReportDraft {
                title: title.to_string(),
            },
            None => ReportDraft::default(),
        };

        let report = self.page.create(&draft).await?;
        self.page.prepend(report.clone()).await;
        Ok(report)
    }

    pub async fn view(&self) -> ReportsView {
        build_view(self.page.snapshot().await)
    }
}

pub fn build_view(snapshot: PageSnapshot<Report>) -> ReportsView {
    let vocabulary = REPORT_STATUSES;
    let counts = count_by(&snapshot.rows, |r| r.status(), vocabulary.known, vocabulary.catch_all);

    let bars = counts
        .non_empty()
        .filter(|b| vocabulary.known.contains(&b.key.as_str()))
        .cloned()
        .collect();

    ReportsView {
        slices: status_slices(&counts, |k| vocabulary.color(k)),
        total: snapshot.rows.len(),
        rows: snapshot.rows,
        counts,
        bars,
        loading: snapshot.loading,
        auto_refresh: snapshot.auto_refresh,
        polling: snapshot.polling,
        error: snapshot.error,
        loaded_at: snapshot.loaded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::record_page::tests::{ScriptedReports, report};

    #[test]
    fn test_bars_follow_fixed_status_order() {
        let rows = vec![
            report(1, "Weekly", "failed"),
            report(2, "Monthly", "done"),
            report(3, "Quarterly", "pending"),
            report(4, "Daily", "done"),
        ];
        let view = build_view(PageSnapshot {
            rows,
            error: None,
            loading: false,
            loaded_at: None,
            auto_refresh: true,
            polling: PollerState::Idle,
        });

        let bars: Vec<(&str, usize)> = view.bars.iter().map(|b| (b.key.as_str(), b.count)).collect();
        assert_eq!(bars, vec![("done", 2), ("failed", 1)]);
        assert_eq!(view.counts.get("other"), 1);
        assert_eq!(view.counts.total(), view.total);
        assert_eq!(view.slices.last().map(|s| s.color), Some("#A78BFA"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_created_report_is_prepended_and_polled() {
        let repo = Arc::new(ScriptedReports::new(vec![Some(vec![report(1, "Weekly", "done")])]));
        let service = ReportService::new(repo, Duration::from_secs(3));
        service.page().mount().await;
        assert_eq!(service.view().await.polling, PollerState::Idle);

        let created = service.create(Some("  ")).await.unwrap();
        assert_eq!(created.title, "Ad-hoc Revenue Report");

        let view = service.view().await;
        assert_eq!(view.rows[0].id, 99);
        assert_eq!(view.total, 2);
        assert_eq!(view.polling, PollerState::Scheduled);
        service.page().unmount().await;
    }
}
