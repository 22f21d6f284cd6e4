// Data-source service - Health overview with search and filters
use crate::application::analytics_repository::RecordRepository;
use crate::application::poller::PollerState;
use crate::application::record_page::{PageSnapshot, RecordPage};
use crate::domain::aggregate::{Bucket, StatusBuckets, count_by, group_count};
use crate::domain::filter::{ALL, RecordFilter};
use crate::domain::record::{DATASOURCE_STATUSES, DataSource, DataSourceDraft, Record};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSlice {
    pub name: String,
    pub value: usize,
    pub color: &'static str,
}

/// Pie slices for the non-empty buckets, coloured by status
pub fn status_slices(buckets: &StatusBuckets, colors: impl Fn(&str) -> &'static str) -> Vec<StatusSlice> {
    buckets
        .non_empty()
        .map(|b| StatusSlice {
            name: b.key.clone(),
            value: b.count,
            color: colors(&b.key),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSourcesView {
    pub rows: Vec<DataSource>,
    pub counts: StatusBuckets,
    pub slices: Vec<StatusSlice>,
    pub by_type: Vec<Bucket>,
    pub type_options: Vec<String>,
    pub total: usize,
    pub healthy: usize,
    pub unstable: usize,
    pub loading: bool,
    pub auto_refresh: bool,
    pub polling: PollerState,
    pub error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DataSourceService {
    page: Arc<RecordPage<DataSource>>,
}

impl DataSourceService {
    pub fn new(repository: Arc<dyn RecordRepository<DataSource>>, poll_every: Duration) -> Self {
        Self {
            page: RecordPage::new("data sources", DATASOURCE_STATUSES, repository, poll_every),
        }
    }

    pub fn page(&self) -> &Arc<RecordPage<DataSource>> {
        &self.page
    }

    /// Register a new API source and reload. A blank name does nothing.
    pub async fn add(&self, name: &str) -> anyhow::Result<Option<DataSource>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        let created = self.page.create(&DataSourceDraft::api(name)).await?;
        self.page.refresh().await?;
        Ok(Some(created))
    }

    pub async fn view(&self, filter: &RecordFilter) -> DataSourcesView {
        build_view(self.page.snapshot().await, filter)
    }
}

/// Counts and charts cover every row; only the table honours the filter.
pub fn build_view(snapshot: PageSnapshot<DataSource>, filter: &RecordFilter) -> DataSourcesView {
    let rows = &snapshot.rows;
    let vocabulary = DATASOURCE_STATUSES;

    let counts = count_by(rows, |r| r.status(), vocabulary.known, vocabulary.catch_all);
    let by_type = group_count(rows, |r| r.field("type"), "other");
    debug_assert_eq!(counts.total(), rows.len());

    let mut type_options = vec![ALL.to_string()];
    type_options.extend(by_type.iter().map(|b| b.key.clone()));

    let healthy = counts.get("connected");
    let unstable = counts.get("degraded") + counts.get("disconnected") + counts.get("unknown");

    DataSourcesView {
        slices: status_slices(&counts, |k| vocabulary.color(k)),
        rows: filter.apply(rows),
        total: rows.len(),
        healthy,
        unstable,
        counts,
        by_type,
        type_options,
        loading: snapshot.loading,
        auto_refresh: snapshot.auto_refresh,
        polling: snapshot.polling,
        error: snapshot.error,
        loaded_at: snapshot.loaded_at,
    }
}
