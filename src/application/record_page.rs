// Polled record page - Shared load/refresh/poll lifecycle for record lists
use crate::application::analytics_repository::RecordRepository;
use crate::application::poller::{ConditionalPoller, PollerState};
use crate::domain::record::{Record, StatusVocabulary};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// What a page currently shows. Rows are the last good load; `error` is the
/// banner for the latest failure, if any.
#[derive(Debug, Clone)]
pub struct PageSnapshot<R> {
    pub rows: Vec<R>,
    pub error: Option<String>,
    pub loading: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    pub auto_refresh: bool,
    pub polling: PollerState,
}

struct PageState<R> {
    rows: Vec<R>,
    error: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Counts a load as in flight until dropped, including when the loading
/// future is cancelled by a poller restart.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct RecordPage<R: Record> {
    name: &'static str,
    vocabulary: StatusVocabulary,
    repository: Arc<dyn RecordRepository<R>>,
    state: RwLock<PageState<R>>,
    in_flight: AtomicUsize,
    auto_refresh: AtomicBool,
    poller: Mutex<ConditionalPoller>,
}

impl<R: Record> RecordPage<R> {
    pub fn new(
        name: &'static str,
        vocabulary: StatusVocabulary,
        repository: Arc<dyn RecordRepository<R>>,
        poll_every: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            vocabulary,
            repository,
            state: RwLock::new(PageState {
                rows: Vec::new(),
                error: None,
                loaded_at: None,
            }),
            in_flight: AtomicUsize::new(0),
            auto_refresh: AtomicBool::new(true),
            poller: Mutex::new(ConditionalPoller::new(name, poll_every)),
        })
    }

    /// Initial load, then arm polling against what was loaded
    pub async fn mount(self: &Arc<Self>) {
        if let Err(e) = self.reload().await {
            tracing::warn!("Initial load of {} failed: {:#}", self.name, e);
        }
        self.rearm().await;
    }

    /// Cancel polling, e.g. when the page goes away
    pub async fn unmount(&self) {
        self.poller.lock().await.stop();
    }

    /// Fetch the collection and replace the rows wholesale.
    ///
    /// On failure the rows are left as they were and the error banner is
    /// set; the error is also returned to the caller.
    pub async fn reload(&self) -> anyhow::Result<Vec<R>> {
        let _loading = InFlight::enter(&self.in_flight);

        let result = self
            .repository
            .list()
            .await
            .with_context(|| format!("Failed to load {}", self.name));

        let mut state = self.state.write().await;
        match result {
            Ok(rows) => {
                tracing::debug!("Loaded {} {}", rows.len(), self.name);
                state.rows = rows.clone();
                state.error = None;
                state.loaded_at = Some(Utc::now());
                Ok(rows)
            }
            Err(e) => {
                state.error = Some(format!(
                    "Could not load {} (check the token and the backend).",
                    self.name
                ));
                Err(e)
            }
        }
    }

    /// Manual refresh; restarts polling against the fresh rows
    pub async fn refresh(self: &Arc<Self>) -> anyhow::Result<()> {
        let result = self.reload().await.map(|_| ());
        self.rearm().await;
        result
    }

    pub async fn set_auto_refresh(self: &Arc<Self>, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::SeqCst);
        self.rearm().await;
    }

    /// Create a record through the backend. Failures set the banner.
    pub async fn create(&self, draft: &R::Draft) -> anyhow::Result<R> {
        match self.repository.create(draft).await {
            Ok(record) => {
                tracing::info!("Created {} #{}", self.name, record.id());
                Ok(record)
            }
            Err(e) => {
                tracing::error!("Create in {} failed: {:#}", self.name, e);
                self.state.write().await.error = Some(format!("Could not create in {}.", self.name));
                Err(e)
            }
        }
    }

    /// Put a freshly created record at the top without refetching
    pub async fn prepend(self: &Arc<Self>, record: R) {
        self.state.write().await.rows.insert(0, record);
        self.rearm().await;
    }

    pub async fn snapshot(&self) -> PageSnapshot<R> {
        let polling = self.poller.lock().await.state();
        let state = self.state.read().await;
        PageSnapshot {
            rows: state.rows.clone(),
            error: state.error.clone(),
            loading: self.in_flight.load(Ordering::SeqCst) > 0,
            loaded_at: state.loaded_at,
            auto_refresh: self.auto_refresh.load(Ordering::SeqCst),
            polling,
        }
    }

    /// Stop the poller and, with auto-refresh on, start it again against the
    /// current rows. Runs after every change made from outside the poller.
    pub async fn rearm(self: &Arc<Self>) {
        let mut poller = self.poller.lock().await;
        poller.stop();

        if !self.auto_refresh.load(Ordering::SeqCst) {
            return;
        }

        let rows = self.state.read().await.rows.clone();
        let page: Weak<Self> = Arc::downgrade(self);
        let vocabulary = self.vocabulary;

        poller.start(
            move || {
                let page = page.clone();
                async move {
                    match page.upgrade() {
                        Some(page) => page.reload().await,
                        None => anyhow::bail!("page dropped"),
                    }
                }
            },
            move |rows: &Vec<R>| vocabulary.has_pending(rows),
            &rows,
        );
    }
}
