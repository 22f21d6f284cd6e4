// Conditional poller - Re-fetch on a fixed period while a predicate holds
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerState {
    Idle,
    Scheduled,
    Stopped,
}

/// One recurring-refresh context. At most one timer is live per poller:
/// `start` replaces any running timer, `stop` cancels it, and dropping the
/// poller cancels it as well.
///
/// Ticks never overlap. Each tick awaits its fetch before the next tick is
/// taken; a tick missed while a slow fetch was in flight fires once right
/// after, then the period resumes from there.
pub struct ConditionalPoller {
    name: &'static str,
    interval: Duration,
    state: Arc<watch::Sender<PollerState>>,
    task: Option<JoinHandle<()>>,
}

impl ConditionalPoller {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            name,
            interval,
            state: Arc::new(state),
            task: None,
        }
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    /// True while a timer task exists and has not finished
    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Arm the timer if `should_continue` holds for `initial`.
    ///
    /// Each tick runs `fetch`; a successful fetch yields the new snapshot
    /// and the poller stops once `should_continue` rejects it. A failed
    /// fetch is logged and the timer keeps its cadence.
    pub fn start<S, F, Fut, P>(&mut self, mut fetch: F, should_continue: P, initial: &S)
    where
        S: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.cancel_task();

        if !should_continue(initial) {
            tracing::debug!("Poller {} not armed: nothing left to wait for", self.name);
            self.state.send_replace(PollerState::Idle);
            return;
        }

        tracing::debug!("Poller {} armed every {:?}", self.name, self.interval);
        self.state.send_replace(PollerState::Scheduled);

        let name = self.name;
        let period = self.interval;
        let state = self.state.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(snapshot) => {
                        if !should_continue(&snapshot) {
                            tracing::debug!("Poller {} settled, stopping", name);
                            state.send_replace(PollerState::Stopped);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Poller {} tick failed: {:#}", name, e);
                    }
                }
            }
        }));
    }

    /// Cancel any live timer. Safe from any state, any number of times.
    pub fn stop(&mut self) {
        self.cancel_task();
        self.state.send_replace(PollerState::Stopped);
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConditionalPoller {
    fn drop(&mut self) {
        self.cancel_task();
    }
}
