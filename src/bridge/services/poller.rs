//! Periodic completion polling with an overlap guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::completion::{CompletionSyncError, CompletionSyncService, CycleReport, SyncSummary};
use crate::bridge::{
    domain::PollerState,
    ports::{EditorHost, SettingsStore, TaskService},
};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Outcome of one guarded poll.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Another cycle was running, so nothing happened.
    Skipped,
    /// The cursor was initialised.
    ColdStart(DateTime<Utc>),
    /// Completed tasks were applied and the cursor moved.
    Synced(SyncSummary),
    /// The cycle failed and the cursor kept its previous value.
    Aborted(CompletionSyncError),
}

/// Drives completion sync on a timer.
///
/// At most one cycle runs at a time: a tick or [`SyncPoller::poll_once`] call
/// during a running cycle is a no-op. Cloning yields a handle to the same
/// poller.
pub struct SyncPoller<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    inner: Arc<PollerInner<E, T, S, C>>,
}

struct PollerInner<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    service: CompletionSyncService<E, T, S, C>,
    cycle: Arc<CycleFlag>,
    timer: Mutex<Option<Timer>>,
}

/// Reentrancy flag plus a wakeup for callers waiting for it to clear.
#[derive(Default)]
struct CycleFlag {
    polling: AtomicBool,
    idle: Notify,
}

struct Timer {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl<E, T, S, C> Clone for SyncPoller<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, T, S, C> SyncPoller<E, T, S, C>
where
    E: EditorHost,
    T: TaskService,
    S: SettingsStore,
    C: Clock + Send + Sync,
{
    /// Creates an idle poller without a timer.
    #[must_use]
    pub fn new(service: CompletionSyncService<E, T, S, C>) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                service,
                cycle: Arc::new(CycleFlag::default()),
                timer: Mutex::new(None),
            }),
        }
    }

    /// Returns whether a cycle is running.
    #[must_use]
    pub fn state(&self) -> PollerState {
        PollerState::from(self.inner.cycle.polling.load(Ordering::Acquire))
    }

    /// Returns `true` while a timer is scheduled.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.token.is_cancelled())
    }

    /// Runs one cycle unless another one is running.
    ///
    /// Errors end the cycle and are reported in the outcome; they never
    /// propagate further.
    pub async fn poll_once(&self) -> CycleOutcome {
        let Some(_guard) = CycleGuard::try_acquire(&self.inner.cycle) else {
            debug!("completion sync already running, skipping poll");
            return CycleOutcome::Skipped;
        };
        self.run_guarded().await
    }

    /// Runs a cycle; the caller holds the [`CycleGuard`].
    async fn run_guarded(&self) -> CycleOutcome {
        match self.inner.service.run_cycle().await {
            Ok(CycleReport::ColdStart { cursor }) => CycleOutcome::ColdStart(cursor),
            Ok(CycleReport::Synced(summary)) => {
                info!(
                    completed = summary.completed().len(),
                    skipped = summary.skipped().len(),
                    "completion sync cycle finished"
                );
                CycleOutcome::Synced(summary)
            }
            Err(err) => {
                error!(error = %err, "completion sync cycle aborted");
                CycleOutcome::Aborted(err)
            }
        }
    }

    /// Cancels the timer. A running cycle is not interrupted.
    pub fn stop(&self) {
        if let Some(timer) = self.take_timer() {
            timer.token.cancel();
            debug!("completion sync timer stopped");
        }
    }

    /// Cancels the timer and waits until no cycle is running.
    ///
    /// Call this before the runtime shuts down so an in-flight cycle can
    /// finish and write its cursor.
    pub async fn shutdown(&self) {
        if let Some(timer) = self.take_timer() {
            timer.token.cancel();
            if let Err(err) = timer.task.await {
                error!(error = %err, "completion sync timer task failed");
            }
        }
        self.wait_idle().await;
        debug!("completion sync shut down");
    }

    /// Waits until no cycle is running.
    pub async fn wait_idle(&self) {
        let flag = &self.inner.cycle;
        loop {
            // Registered before the check, so a release in between still wakes it.
            let idle = flag.idle.notified();
            if !flag.polling.load(Ordering::Acquire) {
                return;
            }
            idle.await;
        }
    }

    fn take_timer(&self) -> Option<Timer> {
        self.inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<E, T, S, C> SyncPoller<E, T, S, C>
where
    E: EditorHost + 'static,
    T: TaskService + 'static,
    S: SettingsStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Starts polling every `period`, replacing any previous timer.
    ///
    /// The first cycle runs immediately. Each tick claims the cycle guard and
    /// runs the cycle as a separate task, so a slow cycle never delays the
    /// timer and a tick during a running cycle does nothing. Must be called
    /// within a Tokio runtime. Periods shorter than a millisecond are
    /// raised to one millisecond.
    pub fn start(&self, period: Duration) {
        self.stop();

        let token = CancellationToken::new();
        let poller = self.clone();
        let period = period.max(MIN_PERIOD);
        let task = tokio::spawn({
            let token = token.clone();
            async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        () = token.cancelled() => break,
                        _ = ticker.tick() => poller.spawn_cycle(),
                    }
                }
            }
        });
        *self
            .inner
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Timer { token, task });
        info!(period_secs = period.as_secs(), "completion sync timer started");
    }

    /// Restarts the timer with a new period.
    pub fn restart(&self, period: Duration) {
        self.start(period);
    }

    fn spawn_cycle(&self) {
        let Some(guard) = CycleGuard::try_acquire(&self.inner.cycle) else {
            debug!("completion sync already running, skipping tick");
            return;
        };
        let poller = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            let _outcome = poller.run_guarded().await;
        });
    }
}

/// Holds the polling flag for the duration of one cycle.
///
/// The flag is released on drop, which also covers early returns and
/// panics inside the cycle. Waiters in [`SyncPoller::wait_idle`] are woken.
struct CycleGuard {
    flag: Arc<CycleFlag>,
}

impl CycleGuard {
    fn try_acquire(flag: &Arc<CycleFlag>) -> Option<Self> {
        flag.polling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.flag.polling.store(false, Ordering::Release);
        self.flag.idle.notify_waiters();
    }
}
