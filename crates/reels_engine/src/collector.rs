use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reels_core::{CollectionReport, ReelEvent};
use reels_logging::{reels_debug, reels_error, reels_info, Lane};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::collect::run_collection;
use crate::types::lock_queue;
use crate::{AutomationDriver, AutomationError, AutomationSession, EventHub, PipelineSettings, SharedQueue};

/// Keeps the buffer topped up from a secondary session.
///
/// At most one run is in flight. A request made while a run is active, or
/// while the collector is disabled, is dropped rather than queued. Each run
/// opens its own session and closes it before the guard is released, whether
/// the run succeeded or not.
#[derive(Clone)]
pub struct BackgroundCollector {
    inner: Arc<Inner>,
}

struct Inner {
    driver: Arc<dyn AutomationDriver>,
    queue: SharedQueue,
    events: EventHub,
    settings: Arc<PipelineSettings>,
    collecting: AtomicBool,
    enabled: AtomicBool,
    cancel: CancellationToken,
}

/// Holds the single-flight slot; releases it on drop.
struct RunGuard {
    inner: Arc<Inner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.inner.collecting.store(false, Ordering::Release);
    }
}

impl BackgroundCollector {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        queue: SharedQueue,
        events: EventHub,
        settings: Arc<PipelineSettings>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                driver,
                queue,
                events,
                settings,
                collecting: AtomicBool::new(false),
                enabled: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.inner.collecting.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire) && !self.inner.cancel.is_cancelled()
    }

    /// Allows or refuses new runs. Set once the primary session is live.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    /// Fire-and-forget request for a run.
    ///
    /// Returns the spawned task, or `None` when the request coalesced into a
    /// run already in flight or the collector is disabled. Must be called
    /// from within a tokio runtime.
    pub fn request_run(&self) -> Option<JoinHandle<Option<CollectionReport>>> {
        let guard = self.try_begin()?;
        let inner = self.inner.clone();
        Some(tokio::spawn(run(inner, guard)))
    }

    /// Runs in the caller's task. Returns `None` if the request was dropped
    /// or the run was cancelled by [`shutdown`](Self::shutdown).
    pub async fn run_once(&self) -> Option<CollectionReport> {
        let guard = self.try_begin()?;
        run(self.inner.clone(), guard).await
    }

    /// Refuses further runs and cancels the one in flight. The secondary
    /// session of a cancelled run is still closed.
    pub fn shutdown(&self) {
        self.set_enabled(false);
        self.inner.cancel.cancel();
    }

    fn try_begin(&self) -> Option<RunGuard> {
        if !self.is_enabled() {
            reels_debug!(Lane::Background, "collection request ignored: no live primary session");
            return None;
        }
        if self
            .inner
            .collecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            reels_debug!(Lane::Background, "collection request coalesced into running pass");
            return None;
        }
        Some(RunGuard {
            inner: self.inner.clone(),
        })
    }
}

async fn run(inner: Arc<Inner>, guard: RunGuard) -> Option<CollectionReport> {
    let remaining = lock_queue(&inner.queue).remaining();
    reels_info!(
        Lane::Background,
        "starting background collection ({} remaining)",
        remaining
    );

    let session = match inner.driver.open_session().await {
        Ok(session) => Some(session),
        Err(err) => {
            reels_error!(Lane::Background, "failed to open collection session: {}", err);
            None
        }
    };

    let mut discovered = 0;
    let mut cancelled = false;
    if let Some(session) = session.as_deref() {
        tokio::select! {
            result = collect_on(&inner, session) => match result {
                Ok(report) => discovered = report.discovered_count,
                Err(err) => {
                    reels_error!(Lane::Background, "background collection failed: {}", err);
                }
            },
            _ = inner.cancel.cancelled() => {
                reels_info!(Lane::Background, "background collection cancelled");
                cancelled = true;
            }
        }
    }

    if let Some(session) = session {
        if let Err(err) = session.close().await {
            reels_error!(Lane::Background, "error closing collection session: {}", err);
        }
    }
    drop(guard);

    if cancelled {
        return None;
    }

    let report = CollectionReport {
        discovered_count: discovered,
        total_queue_length: lock_queue(&inner.queue).len(),
    };
    reels_info!(
        Lane::Background,
        "background collection completed: {} new, queue length {}",
        report.discovered_count,
        report.total_queue_length
    );
    inner.events.emit(ReelEvent::ReelsCollected(report));
    Some(report)
}

async fn collect_on(
    inner: &Inner,
    session: &dyn AutomationSession,
) -> Result<CollectionReport, AutomationError> {
    let settings = &inner.settings;
    session
        .navigate(&settings.entry_url, settings.navigation_timeout())
        .await?;
    tokio::time::sleep(settings.initial_settle()).await;
    if !session.is_open() {
        return Err(AutomationError::new(
            crate::FailureKind::SessionClosed,
            "collection session closed during setup",
        ));
    }
    session
        .wait_for_element(&settings.item_selector, settings.first_item_timeout())
        .await?;

    Ok(run_collection(
        session,
        &inner.queue,
        &settings.sentinel,
        settings.background.plan(),
        Lane::Background,
    )
    .await)
}
