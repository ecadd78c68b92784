#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use reels_core::{ReelEvent, DEFAULT_MIN_MARGIN};
use reels_engine::{
    AutomationDriver, AutomationError, AutomationSession, EventSink, FailureKind, PassSettings,
    PipelineSettings,
};
use tokio::sync::Semaphore;

pub const LANDING: &str = "https://www.instagram.com/reels/";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(reels_logging::initialize_for_tests);
}

pub fn reel(id: &str) -> String {
    format!("https://www.instagram.com/reels/{id}/")
}

/// Production tuning with every delay removed.
pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        min_margin: DEFAULT_MIN_MARGIN,
        foreground: PassSettings {
            max_steps: 3,
            target_new: 10,
            settle_delay_ms: 0,
        },
        background: PassSettings {
            max_steps: 8,
            target_new: 8,
            settle_delay_ms: 0,
        },
        initial_settle_ms: 0,
        first_item_timeout_ms: 50,
        navigation_timeout_ms: 50,
        interaction_timeout_ms: 50,
        ..PipelineSettings::default()
    }
}

/// Where a session's locations come from.
enum Source {
    /// Fixed list; navigate rewinds, the gesture steps forward and the last
    /// entry repeats.
    Script(Vec<Result<String, FailureKind>>),
    /// Shared endless feed: every navigate or gesture lands on an item no
    /// session has seen yet, then the landing page once the feed runs out.
    Feed(Arc<Feed>),
}

pub struct Feed {
    items: Vec<String>,
    next: AtomicUsize,
}

impl Feed {
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            items: (0..count).map(|i| reel(&format!("feed{i}"))).collect(),
            next: AtomicUsize::new(0),
        })
    }

    fn take(&self) -> usize {
        self.next.fetch_add(1, Ordering::AcqRel)
    }

    pub fn served(&self) -> usize {
        self.next.load(Ordering::Acquire)
    }
}

/// Location reads from `from_read` on (counted per session) fail with `kind`.
#[derive(Debug, Clone, Copy)]
pub struct ReadFault {
    pub from_read: usize,
    pub kind: FailureKind,
}

#[derive(Default)]
pub struct Faults {
    pub fail_open: AtomicBool,
    pub fail_navigation: AtomicBool,
    pub fail_click: AtomicBool,
    /// Every location reads as the landing page.
    pub hide_items: AtomicBool,
    pub read_fault: Mutex<Option<ReadFault>>,
}

#[derive(Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub clicks: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Acquire)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::Acquire)
    }

    pub fn live(&self) -> usize {
        self.opened() - self.closed()
    }
}

pub struct ScriptedSession {
    source: Source,
    position: AtomicUsize,
    open: AtomicBool,
    advances: AtomicUsize,
    reads: AtomicUsize,
    faults: Arc<Faults>,
    counters: Arc<Counters>,
}

impl ScriptedSession {
    pub fn scripted(locations: Vec<Result<String, FailureKind>>) -> Self {
        Self::with_source(
            Source::Script(locations),
            Arc::new(Faults::default()),
            Arc::new(Counters::default()),
        )
    }

    fn with_source(source: Source, faults: Arc<Faults>, counters: Arc<Counters>) -> Self {
        Self {
            source,
            position: AtomicUsize::new(0),
            open: AtomicBool::new(true),
            advances: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            faults,
            counters,
        }
    }

    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::Acquire)
    }

    fn closed_error(&self) -> AutomationError {
        AutomationError::new(FailureKind::SessionClosed, "session is closed")
    }
}

#[async_trait::async_trait]
impl AutomationSession for ScriptedSession {
    async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<(), AutomationError> {
        if !self.is_open() {
            return Err(self.closed_error());
        }
        if self.faults.fail_navigation.load(Ordering::Acquire) {
            return Err(AutomationError::new(FailureKind::Navigation, "net::ERR_FAILED"));
        }
        let position = match &self.source {
            Source::Script(_) => 0,
            Source::Feed(feed) => feed.take(),
        };
        self.position.store(position, Ordering::Release);
        Ok(())
    }

    async fn wait_for_element(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<(), AutomationError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(self.closed_error())
        }
    }

    async fn current_location(&self) -> Result<String, AutomationError> {
        if !self.is_open() {
            return Err(self.closed_error());
        }
        let read = self.reads.fetch_add(1, Ordering::AcqRel);
        let fault = *self.faults.read_fault.lock().unwrap();
        if let Some(fault) = fault {
            if read >= fault.from_read {
                return Err(AutomationError::new(fault.kind, "scripted read failure"));
            }
        }
        if self.faults.hide_items.load(Ordering::Acquire) {
            return Ok(LANDING.to_string());
        }
        let position = self.position.load(Ordering::Acquire);
        match &self.source {
            Source::Script(locations) => {
                let last = locations.len().saturating_sub(1);
                match locations.get(position.min(last)) {
                    Some(Ok(location)) => Ok(location.clone()),
                    Some(Err(kind)) => Err(AutomationError::new(*kind, "scripted failure")),
                    None => Ok(LANDING.to_string()),
                }
            }
            Source::Feed(feed) => Ok(feed
                .items
                .get(position)
                .cloned()
                .unwrap_or_else(|| LANDING.to_string())),
        }
    }

    async fn advance_gesture(&self) -> Result<(), AutomationError> {
        if !self.is_open() {
            return Err(self.closed_error());
        }
        self.advances.fetch_add(1, Ordering::AcqRel);
        match &self.source {
            Source::Script(_) => {
                self.position.fetch_add(1, Ordering::AcqRel);
            }
            Source::Feed(feed) => self.position.store(feed.take(), Ordering::Release),
        }
        Ok(())
    }

    async fn click(&self, _selector: &str, _timeout: Duration) -> Result<(), AutomationError> {
        if !self.is_open() {
            return Err(self.closed_error());
        }
        if self.faults.fail_click.load(Ordering::Acquire) {
            return Err(AutomationError::new(FailureKind::Timeout, "button never appeared"));
        }
        self.counters.clicks.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn close(&self) -> Result<(), AutomationError> {
        if self.open.swap(false, Ordering::AcqRel) {
            self.counters.closed.fetch_add(1, Ordering::AcqRel);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Opens feed-backed sessions and counts them.
pub struct ScriptedDriver {
    pub feed: Arc<Feed>,
    pub faults: Arc<Faults>,
    pub counters: Arc<Counters>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedDriver {
    pub fn new(feed_len: usize) -> Self {
        Self {
            feed: Feed::new(feed_len),
            faults: Arc::new(Faults::default()),
            counters: Arc::new(Counters::default()),
            gate: None,
        }
    }

    /// Every `open_session` waits for a permit on `gate`.
    pub fn gated(feed_len: usize, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(feed_len)
        }
    }
}

#[async_trait::async_trait]
impl AutomationDriver for ScriptedDriver {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, AutomationError> {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if self.faults.fail_open.load(Ordering::Acquire) {
            return Err(AutomationError::new(
                FailureKind::Unavailable,
                "connection refused",
            ));
        }
        self.counters.opened.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(ScriptedSession::with_source(
            Source::Feed(self.feed.clone()),
            self.faults.clone(),
            self.counters.clone(),
        )))
    }
}

/// Records every event it sees.
#[derive(Default, Clone)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ReelEvent>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ReelEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&ReelEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| matches(e)).count()
    }
}

impl EventSink for Recorder {
    fn emit(&self, event: &ReelEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
