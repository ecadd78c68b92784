use std::sync::{Arc, Mutex};

use reels_core::{BufferStatus, ContentId, Interaction, Phase, QueueSnapshot, ReelQueue};
use reels_logging::{reels_info, Lane};

use crate::types::lock_queue;
use crate::{
    AutomationDriver, BackgroundCollector, EventHub, EventSink, ForegroundNavigator,
    PipelineError, PipelineSettings, SharedQueue,
};

/// Composition root: owns the queue, the event hub, the background collector
/// and the foreground navigator for the lifetime of one viewing session.
pub struct Controller {
    settings: Arc<PipelineSettings>,
    queue: SharedQueue,
    events: EventHub,
    collector: BackgroundCollector,
    navigator: ForegroundNavigator,
}

impl Controller {
    pub fn new(settings: PipelineSettings, driver: Arc<dyn AutomationDriver>) -> Self {
        let settings = Arc::new(settings);
        let queue: SharedQueue = Arc::new(Mutex::new(ReelQueue::new()));
        let events = EventHub::new();
        let collector = BackgroundCollector::new(
            driver.clone(),
            queue.clone(),
            events.clone(),
            settings.clone(),
        );
        let navigator = ForegroundNavigator::new(
            driver,
            queue.clone(),
            collector.clone(),
            events.clone(),
            settings.clone(),
        );
        Self {
            settings,
            queue,
            events,
            collector,
            navigator,
        }
    }

    /// Registers a listener. Listeners see events in registration order.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.events.subscribe(sink);
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn initialize(&self) -> Result<(), PipelineError> {
        self.navigator.initialize().await
    }

    pub fn phase(&self) -> Phase {
        self.navigator.phase()
    }

    pub fn is_initialized(&self) -> bool {
        self.phase() == Phase::Ready
    }

    pub async fn go_next(&self) -> Result<usize, PipelineError> {
        self.navigator.go_next().await
    }

    pub async fn go_previous(&self) -> Result<usize, PipelineError> {
        self.navigator.go_previous().await
    }

    pub async fn current_item(&self) -> Option<ContentId> {
        self.navigator.current_item().await
    }

    /// Shareable URL for the current reel, or the live location of the
    /// primary session when nothing is queued at the cursor.
    pub async fn reel_url(&self) -> Option<String> {
        let queued = lock_queue(&self.queue).current().cloned();
        match queued {
            Some(id) => Some(self.settings.reel_url(&id)),
            None => self.navigator.live_location().await,
        }
    }

    pub async fn like_current(&self) -> Result<(), PipelineError> {
        self.navigator.interact(Interaction::Like).await
    }

    pub async fn save_current(&self) -> Result<(), PipelineError> {
        self.navigator.interact(Interaction::Save).await
    }

    pub fn buffer_status(&self) -> BufferStatus {
        lock_queue(&self.queue).status(self.collector.is_collecting())
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        lock_queue(&self.queue).snapshot()
    }

    /// Cancels background work and closes the primary session. Idempotent.
    pub async fn shutdown(&self) {
        reels_info!(Lane::Controller, "shutting down");
        self.collector.shutdown();
        self.navigator.shutdown().await;
    }
}
