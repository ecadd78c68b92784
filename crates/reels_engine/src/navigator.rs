use std::sync::{Arc, Mutex, PoisonError};

use reels_core::{
    extract_content_id, update, ContentId, Effect, Interaction, Msg, NavigatorState, Phase,
};
use reels_logging::{reels_debug, reels_error, reels_info, reels_warn, Lane};
use tokio::sync::Mutex as AsyncMutex;

use crate::collect::run_collection;
use crate::types::lock_queue;
use crate::{
    AutomationDriver, AutomationError, AutomationSession, BackgroundCollector, EventHub,
    FailureKind, PipelineError, PipelineSettings, SharedQueue,
};

type SessionSlot = Option<Box<dyn AutomationSession>>;

/// Owns the primary session the viewer watches and executes the effects the
/// navigator state machine asks for.
///
/// Operations are serialized on the session slot, so one request runs to
/// completion (including any recovery) before the next starts.
pub struct ForegroundNavigator {
    state: Mutex<NavigatorState>,
    session: AsyncMutex<SessionSlot>,
    driver: Arc<dyn AutomationDriver>,
    queue: SharedQueue,
    collector: BackgroundCollector,
    events: EventHub,
    settings: Arc<PipelineSettings>,
}

impl ForegroundNavigator {
    pub fn new(
        driver: Arc<dyn AutomationDriver>,
        queue: SharedQueue,
        collector: BackgroundCollector,
        events: EventHub,
        settings: Arc<PipelineSettings>,
    ) -> Self {
        Self {
            state: Mutex::new(NavigatorState::new(settings.policy())),
            session: AsyncMutex::new(None),
            driver,
            queue,
            collector,
            events,
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase()
    }

    pub async fn initialize(&self) -> Result<(), PipelineError> {
        let mut slot = self.session.lock().await;
        match self.phase() {
            Phase::Uninitialized => {}
            Phase::Initializing | Phase::Ready => return Ok(()),
            Phase::Failed => return Err(PipelineError::Failed),
            Phase::Closed => return Err(PipelineError::Closed),
        }

        reels_info!(Lane::Foreground, "initializing primary session");
        let failure = self.drive(&mut slot, Msg::InitializeRequested).await;
        match (self.phase(), failure) {
            (Phase::Ready, _) => Ok(()),
            (_, Some(err)) => Err(PipelineError::Setup(err)),
            (Phase::Closed, None) => Err(PipelineError::Closed),
            (_, None) => Err(PipelineError::Failed),
        }
    }

    /// Moves to the next reel, recovering by reload if the queue ran dry.
    pub async fn go_next(&self) -> Result<usize, PipelineError> {
        let mut slot = self.session.lock().await;
        self.ensure_ready()?;
        let msg = Msg::NextRequested {
            collecting: self.collector.is_collecting(),
        };
        let failure = self.drive(&mut slot, msg).await;
        let cursor = lock_queue(&self.queue).cursor();
        match failure {
            Some(err) => Err(PipelineError::Recovery(err)),
            None => Ok(cursor),
        }
    }

    pub async fn go_previous(&self) -> Result<usize, PipelineError> {
        let mut slot = self.session.lock().await;
        self.ensure_ready()?;
        self.drive(&mut slot, Msg::PreviousRequested).await;
        Ok(lock_queue(&self.queue).cursor())
    }

    /// Identifier at the cursor, falling back to whatever the primary session
    /// shows when the queue has no current item.
    pub async fn current_item(&self) -> Option<ContentId> {
        let queued = lock_queue(&self.queue).current().cloned();
        if queued.is_some() {
            return queued;
        }

        let slot = self.session.lock().await;
        let session = slot.as_deref()?;
        let location = match session.current_location().await {
            Ok(location) => location,
            Err(err) => {
                reels_warn!(Lane::Foreground, "could not read primary location: {}", err);
                return None;
            }
        };
        match extract_content_id(&location, &self.settings.sentinel) {
            Ok(id) => {
                if lock_queue(&self.queue).append(id.clone()) {
                    reels_debug!(Lane::Foreground, "queued {} from live location", id);
                }
                Some(id)
            }
            Err(err) => {
                reels_debug!(Lane::Foreground, "no item at live location: {}", err);
                None
            }
        }
    }

    /// Location of the primary session, if it is open.
    pub async fn live_location(&self) -> Option<String> {
        let slot = self.session.lock().await;
        match slot.as_deref() {
            Some(session) => session.current_location().await.ok(),
            None => None,
        }
    }

    pub async fn interact(&self, interaction: Interaction) -> Result<(), PipelineError> {
        let mut slot = self.session.lock().await;
        self.ensure_ready()?;
        match self
            .drive(&mut slot, Msg::InteractionRequested(interaction))
            .await
        {
            Some(err) => Err(PipelineError::Interaction(err)),
            None => Ok(()),
        }
    }

    pub async fn shutdown(&self) {
        let mut slot = self.session.lock().await;
        self.drive(&mut slot, Msg::ShutdownRequested).await;
    }

    fn ensure_ready(&self) -> Result<(), PipelineError> {
        match self.phase() {
            Phase::Ready => Ok(()),
            Phase::Failed => Err(PipelineError::Failed),
            Phase::Closed => Err(PipelineError::Closed),
            Phase::Uninitialized | Phase::Initializing => Err(PipelineError::NotReady),
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `msg` and runs the resulting effects depth-first: effects fed
    /// back by an effect run before the remaining ones. Returns the last
    /// automation failure seen, if any.
    async fn drive(&self, slot: &mut SessionSlot, msg: Msg) -> Option<AutomationError> {
        let mut pending = Vec::new();
        let mut failure = None;
        self.apply(msg, &mut pending);
        while let Some(effect) = pending.pop() {
            if let Some(next) = self.execute(effect, slot, &mut failure).await {
                self.apply(next, &mut pending);
            }
        }
        failure
    }

    fn apply(&self, msg: Msg, pending: &mut Vec<Effect>) {
        let effects = {
            let mut state = self.lock_state();
            let mut queue = lock_queue(&self.queue);
            let (next, effects) = update(state.clone(), &mut queue, msg);
            *state = next;
            effects
        };
        pending.extend(effects.into_iter().rev());
    }

    async fn execute(
        &self,
        effect: Effect,
        slot: &mut SessionSlot,
        failure: &mut Option<AutomationError>,
    ) -> Option<Msg> {
        match effect {
            Effect::OpenPrimarySession => {
                let session = match self.driver.open_session().await {
                    Ok(session) => session,
                    Err(err) => return Some(surface_failed(err, failure)),
                };
                if let Err(err) = self.load_surface(session.as_ref()).await {
                    if let Err(close_err) = session.close().await {
                        reels_warn!(Lane::Foreground, "closing failed primary session: {}", close_err);
                    }
                    return Some(surface_failed(err, failure));
                }
                *slot = Some(session);
                self.collector.set_enabled(true);
                Some(Msg::SurfaceLoaded)
            }
            Effect::ReloadPrimarySession => {
                reels_info!(Lane::Foreground, "queue exhausted; reloading content surface");
                let result = match slot.as_deref() {
                    Some(session) => self.load_surface(session).await,
                    None => Err(AutomationError::new(
                        FailureKind::SessionClosed,
                        "primary session is not open",
                    )),
                };
                match result {
                    Ok(()) => Some(Msg::SurfaceLoaded),
                    Err(err) => Some(surface_failed(err, failure)),
                }
            }
            Effect::CollectForeground => {
                let session = slot.as_deref()?;
                let report = run_collection(
                    session,
                    &self.queue,
                    &self.settings.sentinel,
                    self.settings.foreground.plan(),
                    Lane::Foreground,
                )
                .await;
                Some(Msg::ForegroundCollected(report))
            }
            Effect::RequestBackgroundRun => {
                let _ = self.collector.request_run();
                None
            }
            Effect::Interact(interaction) => {
                let selector = match interaction {
                    Interaction::Like => &self.settings.like_selector,
                    Interaction::Save => &self.settings.save_selector,
                };
                let result = match slot.as_deref() {
                    Some(session) => {
                        session
                            .click(selector, self.settings.interaction_timeout())
                            .await
                    }
                    None => Err(AutomationError::new(
                        FailureKind::SessionClosed,
                        "primary session is not open",
                    )),
                };
                match result {
                    Ok(()) => Some(Msg::InteractionDone(interaction)),
                    Err(err) => {
                        reels_error!(Lane::Foreground, "{:?} failed: {}", interaction, err);
                        let detail = err.to_string();
                        *failure = Some(err);
                        Some(Msg::InteractionFailed { detail })
                    }
                }
            }
            Effect::ClosePrimarySession => {
                self.collector.shutdown();
                if let Some(session) = slot.take() {
                    if let Err(err) = session.close().await {
                        reels_warn!(Lane::Foreground, "error closing primary session: {}", err);
                    }
                }
                reels_info!(Lane::Foreground, "primary session closed");
                None
            }
            Effect::Emit(event) => {
                self.events.emit(event);
                None
            }
        }
    }

    async fn load_surface(&self, session: &dyn AutomationSession) -> Result<(), AutomationError> {
        let settings = &self.settings;
        session
            .navigate(&settings.entry_url, settings.navigation_timeout())
            .await?;
        tokio::time::sleep(settings.initial_settle()).await;
        session
            .wait_for_element(&settings.item_selector, settings.first_item_timeout())
            .await
    }
}

fn surface_failed(err: AutomationError, failure: &mut Option<AutomationError>) -> Msg {
    reels_error!(Lane::Foreground, "content surface failed: {}", err);
    let detail = err.to_string();
    *failure = Some(err);
    Msg::SurfaceFailed { detail }
}
