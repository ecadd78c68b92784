use std::time::Duration;

use crate::AutomationError;

/// A live browsing context that can be navigated and poked.
///
/// Sessions are used through `&self` so a run can hand out a reference while
/// still owning the handle. `close` must be idempotent.
#[async_trait::async_trait]
pub trait AutomationSession: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), AutomationError>;

    async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), AutomationError>;

    /// Current location of the session (URL).
    async fn current_location(&self) -> Result<String, AutomationError>;

    /// Move the surface on by one item (a directional key press).
    async fn advance_gesture(&self) -> Result<(), AutomationError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), AutomationError>;

    async fn close(&self) -> Result<(), AutomationError>;

    fn is_open(&self) -> bool;
}

/// Factory for independent sessions.
#[async_trait::async_trait]
pub trait AutomationDriver: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, AutomationError>;
}
