//! Reels engine: browser automation, collection passes and effect execution.
mod automation;
mod collect;
mod collector;
mod controller;
mod events;
mod navigator;
mod settings;
mod types;
mod webdriver;

pub use automation::{AutomationDriver, AutomationSession};
pub use collect::run_collection;
pub use collector::BackgroundCollector;
pub use controller::Controller;
pub use events::{ChannelEventSink, EventHub, EventSink};
pub use navigator::ForegroundNavigator;
pub use settings::{PassSettings, PipelineSettings, WebDriverSettings};
pub use types::{AutomationError, FailureKind, PipelineError, SharedQueue};
pub use webdriver::{WebDriverDriver, WebDriverSession};
