//! Reels core: pure queue, buffer policy and navigator state machine.
mod content_id;
mod effect;
mod event;
mod msg;
mod policy;
mod queue;
mod run;
mod state;
mod update;

pub use content_id::{extract_content_id, ContentId, ExtractionError};
pub use effect::{Effect, Interaction};
pub use event::{CollectionReport, ReelEvent};
pub use msg::Msg;
pub use policy::{needs_collection, BufferPolicy, BufferStatus, DEFAULT_MIN_MARGIN};
pub use queue::{Advance, QueueSnapshot, ReelQueue};
pub use run::{CollectionPlan, CollectionRun, StepOutcome};
pub use state::{NavigatorState, Phase};
pub use update::update;
