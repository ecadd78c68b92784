use crate::{CollectionReport, Interaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Owner asked to bring up the primary session.
    InitializeRequested,
    /// The content surface rendered its first item on the primary session.
    SurfaceLoaded,
    /// Navigating or waiting on the primary session failed.
    SurfaceFailed { detail: String },
    /// A foreground collection pass finished.
    ForegroundCollected(CollectionReport),
    /// Viewer asked for the next reel. `collecting` mirrors the background guard.
    NextRequested { collecting: bool },
    /// Viewer asked for the previous reel.
    PreviousRequested,
    /// Viewer asked to act on the current reel.
    InteractionRequested(Interaction),
    InteractionDone(Interaction),
    InteractionFailed { detail: String },
    /// Owner is tearing the navigator down.
    ShutdownRequested,
}
