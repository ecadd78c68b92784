#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create the primary session, navigate to the entry point, wait for the first item.
    OpenPrimarySession,
    /// Navigate the primary session to the entry point again and wait for the first item.
    ReloadPrimarySession,
    /// Run one foreground collection pass on the primary session.
    CollectForeground,
    /// Ask the background collector for a run; never awaited.
    RequestBackgroundRun,
    Interact(Interaction),
    ClosePrimarySession,
    Emit(crate::ReelEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Like,
    Save,
}
