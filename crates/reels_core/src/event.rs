use serde::Serialize;

/// Summary of a finished collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub discovered_count: usize,
    pub total_queue_length: usize,
}

/// Notifications delivered to listeners, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReelEvent {
    /// Primary session initialized and the queue bootstrapped.
    Ready,
    /// First item became visible on the primary session.
    ReelsLoaded,
    /// Cursor moved forward or back.
    ReelChanged { index: usize },
    /// A collection pass finished.
    ReelsCollected(CollectionReport),
    ReelLiked,
    ReelSaved,
    /// Unrecoverable failure in initialize, recovery or an interaction.
    Error { detail: String },
}
