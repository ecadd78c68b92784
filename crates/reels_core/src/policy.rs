use serde::Serialize;

/// Unseen items to keep ahead of the viewer before asking for more.
pub const DEFAULT_MIN_MARGIN: usize = 5;

/// Derived view of the buffer ahead of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferStatus {
    /// `total - cursor`. Negative only if the cursor overran the queue.
    pub remaining: i64,
    pub total: usize,
    pub is_collecting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    pub min_margin: usize,
}

impl BufferPolicy {
    pub fn new(min_margin: usize) -> Self {
        Self { min_margin }
    }

    pub fn needs_collection(&self, status: BufferStatus) -> bool {
        needs_collection(status, self.min_margin)
    }
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MARGIN)
    }
}

/// True when the unseen margin is at or below `min_margin` and no background
/// run is already in flight.
pub fn needs_collection(status: BufferStatus, min_margin: usize) -> bool {
    let margin = i64::try_from(min_margin).unwrap_or(i64::MAX);
    status.remaining <= margin && !status.is_collecting
}
