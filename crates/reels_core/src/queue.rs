use std::collections::HashSet;

use serde::Serialize;

use crate::{BufferStatus, ContentId};

/// Result of moving the cursor forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor points at a queued item.
    Ready { cursor: usize },
    /// The cursor ran past the last queued item; more must be collected.
    Exhausted { cursor: usize },
}

impl Advance {
    pub fn cursor(self) -> usize {
        match self {
            Advance::Ready { cursor } | Advance::Exhausted { cursor } => cursor,
        }
    }
}

/// Copy of the queue for debugging and observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    pub items: Vec<ContentId>,
    pub cursor: usize,
}

/// Append-only, deduplicated sequence of identifiers with a viewing cursor.
///
/// Items are kept in discovery order and never removed. The cursor may sit at
/// `len()` while the queue is exhausted, but never beyond it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReelQueue {
    items: Vec<ContentId>,
    seen: HashSet<ContentId>,
    cursor: usize,
}

impl ReelQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless already present. Returns whether it was added.
    pub fn append(&mut self, id: ContentId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.items.push(id);
        true
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.seen.contains(id)
    }

    pub fn current(&self) -> Option<&ContentId> {
        self.items.get(self.cursor)
    }

    /// Moves the cursor forward by one.
    ///
    /// An already exhausted queue keeps its cursor at `len()` so the margin
    /// never goes negative while a recovery is pending.
    pub fn advance(&mut self) -> Advance {
        if self.cursor < self.items.len() {
            self.cursor += 1;
        }
        if self.is_exhausted() {
            Advance::Exhausted {
                cursor: self.cursor,
            }
        } else {
            Advance::Ready {
                cursor: self.cursor,
            }
        }
    }

    /// Moves the cursor back by one, stopping at zero.
    pub fn retreat(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        self.cursor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    pub fn remaining(&self) -> i64 {
        self.items.len() as i64 - self.cursor as i64
    }

    pub fn status(&self, is_collecting: bool) -> BufferStatus {
        BufferStatus {
            remaining: self.remaining(),
            total: self.items.len(),
            is_collecting,
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            items: self.items.clone(),
            cursor: self.cursor,
        }
    }
}
