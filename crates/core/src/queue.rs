use std::collections::VecDeque;

use crate::record::RecordId;

/// FIFO queue of process records. Used for both the dispatch queue and the
/// ready queue; insertion order is the only ordering.
#[derive(Debug, Default, Clone)]
pub struct RecordQueue {
    ids: VecDeque<RecordId>,
}

impl RecordQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail.
    pub fn enqueue(&mut self, id: RecordId) {
        debug_assert!(!self.ids.contains(&id), "record {id:?} queued twice");
        self.ids.push_back(id);
    }

    /// Remove and return the head, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<RecordId> {
        self.ids.pop_front()
    }

    pub fn peek(&self) -> Option<RecordId> {
        self.ids.front().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ids.iter().copied()
    }
}
