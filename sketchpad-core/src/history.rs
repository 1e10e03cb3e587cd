// Undo/redo history of full-surface snapshots.

use tracing::{debug, trace};

use crate::Snapshot;

/// Default number of snapshots kept before the oldest is evicted.
pub const DEFAULT_MAX_STATES: usize = 50;

/// A linear log of snapshots with a cursor at the one currently displayed.
///
/// Recording after an undo drops everything past the cursor, so there is
/// never more than one redo branch.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    states: Vec<Snapshot>,
    current_index: Option<usize>,
    max_states: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STATES)
    }
}

impl History {
    /// An empty history holding at most `max_states` snapshots (at least one).
    pub fn new(max_states: usize) -> Self {
        debug!("Creating history with capacity {}", max_states);
        Self {
            states: Vec::with_capacity(max_states.min(DEFAULT_MAX_STATES)),
            current_index: None,
            max_states: max_states.max(1),
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        let keep = self.current_index.map_or(0, |index| index + 1);
        if keep < self.states.len() {
            debug!(
                "Discarding {} redo state(s) past index {}",
                self.states.len() - keep,
                keep
            );
            self.states.truncate(keep);
        }

        self.states.push(snapshot);
        let mut index = self.states.len() - 1;

        if self.states.len() > self.max_states {
            trace!("History over capacity, evicting oldest state");
            self.states.remove(0);
            index -= 1;
        }

        self.current_index = Some(index);
        debug!("Recorded state {} of {}", index + 1, self.states.len());
    }

    /// Step back one snapshot. Returns the snapshot to display, or `None` at the oldest.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let Some(index) = self.current_index.filter(|index| *index > 0) else {
            trace!("Nothing to undo");
            return None;
        };
        self.current_index = Some(index - 1);
        debug!("Undo to state {}", index - 1);
        self.states.get(index - 1)
    }

    /// Step forward one snapshot. Returns the snapshot to display, or `None` at the newest.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            trace!("Nothing to redo");
            return None;
        }

        let index = self.current_index.map_or(0, |index| index + 1);
        self.current_index = Some(index);
        debug!("Redo to state {}", index);
        self.states.get(index)
    }

    /// The snapshot `undo` would move to, without moving the cursor.
    pub fn peek_undo(&self) -> Option<&Snapshot> {
        self.current_index
            .filter(|index| *index > 0)
            .and_then(|index| self.states.get(index - 1))
    }

    /// The snapshot `redo` would move to, without moving the cursor.
    pub fn peek_redo(&self) -> Option<&Snapshot> {
        let next = self.current_index.map_or(0, |index| index + 1);
        self.states.get(next)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.current_index, Some(index) if index > 0)
    }

    pub fn can_redo(&self) -> bool {
        let next = self.current_index.map_or(0, |index| index + 1);
        next < self.states.len()
    }

    /// Index of the displayed snapshot; `None` before the first record.
    pub fn cursor(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current_index.and_then(|index| self.states.get(index))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_states
    }

    pub fn states(&self) -> &[Snapshot] {
        &self.states
    }
}
