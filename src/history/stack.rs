use std::collections::VecDeque;

use crate::{
    foundation::error::ReelResult, history::action::HistoryAction, scene::graph::SceneGraph,
};

pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded undo/redo stacks.
///
/// Once the undo stack holds `capacity` actions the oldest one is dropped on every new record.
/// Recording clears the redo stack.
#[derive(Clone, Debug)]
pub struct History {
    undo: VecDeque<HistoryAction>,
    redo: VecDeque<HistoryAction>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    /// A history keeping at most `capacity` undo steps (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: VecDeque::new(),
            capacity,
        }
    }

    /// Push an action whose forward patch has already been applied.
    pub fn record(&mut self, action: HistoryAction) {
        tracing::debug!(kind = ?action.kind, target = %action.target, "history record");
        self.undo.push_back(action);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Revert the most recent action. `Ok(false)` when there is nothing to undo.
    ///
    /// If the inverse patch no longer applies the action stays on the undo stack and the graph
    /// is left untouched.
    pub fn undo(&mut self, graph: &mut SceneGraph) -> ReelResult<bool> {
        let Some(action) = self.undo.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = action.inverse.apply(graph) {
            self.undo.push_back(action);
            return Err(err);
        }
        tracing::debug!(kind = ?action.kind, target = %action.target, "undo");
        self.redo.push_back(action);
        Ok(true)
    }

    /// Reapply the most recently undone action. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, graph: &mut SceneGraph) -> ReelResult<bool> {
        let Some(action) = self.redo.pop_back() else {
            return Ok(false);
        };
        if let Err(err) = action.forward.apply(graph) {
            self.redo.push_back(action);
            return Err(err);
        }
        tracing::debug!(kind = ?action.kind, target = %action.target, "redo");
        self.undo.push_back(action);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Action the next [`History::undo`] would revert.
    pub fn peek_undo(&self) -> Option<&HistoryAction> {
        self.undo.back()
    }

    /// Action the next [`History::redo`] would reapply.
    pub fn peek_redo(&self) -> Option<&HistoryAction> {
        self.redo.back()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
