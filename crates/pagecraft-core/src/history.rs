//! Undo/redo history with an explicit begin/commit protocol.
//!
//! The top of the undo stack is always the last committed state. Live edits
//! happen on the editor's working document; only `commit` records a step.

use crate::config::DEFAULT_HISTORY_DEPTH;
use crate::document::Document;
use crate::selection::Selection;
use std::collections::VecDeque;

/// A recorded document state plus the selection that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub document: Document,
    pub selection: Selection,
}

impl HistoryEntry {
    pub fn new(document: Document, selection: Selection) -> Self {
        Self { document, selection }
    }
}

/// Result of an undo or redo request.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    /// The caller should restore this state.
    Restored(HistoryEntry),
    /// Nothing to undo/redo.
    Nothing,
}

impl HistoryOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, HistoryOutcome::Restored(_))
    }
}

/// Two-stack history with a pending edit base.
#[derive(Debug, Clone)]
pub struct History {
    /// Committed states, oldest first. Never empty; back is current.
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    /// State captured by `begin` for the edit in progress.
    pending: Option<HistoryEntry>,
    /// Maximum number of undoable steps.
    max_depth: usize,
}

impl History {
    /// Start a history whose baseline is `initial`.
    pub fn new(initial: HistoryEntry, max_depth: usize) -> Self {
        let mut undo_stack = VecDeque::with_capacity(max_depth.saturating_add(1).min(64));
        undo_stack.push_back(initial);
        Self {
            undo_stack,
            redo_stack: Vec::new(),
            pending: None,
            max_depth: max_depth.max(1),
        }
    }

    /// History with the default depth.
    pub fn with_default_depth(initial: HistoryEntry) -> Self {
        Self::new(initial, DEFAULT_HISTORY_DEPTH)
    }

    /// Drop all steps and make `entry` the new baseline.
    pub fn reset(&mut self, entry: HistoryEntry) {
        self.undo_stack.clear();
        self.undo_stack.push_back(entry);
        self.redo_stack.clear();
        self.pending = None;
    }

    /// The last committed state.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The base captured for the edit in progress.
    pub fn pending_base(&self) -> Option<&HistoryEntry> {
        self.pending.as_ref()
    }

    /// Capture the base for an edit. A nested call keeps the first base and
    /// returns false.
    pub fn begin(&mut self, document: &Document, selection: &Selection) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(HistoryEntry::new(document.clone(), selection.clone()));
        true
    }

    /// Finish the edit in progress (or an implicit one) with the given state.
    ///
    /// Always clears redo. Records a step only if the document differs from
    /// the last committed one; otherwise the stored selection is refreshed.
    /// Returns true if a step was recorded.
    pub fn commit(&mut self, document: &Document, selection: &Selection) -> bool {
        let base = self.pending.take();
        self.redo_stack.clear();

        let Some(top) = self.undo_stack.back_mut() else {
            self.undo_stack
                .push_back(HistoryEntry::new(document.clone(), selection.clone()));
            return true;
        };
        if top.document == *document {
            top.selection = selection.clone();
            return false;
        }
        if let Some(base) = base {
            top.selection = base.selection;
        }
        self.undo_stack
            .push_back(HistoryEntry::new(document.clone(), selection.clone()));
        while self.undo_stack.len() > self.max_depth + 1 {
            self.undo_stack.pop_front();
        }
        log::debug!("Committed history step ({} undoable)", self.undo_depth());
        true
    }

    /// Abandon the edit in progress. Returns the base to restore.
    pub fn cancel(&mut self) -> Option<HistoryEntry> {
        self.pending.take()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undoable steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len().saturating_sub(1)
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Step back one commit. Any pending edit is discarded.
    pub fn undo(&mut self) -> HistoryOutcome {
        if !self.can_undo() {
            return HistoryOutcome::Nothing;
        }
        self.pending = None;
        let Some(popped) = self.undo_stack.pop_back() else {
            return HistoryOutcome::Nothing;
        };
        self.redo_stack.push(popped);
        match self.undo_stack.back() {
            Some(entry) => HistoryOutcome::Restored(entry.clone()),
            None => HistoryOutcome::Nothing,
        }
    }

    /// Reapply the last undone commit. Any pending edit is discarded.
    pub fn redo(&mut self) -> HistoryOutcome {
        let Some(entry) = self.redo_stack.pop() else {
            return HistoryOutcome::Nothing;
        };
        self.pending = None;
        self.undo_stack.push_back(entry.clone());
        HistoryOutcome::Restored(entry)
    }
}
