//! Undo/redo as a bounded ring of prior roots (spec.md §4.3, §9 design
//! note). Snapshots are `Rc`-shared leaf lists, so pushing one onto the
//! history ring is O(1) — no leaf data is copied.

use std::rc::Rc;

use super::leaf::Leaf;

/// Soft cap on retained snapshots; oldest entries are dropped once exceeded,
/// mirroring the teacher's bounded `MAX_UNDO_REDO_SIZE` ring
/// (`tui/editor/editor_buffer/history.rs`).
pub const MAX_HISTORY: usize = 512;

struct Snapshot {
    root: Rc<Vec<Leaf>>,
    label: &'static str,
}

/// A ring of prior rope roots. `current_index` points at the entry matching
/// the rope's live content; pushing a new state past `current_index`
/// discards any redo-able future (standard linear undo history).
pub struct UndoHistory {
    versions: Vec<Snapshot>,
    current_index: Option<usize>,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self { versions: Vec::new(), current_index: None }
    }

    /// Record `root` as the new current state, labeled `label`. Any
    /// previously-redoable states are discarded.
    pub fn store_undo(&mut self, root: Rc<Vec<Leaf>>, label: &'static str) {
        let insert_at = self.current_index.map_or(0, |i| i + 1);
        self.versions.truncate(insert_at);
        self.versions.push(Snapshot { root, label });
        self.current_index = Some(self.versions.len() - 1);

        if self.versions.len() > MAX_HISTORY {
            let drop_count = self.versions.len() - MAX_HISTORY;
            self.versions.drain(0..drop_count);
            self.current_index = self.current_index.map(|i| i.saturating_sub(drop_count));
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|i| i > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        match self.current_index {
            Some(i) => i + 1 < self.versions.len(),
            None => false,
        }
    }

    /// Step back one state, returning its root.
    pub fn undo(&mut self) -> Option<Rc<Vec<Leaf>>> {
        let i = self.current_index?;
        if i == 0 {
            return None;
        }
        self.current_index = Some(i - 1);
        Some(Rc::clone(&self.versions[i - 1].root))
    }

    /// Step forward one state, returning its root.
    pub fn redo(&mut self) -> Option<Rc<Vec<Leaf>>> {
        let i = self.current_index?;
        if i + 1 >= self.versions.len() {
            return None;
        }
        self.current_index = Some(i + 1);
        Some(Rc::clone(&self.versions[i + 1].root))
    }

    #[must_use]
    pub fn current_label(&self) -> Option<&'static str> {
        self.current_index.map(|i| self.versions[i].label)
    }

    pub fn clear(&mut self) {
        self.versions.clear();
        self.current_index = None;
    }
}
