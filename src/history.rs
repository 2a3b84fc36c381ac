use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Undo/redo stack machine around a current value.
///
/// `push` follows the standard editor discipline: a new edit discards
/// any forward history. `set` replaces the current value without
/// creating an undo step and is used to reconcile external changes.
/// Serialized field names (`prev`/`next`/`current`) are part of the
/// on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History<T> {
    current: T,
    #[serde(rename = "prev", default = "VecDeque::new")]
    undo: VecDeque<T>,
    #[serde(rename = "next", default = "VecDeque::new")]
    redo: VecDeque<T>,
}

impl<T> History<T> {
    pub fn new(current: T) -> Self {
        History {
            current,
            undo: VecDeque::new(),
            redo: VecDeque::new(),
        }
    }

    pub(crate) fn from_parts(current: T, undo: VecDeque<T>, redo: VecDeque<T>) -> Self {
        History {
            current,
            undo,
            redo,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    /// Replace the current value without touching the stacks.
    pub fn set(&mut self, value: T) {
        self.current = value;
    }

    pub fn push(&mut self, value: T) {
        self.redo.clear();
        let previous = std::mem::replace(&mut self.current, value);
        self.undo.push_front(previous);
    }

    /// Panics if there is nothing to undo; callers gate on [`can_undo`].
    ///
    /// [`can_undo`]: History::can_undo
    pub fn undo(&mut self) {
        assert!(self.can_undo());
        let restored = self.undo.pop_front().unwrap();
        let current = std::mem::replace(&mut self.current, restored);
        self.redo.push_front(current);
    }

    /// Panics if there is nothing to redo; callers gate on [`can_redo`].
    ///
    /// [`can_redo`]: History::can_redo
    pub fn redo(&mut self) {
        assert!(self.can_redo());
        let restored = self.redo.pop_front().unwrap();
        let current = std::mem::replace(&mut self.current, restored);
        self.undo.push_front(current);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// The value `undo` would restore, without moving the cursor.
    pub fn peek_undo(&self) -> Option<&T> {
        self.undo.front()
    }

    /// The value `redo` would restore, without moving the cursor.
    pub fn peek_redo(&self) -> Option<&T> {
        self.redo.front()
    }
}
