//! Sequential cursor over the current unfilled entries.
//!
//! The list shrinks as fields get filled and grows when they are cleared.
//! [`FieldNavigator::refresh`] keeps the cursor on the same named entry when
//! it survives, clamps when it vanished, and drops to inactive when the list
//! empties. Callers never drive the state transitions themselves.

use tracing::trace;

use crate::unfilled::UnfilledEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    /// Nothing left to visit.
    Inactive,
    Active { index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct FieldNavigator {
    entries: Vec<UnfilledEntry>,
    current_index: usize,
}

impl FieldNavigator {
    #[must_use]
    pub fn new(entries: Vec<UnfilledEntry>) -> Self {
        Self {
            entries,
            current_index: 0,
        }
    }

    /// Swap in a recomputed list.
    pub fn refresh(&mut self, entries: Vec<UnfilledEntry>) -> NavigatorState {
        let before = self.state();
        let anchor = self.current().map(|e| e.name.clone());
        self.entries = entries;

        if self.entries.is_empty() {
            self.current_index = 0;
        } else if let Some(pos) = anchor.and_then(|name| self.index_of(&name)) {
            self.current_index = pos;
        } else {
            self.current_index = self.current_index.min(self.entries.len() - 1);
        }

        let after = self.state();
        if matches!(before, NavigatorState::Inactive) != matches!(after, NavigatorState::Inactive) {
            trace!(?before, ?after, entries = self.entries.len(), "navigator state changed");
        }
        after
    }

    #[must_use]
    pub fn state(&self) -> NavigatorState {
        if self.entries.is_empty() {
            NavigatorState::Inactive
        } else {
            NavigatorState::Active {
                index: self.current_index,
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    #[must_use]
    pub fn current(&self) -> Option<&UnfilledEntry> {
        self.entries.get(self.current_index)
    }

    /// Advance, wrapping past the end.
    pub fn go_next(&mut self) -> Option<&UnfilledEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.current_index = (self.current_index + 1) % self.entries.len();
        self.current()
    }

    /// Step back, wrapping past the start.
    pub fn go_prev(&mut self) -> Option<&UnfilledEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let len = self.entries.len();
        self.current_index = (self.current_index + len - 1) % len;
        self.current()
    }

    /// Jump to a named entry. Returns `false` and leaves the cursor alone
    /// when the name is not in the list.
    pub fn go_to_field(&mut self, name: &str) -> bool {
        match self.index_of(name) {
            Some(pos) => {
                self.current_index = pos;
                true
            }
            None => false,
        }
    }

    /// 1-based position and list length, for "3 of 7" displays.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current()
            .map(|_| (self.current_index + 1, self.entries.len()))
    }

    #[must_use]
    pub fn entries(&self) -> &[UnfilledEntry] {
        &self.entries
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}
