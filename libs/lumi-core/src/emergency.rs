//! Emergency mode: work through incomplete tasks one at a time.

use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Cursor over the incomplete task list.
///
/// The list it indexes is recomputed by the caller on every render, so the
/// cursor only stores a position and clamps it against the current length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyCursor {
    index: usize,
}

impl EmergencyCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Task under the cursor, or `None` when everything is done.
    pub fn current<'a>(&self, incomplete: &[&'a Task]) -> Option<&'a Task> {
        if incomplete.is_empty() {
            return None;
        }
        incomplete.get(self.index.min(incomplete.len() - 1)).copied()
    }

    /// Move past the current task, wrapping to the first one.
    pub fn skip(&mut self, len: usize) {
        self.index = if self.index + 1 < len { self.index + 1 } else { 0 };
    }

    /// Same movement as `skip`; `len` is the list length before completion.
    pub fn complete(&mut self, len: usize) {
        self.skip(len);
    }

    /// One-based position label, e.g. `"Task 2 of 5"`.
    pub fn position(&self, len: usize) -> Option<String> {
        if len == 0 {
            return None;
        }
        Some(format!("Task {} of {}", self.index.min(len - 1) + 1, len))
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
