//! Round-robin rotation cursor.

/// Rotation cursor over an ordered, resizable list.
/// Always satisfies `index < len` whenever the list is non-empty.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Return the current index and advance, wrapping at `len`.
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            self.cursor = 0;
            return None;
        }
        let index = self.cursor % len;
        self.cursor = (index + 1) % len;
        Some(index)
    }

    /// Keep pointing at the same next element after `removed` was taken out
    /// of a list that now has `new_len` elements.
    pub fn on_removed(&mut self, removed: usize, new_len: usize) {
        if removed < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= new_len {
            self.cursor = 0;
        }
    }

    /// Keep pointing at the same next element after an insertion at `inserted`.
    pub fn on_inserted(&mut self, inserted: usize, new_len: usize) {
        if inserted < self.cursor {
            self.cursor += 1;
        }
        if self.cursor >= new_len {
            self.cursor = 0;
        }
    }
}
