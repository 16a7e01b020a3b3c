use serde::{Deserialize, Serialize};

/// Monotonic id allocator. Ids observed through explicit creation push the
/// counter forward so allocated ids never collide with or reuse earlier ones.
/// Once `u64::MAX` has been handed out the sequence is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct IdSequence {
    next: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    exhausted: bool,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self {
            next: 1,
            exhausted: false,
        }
    }
}

impl IdSequence {
    /// The id the next call to [`IdSequence::allocate`] will return.
    pub(crate) fn peek(&self) -> Option<u64> {
        (!self.exhausted).then(|| self.next.max(1))
    }

    pub(crate) fn allocate(&mut self) -> Option<u64> {
        let id = self.peek()?;
        self.observe(id);
        Some(id)
    }

    pub(crate) fn observe(&mut self, id: u64) {
        if self.exhausted || id < self.next {
            return;
        }
        match id.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
    }
}
