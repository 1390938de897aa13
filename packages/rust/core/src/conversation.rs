//! Conversation log and history windowing.

use std::collections::VecDeque;
use std::collections::vec_deque;

use docbrief_shared::Turn;

/// Append-only, ordered log of conversation turns.
///
/// Unbounded unless created with [`ConversationLog::with_max_retained`], in
/// which case the oldest turns are evicted once the cap is reached. Only the
/// window handed to prompts is bounded by `k`.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: VecDeque<Turn>,
    max_retained: Option<usize>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that keeps at most `max` turns. A cap of zero is treated as one.
    pub fn with_max_retained(max: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_retained: Some(max.max(1)),
        }
    }

    /// Append a turn at the end of the log.
    pub fn append(&mut self, turn: Turn) {
        if let Some(max) = self.max_retained {
            while self.turns.len() >= max {
                self.turns.pop_front();
            }
        }
        self.turns.push_back(turn);
    }

    /// The last `min(k, len)` turns, oldest first.
    pub fn window(&self, k: usize) -> vec_deque::Iter<'_, Turn> {
        let start = self.turns.len().saturating_sub(k);
        self.turns.range(start..)
    }

    /// The last `k` turns as they would be once `pending` is appended,
    /// eviction included. `pending` is not recorded.
    pub fn window_with<'a>(
        &'a self,
        pending: &'a Turn,
        k: usize,
    ) -> impl Iterator<Item = &'a Turn> {
        let k = self.max_retained.map_or(k, |max| k.min(max));
        self.window(k.saturating_sub(1))
            .chain(std::iter::once(pending))
            .take(k)
    }

    /// Clear every turn.
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// All retained turns, oldest first.
    pub fn turns(&self) -> vec_deque::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Render turns as `"{role}: {content}"` lines joined by `\n`, in order.
pub fn serialize<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> String {
    turns
        .into_iter()
        .map(|t| format!("{}: {}", t.role(), t.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
