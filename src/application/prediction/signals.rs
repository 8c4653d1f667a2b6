//! Edit and cursor signals feeding the prediction heuristics.

use std::collections::VecDeque;
use std::time::Instant;

pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// One recorded edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditEvent {
    pub block_index: usize,
    pub timestamp: Instant,
}

/// Last reported cursor position. Last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
    pub line: usize,
    pub last_update: Instant,
}

/// Bounded history of edited block indices plus the current cursor line.
///
/// The oldest event is dropped silently once `depth` events are held. A
/// "sequential streak" counts consecutive edits that each landed exactly one
/// block after the previous one.
#[derive(Debug, Clone)]
pub struct EditSignalTracker {
    history: VecDeque<EditEvent>,
    depth: usize,
    streak: usize,
    cursor: Option<CursorState>,
}

impl Default for EditSignalTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl EditSignalTracker {
    /// `depth` is clamped to at least one event.
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            history: VecDeque::with_capacity(depth),
            depth,
            streak: 0,
            cursor: None,
        }
    }

    pub fn record_edit(&mut self, block_index: usize) {
        self.record_edit_at(block_index, Instant::now());
    }

    pub fn record_edit_at(&mut self, block_index: usize, timestamp: Instant) {
        self.streak = match self.history.back() {
            Some(last) if last.block_index.checked_add(1) == Some(block_index) => self.streak + 1,
            _ => 0,
        };

        if self.history.len() == self.depth {
            self.history.pop_front();
        }
        self.history.push_back(EditEvent {
            block_index,
            timestamp,
        });
    }

    pub fn update_cursor(&mut self, line: usize) {
        self.update_cursor_at(line, Instant::now());
    }

    pub fn update_cursor_at(&mut self, line: usize, at: Instant) {
        self.cursor = Some(CursorState {
            line,
            last_update: at,
        });
    }

    pub fn cursor(&self) -> Option<CursorState> {
        self.cursor
    }

    pub fn last_edit(&self) -> Option<&EditEvent> {
        self.history.back()
    }

    /// Events newest first.
    pub fn recent(&self) -> impl Iterator<Item = &EditEvent> {
        self.history.iter().rev()
    }

    /// Up to `limit` distinct edited indices, newest first.
    pub fn recent_distinct(&self, limit: usize) -> Vec<usize> {
        let mut seen = Vec::with_capacity(limit);
        for event in self.recent() {
            if seen.len() == limit {
                break;
            }
            if !seen.contains(&event.block_index) {
                seen.push(event.block_index);
            }
        }
        seen
    }

    /// Position of the newest edit to `block_index`, 0 being the latest event.
    pub fn position_of(&self, block_index: usize) -> Option<usize> {
        self.recent()
            .position(|event| event.block_index == block_index)
    }

    pub fn streak(&self) -> usize {
        self.streak
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget edits and cursor alike.
    pub fn clear(&mut self) {
        self.history.clear();
        self.streak = 0;
        self.cursor = None;
    }
}
