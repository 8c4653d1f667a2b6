//! Candidate heuristics and the priority-score reducer.
//!
//! Every function here is pure over `(candidate, signals)`. Candidate
//! generators return in-range indices only; contribution functions return a
//! non-negative weight, and [`priority_score`] sums and clamps them.

use std::time::{Duration, Instant};

use super::signals::EditSignalTracker;

/// How many distinct recent edits the recall heuristic proposes.
pub const RECENT_EDIT_RECALL: usize = 3;
/// Radius of the neighbourhood proposed around a very recent edit.
pub const TEMPORAL_RADIUS: usize = 2;

const DISTANCE_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.1];
const RECENCY_WEIGHT: f64 = 0.3;
/// Recency lost per history position, independent of the configured depth.
const RECENCY_STEP: f64 = 0.03;
const STREAK_BONUS: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    CursorLocality,
    RecentEdits,
    SequentialStreak,
    TemporalLocality,
}

impl Heuristic {
    pub fn name(self) -> &'static str {
        match self {
            Self::CursorLocality => "cursor_locality",
            Self::RecentEdits => "recent_edits",
            Self::SequentialStreak => "sequential_streak",
            Self::TemporalLocality => "temporal_locality",
        }
    }
}

/// The current block and its immediate neighbours.
///
/// An out-of-range `current` is clamped to the last block first.
pub fn cursor_locality(total_blocks: usize, current: usize) -> Vec<usize> {
    let Some(last) = total_blocks.checked_sub(1) else {
        return Vec::new();
    };
    let current = current.min(last);
    (current.saturating_sub(1)..=current.saturating_add(1).min(last)).collect()
}

/// The last [`RECENT_EDIT_RECALL`] distinct edited blocks still in range.
pub fn recent_edit_recall(signals: &EditSignalTracker, total_blocks: usize) -> Vec<usize> {
    signals
        .recent_distinct(RECENT_EDIT_RECALL)
        .into_iter()
        .filter(|index| *index < total_blocks)
        .collect()
}

/// The block after the last edit, while a streak of at least `min_streak`
/// sequential edits is running.
pub fn sequential_extrapolation(
    signals: &EditSignalTracker,
    total_blocks: usize,
    min_streak: usize,
) -> Option<usize> {
    streak_target(signals, min_streak).filter(|index| *index < total_blocks)
}

/// A ±[`TEMPORAL_RADIUS`] neighbourhood around an edit made within `window`.
pub fn temporal_locality(
    signals: &EditSignalTracker,
    total_blocks: usize,
    window: Duration,
    now: Instant,
) -> Vec<usize> {
    let Some(last) = signals.last_edit() else {
        return Vec::new();
    };
    if now.saturating_duration_since(last.timestamp) > window {
        return Vec::new();
    }

    let start = last.block_index.saturating_sub(TEMPORAL_RADIUS);
    let end = last.block_index.saturating_add(TEMPORAL_RADIUS);
    (start..=end).filter(|index| *index < total_blocks).collect()
}

/// 0.5, 0.3, 0.1 at distances 0, 1, 2; halving from there on.
pub fn distance_contribution(candidate: usize, current: usize) -> f64 {
    let distance = candidate.abs_diff(current);
    match DISTANCE_WEIGHTS.get(distance) {
        Some(weight) => *weight,
        None => {
            let exponent = i32::try_from(distance - 2).unwrap_or(i32::MAX);
            DISTANCE_WEIGHTS[2] * 0.5f64.powi(exponent)
        }
    }
}

/// 0.3 for the newest edit, minus 0.03 per older history position, floored
/// at zero.
///
/// The slope does not scale with history depth, so a block two or more edits
/// back never earns more than 0.24. Together with the streak bonus and the
/// distance tail this keeps any block at distance ≥ 4 below the 0.5 of the
/// current block.
pub fn recency_contribution(candidate: usize, signals: &EditSignalTracker) -> f64 {
    match signals.position_of(candidate) {
        Some(position) => (RECENCY_WEIGHT - RECENCY_STEP * position as f64).max(0.0),
        None => 0.0,
    }
}

/// Fixed bonus for the block a running streak points at.
pub fn streak_contribution(
    candidate: usize,
    signals: &EditSignalTracker,
    min_streak: usize,
) -> f64 {
    if streak_target(signals, min_streak) == Some(candidate) {
        STREAK_BONUS
    } else {
        0.0
    }
}

/// Sum of all contributions, clamped to `[0, 1]`.
pub fn priority_score(
    candidate: usize,
    current: usize,
    signals: &EditSignalTracker,
    min_streak: usize,
) -> f64 {
    let score = distance_contribution(candidate, current)
        + recency_contribution(candidate, signals)
        + streak_contribution(candidate, signals, min_streak);
    score.clamp(0.0, 1.0)
}

fn streak_target(signals: &EditSignalTracker, min_streak: usize) -> Option<usize> {
    if signals.streak() < min_streak {
        return None;
    }
    signals
        .last_edit()
        .and_then(|last| last.block_index.checked_add(1))
}
