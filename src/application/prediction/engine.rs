use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::trace;

use super::heuristics::{
    Heuristic, cursor_locality, priority_score, recent_edit_recall, sequential_extrapolation,
    temporal_locality,
};
use super::signals::{DEFAULT_HISTORY_DEPTH, EditSignalTracker};

const CONFIDENCE_PER_HEURISTIC: f64 = 0.2;

/// Tunables for candidate selection and scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionConfig {
    pub max_predictions: usize,
    pub history_depth: usize,
    pub temporal_window: Duration,
    pub min_streak: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_predictions: 5,
            history_depth: DEFAULT_HISTORY_DEPTH,
            temporal_window: Duration::from_secs(2),
            min_streak: 2,
        }
    }
}

impl From<&crate::config::PredictionSettings> for PredictionConfig {
    fn from(settings: &crate::config::PredictionSettings) -> Self {
        Self {
            max_predictions: settings.max_predictions.get(),
            history_depth: settings.history_depth.get(),
            temporal_window: settings.temporal_window,
            min_streak: settings.min_streak.get(),
        }
    }
}

/// Ranked guess at the blocks the user will look at next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Highest priority first, at most `max_predictions` long.
    pub block_indices: Vec<usize>,
    /// `min(1, heuristics_fired × 0.2)`. Diagnostic only.
    pub confidence: f64,
    /// Names of the heuristics that fired.
    pub reason: String,
}

impl Prediction {
    pub fn is_empty(&self) -> bool {
        self.block_indices.is_empty()
    }
}

/// Fuses the candidate heuristics over one document's edit signals.
#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    config: PredictionConfig,
    signals: EditSignalTracker,
}

impl PredictionEngine {
    pub fn new(config: PredictionConfig) -> Self {
        let signals = EditSignalTracker::new(config.history_depth);
        Self { config, signals }
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn signals(&self) -> &EditSignalTracker {
        &self.signals
    }

    pub fn record_edit(&mut self, block_index: usize) {
        self.signals.record_edit(block_index);
    }

    pub fn record_edit_at(&mut self, block_index: usize, at: Instant) {
        self.signals.record_edit_at(block_index, at);
    }

    pub fn update_cursor(&mut self, line: usize) {
        self.signals.update_cursor(line);
    }

    pub fn predict_next_blocks(&self, total_blocks: usize, current_block: usize) -> Prediction {
        self.predict_next_blocks_at(total_blocks, current_block, Instant::now())
    }

    /// Union the heuristic candidates, rank them by priority score (ties go
    /// to the lower index) and keep the best `max_predictions`.
    pub fn predict_next_blocks_at(
        &self,
        total_blocks: usize,
        current_block: usize,
        now: Instant,
    ) -> Prediction {
        let mut candidates = BTreeSet::new();
        let mut fired: Vec<Heuristic> = Vec::with_capacity(4);
        let mut offer = |heuristic: Heuristic, indices: Vec<usize>| {
            if !indices.is_empty() {
                fired.push(heuristic);
                candidates.extend(indices);
            }
        };

        offer(
            Heuristic::CursorLocality,
            cursor_locality(total_blocks, current_block),
        );
        offer(
            Heuristic::RecentEdits,
            recent_edit_recall(&self.signals, total_blocks),
        );
        offer(
            Heuristic::SequentialStreak,
            sequential_extrapolation(&self.signals, total_blocks, self.config.min_streak)
                .into_iter()
                .collect(),
        );
        offer(
            Heuristic::TemporalLocality,
            temporal_locality(
                &self.signals,
                total_blocks,
                self.config.temporal_window,
                now,
            ),
        );

        let mut ranked: Vec<(usize, f64)> = candidates
            .into_iter()
            .map(|index| (index, self.get_priority_score(index, current_block)))
            .collect();
        // BTreeSet order plus a stable sort keeps lower indices first on ties.
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1));
        ranked.truncate(self.config.max_predictions);

        let confidence = (fired.len() as f64 * CONFIDENCE_PER_HEURISTIC).min(1.0);
        let reason = if fired.is_empty() {
            "none".to_string()
        } else {
            fired
                .iter()
                .map(|heuristic| heuristic.name())
                .collect::<Vec<_>>()
                .join(", ")
        };

        trace!(
            target = "livepreview::prediction::engine",
            total_blocks,
            current_block,
            candidates = ranked.len(),
            confidence,
            reason = %reason,
            "prediction computed"
        );

        Prediction {
            block_indices: ranked.into_iter().map(|(index, _)| index).collect(),
            confidence,
            reason,
        }
    }

    /// Priority in `[0, 1]` of `block_index` relative to `current_block`.
    pub fn get_priority_score(&self, block_index: usize, current_block: usize) -> f64 {
        priority_score(
            block_index,
            current_block,
            &self.signals,
            self.config.min_streak,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_engine_predicts_cursor_neighbourhood() {
        let engine = PredictionEngine::default();
        let prediction = engine.predict_next_blocks(10, 5);

        assert_eq!(prediction.block_indices, vec![5, 4, 6]);
        assert!((prediction.confidence - 0.2).abs() < 1e-12);
        assert_eq!(prediction.reason, "cursor_locality");
    }

    #[test]
    fn empty_document_yields_empty_prediction() {
        let prediction = PredictionEngine::default().predict_next_blocks(0, 0);
        assert!(prediction.is_empty());
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.reason, "none");
    }

    #[test]
    fn cap_applies_after_ranking() {
        let mut engine = PredictionEngine::new(PredictionConfig {
            max_predictions: 2,
            ..PredictionConfig::default()
        });
        let now = Instant::now();
        engine.record_edit_at(0, now);

        let prediction = engine.predict_next_blocks_at(10, 5, now);
        assert_eq!(prediction.block_indices, vec![5, 0]);
    }

    #[test]
    fn all_heuristics_fire_together() {
        let mut engine = PredictionEngine::default();
        let now = Instant::now();
        for index in [2, 3, 4] {
            engine.record_edit_at(index, now);
        }

        let prediction = engine.predict_next_blocks_at(10, 4, now);
        assert!((prediction.confidence - 0.8).abs() < 1e-12);
        assert_eq!(
            prediction.reason,
            "cursor_locality, recent_edits, sequential_streak, temporal_locality"
        );
        assert_eq!(prediction.block_indices.len(), 5);
        assert_eq!(prediction.block_indices[0], 4);
    }
}
