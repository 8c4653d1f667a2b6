//! Idle-time pre-render queue.
//!
//! The queue is advisory: every `request_prediction` replaces it wholesale,
//! and a host may stop draining it at any point without cleanup.

use std::collections::VecDeque;
use std::time::Instant;

use metrics::counter;
use serde::Serialize;
use tracing::debug;

use super::engine::{Prediction, PredictionConfig, PredictionEngine};

pub(crate) const METRIC_PRERENDER: &str = "livepreview_prerender_total";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrerenderQueueEntry {
    pub block_index: usize,
    pub priority: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SchedulerStatistics {
    /// Predictions requested since construction.
    pub predictions: u64,
    /// Entries currently waiting.
    pub queued: usize,
    /// Indices handed out by `get_next_prerender_block`.
    pub dispatched: u64,
    pub last_confidence: f64,
}

/// Owns the prediction engine and the priority queue derived from it.
#[derive(Debug, Clone, Default)]
pub struct PrerenderScheduler {
    engine: PredictionEngine,
    queue: VecDeque<PrerenderQueueEntry>,
    total_blocks: usize,
    predictions: u64,
    dispatched: u64,
    last_confidence: f64,
}

impl PrerenderScheduler {
    pub fn new(config: PredictionConfig) -> Self {
        Self {
            engine: PredictionEngine::new(config),
            ..Self::default()
        }
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }

    pub fn update_cursor_position(&mut self, line: usize) {
        self.engine.update_cursor(line);
    }

    pub fn record_edit(&mut self, block_index: usize) {
        self.engine.record_edit(block_index);
    }

    pub fn record_edit_at(&mut self, block_index: usize, at: Instant) {
        self.engine.record_edit_at(block_index, at);
    }

    pub fn request_prediction(&mut self, total_blocks: usize, current_block: usize) -> Prediction {
        self.request_prediction_at(total_blocks, current_block, Instant::now())
    }

    /// Recompute a prediction and replace the queue with its candidates,
    /// highest priority first.
    pub fn request_prediction_at(
        &mut self,
        total_blocks: usize,
        current_block: usize,
        now: Instant,
    ) -> Prediction {
        let prediction = self
            .engine
            .predict_next_blocks_at(total_blocks, current_block, now);

        let mut entries: Vec<PrerenderQueueEntry> = prediction
            .block_indices
            .iter()
            .map(|&block_index| PrerenderQueueEntry {
                block_index,
                priority: self.engine.get_priority_score(block_index, current_block),
            })
            .collect();
        entries.sort_by(|left, right| {
            right
                .priority
                .total_cmp(&left.priority)
                .then(left.block_index.cmp(&right.block_index))
        });

        self.queue = entries.into();
        self.total_blocks = total_blocks;
        self.predictions += 1;
        self.last_confidence = prediction.confidence;

        debug!(
            target = "livepreview::prediction::scheduler",
            total_blocks,
            current_block,
            queued = self.queue.len(),
            confidence = prediction.confidence,
            "pre-render queue replaced"
        );

        prediction
    }

    /// Pop the highest-priority block, skipping anything the document has
    /// since outgrown.
    pub fn get_next_prerender_block(&mut self) -> Option<usize> {
        while let Some(entry) = self.queue.pop_front() {
            if entry.block_index < self.total_blocks {
                self.dispatched += 1;
                counter!(METRIC_PRERENDER).increment(1);
                return Some(entry.block_index);
            }
        }
        None
    }

    /// Drop entries that no longer address a block after the document shrank.
    pub fn retain_within(&mut self, total_blocks: usize) {
        self.total_blocks = total_blocks;
        self.queue.retain(|entry| entry.block_index < total_blocks);
    }

    pub fn get_priority_score(&self, block_index: usize, current_block: usize) -> f64 {
        self.engine.get_priority_score(block_index, current_block)
    }

    pub fn queue(&self) -> impl Iterator<Item = &PrerenderQueueEntry> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn get_statistics(&self) -> SchedulerStatistics {
        SchedulerStatistics {
            predictions: self.predictions,
            queued: self.queue.len(),
            dispatched: self.dispatched,
            last_confidence: self.last_confidence,
        }
    }
}
