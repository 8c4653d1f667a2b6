//! Per-document preview session.
//!
//! One session owns one block cache, shared by the incremental render path
//! and the pre-render path. Drop the session when the document closes.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::application::prediction::{
    Prediction, PredictionConfig, PrerenderScheduler, SchedulerStatistics,
};
use crate::application::render::{FragmentRenderer, IncrementalRenderer, RenderStatistics};
use crate::cache::{CacheConfig, CacheError, CacheStats, ContentHash};
use crate::config::Settings;
use crate::domain::blocks::{Block, block_index_for_line, split_document};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cache: CacheConfig,
    pub prediction: PredictionConfig,
    pub incremental: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            prediction: PredictionConfig::default(),
            incremental: true,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            cache: CacheConfig::from(&settings.cache),
            prediction: PredictionConfig::from(&settings.prediction),
            incremental: settings.render.incremental,
        }
    }
}

/// Everything a host might want to display about a session.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionStatistics {
    pub render: RenderStatistics,
    pub cache: CacheStats,
    pub scheduler: SchedulerStatistics,
}

pub struct PreviewSession<R> {
    renderer: IncrementalRenderer<R>,
    scheduler: PrerenderScheduler,
    blocks: Vec<Block>,
    cursor_line: Option<usize>,
}

impl<R: FragmentRenderer> PreviewSession<R> {
    pub fn new(renderer: R, config: &SessionConfig) -> Result<Self, CacheError> {
        let mut incremental = IncrementalRenderer::new(renderer, &config.cache)?;
        incremental.enable(config.incremental);
        Ok(Self {
            renderer: incremental,
            scheduler: PrerenderScheduler::new(config.prediction.clone()),
            blocks: Vec::new(),
            cursor_line: None,
        })
    }

    /// Render a new revision of the document.
    ///
    /// Blocks whose content did not exist in the previous revision are
    /// recorded as edits, so prediction follows the author without the host
    /// reporting edits itself. The first revision records nothing.
    pub fn render(&mut self, source: &str) -> String {
        let document = split_document(source);
        let html = self.renderer.render_split(source, &document);
        let blocks = document.blocks;

        if !self.blocks.is_empty() {
            let previous: HashSet<ContentHash> =
                self.blocks.iter().map(|block| block.id).collect();
            let edited: Vec<usize> = blocks
                .iter()
                .enumerate()
                .filter(|(_, block)| !previous.contains(&block.id))
                .map(|(index, _)| index)
                .collect();
            for index in &edited {
                self.scheduler.record_edit(*index);
            }
            debug!(
                target = "livepreview::session",
                blocks = blocks.len(),
                edited = edited.len(),
                "revision rendered"
            );
        }

        self.scheduler.retain_within(blocks.len());
        self.blocks = blocks;
        html
    }

    pub fn enable(&mut self, enabled: bool) {
        self.renderer.enable(enabled);
    }

    pub fn update_cursor_position(&mut self, line: usize) {
        self.cursor_line = Some(line);
        self.scheduler.update_cursor_position(line);
    }

    /// Report an edit at `line` of the last rendered revision.
    pub fn record_edit_at_line(&mut self, line: usize) {
        if let Some(index) = block_index_for_line(&self.blocks, line) {
            self.scheduler.record_edit(index);
        }
    }

    /// Block under the cursor; the first block when the cursor is unknown or
    /// sits in the preamble.
    pub fn current_block(&self) -> usize {
        self.cursor_line
            .and_then(|line| block_index_for_line(&self.blocks, line))
            .unwrap_or(0)
    }

    /// Refresh the pre-render queue from the current cursor and edit history.
    pub fn request_prediction(&mut self) -> Prediction {
        let current = self.current_block();
        self.scheduler
            .request_prediction(self.blocks.len(), current)
    }

    /// Drain up to `max_blocks` queued predictions into the cache.
    ///
    /// Returns how many blocks were actually rendered; already-cached blocks
    /// are popped without rendering.
    pub fn idle_prerender(&mut self, max_blocks: usize) -> usize {
        let mut rendered = 0;
        for _ in 0..max_blocks {
            let Some(index) = self.scheduler.get_next_prerender_block() else {
                break;
            };
            if let Some(block) = self.blocks.get(index)
                && self.renderer.prerender_block(block)
            {
                rendered += 1;
            }
        }
        rendered
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn renderer(&self) -> &IncrementalRenderer<R> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut IncrementalRenderer<R> {
        &mut self.renderer
    }

    pub fn scheduler(&self) -> &PrerenderScheduler {
        &self.scheduler
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.renderer.get_cache_stats()
    }

    pub fn get_statistics(&self) -> SessionStatistics {
        SessionStatistics {
            render: self.renderer.get_statistics(),
            cache: self.renderer.get_cache_stats(),
            scheduler: self.scheduler.get_statistics(),
        }
    }
}
