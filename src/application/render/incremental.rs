//! Block-diffing preview renderer.
//!
//! Each pass splits the source, compares the block ids against the previous
//! pass, sends only new (or evicted) blocks to the fragment renderer and
//! stitches the result back together in document order. Per-block failures
//! degrade that block to escaped plain text; `render` itself never fails.

use std::collections::HashSet;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{BlockCache, CacheConfig, CacheError, CacheStats, ContentHash, content_hash};
use crate::domain::blocks::{Block, SplitDocument, split_document};

use super::types::{FragmentRenderer, RenderError};

pub(crate) const METRIC_FRAGMENT_RENDER: &str = "livepreview_fragment_render_total";
pub(crate) const METRIC_FRAGMENT_FALLBACK: &str = "livepreview_fragment_fallback_total";
pub(crate) const METRIC_RENDER_MS: &str = "livepreview_render_ms";

/// Diagnostics for the most recent `render` pass.
///
/// `renders` counts every pass since construction; the remaining fields
/// describe the last one only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RenderStatistics {
    pub renders: u64,
    pub blocks_total: usize,
    pub blocks_rendered: usize,
    pub blocks_reused: usize,
    /// Blocks present last pass whose cache entry had been evicted.
    pub stale_misses: usize,
    pub fallbacks: usize,
    pub last_render_ms: f64,
}

#[derive(Debug, Default)]
struct PassTally {
    blocks_total: usize,
    rendered: usize,
    reused: usize,
    stale_misses: usize,
    fallbacks: usize,
}

/// Stateful incremental renderer for one document.
///
/// Between calls only the ordered id sequence of the previous pass is kept;
/// block objects are rebuilt from the source every time.
pub struct IncrementalRenderer<R> {
    renderer: R,
    cache: BlockCache,
    enabled: bool,
    previous_ids: Vec<ContentHash>,
    stats: RenderStatistics,
}

impl<R: FragmentRenderer> IncrementalRenderer<R> {
    /// Build a renderer with a fresh cache. Fails only on a zero capacity.
    pub fn new(renderer: R, config: &CacheConfig) -> Result<Self, CacheError> {
        Ok(Self::with_cache(renderer, BlockCache::new(config)?))
    }

    pub fn with_cache(renderer: R, cache: BlockCache) -> Self {
        Self {
            renderer,
            cache,
            enabled: true,
            previous_ids: Vec::new(),
            stats: RenderStatistics::default(),
        }
    }

    /// Toggle incremental mode. When disabled, `render` is a plain
    /// whole-document render: no diffing, no cache traffic, no block markers.
    pub fn enable(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(
                target = "livepreview::render::incremental",
                enabled, "incremental mode toggled"
            );
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Render `source` to preview HTML.
    pub fn render(&mut self, source: &str) -> String {
        let document = if self.enabled {
            split_document(source)
        } else {
            SplitDocument::default()
        };
        self.render_split(source, &document)
    }

    /// Render `source` using a split the caller already made.
    ///
    /// `document` must be `split_document(source)`; it is ignored while
    /// incremental mode is disabled.
    pub fn render_split(&mut self, source: &str, document: &SplitDocument) -> String {
        let started_at = Instant::now();
        let mut tally = PassTally::default();

        let (html, mode) = if self.enabled {
            (
                self.render_incremental(source, document, &mut tally),
                "incremental",
            )
        } else {
            (self.render_whole(source, &mut tally), "full")
        };

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_RENDER_MS, "mode" => mode).record(elapsed_ms);

        self.stats = RenderStatistics {
            renders: self.stats.renders + 1,
            blocks_total: tally.blocks_total,
            blocks_rendered: tally.rendered,
            blocks_reused: tally.reused,
            stale_misses: tally.stale_misses,
            fallbacks: tally.fallbacks,
            last_render_ms: elapsed_ms,
        };

        debug!(
            target = "livepreview::render::incremental",
            mode,
            blocks = tally.blocks_total,
            rendered = tally.rendered,
            reused = tally.reused,
            stale_misses = tally.stale_misses,
            fallbacks = tally.fallbacks,
            elapsed_ms,
            "render pass complete"
        );

        html
    }

    /// Render `block` into the cache ahead of need.
    ///
    /// Returns `true` when the renderer was invoked and the result stored;
    /// `false` when the block was already cached or failed to render.
    /// Cache hit/miss accounting is not affected.
    pub fn prerender_block(&mut self, block: &Block) -> bool {
        if self.cache.contains(&block.id) {
            return false;
        }

        match self.render_checked(&block.content, "prerender") {
            Ok(html) => {
                self.cache.put(block.id, html);
                true
            }
            Err(error) => {
                debug!(
                    target = "livepreview::render::incremental",
                    block_id = %block.id,
                    start_line = block.start_line,
                    error = %error,
                    "pre-render skipped failing block"
                );
                false
            }
        }
    }

    /// Forget the previous pass. The next render diffs against nothing and
    /// relies on the cache alone.
    pub fn reset(&mut self) {
        self.previous_ids.clear();
    }

    /// Drop every cached fragment. Ids from the previous pass are kept, so
    /// the next render reports their misses as stale.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn previous_block_ids(&self) -> &[ContentHash] {
        &self.previous_ids
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    pub fn get_statistics(&self) -> RenderStatistics {
        self.stats
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn render_incremental(
        &mut self,
        source: &str,
        document: &SplitDocument,
        tally: &mut PassTally,
    ) -> String {
        if !document.has_headings() {
            // Nothing to diff; keep the preview populated.
            self.previous_ids.clear();
            return self.render_whole(source, tally);
        }

        let previous: HashSet<ContentHash> = self.previous_ids.iter().copied().collect();
        let mut current_ids = Vec::with_capacity(document.blocks.len());
        let mut html = String::new();

        if let Some(preamble) = document.preamble.as_deref() {
            html.push_str(&self.render_preamble(preamble, tally));
        }

        for block in &document.blocks {
            let (fragment, cached) = self.resolve_block(block, previous.contains(&block.id), tally);
            if cached {
                current_ids.push(block.id);
            }
            push_marked(&mut html, block, &fragment);
        }

        tally.blocks_total = document.blocks.len();
        self.previous_ids = current_ids;
        html
    }

    /// HTML for one block plus whether it now lives in the cache.
    fn resolve_block(
        &mut self,
        block: &Block,
        seen_last_pass: bool,
        tally: &mut PassTally,
    ) -> (String, bool) {
        if seen_last_pass {
            if let Some(html) = self.cache.get(&block.id) {
                tally.reused += 1;
                return (html.to_owned(), true);
            }
            // Evicted since the last pass; the cache is authoritative.
            tally.stale_misses += 1;
        } else if let Some(html) = self.cache.revive(&block.id) {
            tally.reused += 1;
            return (html.to_owned(), true);
        }

        tally.rendered += 1;
        match self.render_checked(&block.content, "block") {
            Ok(html) => {
                self.cache.put(block.id, html.clone());
                (html, true)
            }
            Err(error) => {
                tally.fallbacks += 1;
                counter!(METRIC_FRAGMENT_FALLBACK).increment(1);
                warn!(
                    target = "livepreview::render::incremental",
                    block_id = %block.id,
                    start_line = block.start_line,
                    error = %error,
                    "block render failed; substituting plain text"
                );
                (fallback_html(&block.content), false)
            }
        }
    }

    /// Preamble HTML, cached like a block but outside hit/miss accounting.
    fn render_preamble(&mut self, preamble: &str, tally: &mut PassTally) -> String {
        let id = content_hash(preamble);
        if let Some(html) = self.cache.revive(&id) {
            return html.to_owned();
        }

        match self.render_checked(preamble, "preamble") {
            Ok(html) => {
                self.cache.put(id, html.clone());
                html
            }
            Err(error) => {
                tally.fallbacks += 1;
                counter!(METRIC_FRAGMENT_FALLBACK).increment(1);
                warn!(
                    target = "livepreview::render::incremental",
                    error = %error,
                    "preamble render failed; substituting plain text"
                );
                fallback_html(preamble)
            }
        }
    }

    fn render_whole(&self, source: &str, tally: &mut PassTally) -> String {
        counter!(METRIC_FRAGMENT_RENDER, "scope" => "document").increment(1);
        match self.renderer.render_document(source) {
            Ok(html) => html,
            Err(error) => {
                tally.fallbacks += 1;
                counter!(METRIC_FRAGMENT_FALLBACK).increment(1);
                warn!(
                    target = "livepreview::render::incremental",
                    source_bytes = source.len(),
                    error = %error,
                    "document render failed; substituting plain text"
                );
                fallback_html(source)
            }
        }
    }

    fn render_checked(&self, markup: &str, scope: &'static str) -> Result<String, RenderError> {
        counter!(METRIC_FRAGMENT_RENDER, "scope" => scope).increment(1);
        let html = self.renderer.render_fragment(markup)?;
        if html.trim().is_empty() && !markup.trim().is_empty() {
            return Err(RenderError::malformed("renderer returned empty output"));
        }
        Ok(html)
    }
}

fn push_marked(out: &mut String, block: &Block, html: &str) {
    out.push_str(&format!(
        "<div class=\"preview-block\" data-block-id=\"{}\" data-line=\"{}\">\n",
        block.id, block.start_line
    ));
    out.push_str(html);
    if !html.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</div>\n");
}

/// Escaped plain-text stand-in for markup the renderer could not handle.
fn fallback_html(markup: &str) -> String {
    format!(
        "<pre class=\"preview-fallback\">{}</pre>\n",
        ammonia::clean_text(markup)
    )
}
