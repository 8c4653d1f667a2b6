mod config;
mod highlight;
mod rewrite;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use tracing::trace;

use crate::application::render::types::{FragmentRenderer, RenderError};

use config::{build_fragment_sanitizer, default_options};
use highlight::CodeHighlighter;
use rewrite::{normalize_headings, rewrite_code_blocks};

/// Default Comrak-based fragment renderer with Syntect highlighting and
/// optional Ammonia sanitisation.
///
/// `=`-style headings are normalised to ATX headings before parsing; all other
/// markup is treated as CommonMark with the GFM extensions enabled. The
/// renderer keeps no document-wide state, so identical input always yields
/// identical HTML.
pub struct ComrakFragmentRenderer {
    options: comrak::Options<'static>,
    highlighter: CodeHighlighter,
    sanitizer: Option<ammonia::Builder<'static>>,
}

/// Knobs for the default renderer.
#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    /// Run rendered HTML through the allow-list sanitizer.
    pub sanitize: bool,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        Self {
            sanitize: settings.sanitize,
        }
    }
}

impl ComrakFragmentRenderer {
    pub fn new(config: &RenderPipelineConfig) -> Self {
        Self {
            options: default_options(),
            highlighter: CodeHighlighter::default(),
            sanitizer: config.sanitize.then(build_fragment_sanitizer),
        }
    }

    fn render_markup(&self, markup: &str) -> Result<String, RenderError> {
        let normalized = normalize_headings(markup);
        let arena = Arena::new();
        let root = parse_document(&arena, &normalized, &self.options);

        let highlighted = rewrite_stage(root, &self.highlighter)?;
        let rendered_html = render_html_stage(root, &self.options)?;
        let html = sanitize_stage(rendered_html, self.sanitizer.as_ref());

        trace!(
            target = "livepreview::render::comrak",
            markup_bytes = markup.len(),
            html_bytes = html.len(),
            code_blocks = highlighted,
            "fragment rendered"
        );
        Ok(html)
    }
}

impl Default for ComrakFragmentRenderer {
    fn default() -> Self {
        Self::new(&RenderPipelineConfig::default())
    }
}

impl FragmentRenderer for ComrakFragmentRenderer {
    fn render_fragment(&self, markup: &str) -> Result<String, RenderError> {
        self.render_markup(markup)
    }

    fn render_document(&self, source: &str) -> Result<String, RenderError> {
        self.render_markup(source)
    }
}

fn rewrite_stage<'a>(
    root: &'a AstNode<'a>,
    highlighter: &CodeHighlighter,
) -> Result<usize, RenderError> {
    rewrite_code_blocks(root, highlighter)
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::markdown(err.to_string()))?;
    Ok(html)
}

fn sanitize_stage(html: String, sanitizer: Option<&ammonia::Builder<'static>>) -> String {
    match sanitizer {
        Some(sanitizer) => sanitizer.clean(&html).to_string(),
        None => html,
    }
}
