use thiserror::Error;

/// Structured errors surfaced by a fragment renderer. The incremental
/// renderer recovers from every variant locally; none of them reach the host.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("markup conversion failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
    #[error("renderer returned malformed output: {message}")]
    Malformed { message: String },
}

impl RenderError {
    pub fn markdown(message: impl Into<String>) -> Self {
        Self::Markdown {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Markup-to-HTML conversion capability consumed by the preview pipeline.
///
/// Implementations must be deterministic: identical input yields identical
/// HTML. Cached output is reused on that assumption. They should not depend on
/// hidden document-wide state that changes between blocks.
pub trait FragmentRenderer {
    /// Render one block's raw markup.
    fn render_fragment(&self, markup: &str) -> Result<String, RenderError>;

    /// Render a whole document in one pass.
    ///
    /// Used when incremental mode is disabled and for heading-less documents.
    fn render_document(&self, source: &str) -> Result<String, RenderError> {
        self.render_fragment(source)
    }
}

impl<R: FragmentRenderer + ?Sized> FragmentRenderer for Box<R> {
    fn render_fragment(&self, markup: &str) -> Result<String, RenderError> {
        (**self).render_fragment(markup)
    }

    fn render_document(&self, source: &str) -> Result<String, RenderError> {
        (**self).render_document(source)
    }
}
