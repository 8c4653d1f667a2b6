//! Preview rendering.
//!
//! Fragment renderers are pure: markup in, deterministic HTML out, structured
//! errors on failure. All state (previous block ids, cached fragments,
//! statistics) lives in [`IncrementalRenderer`].

mod incremental;
mod service;
mod types;

pub use incremental::{IncrementalRenderer, RenderStatistics};
pub use service::{ComrakFragmentRenderer, RenderPipelineConfig};
pub use types::{FragmentRenderer, RenderError};

pub(crate) use incremental::{METRIC_FRAGMENT_FALLBACK, METRIC_FRAGMENT_RENDER, METRIC_RENDER_MS};
