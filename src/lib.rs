//! Incremental live-preview rendering for heading-structured markup.
//!
//! Source text is split into heading-delimited blocks ([`domain::blocks`]),
//! each block is rendered once and cached under a content hash
//! ([`cache`]), and successive revisions only re-render what changed
//! ([`application::render::IncrementalRenderer`]). A prediction layer
//! ([`application::prediction`]) warms the cache for blocks the author is
//! likely to touch next.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::render::{
    ComrakFragmentRenderer, FragmentRenderer, IncrementalRenderer, RenderError,
};
pub use application::session::{PreviewSession, SessionConfig};
