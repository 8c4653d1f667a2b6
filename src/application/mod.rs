//! Application layer: rendering, prediction, and the per-document session
//! tying them to one block cache.

pub mod error;
pub mod prediction;
pub mod render;
pub mod session;
