//! Content addressing for preview blocks.
//!
//! A block's identity is derived from its text alone, so identical content
//! maps to the same key wherever it appears in the document. The incremental
//! path and the predictive pre-render path both key the shared cache through
//! [`content_hash`]; nothing else may mint a [`ContentHash`].

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in a [`ContentHash`].
pub const CONTENT_HASH_BYTES: usize = 8;

/// Short, deterministic digest of a block's source text.
///
/// Truncated SHA-256; collisions are accepted as negligible for editor-sized
/// documents. Not intended as a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; CONTENT_HASH_BYTES]);

impl ContentHash {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_BYTES] {
        &self.0
    }

    /// Lowercase hex form, as used in block markers and logs.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the content address of a block's text.
pub fn content_hash(content: &str) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();

    let mut short = [0u8; CONTENT_HASH_BYTES];
    short.copy_from_slice(&digest[..CONTENT_HASH_BYTES]);
    ContentHash(short)
}
