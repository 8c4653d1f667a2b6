//! Heading-delimited document blocks.
//!
//! A block runs from one heading line up to (not including) the next heading
//! of any level. Headings are lines of the form `=… text`: one to
//! [`MAX_HEADING_LEVEL`] leading `=` markers, at least one whitespace
//! character, then visible text. Splitting is pure and allocation is bounded
//! by the input; nothing is retained between calls.

use crate::cache::{ContentHash, content_hash};

pub const MAX_HEADING_LEVEL: u8 = 6;

/// One heading-delimited span of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Content address of `content`; independent of position.
    pub id: ContentHash,
    /// Zero-based line of the heading that opens the block.
    pub start_line: usize,
    /// Zero-based line one past the block's last line.
    pub end_line: usize,
    /// Block source, lines joined with `\n`, heading line included.
    pub content: String,
    /// Heading depth, 1..=6.
    pub level: u8,
    pub rendered_html: Option<String>,
}

impl Block {
    pub fn new(start_line: usize, end_line: usize, content: String, level: u8) -> Self {
        Self {
            id: content_hash(&content),
            start_line,
            end_line,
            content,
            level,
            rendered_html: None,
        }
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..self.end_line).contains(&line)
    }
}

/// Result of splitting a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitDocument {
    /// Non-blank text before the first heading, if any.
    pub preamble: Option<String>,
    pub blocks: Vec<Block>,
}

impl SplitDocument {
    pub fn has_headings(&self) -> bool {
        !self.blocks.is_empty()
    }
}

/// Heading depth of `line`, or `None` when it is body text.
pub fn heading_level(line: &str) -> Option<u8> {
    let markers = line.bytes().take_while(|byte| *byte == b'=').count();
    if markers == 0 || markers > usize::from(MAX_HEADING_LEVEL) {
        return None;
    }

    let rest = &line[markers..];
    let text = rest.trim_start();
    if text.len() == rest.len() || text.is_empty() {
        return None;
    }

    u8::try_from(markers).ok()
}

/// Split `source` into blocks in document order.
///
/// Text before the first heading is not a block; empty or heading-less
/// sources yield an empty sequence.
pub fn split(source: &str) -> Vec<Block> {
    split_document(source).blocks
}

/// Split `source`, also returning the text that precedes the first heading.
pub fn split_document(source: &str) -> SplitDocument {
    let mut preamble_lines: Vec<&str> = Vec::new();
    let mut blocks = Vec::new();
    let mut current: Option<(usize, u8, Vec<&str>)> = None;
    let mut line_count = 0usize;

    for (index, line) in source.lines().enumerate() {
        line_count = index + 1;

        if let Some(level) = heading_level(line) {
            if let Some((start, open_level, lines)) = current.take() {
                blocks.push(Block::new(start, index, lines.join("\n"), open_level));
            }
            current = Some((index, level, vec![line]));
            continue;
        }

        match current.as_mut() {
            Some((_, _, lines)) => lines.push(line),
            None => preamble_lines.push(line),
        }
    }

    if let Some((start, level, lines)) = current {
        blocks.push(Block::new(start, line_count, lines.join("\n"), level));
    }

    let preamble = preamble_lines.join("\n");
    let preamble = (!preamble.trim().is_empty()).then_some(preamble);

    SplitDocument { preamble, blocks }
}

/// Index of the block containing `line`.
///
/// Lines past the end of the document map to the last block; lines in the
/// preamble (or any line of a heading-less document) map to `None`.
pub fn block_index_for_line(blocks: &[Block], line: usize) -> Option<usize> {
    let after = blocks.partition_point(|block| block.start_line <= line);
    after.checked_sub(1)
}
