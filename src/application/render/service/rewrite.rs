use std::borrow::Cow;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};

use crate::application::render::types::RenderError;
use crate::domain::blocks::heading_level;

use super::highlight::CodeHighlighter;

/// Translate `=`-style heading lines into ATX headings comrak understands.
///
/// Borrowed when the markup has no heading lines at all.
pub(crate) fn normalize_headings(markup: &str) -> Cow<'_, str> {
    if !markup.lines().any(|line| heading_level(line).is_some()) {
        return Cow::Borrowed(markup);
    }

    let mut normalized = String::with_capacity(markup.len());
    for line in markup.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        match heading_level(body) {
            Some(level) => {
                let markers = usize::from(level);
                normalized.push_str(&"#".repeat(markers));
                normalized.push_str(&line[markers..]);
            }
            None => normalized.push_str(line),
        }
    }
    Cow::Owned(normalized)
}

/// Replace fenced code blocks with highlighted HTML blocks in place.
///
/// Returns the number of blocks rewritten.
pub(crate) fn rewrite_code_blocks<'a>(
    root: &'a AstNode<'a>,
    highlighter: &CodeHighlighter,
) -> Result<usize, RenderError> {
    let mut rewritten = 0usize;
    visit_nodes(root, highlighter, &mut rewritten)?;
    Ok(rewritten)
}

fn visit_nodes(
    node: &AstNode<'_>,
    highlighter: &CodeHighlighter,
    rewritten: &mut usize,
) -> Result<(), RenderError> {
    if let Some((info, literal)) = extract_code_block(node) {
        let html = highlighter.highlight(&info, &literal)?;
        let mut data = node.data.borrow_mut();
        data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: html,
        });
        *rewritten += 1;
    }

    let mut child = node.first_child();
    while let Some(next) = child {
        visit_nodes(next, highlighter, rewritten)?;
        child = next.next_sibling();
    }

    Ok(())
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.to_string()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comrak::{Arena, format_html, parse_document};

    #[test]
    fn headings_become_atx() {
        let normalized = normalize_headings("= Title\nbody\n=== Third\r\nmore");
        assert_eq!(normalized, "# Title\nbody\n### Third\r\nmore");
    }

    #[test]
    fn headingless_markup_is_borrowed() {
        assert!(matches!(normalize_headings("plain\n===="), Cow::Borrowed(_)));
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let options = super::super::config::default_options();
        let arena = Arena::new();
        let root = parse_document(&arena, "```rust\nlet x = 1;\n```\n", &options);

        let count = rewrite_code_blocks(root, &CodeHighlighter::default()).expect("rewrite");
        assert_eq!(count, 1);

        let mut html = String::new();
        format_html(root, &options, &mut html).expect("html");
        assert!(html.contains("syntax-highlight syntax-lang-rust"));
    }
}
