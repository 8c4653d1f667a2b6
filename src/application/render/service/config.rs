use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::{ListStyleType, Options};

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

/// Allow-list sanitizer for preview fragments.
///
/// Keeps the structural tags a preview pane needs plus the `class` hooks the
/// highlighter emits; scripts, styles, and event attributes are dropped.
pub(crate) fn build_fragment_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "div",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "ins",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "u",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "ul",
        "dl",
        "dt",
        "dd",
        "del",
        "mark",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "aria-hidden",
        "aria-label",
        "role",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("img", &["src", "alt", "width", "height"]);
    builder.add_tag_attributes("code", &["data-meta", "data-language", "class"]);
    builder.add_tag_attributes("pre", &["class", "data-language"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled", "class"]);

    builder
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.superscript = true;
    ext.footnotes = true;
    ext.description_lists = true;
    ext.multiline_block_quotes = true;
    ext.alerts = true;
    ext.underline = true;
    ext.subscript = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.full_info_string = true;
    render.tasklist_classes = true;
    render.list_style = ListStyleType::Dash;
    render.r#unsafe = true;
    render.sourcepos = false;
    render.escaped_char_spans = true;
    render.gfm_quirks = true;
}

#[cfg(test)]
mod tests {
    use super::build_fragment_sanitizer;

    #[test]
    fn sanitizer_strips_scripts() {
        let sanitizer = build_fragment_sanitizer();
        let html = sanitizer
            .clean("<p>ok</p><script>alert(1)</script>")
            .to_string();

        assert_eq!(html, "<p>ok</p>");
    }

    #[test]
    fn sanitizer_preserves_strikethrough() {
        let sanitizer = build_fragment_sanitizer();
        let html = sanitizer
            .clean("<p><del>Removed</del> text</p>")
            .to_string();

        assert!(html.contains("<del>Removed</del>"));
    }

    #[test]
    fn sanitizer_keeps_highlight_classes() {
        let sanitizer = build_fragment_sanitizer();
        let html = sanitizer
            .clean("<pre class=\"syntax-highlight\"><code class=\"syntax-code\"><span class=\"syntax-keyword\">fn</span></code></pre>")
            .to_string();

        assert!(html.contains("class=\"syntax-highlight\""));
        assert!(html.contains("class=\"syntax-keyword\""));
    }
}
