use once_cell::sync::Lazy;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::RenderError;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syntax-" };

/// Class-based code highlighter shared by every fragment render.
///
/// Output only carries `syntax-` prefixed classes, so the preview stylesheet
/// decides colours and fragments stay byte-identical across themes.
#[derive(Clone, Copy)]
pub(crate) struct CodeHighlighter {
    syntax_set: &'static SyntaxSet,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
        }
    }
}

impl CodeHighlighter {
    /// Highlight a fenced block. `info` is the raw info string
    /// (`lang meta…`); an unknown or missing language renders as plain text.
    pub(crate) fn highlight(&self, info: &str, code: &str) -> Result<String, RenderError> {
        let mut segments = info.split_whitespace();
        let lang_token = segments.next().unwrap_or("text").to_ascii_lowercase();
        let meta = segments.collect::<Vec<_>>().join(" ");

        let syntax = self
            .find_syntax(&lang_token)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.syntax_set, CLASS_STYLE);

        let mut code_with_newline = code.to_string();
        if !code_with_newline.ends_with('\n') {
            code_with_newline.push('\n');
        }
        for line in LinesWithEndings::from(code_with_newline.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlighting {
                    language: lang_token.clone(),
                    message: err.to_string(),
                })?;
        }

        let meta_attr = if meta.is_empty() {
            String::new()
        } else {
            format!(" data-meta=\"{}\"", ammonia::clean_text(&meta))
        };

        Ok(format!(
            "<pre class=\"syntax-highlight syntax-lang-{lang}\" data-language=\"{lang}\"><code class=\"language-{lang} syntax-code\"{meta_attr}>{body}</code></pre>",
            lang = ammonia::clean_text(&lang_token),
            body = generator.finalize(),
        ))
    }

    fn find_syntax(&self, token: &str) -> Option<&'static SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}
