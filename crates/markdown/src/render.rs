//! Markdown to HTML and plain text.

use pulldown_cmark::{Event, Options, Parser, TagEnd, html};

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Pass raw HTML blocks through unchanged. When off they are escaped.
    pub allow_raw_html: bool,
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render markdown to HTML, escaping any raw HTML in the source.
#[must_use]
pub fn to_html(markdown: &str) -> String {
    to_html_with(markdown, RenderOptions::default())
}

/// Render markdown to HTML with explicit options.
#[must_use]
pub fn to_html_with(markdown: &str, options: RenderOptions) -> String {
    let parser = Parser::new_ext(markdown, parser_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !options.allow_raw_html => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Strip markdown syntax, keeping the readable text.
///
/// Block boundaries become single spaces and runs of whitespace collapse.
#[must_use]
pub fn to_plain_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell
                | TagEnd::BlockQuote,
            ) => out.push(' '),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html_basic() {
        let html = to_html("# Title\n\nSome *emphasis* and `code`.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<code>code</code>"));
    }

    #[test]
    fn test_to_html_escapes_raw_html() {
        let html = to_html("<script>alert(1)</script>\n\nok <b>bold</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_to_html_allows_raw_html_when_asked() {
        let html = to_html_with(
            "<div class=\"note\">hi</div>",
            RenderOptions {
                allow_raw_html: true,
            },
        );
        assert!(html.contains("<div class=\"note\">"));
    }

    #[test]
    fn test_to_html_tables() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_to_plain_text() {
        let text = to_plain_text("# Title\n\nA [link](https://example.com) and **bold**.\n\n- one\n- two");
        assert_eq!(text, "Title A link and bold. one two");
    }

    #[test]
    fn test_to_plain_text_empty() {
        assert_eq!(to_plain_text(""), "");
    }
}
