//! Public renderer entry points.

use crate::heading::TocEntry;
use crate::html::write_blocks;
use crate::stages::{self, PIPELINE, RenderContext};

/// Result of rendering markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Plain text of the first H1 (if title extraction was enabled).
    pub title: Option<String>,
    /// Level 2 and 3 headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer running the staged pipeline.
///
/// Rendering is total: any input produces some HTML, never an error.
///
/// # Example
///
/// ```
/// use vd_renderer::MarkdownRenderer;
///
/// let result = MarkdownRenderer::new()
///     .with_title_extraction()
///     .render("# Guide\n\n## Install\n\nRun it.");
/// assert_eq!(result.title.as_deref(), Some("Guide"));
/// assert_eq!(result.toc[0].id, "install");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownRenderer {
    extract_title: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable title extraction from first H1 heading.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Render markdown text.
    pub fn render(&self, markdown: &str) -> RenderResult {
        let mut ctx = RenderContext::default();
        let blocks = stages::run(markdown.lines(), &mut ctx);
        let (title, toc) = ctx.headings.into_parts();

        RenderResult {
            html: write_blocks(&blocks),
            title: title.filter(|_| self.extract_title),
            toc,
        }
    }
}

/// Render markdown to an HTML string.
///
/// ```
/// assert_eq!(
///     vd_renderer::render("## Getting Started"),
///     r#"<h2 id="getting-started">Getting Started</h2>"#
/// );
/// ```
#[must_use]
pub fn render(markdown: &str) -> String {
    MarkdownRenderer::new().render(markdown).html
}

/// Names of the pipeline stages in the order they run.
#[must_use]
pub fn stage_names() -> Vec<&'static str> {
    PIPELINE.iter().map(|stage| stage.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_body_is_escaped_verbatim() {
        let html = render("```html\n<b>x</b> **not bold** [no](link)\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;b&gt;x&lt;/b&gt; **not bold** [no](link)\n</code></pre>"
        );
    }

    #[test]
    fn test_heading_id() {
        assert_eq!(
            render("## Getting Started"),
            r#"<h2 id="getting-started">Getting Started</h2>"#
        );
    }

    #[test]
    fn test_table_alignment() {
        let html = render("A|B\n:--|--:\n1|2");
        assert_eq!(
            html,
            concat!(
                r#"<table><thead><tr><th style="text-align:left">A</th>"#,
                r#"<th style="text-align:right">B</th></tr></thead>"#,
                r#"<tbody><tr><td style="text-align:left">1</td>"#,
                r#"<td style="text-align:right">2</td></tr></tbody></table>"#,
            )
        );
    }

    #[test]
    fn test_consecutive_bullets_share_one_list() {
        let html = render("- one\n- two");
        assert_eq!(html, "<ul>\n<li>one</li>\n<li>two</li>\n</ul>");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
    }

    #[test]
    fn test_duplicate_heading_ids_get_suffixes() {
        let html = render("## Notes\n\n## Notes\n\n## Notes");
        assert_eq!(
            html,
            concat!(
                r#"<h2 id="notes">Notes</h2>"#,
                "\n",
                r#"<h2 id="notes-1">Notes</h2>"#,
                "\n",
                r#"<h2 id="notes-2">Notes</h2>"#,
            )
        );
    }

    #[test]
    fn test_heading_ids_unique_when_text_looks_suffixed() {
        let html = render("## Setup\n\n## Setup\n\n## Setup 1");
        assert_eq!(html.matches(r#"id="setup-1""#).count(), 1);
        assert!(html.contains(r#"<h2 id="setup-1-1">Setup 1</h2>"#));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        assert_eq!(
            render("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_full_document() {
        let markdown = "\
# Vitte

Intro with **bold**, *em* and `code`.
Second line.

> Quoted [link](#/en/start)

- [x] done
- [ ] open

1. first
2. second

### Next `steps`
";
        let result = MarkdownRenderer::new().with_title_extraction().render(markdown);
        assert_eq!(
            result.html,
            concat!(
                r#"<h1 id="vitte">Vitte</h1>"#,
                "\n<p>Intro with <strong>bold</strong>, <em>em</em> and <code>code</code>.\nSecond line.</p>\n",
                r##"<blockquote><p>Quoted <a href="#/en/start">link</a></p></blockquote>"##,
                "\n<ul>\n",
                r#"<li><input type="checkbox" disabled checked> done</li>"#,
                "\n",
                r#"<li><input type="checkbox" disabled> open</li>"#,
                "\n</ul>\n<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n",
                r#"<h3 id="next-steps">Next <code>steps</code></h3>"#,
            )
        );
        assert_eq!(result.title.as_deref(), Some("Vitte"));
        assert_eq!(
            result.toc,
            vec![TocEntry {
                level: 3,
                title: "Next steps".to_owned(),
                id: "next-steps".to_owned(),
            }]
        );
    }

    #[test]
    fn test_title_only_when_enabled() {
        assert_eq!(MarkdownRenderer::new().render("# T").title, None);
    }

    #[test]
    fn test_total_on_awkward_input() {
        let inputs = [
            "",
            "\n\n\n",
            "```",
            "|",
            "|\n|-|",
            "# ",
            "&gt;",
            "> ",
            "- ",
            "- [ ]",
            "**",
            "[](",
            "[a]()",
            "\u{1A}\u{1A}",
            "`\u{1A}0\u{1A}`",
            "\r\n\t\u{0}",
            "## ü ü ü",
        ];
        for input in inputs {
            let _ = render(input);
        }
        assert_eq!(render(""), "");
        assert_eq!(render("# "), r#"<h1 id=""></h1>"#);
    }

    #[test]
    fn test_stage_names() {
        let names = stage_names();
        assert_eq!(names.first(), Some(&"escape"));
        assert_eq!(names.last(), Some(&"anchors"));
    }
}
