//! `vd render` command implementation.

use std::path::PathBuf;

use clap::Args;
use vd_renderer::MarkdownRenderer;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Print title, table of contents and HTML as JSON.
    #[arg(long)]
    json: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let markdown = std::fs::read_to_string(&self.file).map_err(|e| {
            CliError::Validation(format!("Cannot read {}: {e}", self.file.display()))
        })?;

        let rendered = render(&markdown, self.json)?;
        Output::new().document(&rendered)?;
        Ok(())
    }
}

/// Render `markdown` as HTML, or as a JSON document with title and toc.
fn render(markdown: &str, json: bool) -> Result<String, CliError> {
    if json {
        let result = MarkdownRenderer::new()
            .with_title_extraction()
            .render(markdown);
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(vd_renderer::render(markdown))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_html() {
        assert_eq!(
            render("# Hi\n\nThere", false).unwrap(),
            "<h1 id=\"hi\">Hi</h1>\n<p>There</p>"
        );
    }

    #[test]
    fn test_render_json() {
        let output = render("# Guide\n\n## Setup", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["title"], "Guide");
        assert_eq!(value["toc"][0]["id"], "setup");
        assert!(value["html"].as_str().unwrap().contains("<h2 id=\"setup\">"));
    }
}
