//! Staged markdown to HTML renderer.
//!
//! The renderer is a fixed, ordered list of stages over a line-oriented
//! intermediate representation:
//!
//! escape → fenced code → tables → headings → blockquotes → checklist items →
//! bullet items → ordered items → list grouping → inline spans → links →
//! paragraphs → anchors
//!
//! Each stage only rewrites blocks and inline text that earlier stages left
//! unclaimed, so emitted markup is never matched twice. Rendering never fails;
//! malformed markdown degrades to plain paragraphs.
//!
//! # Example
//!
//! ```
//! use vd_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render("# Hello\n\n**Bold** text");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains("<strong>Bold</strong>"));
//! ```

mod block;
mod escape;
mod heading;
mod html;
mod renderer;
mod stages;

pub use escape::escape_html;
pub use heading::{TocEntry, slugify};
pub use renderer::{MarkdownRenderer, RenderResult, render, stage_names};
