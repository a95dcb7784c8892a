use std::sync::LazyLock;

use regex::Regex;

use super::{RenderContext, Stage};
use crate::block::{Block, InlineText};

// Runs after escaping, so the marker is `&gt;`
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&gt;(?:\s(.*))?$").expect("valid quote regex"));

/// Groups consecutive `>` lines into one blockquote.
pub(super) struct Blockquotes;

impl Stage for Blockquotes {
    fn name(&self) -> &'static str {
        "blockquotes"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        let mut out: Vec<Block> = Vec::with_capacity(blocks.len());

        for block in blocks {
            let quoted = match &block {
                Block::Line(text) => QUOTE.captures(&text.markup).map(|caps| {
                    InlineText::new(caps.get(1).map_or("", |m| m.as_str().trim_end()))
                }),
                _ => None,
            };
            match (quoted, out.last_mut()) {
                (Some(line), Some(Block::Quote(lines))) => lines.push(line),
                (Some(line), _) => out.push(Block::Quote(vec![line])),
                (None, _) => out.push(block),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(source: &str) -> Vec<Block> {
        let blocks = source
            .lines()
            .map(|line| Block::Line(InlineText::new(line)))
            .collect();
        Blockquotes.apply(blocks, &mut RenderContext::default())
    }

    #[test]
    fn test_consecutive_lines_grouped() {
        let blocks = apply("&gt; first\n&gt;\n&gt; second\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Quote(vec![
                    InlineText::new("first"),
                    InlineText::new(""),
                    InlineText::new("second"),
                ]),
                Block::Line(InlineText::new("after")),
            ]
        );
    }

    #[test]
    fn test_separated_quotes_stay_apart() {
        let blocks = apply("&gt; a\n\n&gt; b");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], Block::Quote(_)));
        assert!(matches!(blocks[2], Block::Quote(_)));
    }

    #[test]
    fn test_marker_needs_space() {
        let blocks = apply("&gt;no");
        assert!(matches!(blocks[0], Block::Line(_)));
    }
}
