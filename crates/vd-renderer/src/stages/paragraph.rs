use super::{RenderContext, Stage};
use crate::block::Block;

/// Wraps runs of remaining lines in paragraphs and drops blank lines.
pub(super) struct Paragraphs;

impl Stage for Paragraphs {
    fn name(&self) -> &'static str {
        "paragraphs"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
        // Whether the previous block was a line that opened or extended a paragraph
        let mut open = false;

        for block in blocks {
            match block {
                Block::Line(text) if text.is_blank() => open = false,
                Block::Line(text) => {
                    match out.last_mut() {
                        Some(Block::Paragraph(lines)) if open => lines.push(text),
                        _ => out.push(Block::Paragraph(vec![text])),
                    }
                    open = true;
                }
                other => {
                    out.push(other);
                    open = false;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::InlineText;

    fn apply(blocks: Vec<Block>) -> Vec<Block> {
        Paragraphs.apply(blocks, &mut RenderContext::default())
    }

    fn line(text: &str) -> Block {
        Block::Line(InlineText::new(text))
    }

    #[test]
    fn test_adjacent_lines_join() {
        let blocks = apply(vec![line("a"), line("b"), line(""), line("c")]);
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![InlineText::new("a"), InlineText::new("b")]),
                Block::Paragraph(vec![InlineText::new("c")]),
            ]
        );
    }

    #[test]
    fn test_block_between_lines_splits_paragraph() {
        let code = Block::Code {
            lang: None,
            body: String::new(),
        };
        let blocks = apply(vec![line("a"), code.clone(), line("b")]);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], code);
    }
}
