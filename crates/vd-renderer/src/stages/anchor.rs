use super::{RenderContext, Stage};
use crate::block::Block;
use crate::escape::plain_text;

/// Assigns every heading a unique anchor id from its plain text.
pub(super) struct Anchors;

impl Stage for Anchors {
    fn name(&self) -> &'static str {
        "anchors"
    }

    fn apply(&self, mut blocks: Vec<Block>, ctx: &mut RenderContext) -> Vec<Block> {
        for block in &mut blocks {
            if let Block::Heading(heading) = block {
                let text = plain_text(&heading.text.to_html());
                heading.id = Some(ctx.headings.assign(heading.level, &text));
            }
        }
        blocks
    }
}
