//! The ordered transformation pipeline.
//!
//! Every stage takes the whole block list and returns a rewritten one. Order
//! is part of the contract: later stages only see text that earlier stages
//! left as [`InlineText`], never markup they emitted.

mod anchor;
mod code;
mod heading;
mod inline;
mod list;
mod paragraph;
mod quote;
mod table;

use crate::block::{Block, InlineText, SPAN_MARK};
use crate::escape::escape_html;
use crate::heading::HeadingIds;

/// Per-document state shared between stages.
#[derive(Debug, Default)]
pub(crate) struct RenderContext {
    pub(crate) headings: HeadingIds,
}

/// One pass over the intermediate representation.
pub(crate) trait Stage: Sync {
    /// Stable name, used in diagnostics and tests.
    fn name(&self) -> &'static str;

    fn apply(&self, blocks: Vec<Block>, ctx: &mut RenderContext) -> Vec<Block>;
}

pub(crate) static PIPELINE: &[&dyn Stage] = &[
    &Escape,
    &code::FencedCode,
    &table::Tables,
    &heading::Headings,
    &quote::Blockquotes,
    &list::ChecklistItems,
    &list::BulletItems,
    &list::OrderedItems,
    &list::ListGrouping,
    &inline::InlineSpans,
    &inline::Links,
    &paragraph::Paragraphs,
    &anchor::Anchors,
];

/// Run every stage over `lines` in order.
pub(crate) fn run<'a>(lines: impl Iterator<Item = &'a str>, ctx: &mut RenderContext) -> Vec<Block> {
    let blocks: Vec<Block> = lines.map(|line| Block::Line(InlineText::new(line))).collect();
    PIPELINE
        .iter()
        .fold(blocks, |blocks, stage| stage.apply(blocks, ctx))
}

/// Rewrite every unclaimed line with `f`, leaving other blocks alone.
fn map_lines(blocks: Vec<Block>, mut f: impl FnMut(InlineText) -> Block) -> Vec<Block> {
    blocks
        .into_iter()
        .map(|block| match block {
            Block::Line(text) => f(text),
            other => other,
        })
        .collect()
}

/// Escapes `&`, `<` and `>` before any markup exists.
struct Escape;

impl Stage for Escape {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        map_lines(blocks, |text| {
            // The span marker must not survive from the source
            let markup = escape_html(&text.markup).replace(SPAN_MARK, "\u{FFFD}");
            Block::Line(InlineText::new(markup))
        })
    }
}
