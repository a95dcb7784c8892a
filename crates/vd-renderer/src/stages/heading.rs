use std::sync::LazyLock;

use regex::Regex;

use super::{RenderContext, Stage, map_lines};
use crate::block::{Block, Heading, InlineText};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*$").expect("valid heading regex"));

/// ATX headings, levels one to six. No nesting.
pub(super) struct Headings;

impl Stage for Headings {
    fn name(&self) -> &'static str {
        "headings"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        map_lines(blocks, |text| {
            let Some(caps) = HEADING.captures(&text.markup) else {
                return Block::Line(text);
            };
            #[allow(clippy::cast_possible_truncation)] // at most six hashes
            let level = caps[1].len() as u8;
            Block::Heading(Heading {
                level,
                text: InlineText::new(&caps[2]),
                id: None,
            })
        })
    }
}
