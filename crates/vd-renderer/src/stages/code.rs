use std::sync::LazyLock;

use regex::Regex;

use super::{RenderContext, Stage};
use crate::block::Block;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```\s*([\w+-]*)").expect("valid fence regex"));

/// Collects fenced code blocks.
///
/// The body keeps the escaping done by the first stage and is never touched
/// again. A fence without a closing line runs to the end of the document.
pub(super) struct FencedCode;

impl Stage for FencedCode {
    fn name(&self) -> &'static str {
        "fenced-code"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        let mut out = Vec::with_capacity(blocks.len());
        let mut open: Option<(Option<String>, String)> = None;

        for block in blocks {
            let Block::Line(text) = block else {
                out.push(block);
                continue;
            };
            let fence = FENCE.captures(&text.markup).map(|caps| {
                caps.get(1)
                    .map(|m| m.as_str())
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_owned)
            });

            match (open.take(), fence) {
                (Some((lang, body)), Some(_)) => out.push(Block::Code { lang, body }),
                (Some((lang, mut body)), None) => {
                    body.push_str(&text.markup);
                    body.push('\n');
                    open = Some((lang, body));
                }
                (None, Some(lang)) => open = Some((lang, String::new())),
                (None, None) => out.push(Block::Line(text)),
            }
        }

        if let Some((lang, body)) = open {
            out.push(Block::Code { lang, body });
        }
        out
    }
}
