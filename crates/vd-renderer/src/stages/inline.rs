use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{RenderContext, Stage};
use crate::block::{Block, InlineText, SPAN_MARK};
use crate::escape::escape_attr;

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid code span regex"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid strong regex"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid emphasis regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));

/// Code spans, then `**strong**`, then `*em*`.
///
/// Code spans are lifted out first so emphasis and links never see their
/// content. Strong must run before emphasis since both use `*`.
pub(super) struct InlineSpans;

impl Stage for InlineSpans {
    fn name(&self) -> &'static str {
        "inline-spans"
    }

    fn apply(&self, mut blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        for block in &mut blocks {
            block.for_each_inline(&mut |text: &mut InlineText| {
                lift_code_spans(text);
                text.rewrite(|s| STRONG.replace_all(s, "<strong>$1</strong>").into_owned());
                text.rewrite(|s| EMPHASIS.replace_all(s, "<em>$1</em>").into_owned());
            });
        }
        blocks
    }
}

fn lift_code_spans(text: &mut InlineText) {
    let spans = &mut text.code_spans;
    let markup = CODE_SPAN.replace_all(&text.markup, |caps: &Captures<'_>| {
        let index = spans.len();
        spans.push(caps[1].to_owned());
        format!("{SPAN_MARK}{index}{SPAN_MARK}")
    });
    text.markup = markup.into_owned();
}

/// `[label](target)` to anchors with an attribute-safe `href`.
pub(super) struct Links;

impl Stage for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    fn apply(&self, mut blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        for block in &mut blocks {
            block.for_each_inline(&mut |text: &mut InlineText| {
                text.rewrite(|s| {
                    LINK.replace_all(s, |caps: &Captures<'_>| {
                        let target = &caps[2];
                        // A target holding a code span is not a link
                        if target.contains(SPAN_MARK) {
                            return caps[0].to_owned();
                        }
                        format!(r#"<a href="{}">{}</a>"#, escape_attr(target), &caps[1])
                    })
                    .into_owned()
                });
            });
        }
        blocks
    }
}
