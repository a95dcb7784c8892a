use std::sync::LazyLock;

use regex::Regex;

use super::{RenderContext, Stage, map_lines};
use crate::block::{Block, InlineText, ListItem};

static CHECKLIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*]\s+\[( |x|X)\]\s+(.*)$").expect("valid checklist regex")
});
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("valid bullet regex"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("valid ordered regex"));

/// `- [ ]` and `- [x]` items. Runs before [`BulletItems`] so the generic
/// bullet pattern never claims them.
pub(super) struct ChecklistItems;

impl Stage for ChecklistItems {
    fn name(&self) -> &'static str {
        "checklist-items"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        map_lines(blocks, |text| match CHECKLIST_ITEM.captures(&text.markup) {
            Some(caps) => Block::Item(ListItem {
                ordered: false,
                checked: Some(&caps[1] != " "),
                text: InlineText::new(&caps[2]),
            }),
            None => Block::Line(text),
        })
    }
}

pub(super) struct BulletItems;

impl Stage for BulletItems {
    fn name(&self) -> &'static str {
        "bullet-items"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        map_lines(blocks, |text| item(&BULLET_ITEM, false, text))
    }
}

pub(super) struct OrderedItems;

impl Stage for OrderedItems {
    fn name(&self) -> &'static str {
        "ordered-items"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        map_lines(blocks, |text| item(&ORDERED_ITEM, true, text))
    }
}

fn item(pattern: &Regex, ordered: bool, text: InlineText) -> Block {
    match pattern.captures(&text.markup) {
        Some(caps) => Block::Item(ListItem {
            ordered,
            checked: None,
            text: InlineText::new(&caps[1]),
        }),
        None => Block::Line(text),
    }
}

/// Wraps runs of adjacent items of the same kind in one list.
pub(super) struct ListGrouping;

impl Stage for ListGrouping {
    fn name(&self) -> &'static str {
        "list-grouping"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        let mut out: Vec<Block> = Vec::with_capacity(blocks.len());

        for block in blocks {
            let Block::Item(item) = block else {
                out.push(block);
                continue;
            };
            match out.last_mut() {
                Some(Block::List { ordered, items }) if *ordered == item.ordered => {
                    items.push(item);
                }
                _ => out.push(Block::List {
                    ordered: item.ordered,
                    items: vec![item],
                }),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_items(source: &str) -> Vec<Block> {
        let mut ctx = RenderContext::default();
        let blocks: Vec<Block> = source
            .lines()
            .map(|line| Block::Line(InlineText::new(line)))
            .collect();
        [
            &ChecklistItems as &dyn Stage,
            &BulletItems,
            &OrderedItems,
            &ListGrouping,
        ]
        .iter()
        .fold(blocks, |blocks, stage| stage.apply(blocks, &mut ctx))
    }

    #[test]
    fn test_checklist_before_bullets() {
        let blocks = apply_items("- [ ] todo\n- [x] done\n- plain");
        let [Block::List { ordered: false, items }] = blocks.as_slice() else {
            panic!("expected one unordered list, got {blocks:?}");
        };
        let checked: Vec<_> = items.iter().map(|item| item.checked).collect();
        assert_eq!(checked, [Some(false), Some(true), None]);
        assert_eq!(items[0].text.markup, "todo");
        assert_eq!(items[2].text.markup, "plain");
    }

    #[test]
    fn test_bullet_markers() {
        let blocks = apply_items("- a\n* b\n+ c");
        let [Block::List { items, .. }] = blocks.as_slice() else {
            panic!("expected one list, got {blocks:?}");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_kinds_are_grouped_separately() {
        let blocks = apply_items("- a\n- b\n1. one\n2. two\n- c");
        let kinds: Vec<_> = blocks
            .iter()
            .map(|block| match block {
                Block::List { ordered, items } => (*ordered, items.len()),
                other => panic!("unexpected block {other:?}"),
            })
            .collect();
        assert_eq!(kinds, [(false, 2), (true, 2), (false, 1)]);
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let blocks = apply_items("- a\n\n- b");
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_emphasis_is_not_a_bullet() {
        let blocks = apply_items("**bold** start\n---");
        assert!(blocks.iter().all(|block| matches!(block, Block::Line(_))));
    }
}
