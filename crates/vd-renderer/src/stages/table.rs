use std::sync::LazyLock;

use regex::Regex;

use super::{RenderContext, Stage};
use crate::block::{Alignment, Block, InlineText, Table};

static ALIGNMENT_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid alignment regex"));

/// Detects pipe tables: a header line, an alignment row, then body lines.
pub(super) struct Tables;

impl Stage for Tables {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn apply(&self, blocks: Vec<Block>, _ctx: &mut RenderContext) -> Vec<Block> {
        let mut out = Vec::with_capacity(blocks.len());
        let mut iter = blocks.into_iter().peekable();

        while let Some(block) = iter.next() {
            let header = match &block {
                Block::Line(text) if text.markup.contains('|') => &text.markup,
                _ => {
                    out.push(block);
                    continue;
                }
            };
            let Some(alignments) = iter.peek().and_then(parse_alignments) else {
                out.push(block);
                continue;
            };

            let header = split_row(header);
            iter.next();

            let mut rows = Vec::new();
            while let Some(Block::Line(text)) = iter.peek() {
                if text.is_blank() || !text.markup.contains('|') {
                    break;
                }
                rows.push(split_row(&text.markup));
                iter.next();
            }

            out.push(Block::Table(Table {
                header,
                alignments,
                rows,
            }));
        }
        out
    }
}

/// Parse an alignment row such as `:--|:-:|--:`.
fn parse_alignments(block: &Block) -> Option<Vec<Alignment>> {
    let Block::Line(text) = block else {
        return None;
    };
    if !text.markup.contains('-') {
        return None;
    }
    cells(&text.markup)
        .map(|cell| {
            ALIGNMENT_CELL.is_match(cell).then(|| {
                match (cell.starts_with(':'), cell.ends_with(':')) {
                    (true, true) => Alignment::Center,
                    (false, true) => Alignment::Right,
                    _ => Alignment::Left,
                }
            })
        })
        .collect()
}

fn split_row(line: &str) -> Vec<InlineText> {
    cells(line).map(InlineText::new).collect()
}

/// Split a row on `|`, ignoring one leading and one trailing pipe.
fn cells(line: &str) -> impl Iterator<Item = &str> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(source: &str) -> Vec<Block> {
        let blocks = source
            .lines()
            .map(|line| Block::Line(InlineText::new(line)))
            .collect();
        Tables.apply(blocks, &mut RenderContext::default())
    }

    fn texts(cells: &[InlineText]) -> Vec<&str> {
        cells.iter().map(|cell| cell.markup.as_str()).collect()
    }

    #[test]
    fn test_alignment_markers() {
        let blocks = apply("| A | B | C |\n|:--|:-:|--:|\n| 1 | 2 | 3 |");
        let [Block::Table(table)] = blocks.as_slice() else {
            panic!("expected one table, got {blocks:?}");
        };
        assert_eq!(texts(&table.header), ["A", "B", "C"]);
        assert_eq!(
            table.alignments,
            [Alignment::Left, Alignment::Center, Alignment::Right]
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(texts(&table.rows[0]), ["1", "2", "3"]);
    }

    #[test]
    fn test_default_alignment_is_left() {
        let blocks = apply("A|B\n---|---");
        let [Block::Table(table)] = blocks.as_slice() else {
            panic!("expected one table, got {blocks:?}");
        };
        assert_eq!(table.alignments, [Alignment::Left, Alignment::Left]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_rows_keep_their_cell_count() {
        let blocks = apply("A|B\n--|--\n1\n1|2|3");
        let [Block::Table(table), Block::Line(rest), ..] = blocks.as_slice() else {
            panic!("unexpected blocks {blocks:?}");
        };
        // A line without a pipe ends the table
        assert!(table.rows.is_empty());
        assert_eq!(rest.markup, "1");

        let blocks = apply("A|B\n--|--\n1|2|3\n4");
        let Block::Table(table) = &blocks[0] else {
            panic!("expected table, got {blocks:?}");
        };
        assert_eq!(texts(&table.rows[0]), ["1", "2", "3"]);
    }

    #[test]
    fn test_pipe_without_alignment_row_is_not_a_table() {
        let blocks = apply("a | b\nplain");
        assert!(blocks.iter().all(|block| matches!(block, Block::Line(_))));
    }
}
