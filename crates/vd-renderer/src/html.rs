//! HTML writer for the finished block list.

use std::fmt::Write;

use crate::block::{Block, Heading, InlineText, ListItem, Table};

/// Serialize blocks to HTML, one block per line.
pub(crate) fn write_blocks(blocks: &[Block]) -> String {
    let mut out = String::with_capacity(4096);
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_block(block, &mut out);
    }
    out
}

fn write_block(block: &Block, out: &mut String) {
    match block {
        Block::Line(text) => out.push_str(&text.to_html()),
        Block::Code { lang, body } => {
            write!(
                out,
                r#"<pre><code class="language-{}">{body}</code></pre>"#,
                lang.as_deref().unwrap_or("text")
            )
            .unwrap();
        }
        Block::Table(table) => write_table(table, out),
        Block::Heading(heading) => write_heading(heading, out),
        Block::Quote(lines) => {
            out.push_str("<blockquote>");
            // Empty quote lines separate paragraphs inside the quote
            for group in lines.split(InlineText::is_blank) {
                if !group.is_empty() {
                    write_paragraph(group, out);
                }
            }
            out.push_str("</blockquote>");
        }
        Block::Item(item) => write_item(item, out),
        Block::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            writeln!(out, "<{tag}>").unwrap();
            for item in items {
                write_item(item, out);
                out.push('\n');
            }
            write!(out, "</{tag}>").unwrap();
        }
        Block::Paragraph(lines) => write_paragraph(lines, out),
    }
}

fn write_heading(heading: &Heading, out: &mut String) {
    let level = heading.level;
    match &heading.id {
        Some(id) => write!(out, r#"<h{level} id="{id}">"#).unwrap(),
        None => write!(out, "<h{level}>").unwrap(),
    }
    out.push_str(&heading.text.to_html());
    write!(out, "</h{level}>").unwrap();
}

fn write_table(table: &Table, out: &mut String) {
    out.push_str("<table><thead><tr>");
    write_cells("th", &table.header, table, out);
    out.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        write_cells("td", row, table, out);
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_cells(tag: &str, cells: &[InlineText], table: &Table, out: &mut String) {
    for (i, cell) in cells.iter().enumerate() {
        let align = table.alignments.get(i).copied().unwrap_or_default();
        write!(
            out,
            r#"<{tag} style="text-align:{}">{}</{tag}>"#,
            align.as_str(),
            cell.to_html()
        )
        .unwrap();
    }
}

fn write_item(item: &ListItem, out: &mut String) {
    out.push_str("<li>");
    match item.checked {
        Some(true) => out.push_str(r#"<input type="checkbox" disabled checked> "#),
        Some(false) => out.push_str(r#"<input type="checkbox" disabled> "#),
        None => {}
    }
    out.push_str(&item.text.to_html());
    out.push_str("</li>");
}

fn write_paragraph(lines: &[InlineText], out: &mut String) {
    out.push_str("<p>");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&line.to_html());
    }
    out.push_str("</p>");
}
