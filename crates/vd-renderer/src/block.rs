//! Intermediate representation shared by the pipeline stages.
//!
//! The document starts as one [`Block::Line`] per source line. Each stage
//! rewrites the block list, turning lines into typed blocks. Text that still
//! needs inline processing is carried as [`InlineText`], so later stages never
//! re-match markup emitted by earlier ones.

/// Marks a code-span placeholder inside [`InlineText::markup`].
///
/// The escape stage replaces any occurrence in the source, so the marker is
/// unambiguous afterwards.
pub(crate) const SPAN_MARK: char = '\u{1A}';

/// Inline text with code spans lifted out.
///
/// `markup` holds escaped text plus any inline tags emitted so far; each code
/// span is replaced by `SPAN_MARK{index}SPAN_MARK` and kept verbatim in
/// `code_spans` until the final HTML is written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InlineText {
    pub(crate) markup: String,
    pub(crate) code_spans: Vec<String>,
}

impl InlineText {
    pub(crate) fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            code_spans: Vec::new(),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.markup.trim().is_empty() && self.code_spans.is_empty()
    }

    /// Apply a markup rewrite in place.
    pub(crate) fn rewrite(&mut self, f: impl Fn(&str) -> String) {
        self.markup = f(&self.markup);
    }

    /// Final HTML with code spans restored.
    pub(crate) fn to_html(&self) -> String {
        if self.code_spans.is_empty() {
            return self.markup.clone();
        }

        let mut html = String::with_capacity(self.markup.len());
        let mut parts = self.markup.split(SPAN_MARK);
        if let Some(first) = parts.next() {
            html.push_str(first);
        }
        // Parts alternate between a span index and the text that follows it
        while let Some(index) = parts.next() {
            match index.parse::<usize>().ok().and_then(|i| self.code_spans.get(i)) {
                Some(code) => {
                    html.push_str("<code>");
                    html.push_str(code);
                    html.push_str("</code>");
                }
                None => html.push_str(index),
            }
            if let Some(text) = parts.next() {
                html.push_str(text);
            }
        }
        html
    }
}

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// A pipe-delimited table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Table {
    pub(crate) header: Vec<InlineText>,
    pub(crate) alignments: Vec<Alignment>,
    /// Body rows keep their own cell count.
    pub(crate) rows: Vec<Vec<InlineText>>,
}

/// A heading before and after anchor assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Heading {
    pub(crate) level: u8,
    pub(crate) text: InlineText,
    pub(crate) id: Option<String>,
}

/// One list item; `checked` is set for checklist items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListItem {
    pub(crate) ordered: bool,
    pub(crate) checked: Option<bool>,
    pub(crate) text: InlineText,
}

/// A node in the intermediate representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    /// Source line not yet claimed by any stage.
    Line(InlineText),
    /// Fenced code block; `body` is escaped once and never transformed again.
    Code { lang: Option<String>, body: String },
    Table(Table),
    Heading(Heading),
    Quote(Vec<InlineText>),
    /// Ungrouped list item.
    Item(ListItem),
    List { ordered: bool, items: Vec<ListItem> },
    Paragraph(Vec<InlineText>),
}

impl Block {
    /// Visit every piece of inline text this block carries.
    pub(crate) fn for_each_inline(&mut self, f: &mut impl FnMut(&mut InlineText)) {
        match self {
            Self::Line(text) => f(text),
            Self::Code { .. } => {}
            Self::Table(table) => {
                table.header.iter_mut().for_each(&mut *f);
                for row in &mut table.rows {
                    row.iter_mut().for_each(&mut *f);
                }
            }
            Self::Heading(heading) => f(&mut heading.text),
            Self::Quote(lines) | Self::Paragraph(lines) => lines.iter_mut().for_each(f),
            Self::Item(item) => f(&mut item.text),
            Self::List { items, .. } => {
                for item in items {
                    f(&mut item.text);
                }
            }
        }
    }
}
