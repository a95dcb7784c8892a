//! Heading anchors, table of contents and title tracking.

use std::collections::{HashMap, HashSet};

/// Maximum length of a generated anchor id.
const MAX_SLUG_LEN: usize = 80;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Convert heading text to an anchor slug.
///
/// Lowercases and trims the text, drops every character that is not an ASCII
/// word character, whitespace or `-`, turns each whitespace run into a single
/// dash and truncates the result to 80 characters.
///
/// # Examples
///
/// ```
/// use vd_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's New?"), "whats-new");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c.to_ascii_lowercase());
            in_space = false;
        }
    }

    // Only ASCII survives, so byte truncation is on a char boundary
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// Assigns unique ids and collects title and ToC while walking headings.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    /// Every id handed out so far, suffixed ones included.
    issued: HashSet<String>,
    /// Next suffix to try per base slug.
    next_suffix: HashMap<String, usize>,
    title: Option<String>,
    toc: Vec<TocEntry>,
}

impl HeadingIds {
    /// Register a heading and return its anchor id.
    ///
    /// Repeated slugs get the first free `-1`, `-2`, ... suffix in document
    /// order. Ids are unique even when a heading's own slug looks suffixed.
    pub(crate) fn assign(&mut self, level: u8, text: &str) -> String {
        let base_id = slugify(text);
        let id = if self.issued.contains(&base_id) {
            let suffix = self.next_suffix.entry(base_id.clone()).or_insert(1);
            loop {
                let candidate = format!("{base_id}-{suffix}");
                *suffix += 1;
                if !self.issued.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base_id
        };
        self.issued.insert(id.clone());

        let title = text.trim();
        match level {
            1 if self.title.is_none() => self.title = Some(title.to_owned()),
            2 | 3 => self.toc.push(TocEntry {
                level,
                title: title.to_owned(),
                id: id.clone(),
            }),
            _ => {}
        }
        id
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<TocEntry>) {
        (self.title, self.toc)
    }
}
