//! Printable single-page export of one locale.
//!
//! Reads the locale's navigation from `i18n/{locale}.json` and renders every
//! listed document into its own `<section>`, in navigation order. Documents
//! that cannot be loaded get a `Missing:` section instead.

use serde::Deserialize;
use vd_renderer::{MarkdownRenderer, escape_html};

use crate::handlers::pages::valid_slug;
use crate::loader::{DocumentLoader, DocumentStatus};

/// Navigation part of a locale file. Both the `nav` and `sidebar` spellings
/// are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocaleNav {
    #[serde(alias = "sidebar")]
    nav: Vec<NavGroup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NavGroup {
    items: Vec<NavItem>,
}

#[derive(Debug, Deserialize)]
struct NavItem {
    #[serde(alias = "route")]
    slug: String,
}

/// Slugs listed in a locale file, in navigation order.
fn nav_slugs(locale_json: &str) -> Result<Vec<String>, serde_json::Error> {
    let nav: LocaleNav = serde_json::from_str(locale_json)?;
    Ok(nav
        .nav
        .into_iter()
        .flat_map(|group| group.items)
        .map(|item| item.slug)
        .collect())
}

/// Build the printable HTML document for `locale`.
///
/// Returns `None` when the locale file cannot be loaded or parsed.
pub(crate) async fn build(loader: &DocumentLoader, locale: &str) -> Option<String> {
    let locale_path = format!("i18n/{locale}.json");
    let locale_json = loader.fetch_resource(&locale_path).await?;
    let slugs = match nav_slugs(&locale_json) {
        Ok(slugs) => slugs,
        Err(err) => {
            tracing::warn!(path = %locale_path, error = %err, "Invalid locale navigation");
            return None;
        }
    };

    let mut sections = Vec::with_capacity(slugs.len());
    for slug in &slugs {
        sections.push(section(loader, locale, slug).await);
    }

    Some(format!(
        "<!doctype html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{lang}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        lang = escape_html(locale),
        body = sections.join("\n"),
    ))
}

async fn section(loader: &DocumentLoader, locale: &str, slug: &str) -> String {
    let path = DocumentLoader::document_path(locale, slug);
    let title = escape_html(slug);

    if valid_slug(slug) {
        let document = loader.load_unrouted(locale, slug).await;
        if document.status != DocumentStatus::Missing {
            let html = MarkdownRenderer::new().render(&document.text).html;
            let id = title.replace('"', "&quot;");
            return format!(r#"<section id="{id}"><h1>{title}</h1>{html}</section>"#);
        }
    }

    tracing::debug!(path = %path, "Printable page missing");
    format!(
        "<section><h1>{title}</h1><p>Missing: {}</p></section>",
        escape_html(&path)
    )
}
