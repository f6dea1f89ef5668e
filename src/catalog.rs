use std::sync::LazyLock;

use anyhow::{Context, Result};
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::info;

pub const INDEX_URL: &str = "https://docs.oracle.com/en/java/javase/21/docs/api/allclasses-index.html";

static CLASS_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#all-classes-table .col-first a[title]").unwrap());

/// Fetch the all-classes index and return `(url, name)` pairs in index order.
pub async fn fetch_catalog(client: &reqwest::Client, index_url: &str) -> Result<Vec<(String, String)>> {
    let base = Url::parse(index_url).with_context(|| format!("Invalid index URL {}", index_url))?;

    info!("Fetching class index: {}", index_url);
    let html = client
        .get(base.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
        .context("Failed to fetch class index")?;

    let pages = parse_catalog(&html, &base)?;
    info!("Type pages in index: {}", pages.len());
    Ok(pages)
}

/// Type-page links of an index document, joined onto `base`. Duplicate
/// targets keep their first position.
pub fn parse_catalog(html: &str, base: &Url) -> Result<Vec<(String, String)>> {
    let doc = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();
    let mut pages = Vec::new();

    for a in doc.select(&CLASS_LINK) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        let url = base
            .join(href)
            .with_context(|| format!("Bad link {} in class index", href))?;
        let name = a.text().collect::<String>().trim().to_string();
        if seen.insert(url.to_string()) {
            pages.push((url.to_string(), name));
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_links_joined_in_order() {
        let html = std::fs::read_to_string("tests/fixtures/allclasses-index.html").unwrap();
        let base = Url::parse("https://docs.example.org/api/allclasses-index.html").unwrap();
        let pages = parse_catalog(&html, &base).unwrap();

        assert_eq!(
            pages,
            vec![
                (
                    "https://docs.example.org/api/demo.base/com/example/widgets/Foo.html".to_string(),
                    "Foo".to_string()
                ),
                (
                    "https://docs.example.org/api/demo.base/com/example/widgets/Foo.Mode.html".to_string(),
                    "Foo.Mode".to_string()
                ),
                (
                    "https://docs.example.org/api/demo.base/com/example/api/Registry.html".to_string(),
                    "Registry".to_string()
                ),
            ]
        );
    }

    #[test]
    fn description_links_are_not_pages() {
        let html = std::fs::read_to_string("tests/fixtures/allclasses-index.html").unwrap();
        let base = Url::parse("https://docs.example.org/api/").unwrap();
        let pages = parse_catalog(&html, &base).unwrap();
        assert!(pages.iter().all(|(url, _)| !url.ends_with("Baz.html")));
    }

    #[test]
    fn empty_index() {
        let base = Url::parse("https://docs.example.org/").unwrap();
        assert!(parse_catalog("<html></html>", &base).unwrap().is_empty());
    }
}
