use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::text::text_of;

static TITLED_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[title]").unwrap());

/// Maps a simple type name to a fully-qualified path using the links that
/// appear next to it in the markup.
pub trait PathResolver {
    fn resolve(&self, type_name: &str, candidates: &[String]) -> Option<String>;
}

/// Suffix match: the first candidate ending in `.{type_name}` wins, even when
/// several candidates share that suffix.
pub struct SuffixResolver;

impl PathResolver for SuffixResolver {
    fn resolve(&self, type_name: &str, candidates: &[String]) -> Option<String> {
        let suffix = format!(".{type_name}");
        candidates.iter().find(|c| c.ends_with(&suffix)).cloned()
    }
}

pub fn resolve_path(type_name: &str, candidates: &[String]) -> Option<String> {
    SuffixResolver.resolve(type_name, candidates)
}

/// `<a title="class in java.util">List</a>` → `java.util.List`.
///
/// The package is the last word of the title; the simple name is the link text.
pub fn link_to_path(a: ElementRef) -> Option<String> {
    let title = a.value().attr("title")?;
    let package = title.split_whitespace().last()?;
    let label = text_of(a);
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(format!("{package}.{label}"))
}

/// Paths of every titled link under `el`, in document order.
pub fn link_paths(el: ElementRef) -> Vec<String> {
    el.select(&TITLED_LINK).filter_map(link_to_path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn paths(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_by_suffix() {
        let c = paths(&["java.lang.String", "java.util.List"]);
        assert_eq!(resolve_path("List", &c).as_deref(), Some("java.util.List"));
        assert_eq!(resolve_path("Unknown", &c), None);
    }

    #[test]
    fn suffix_requires_dot_boundary() {
        let c = paths(&["java.util.ArrayList"]);
        assert_eq!(resolve_path("List", &c), None);
    }

    #[test]
    fn first_match_wins_on_ambiguity() {
        let c = paths(&["java.awt.List", "java.util.List"]);
        assert_eq!(resolve_path("List", &c).as_deref(), Some("java.awt.List"));
    }

    #[test]
    fn link_paths_from_markup() {
        let doc = Html::parse_fragment(
            r#"<span class="parameters">(<a href="../util/List.html" title="interface in java.util">List</a>&lt;<a href="String.html" title="class in java.lang">String</a>&gt;&nbsp;list, <a href="x.html">Untitled</a>&nbsp;u)</span>"#,
        );
        let root = doc.root_element();
        assert_eq!(link_paths(root), paths(&["java.util.List", "java.lang.String"]));
    }
}
