use scraper::{ElementRef, Selector};

/// Collapse whitespace runs to a single space and trim. Absent input stays
/// absent, and so does input that is blank after trimming.
pub fn clean(s: Option<&str>) -> Option<String> {
    let s = s?;
    let out = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Raw text content of an element, like DOM `textContent`.
pub fn text_of(el: ElementRef) -> String {
    el.text().collect()
}

/// First descendant matching `sel`.
pub fn first<'a>(el: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.select(sel).next()
}

/// Cleaned text of the first descendant matching `sel`.
pub fn clean_text(el: ElementRef, sel: &Selector) -> Option<String> {
    first(el, sel).and_then(|e| clean(Some(&text_of(e))))
}

/// Whitespace-separated modifier tokens.
pub fn tokens(el: ElementRef) -> Vec<String> {
    text_of(el).split_whitespace().map(str::to_string).collect()
}

/// Text after the first `" - "` separator, as used by note entries of the
/// form `<code>name</code> - description`. Later separators are part of the
/// description and are kept.
pub fn after_dash(s: &str) -> Option<String> {
    clean(s.split_once(" - ").map(|(_, rest)| rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn clean_collapses_whitespace() {
        assert_eq!(
            clean(Some("  a \n\t b\u{a0}c  ")).as_deref(),
            Some("a b c")
        );
    }

    #[test]
    fn clean_passes_none_through() {
        assert_eq!(clean(None), None);
    }

    #[test]
    fn clean_blank_is_none() {
        assert_eq!(clean(Some(" \n ")), None);
    }

    #[test]
    fn after_dash_keeps_rest() {
        assert_eq!(
            after_dash("index - the index - zero based").as_deref(),
            Some("the index - zero based")
        );
        assert_eq!(after_dash("no separator"), None);
    }

    #[test]
    fn tokens_split_modifiers() {
        let doc = Html::parse_fragment("<span class=\"modifiers\">public static&nbsp;final </span>");
        let sel = Selector::parse(".modifiers").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(tokens(el), vec!["public", "static", "final"]);
    }
}
