//! Type signature parsing.
//!
//! Grammar, over text with annotations already removed:
//!
//! ```text
//! type  := name suffix* [ "<" args ">" ] suffix*
//! args  := arg ( "," arg )*
//! arg   := name [ ("extends" | "super") name ]
//! name  := ident ( "." ident )* | "?"
//! suffix := "[]" | "..."
//! ```
//!
//! Generic arguments are parsed one level deep only. An argument's own
//! generic list (`List<Integer>` inside `Map<String, List<Integer>>`) is
//! skipped, so the argument is recorded as `List` with no parameters.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{BoundKind, TypeParam, TypeReference};

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[\w.]+").unwrap());

/// Parse a raw signature string into a [`TypeReference`] with `path` unset.
/// Returns `None` when no type name is present.
pub fn parse_type(raw: &str) -> Option<TypeReference> {
    let stripped = strip_annotations(raw);
    let s = stripped.trim();
    if s.is_empty() {
        return None;
    }

    let mut cur = Cursor::new(s);
    cur.skip_to_name();
    let name = cur.name()?;
    let mut is_array = cur.array_suffix();
    let params = if cur.eat('<') { cur.args() } else { Vec::new() };
    is_array |= cur.array_suffix();

    Some(TypeReference {
        name,
        is_array,
        params,
        path: None,
    })
}

/// Remove `@name` annotation tokens and the zero-width spaces the doclet
/// inserts after commas in generic lists.
pub fn strip_annotations(s: &str) -> String {
    ANNOTATION_RE.replace_all(s, "").replace('\u{200b}', "")
}

/// Strip the trailing generic argument list from a display name
/// (`ArrayList<E>` → `ArrayList`).
pub fn strip_generics(s: &str) -> String {
    match s.find('<') {
        Some(i) => s[..i].trim().to_string(),
        None => s.trim().to_string(),
    }
}

/// Split on commas that are not nested inside `<...>`.
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// `<T extends Comparable<? super T>, U>` → `["T extends Comparable<? super T>", "U"]`.
pub fn split_type_params(raw: &str) -> Vec<String> {
    let s = raw.trim();
    let s = s.strip_prefix('<').unwrap_or(s);
    let s = s.strip_suffix('>').unwrap_or(s);
    split_top_level(s)
        .into_iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume a keyword only when it is not the prefix of a longer name.
    fn eat_keyword(&mut self, kw: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        if rest.starts_with(kw) && !rest[kw.len()..].chars().next().is_some_and(is_ident_char) {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn skip_to_name(&mut self) {
        while let Some(c) = self.peek() {
            if is_ident_char(c) || c == '?' {
                break;
            }
            self.bump();
        }
    }

    fn name(&mut self) -> Option<String> {
        self.skip_ws();
        if self.peek() == Some('?') {
            self.bump();
            return Some("?".to_string());
        }
        let start = self.pos;
        loop {
            let mut chars = self.rest().chars();
            match chars.next() {
                Some(c) if is_ident_char(c) => self.bump(),
                // A dot continues a qualified name; "..." is a varargs marker.
                Some('.') if chars.next().is_some_and(is_ident_char) && self.pos > start => {
                    self.bump()
                }
                _ => break,
            }
        }
        let name = &self.src[start..self.pos];
        (!name.is_empty()).then(|| name.to_string())
    }

    fn array_suffix(&mut self) -> bool {
        let mut found = false;
        loop {
            if self.eat_str("...") {
                found = true;
            } else if self.eat_str("[") {
                self.eat(']');
                found = true;
            } else {
                return found;
            }
        }
    }

    /// Parse arguments after an opening `<`, consuming the closing `>`.
    fn args(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        loop {
            if let Some(p) = self.arg() {
                params.push(p);
            }
            self.skip_to_separator();
            if self.eat(',') {
                continue;
            }
            self.eat('>');
            return params;
        }
    }

    fn arg(&mut self) -> Option<TypeParam> {
        let name = self.name()?;
        self.skip_nested_list();
        self.array_suffix();

        let kind = if self.eat_keyword("extends") {
            BoundKind::Extends
        } else if self.eat_keyword("super") {
            BoundKind::Super
        } else {
            return Some(TypeParam::unbounded(name));
        };
        match self.name() {
            Some(bound) => Some(TypeParam::bounded(name, kind, bound)),
            None => Some(TypeParam::unbounded(name)),
        }
    }

    /// Skip a generic list directly at the cursor. Nested arguments are
    /// beyond the supported depth and are discarded.
    fn skip_nested_list(&mut self) {
        self.skip_ws();
        if self.peek() != Some('<') {
            return;
        }
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Advance to the next `,` or `>` that belongs to the current list.
    fn skip_to_separator(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '<' => depth += 1,
                '>' if depth == 0 => return,
                '>' => depth -= 1,
                ',' if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name() {
        let t = parse_type("String").unwrap();
        assert_eq!(t.name, "String");
        assert!(!t.is_array);
        assert!(t.params.is_empty());
        assert_eq!(t.path, None);
    }

    #[test]
    fn primitive_array() {
        let t = parse_type("int[]").unwrap();
        assert_eq!(t.name, "int");
        assert!(t.is_array);
        assert!(t.params.is_empty());
    }

    #[test]
    fn generic_with_wildcard_bound() {
        let t = parse_type("Map<String, ? extends Number>").unwrap();
        assert_eq!(t.name, "Map");
        assert_eq!(
            t.params,
            vec![
                TypeParam::unbounded("String"),
                TypeParam::bounded("?", BoundKind::Extends, "Number"),
            ]
        );
    }

    #[test]
    fn super_bound() {
        let t = parse_type("Comparator<? super T>").unwrap();
        assert_eq!(t.params, vec![TypeParam::bounded("?", BoundKind::Super, "T")]);
    }

    #[test]
    fn annotations_are_stripped() {
        let t = parse_type("@Nullable @java.lang.Deprecated Object").unwrap();
        assert_eq!(t.name, "Object");
        assert!(parse_type("@Nullable").is_none());
        assert!(parse_type("   ").is_none());
    }

    #[test]
    fn qualified_and_nested_names() {
        assert_eq!(parse_type("Map.Entry<K, V>").unwrap().name, "Map.Entry");
        assert_eq!(parse_type("java.util.List").unwrap().name, "java.util.List");
    }

    #[test]
    fn varargs_count_as_array() {
        let t = parse_type("String...").unwrap();
        assert_eq!(t.name, "String");
        assert!(t.is_array);
    }

    #[test]
    fn array_after_generics() {
        let t = parse_type("List<String>[]").unwrap();
        assert_eq!(t.name, "List");
        assert!(t.is_array);
        assert_eq!(t.params, vec![TypeParam::unbounded("String")]);
    }

    #[test]
    fn nested_generics_one_level() {
        let t = parse_type("Map<String, List<Integer>>").unwrap();
        assert_eq!(
            t.params,
            vec![TypeParam::unbounded("String"), TypeParam::unbounded("List")]
        );
    }

    #[test]
    fn nested_bound_is_truncated() {
        let t = parse_type("Class<? extends Comparable<? super T>>").unwrap();
        assert_eq!(
            t.params,
            vec![TypeParam::bounded("?", BoundKind::Extends, "Comparable")]
        );
    }

    #[test]
    fn nameless_argument_is_dropped() {
        let t = parse_type("Foo<, Bar>").unwrap();
        assert_eq!(t.params, vec![TypeParam::unbounded("Bar")]);
    }

    #[test]
    fn keyword_prefix_is_not_a_bound() {
        let t = parse_type("Foo<T extendsX>").unwrap();
        assert_eq!(t.params, vec![TypeParam::unbounded("T")]);
    }

    #[test]
    fn names_never_carry_whitespace_or_annotations() {
        for raw in [" @A int ", "\n@x.y.Z List<@B String>", "  Map < K , V > "] {
            let t = parse_type(raw).unwrap();
            assert!(!t.name.contains('@'));
            assert_eq!(t.name, t.name.trim());
        }
    }

    #[test]
    fn zero_width_spaces_are_ignored() {
        let t = parse_type("Map<K,\u{200b}V>").unwrap();
        assert_eq!(t.params, vec![TypeParam::unbounded("K"), TypeParam::unbounded("V")]);
    }

    #[test]
    fn strip_generics_drops_suffix() {
        assert_eq!(strip_generics("ArrayList<E>"), "ArrayList");
        assert_eq!(strip_generics(" Foo "), "Foo");
    }

    #[test]
    fn type_param_list() {
        assert_eq!(
            split_type_params("<K extends Comparable<? super K>,\n V>"),
            vec!["K extends Comparable<? super K>", "V"]
        );
        assert!(split_type_params("<>").is_empty());
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(
            split_top_level("Map<K, V> m, int n"),
            vec!["Map<K, V> m", " int n"]
        );
    }
}
