use std::collections::HashMap;

use crate::model::ApiObject;

/// Identifier used when no path is known.
pub const ANY: &str = "any";

/// Read-only lookup of extracted objects by fully-qualified path.
///
/// Built once after extraction finishes; on duplicate paths the first object
/// in corpus order wins.
pub struct Registry<'a> {
    by_path: HashMap<&'a str, &'a ApiObject>,
}

impl<'a> Registry<'a> {
    pub fn new(objects: &'a [ApiObject]) -> Self {
        let mut by_path = HashMap::with_capacity(objects.len());
        for obj in objects {
            by_path.entry(obj.path.as_str()).or_insert(obj);
        }
        Registry { by_path }
    }

    pub fn get(&self, path: &str) -> Option<&'a ApiObject> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }
}

/// Short identifier for a fully-qualified path: the lower-cased initials of
/// the package (and enclosing-type) segments followed by the simple name.
///
/// `java.util.Map.Entry` registered with name `Map.Entry` → `juMapEntry`;
/// the same path unregistered → `jumEntry`.
pub fn synthesize(path: Option<&str>, registry: &Registry) -> String {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return ANY.to_string();
    };

    if let Some(obj) = registry.get(path) {
        let suffix = format!(".{}", obj.name);
        let prefix = obj.path.strip_suffix(&suffix).unwrap_or(&obj.path);
        let mut id = initials(prefix.split('.'));
        id.push_str(&obj.name.replace('.', ""));
        return id;
    }

    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or_default();
    let mut id = initials(segments.into_iter());
    id.push_str(last);
    id
}

fn initials<'s>(segments: impl Iterator<Item = &'s str>) -> String {
    segments
        .filter_map(|s| s.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectKind;

    fn object(path: &str, name: &str) -> ApiObject {
        ApiObject {
            kind: ObjectKind::Class,
            module: None,
            package: None,
            name: name.to_string(),
            type_params: vec![],
            path: path.to_string(),
            modifiers: vec![],
            extends: None,
            implements: vec![],
            deprecation: None,
            description: None,
            since: None,
            constructors: vec![],
            methods: vec![],
            fields: vec![],
            constants: vec![],
        }
    }

    #[test]
    fn registered_paths_do_not_collide() {
        let objs = vec![object("a.b.Widget", "Widget"), object("x.y.Widget", "Widget")];
        let reg = Registry::new(&objs);
        assert_eq!(synthesize(Some("a.b.Widget"), &reg), "abWidget");
        assert_eq!(synthesize(Some("x.y.Widget"), &reg), "xyWidget");
    }

    #[test]
    fn registered_nested_name_drops_dots() {
        let objs = vec![object("java.util.Map.Entry", "Map.Entry")];
        let reg = Registry::new(&objs);
        assert_eq!(synthesize(Some("java.util.Map.Entry"), &reg), "juMapEntry");
    }

    #[test]
    fn unregistered_uses_all_but_last_segment() {
        let reg = Registry::new(&[]);
        assert_eq!(synthesize(Some("java.util.Map.Entry"), &reg), "jumEntry");
        assert_eq!(synthesize(Some("Widget"), &reg), "Widget");
    }

    #[test]
    fn missing_path_is_any() {
        let reg = Registry::new(&[]);
        assert_eq!(synthesize(None, &reg), ANY);
        assert_eq!(synthesize(Some(""), &reg), ANY);
    }

    #[test]
    fn deterministic() {
        let objs = vec![object("com.Example.Thing", "Thing")];
        let reg = Registry::new(&objs);
        let a = synthesize(Some("com.Example.Thing"), &reg);
        let b = synthesize(Some("com.Example.Thing"), &reg);
        assert_eq!(a, b);
        assert_eq!(a, "ceThing");
    }

    #[test]
    fn first_object_wins_on_duplicate_path() {
        let objs = vec![object("p.q.Dup", "Dup"), object("p.q.Dup", "q.Dup")];
        let reg = Registry::new(&objs);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("p.q.Dup").map(|o| o.name.as_str()), Some("Dup"));
    }
}
