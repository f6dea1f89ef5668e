use std::sync::LazyLock;

use anyhow::{anyhow, bail, Result};
use scraper::{Html, Selector};
use tracing::debug;

use super::members::{deprecation, extract_constructor, extract_field, extract_method};
use super::notes::first_note;
use super::text::{clean, clean_text, first, text_of, tokens};
use super::types::{split_type_params, strip_annotations, strip_generics};
use super::xref::link_to_path;
use crate::model::{ApiObject, ObjectKind};

selector!(MODULE_LINK, r#"main .sub-title [href*="module"]"#);
selector!(PACKAGE_LINK, r#"main .sub-title [href*="package"]"#);
selector!(TYPE_MODIFIERS, ".class-description > .type-signature > .modifiers");
selector!(TYPE_NAME, ".class-description > .type-signature > .type-name-label");
selector!(INHERITANCE, r#"main > [title="Inheritance Tree"] .inheritance"#);
selector!(EXTENDS_CLASS, r#".type-signature > .extends-implements [title^="class in"]"#);
selector!(IMPLEMENTS, r#".type-signature > .extends-implements [title^="interface in"]"#);
selector!(TYPE_DEPRECATION, ".class-description > .deprecation-block");
selector!(TYPE_BLOCK, ".class-description > .block");
selector!(TYPE_NOTES, ".class-description .notes");
selector!(CONSTRUCTORS, ".constructor-details .member-list li");
selector!(METHODS, ".method-details .member-list li");
selector!(FIELDS, ".field-details .member-list li");
selector!(CONSTANTS, ".constant-details .member-list li");

/// Build the [`ApiObject`] for one parsed type page.
///
/// Package, type modifiers and type name are required; a page without them
/// is not a type page and yields an error. Everything else degrades to
/// `None` or an empty list.
pub fn extract_object(doc: &Html) -> Result<ApiObject> {
    let root = doc.root_element();

    let module = clean_text(root, &MODULE_LINK);
    let package =
        clean_text(root, &PACKAGE_LINK).ok_or_else(|| anyhow!("no package link in page header"))?;
    let modifiers = tokens(
        first(root, &TYPE_MODIFIERS).ok_or_else(|| anyhow!("no modifiers in type signature"))?,
    );
    let label = first(root, &TYPE_NAME)
        .map(|e| strip_annotations(&text_of(e)))
        .ok_or_else(|| anyhow!("no type name in type signature"))?;
    let name = strip_generics(&label);
    if name.is_empty() {
        bail!("empty type name in type signature");
    }
    let type_params = label
        .find('<')
        .map(|i| split_type_params(&label[i..]))
        .unwrap_or_default();

    // The innermost entry of the inheritance tree is this type, fully qualified.
    let path = root
        .select(&INHERITANCE)
        .last()
        .map(|e| strip_generics(&text_of(e)))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| format!("{package}.{name}"));

    // Class pages carry several notes lists ("All Implemented Interfaces:"
    // comes first), so every one of them is searched for the label.
    let since = root
        .select(&TYPE_NOTES)
        .find_map(|notes| first_note(Some(notes), "Since:"))
        .and_then(|dd| clean(Some(&text_of(dd))));

    let obj = ApiObject {
        kind: ObjectKind::from_modifiers(&modifiers),
        module,
        package: Some(package),
        extends: root.select(&EXTENDS_CLASS).find_map(link_to_path),
        implements: root.select(&IMPLEMENTS).filter_map(link_to_path).collect(),
        deprecation: first(root, &TYPE_DEPRECATION).map(deprecation),
        description: clean_text(root, &TYPE_BLOCK),
        since,
        constructors: root.select(&CONSTRUCTORS).filter_map(extract_constructor).collect(),
        methods: root.select(&METHODS).filter_map(extract_method).collect(),
        fields: root.select(&FIELDS).filter_map(extract_field).collect(),
        constants: root.select(&CONSTANTS).filter_map(extract_field).collect(),
        name,
        type_params,
        path,
        modifiers,
    };

    debug!(
        "Extracted {} ({} constructors, {} methods, {} fields, {} constants)",
        obj.path,
        obj.constructors.len(),
        obj.methods.len(),
        obj.fields.len(),
        obj.constants.len()
    );
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::resolve_object;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}")).unwrap()
    }

    #[test]
    fn class_page() {
        let obj = resolve_object(&fixture("foo.html")).unwrap();
        assert_eq!(obj.kind, ObjectKind::Class);
        assert_eq!(obj.module.as_deref(), Some("demo.base"));
        assert_eq!(obj.package.as_deref(), Some("com.example.widgets"));
        assert_eq!(obj.name, "Foo");
        assert!(obj.type_params.is_empty());
        assert_eq!(obj.path, "com.example.widgets.Foo");
        assert_eq!(obj.modifiers, vec!["public", "final", "class"]);
        assert_eq!(obj.extends.as_deref(), Some("com.example.base.Bar"));
        assert_eq!(obj.implements, vec!["com.example.api.Baz", "com.example.api.Qux"]);
        assert_eq!(obj.since.as_deref(), Some("1.4"));
        assert_eq!(
            obj.description.as_deref(),
            Some("A widget that frobs things. Instances are immutable.")
        );
        assert!(obj.deprecation.is_none());
    }

    #[test]
    fn class_page_members() {
        let obj = resolve_object(&fixture("foo.html")).unwrap();

        assert_eq!(obj.constructors.len(), 2);
        assert!(obj.constructors[0].params.is_empty());
        let ctor = &obj.constructors[1];
        assert_eq!(ctor.params[0].name, "name");
        assert_eq!(ctor.params[0].ty.path.as_deref(), Some("java.lang.String"));
        assert_eq!(ctor.params[0].description.as_deref(), Some("the display name"));
        assert_eq!(ctor.throws[0].path, "java.lang.IllegalArgumentException");

        // The nested <li> inside a method description is not a member.
        assert_eq!(obj.methods.len(), 2);
        let size = &obj.methods[0];
        assert_eq!(size.name, "size");
        let ret = size.returns.as_ref().unwrap();
        assert_eq!(ret.ty.name, "int");
        assert_eq!(ret.description.as_deref(), Some("the number of parts"));

        let frob = &obj.methods[1];
        assert_eq!(frob.name, "frob");
        assert_eq!(frob.params.len(), 2);
        assert_eq!(frob.params[0].ty.path.as_deref(), Some("com.example.base.Bar"));
        assert!(frob.params[1].ty.is_array);
        assert!(frob.deprecation.is_some());

        assert_eq!(obj.fields.len(), 1);
        assert_eq!(obj.fields[0].name, "label");
        assert_eq!(obj.constants.len(), 1);
        assert_eq!(obj.constants[0].name, "MAX_PARTS");
        assert_eq!(obj.constants[0].ty.name, "long");
    }

    #[test]
    fn generic_interface_page() {
        let obj = resolve_object(&fixture("registry.html")).unwrap();
        assert_eq!(obj.kind, ObjectKind::Interface);
        assert_eq!(obj.name, "Registry");
        assert_eq!(obj.type_params, vec!["K"]);
        assert_eq!(obj.module, None);
        // No inheritance tree on interface pages: synthesized from package + name.
        assert_eq!(obj.path, "com.example.api.Registry");
        assert_eq!(obj.extends, None);
        assert_eq!(obj.implements, vec!["com.example.api.Baz"]);
        let d = obj.deprecation.as_ref().unwrap();
        assert_eq!(d.title.as_deref(), Some("Deprecated, for removal: This API element is subject to removal in a future version."));
        assert_eq!(d.description.as_deref(), Some("Use Catalog instead."));

        let lookup = &obj.methods[0];
        assert_eq!(lookup.type_params, vec!["T extends Baz"]);
        let ret = lookup.returns.as_ref().unwrap();
        assert_eq!(ret.ty.name, "Optional");
        assert_eq!(ret.ty.path.as_deref(), Some("java.util.Optional"));
        assert_eq!(ret.ty.params[0].name, "T");
    }

    #[test]
    fn nested_type_path_from_inheritance() {
        let obj = resolve_object(&fixture("entry.html")).unwrap();
        assert_eq!(obj.kind, ObjectKind::Enum);
        assert_eq!(obj.name, "Foo.Mode");
        assert_eq!(obj.path, "com.example.widgets.Foo.Mode");
        assert_eq!(obj.extends.as_deref(), Some("java.lang.Enum"));
        assert_eq!(obj.constants.len(), 2);
    }

    #[test]
    fn non_type_page_is_an_error() {
        let err = resolve_object("<html><body><main><h1>Index</h1></main></body></html>");
        assert!(err.is_err());
    }
}
