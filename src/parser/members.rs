//! Per-member extraction for the constructor, method, field and constant
//! detail regions. Each extractor takes one `<li>` of a `.member-list`.
//! `None` is a structural skip: the fragment is not a member (member lists
//! also contain nested `<li>`s from descriptions, which carry no signature).

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};
use tracing::debug;

use super::notes::{extract_notes, first_note};
use super::text::{after_dash, clean, clean_text, first, text_of, tokens};
use super::types::{parse_type, split_top_level, split_type_params, strip_annotations};
use super::xref::{link_paths, link_to_path, resolve_path};
use crate::model::{
    Constructor, Deprecation, Field, Method, Parameter, ReturnType, ThrowsEntry, TypeReference,
};

selector!(MODIFIERS, ".member-signature .modifiers");
selector!(ELEMENT_NAME, ".member-signature .element-name");
selector!(PARAMETERS, ".member-signature .parameters");
selector!(RETURN_TYPE, ".member-signature .return-type");
selector!(TYPE_PARAMETERS, ".member-signature .type-parameters");
selector!(NOTES, ".notes");
selector!(BLOCK, ".block");
selector!(DEPRECATION_BLOCK, ".deprecation-block");
selector!(DEPRECATED_LABEL, ".deprecated-label");
selector!(DEPRECATION_COMMENT, ".deprecation-comment");
selector!(CODE, "code");
selector!(CODE_LINK, "code a");

/// Parts every member variant shares.
struct Common<'a> {
    modifiers: Vec<String>,
    description: Option<String>,
    deprecation: Option<Deprecation>,
    notes: Option<ElementRef<'a>>,
}

fn common(li: ElementRef<'_>) -> Option<Common<'_>> {
    let modifiers = tokens(first(li, &MODIFIERS)?);
    Some(Common {
        modifiers,
        description: clean_text(li, &BLOCK),
        deprecation: first(li, &DEPRECATION_BLOCK).map(deprecation),
        notes: first(li, &NOTES),
    })
}

/// Deprecation details from a `.deprecation-block`.
pub fn deprecation(block: ElementRef) -> Deprecation {
    Deprecation {
        title: clean_text(block, &DEPRECATED_LABEL),
        description: clean_text(block, &DEPRECATION_COMMENT),
    }
}

/// Parse the type in `el` and resolve it against the links inside `el`.
pub fn resolved_type(el: ElementRef) -> Option<TypeReference> {
    let mut ty = parse_type(&text_of(el))?;
    ty.path = resolve_path(&ty.name, &link_paths(el));
    Some(ty)
}

pub fn extract_constructor(li: ElementRef) -> Option<Constructor> {
    let c = common(li)?;
    Some(Constructor {
        params: extract_params(first(li, &PARAMETERS), c.notes),
        api_note: api_note(c.notes),
        throws: extract_throws(c.notes),
        modifiers: c.modifiers,
        description: c.description,
        deprecation: c.deprecation,
    })
}

pub fn extract_method(li: ElementRef) -> Option<Method> {
    let c = common(li)?;
    let Some(name) = clean_text(li, &ELEMENT_NAME) else {
        debug!("Method signature without a name, skipping");
        return None;
    };

    let type_params = first(li, &TYPE_PARAMETERS)
        .map(|e| split_type_params(&strip_annotations(&text_of(e))))
        .unwrap_or_default();

    let returns = first(li, &RETURN_TYPE).and_then(resolved_type).map(|ty| ReturnType {
        ty,
        description: first_note(c.notes, "Returns:").and_then(|dd| clean(Some(&text_of(dd)))),
    });

    Some(Method {
        name,
        params: extract_params(first(li, &PARAMETERS), c.notes),
        type_params,
        returns,
        api_note: api_note(c.notes),
        throws: extract_throws(c.notes),
        modifiers: c.modifiers,
        description: c.description,
        deprecation: c.deprecation,
    })
}

/// Fields and constants. A signature without a parseable type is skipped.
pub fn extract_field(li: ElementRef) -> Option<Field> {
    let c = common(li)?;
    let name = clean_text(li, &ELEMENT_NAME)?;
    let Some(ty) = first(li, &RETURN_TYPE).and_then(resolved_type) else {
        debug!("Field {} has no type signature, skipping", name);
        return None;
    };
    Some(Field {
        modifiers: c.modifiers,
        name,
        description: c.description,
        deprecation: c.deprecation,
        ty,
    })
}

/// `(int&nbsp;index, Collection<? extends E>&nbsp;c)` → parameters, with
/// descriptions matched by name from the "Parameters:" notes.
fn extract_params(params: Option<ElementRef>, notes: Option<ElementRef>) -> Vec<Parameter> {
    let Some(params) = params else {
        return Vec::new();
    };

    let described: Vec<(String, Option<String>)> = extract_notes(notes, "Parameters:")
        .into_iter()
        .filter_map(|dd| {
            let name = text_of(first(dd, &CODE)?).trim().to_string();
            Some((name, after_dash(&text_of(dd))))
        })
        .collect();

    let candidates = link_paths(params);
    let raw = text_of(params).replace(['(', ')'], "");

    split_top_level(raw.trim())
        .into_iter()
        .filter_map(|param| {
            let (ty, name) = param.trim().rsplit_once(char::is_whitespace)?;
            let mut ty = parse_type(ty)?;
            ty.path = resolve_path(&ty.name, &candidates);
            let description = described
                .iter()
                .find(|(n, _)| n == name)
                .and_then(|(_, d)| d.clone());
            Some(Parameter {
                name: name.to_string(),
                ty,
                description,
            })
        })
        .collect()
}

fn extract_throws(notes: Option<ElementRef>) -> Vec<ThrowsEntry> {
    extract_notes(notes, "Throws:")
        .into_iter()
        .filter_map(|dd| {
            let path = link_to_path(first(dd, &CODE_LINK)?)?;
            Some(ThrowsEntry {
                path,
                description: after_dash(&text_of(dd)),
            })
        })
        .collect()
}

fn api_note(notes: Option<ElementRef>) -> Option<String> {
    first_note(notes, "API Note:").and_then(|dd| clean(Some(&text_of(dd))))
}
