use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::ident::{synthesize, Registry, ANY};
use crate::model::{ApiObject, Deprecation, Member, Parameter, TypeReference};

/// Java type name → TypeScript type, checked before identifier synthesis.
const PRIMITIVES: &[(&str, &str)] = &[
    ("void", "void"),
    ("boolean", "boolean"),
    ("byte", "number"),
    ("short", "number"),
    ("int", "number"),
    ("long", "bigint"),
    ("float", "number"),
    ("double", "number"),
    ("char", "string"),
    ("String", "string"),
    ("Object", "any"),
    ("Throwable", "Error"),
    ("Exception", "Error"),
    ("Error", "Error"),
    ("RuntimeException", "Error"),
];

/// Words that cannot be used as parameter names in the output.
const RESERVED: &[&str] = &[
    "abstract", "any", "as", "asserts", "async", "await", "bigint", "boolean", "class", "const",
    "constructor", "declare", "enum", "export", "false", "from", "get", "global", "implements",
    "import", "in", "infer", "instanceof", "interface", "is", "keyof", "let", "module",
    "namespace", "never", "new", "null", "number", "object", "of", "package", "private",
    "protected", "public", "readonly", "require", "static", "string", "super", "symbol", "this",
    "true", "type", "typeof", "undefined", "unique", "unknown", "var", "void", "with", "yield",
];

/// Java modifiers with no TypeScript counterpart.
const DROPPED_MODIFIERS: &[&str] = &[
    "transient",
    "volatile",
    "default",
    "synchronized",
    "native",
    "strictfp",
];

#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// Skip every object whose serialized form mentions `<` or `>`.
    pub skip_generic_objects: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            skip_generic_objects: true,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub emitted: usize,
    pub skipped: usize,
}

/// Target type for a reference: primitive table first, then the synthesized
/// identifier of its path (or raw name when unresolved), else `any`.
pub fn map_type(ty: Option<&TypeReference>, registry: &Registry) -> String {
    let Some(ty) = ty else {
        return ANY.to_string();
    };
    let base = match PRIMITIVES.iter().find(|(java, _)| *java == ty.name) {
        Some((_, ts)) => ts.to_string(),
        None => synthesize(ty.path.as_deref().or(Some(ty.name.as_str())), registry),
    };
    if ty.is_array {
        format!("{base}[]")
    } else {
        base
    }
}

pub fn escape_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Whole-object exclusion: any generic usage anywhere in the record, down to
/// prose that happens to contain an angle bracket.
pub fn uses_generics(obj: &ApiObject) -> bool {
    obj.is_generic()
        || serde_json::to_string(obj)
            .map(|json| json.contains(['<', '>']))
            .unwrap_or(true)
}

/// Render the corpus into one declaration file body.
pub fn render(objects: &[ApiObject], registry: &Registry, opts: EmitOptions) -> (String, EmitStats) {
    let blocks: Vec<Option<String>> = objects
        .par_iter()
        .map(|obj| {
            if opts.skip_generic_objects && uses_generics(obj) {
                debug!("Skipping {}: uses generics", obj.path);
                None
            } else {
                Some(render_object(obj, registry))
            }
        })
        .collect();

    let mut stats = EmitStats::default();
    let mut out = String::new();
    for block in blocks {
        match block {
            Some(text) => {
                stats.emitted += 1;
                out.push_str(&text);
            }
            None => stats.skipped += 1,
        }
    }
    (out, stats)
}

/// Render and write the declarations for `objects` to `path`.
pub fn write_declarations(path: &Path, objects: &[ApiObject], opts: EmitOptions) -> Result<EmitStats> {
    let registry = Registry::new(objects);
    info!("Registry holds {} objects", registry.len());
    let (text, stats) = render(objects, &registry, opts);
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        "Wrote {} declarations to {} ({} skipped)",
        stats.emitted,
        path.display(),
        stats.skipped
    );
    Ok(stats)
}

pub fn render_object(obj: &ApiObject, registry: &Registry) -> String {
    let mut out = String::new();
    let id = |path: &str| synthesize(Some(path), registry);

    out.push_str("/**\n");
    let _ = writeln!(out, " * {}", obj.path);
    if let Some(desc) = &obj.description {
        let _ = writeln!(out, " * {desc}");
    }
    if let Some(since) = &obj.since {
        let _ = writeln!(out, " * @since {since}");
    }
    if let Some(dep) = &obj.deprecation {
        let _ = writeln!(out, " * @deprecated {}", deprecation_text(dep));
    }
    out.push_str(" */\n");

    let _ = write!(
        out,
        "export {}class {}",
        if obj.implements.is_empty() { "" } else { "abstract " },
        id(&obj.path)
    );
    if let Some(parent) = &obj.extends {
        let _ = write!(out, " extends {}", id(parent));
    }
    if !obj.implements.is_empty() {
        let ifaces: Vec<String> = obj.implements.iter().map(|p| id(p)).collect();
        let _ = write!(out, " implements {}", ifaces.join(", "));
    }
    out.push_str(" {\n");

    for field in obj.fields.iter().chain(&obj.constants) {
        member_deprecation(&mut out, field);
        let _ = writeln!(
            out,
            "  {}{}: {};",
            modifiers(field),
            field.name,
            map_type(Some(&field.ty), registry)
        );
    }
    for ctor in &obj.constructors {
        member_deprecation(&mut out, ctor);
        let _ = writeln!(
            out,
            "  {}constructor({});",
            modifiers(ctor),
            params(&ctor.params, registry)
        );
    }
    for method in &obj.methods {
        member_deprecation(&mut out, method);
        let _ = writeln!(
            out,
            "  {}{}({}): {};",
            modifiers(method),
            method.name,
            params(&method.params, registry),
            map_type(method.returns.as_ref().map(|r| &r.ty), registry)
        );
    }
    out.push_str("}\n\n");
    out
}

fn deprecation_text(dep: &Deprecation) -> String {
    match (&dep.title, &dep.description) {
        (Some(title), Some(desc)) => format!("{title} - {desc}"),
        (Some(text), None) | (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    }
}

fn member_deprecation(out: &mut String, member: &impl Member) {
    if let Some(dep) = member.deprecation() {
        let _ = writeln!(out, "  /** @deprecated {} */", deprecation_text(dep));
    }
}

/// Modifier prefix with a trailing space, or empty.
fn modifiers(member: &impl Member) -> String {
    let mods: Vec<&str> = member
        .modifiers()
        .iter()
        .map(String::as_str)
        .filter(|m| !DROPPED_MODIFIERS.contains(m))
        .map(|m| if m == "final" { "readonly" } else { m })
        .collect();
    if mods.is_empty() {
        String::new()
    } else {
        format!("{} ", mods.join(" "))
    }
}

fn params(params: &[Parameter], registry: &Registry) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", escape_ident(&p.name), map_type(Some(&p.ty), registry)))
        .collect::<Vec<_>>()
        .join(", ")
}
