use serde::{Deserialize, Serialize};

/// Category of a documented type page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Class,
    Interface,
    Enum,
    Record,
}

impl ObjectKind {
    /// Precedence: interface > enum > record > class.
    pub fn from_modifiers(modifiers: &[String]) -> Self {
        let has = |m: &str| modifiers.iter().any(|x| x == m);
        if has("interface") {
            ObjectKind::Interface
        } else if has("enum") {
            ObjectKind::Enum
        } else if has("record") {
            ObjectKind::Record
        } else {
            ObjectKind::Class
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundKind {
    #[default]
    None,
    Extends,
    Super,
}

/// One generic argument. `bound_name` is set iff `bound_kind` is not `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParam {
    pub name: String,
    pub bound_kind: BoundKind,
    pub bound_name: Option<String>,
}

impl TypeParam {
    pub fn unbounded(name: impl Into<String>) -> Self {
        TypeParam {
            name: name.into(),
            bound_kind: BoundKind::None,
            bound_name: None,
        }
    }

    pub fn bounded(name: impl Into<String>, kind: BoundKind, bound: impl Into<String>) -> Self {
        if kind == BoundKind::None {
            return Self::unbounded(name);
        }
        TypeParam {
            name: name.into(),
            bound_kind: kind,
            bound_name: Some(bound.into()),
        }
    }
}

/// A parsed type signature. `path` stays `None` until cross-reference
/// resolution finds a documented link for `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    pub name: String,
    pub is_array: bool,
    pub params: Vec<TypeParam>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnType {
    #[serde(flatten)]
    pub ty: TypeReference,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeReference,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowsEntry {
    pub path: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    pub modifiers: Vec<String>,
    pub params: Vec<Parameter>,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    pub api_note: Option<String>,
    pub throws: Vec<ThrowsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub modifiers: Vec<String>,
    pub name: String,
    pub params: Vec<Parameter>,
    pub type_params: Vec<String>,
    pub returns: Option<ReturnType>,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    pub api_note: Option<String>,
    pub throws: Vec<ThrowsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub modifiers: Vec<String>,
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    #[serde(rename = "type")]
    pub ty: TypeReference,
}

/// Constants share the field record shape; they differ only by the page
/// region they were extracted from.
pub type Constant = Field;

/// Fields shared by every member variant.
pub trait Member {
    fn modifiers(&self) -> &[String];
    fn deprecation(&self) -> Option<&Deprecation>;
}

macro_rules! impl_member {
    ($($t:ty),*) => {$(
        impl Member for $t {
            fn modifiers(&self) -> &[String] {
                &self.modifiers
            }
            fn deprecation(&self) -> Option<&Deprecation> {
                self.deprecation.as_ref()
            }
        }
    )*};
}

impl_member!(Constructor, Method, Field);

/// One documented class, interface, enum or record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub module: Option<String>,
    pub package: Option<String>,
    pub name: String,
    /// Declared type parameters of the object itself (`K`, `V extends Foo`).
    #[serde(default)]
    pub type_params: Vec<String>,
    pub path: String,
    pub modifiers: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub deprecation: Option<Deprecation>,
    pub description: Option<String>,
    pub since: Option<String>,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub fields: Vec<Field>,
    pub constants: Vec<Constant>,
}

impl ApiObject {
    /// Every type reference in member signatures.
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeReference> {
        let ctor_params = self.constructors.iter().flat_map(|c| &c.params);
        let method_params = self.methods.iter().flat_map(|m| &m.params);
        ctor_params
            .chain(method_params)
            .map(|p| &p.ty)
            .chain(self.methods.iter().filter_map(|m| m.returns.as_ref().map(|r| &r.ty)))
            .chain(self.fields.iter().chain(&self.constants).map(|f| &f.ty))
    }

    /// Declares or uses a generic parameter list anywhere in its signatures.
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
            || self.methods.iter().any(|m| !m.type_params.is_empty())
            || self.type_refs().any(|t| !t.params.is_empty())
    }
}
