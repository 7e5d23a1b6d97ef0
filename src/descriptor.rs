//! Type descriptors: the narrow view of a type system the generator needs.
//!
//! The generator never inspects types on its own. Everything it knows about
//! a type (its kind, its fields, its parent) comes through [`TypeProvider`],
//! so the same engine runs over a JSON catalog, compile-time tables, or any
//! other metadata source.
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ------------------------------ Identity --------------------------------- //

/// Identity of a type: its fully qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Display name used in back-references: last path segment, generics stripped.
    ///
    /// `com.acme.Order` → `Order`, `crate::model::Page<T>` → `Page`.
    pub fn simple_name(&self) -> &str {
        let base = match self.0.find('<') {
            Some(ix) => &self.0[..ix],
            None => self.0.as_str(),
        };
        let after_colons = base.rsplit("::").next().unwrap_or(base);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }

    /// Name with generic arguments removed: `shop.Page<shop.Item>` → `shop.Page`.
    pub fn base(&self) -> &str {
        match self.0.find('<') {
            Some(ix) => self.0[..ix].trim(),
            None => self.0.as_str(),
        }
    }

    /// First top-level generic argument, if any.
    ///
    /// `Map<K<A, B>, V>` → `K<A, B>`, `List<Item>` → `Item`, `Item` → `None`.
    pub fn first_generic_argument(&self) -> Option<TypeRef> {
        let open = self.0.find('<')?;
        let rest = &self.0[open + 1..];
        let mut depth = 0usize;
        for (ix, c) in rest.char_indices() {
            match c {
                '<' => depth += 1,
                '>' if depth > 0 => depth -= 1,
                '>' | ',' if depth == 0 => {
                    let arg = rest[..ix].trim();
                    return (!arg.is_empty()).then(|| TypeRef::from(arg));
                }
                _ => {}
            }
        }
        None
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for TypeRef {
    fn from(s: String) -> Self { Self(s) }
}

// -------------------------------- Kinds ---------------------------------- //

/// What a provider says a type is. Deliberately finer than [`crate::schema::SchemaKind`];
/// the classifier collapses it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Enumeration,
    Boolean,
    Character,
    Text,
    /// Fixed-width, boxed, arbitrary-precision and atomic integers.
    Integer,
    /// Floating point and arbitrary-precision decimals.
    Float,
    DateTime,
    /// Native fixed-size array.
    Array,
    /// Homogeneous ordered or unordered collection.
    Collection,
    #[default]
    Composite,
}

// ------------------------------- Fields ---------------------------------- //

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// First generic argument of `ty`, when the declared type is parameterized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<TypeRef>,
    /// Type-level (non-instance) field.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<MetadataTag>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            element: None,
            is_static: false,
            tags: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: impl Into<TypeRef>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_tag(mut self, tag: MetadataTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn type_level(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A metadata tag attached to a field (annotation, attribute, decorator...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetadataTag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub args: IndexMap<String, serde_json::Value>,
}

impl MetadataTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None, args: IndexMap::new() }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }
}

/// Literal textual form: `@Name`, `@Name("value")`, `@Name(key=value, ...)`.
impl fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if self.value.is_none() && self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        let mut first = true;
        if let Some(value) = &self.value {
            write!(f, "{:?}", value)?;
            first = false;
        }
        for (k, v) in &self.args {
            if !first { f.write_str(", ")?; }
            write!(f, "{k}={v}")?;
            first = false;
        }
        f.write_str(")")
    }
}

// ------------------------------ Provider --------------------------------- //

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("unknown type `{0}`")]
    UnknownType(TypeRef),
    #[error("type `{0}` is not an enumeration")]
    NotAnEnumeration(TypeRef),
    #[error("cannot inspect type `{ty}`: {reason}")]
    Inspection { ty: TypeRef, reason: String },
}

/// Source of type metadata consumed by the generator.
pub trait TypeProvider {
    fn kind_of(&self, ty: &TypeRef) -> Result<TypeKind, DescriptorError>;

    /// Declared constant names, in declaration order.
    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<String>, DescriptorError>;

    /// The type's own fields, in declaration order. Inherited fields are not included.
    fn declared_fields(&self, ty: &TypeRef) -> Result<Vec<FieldDescriptor>, DescriptorError>;

    fn parent_type(&self, ty: &TypeRef) -> Result<Option<TypeRef>, DescriptorError>;
}

impl<P: TypeProvider + ?Sized> TypeProvider for &P {
    fn kind_of(&self, ty: &TypeRef) -> Result<TypeKind, DescriptorError> { (**self).kind_of(ty) }
    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<String>, DescriptorError> { (**self).enum_constants(ty) }
    fn declared_fields(&self, ty: &TypeRef) -> Result<Vec<FieldDescriptor>, DescriptorError> { (**self).declared_fields(ty) }
    fn parent_type(&self, ty: &TypeRef) -> Result<Option<TypeRef>, DescriptorError> { (**self).parent_type(ty) }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_paths_and_generics() {
        assert_eq!(TypeRef::from("com.acme.Order").simple_name(), "Order");
        assert_eq!(TypeRef::from("crate::model::Page<T>").simple_name(), "Page");
        assert_eq!(TypeRef::from("Plain").simple_name(), "Plain");
    }

    #[test]
    fn generic_arguments_are_depth_aware() {
        let t = |s: &str| TypeRef::from(s);
        assert_eq!(t("shop.Page<shop.Item>").base(), "shop.Page");
        assert_eq!(t("Plain").base(), "Plain");
        assert_eq!(t("java.util.List<shop.Item>").first_generic_argument(), Some(t("shop.Item")));
        assert_eq!(t("Map<K<A, B>, V>").first_generic_argument(), Some(t("K<A, B>")));
        assert_eq!(t("Vec< Item >").first_generic_argument(), Some(t("Item")));
        assert_eq!(t("Vec<>").first_generic_argument(), None);
        assert_eq!(t("Vec<Item").first_generic_argument(), None);
        assert_eq!(t("Item").first_generic_argument(), None);
    }

    #[test]
    fn tag_display_forms() {
        assert_eq!(MetadataTag::new("Transient").to_string(), "@Transient");
        assert_eq!(
            MetadataTag::new("JsonProperty").with_value("ext_name").to_string(),
            r#"@JsonProperty("ext_name")"#
        );
        let tag = MetadataTag::new("Column")
            .with_arg("nullable", serde_json::json!(false))
            .with_arg("length", serde_json::json!(64));
        assert_eq!(tag.to_string(), "@Column(nullable=false, length=64)");
    }

    #[test]
    fn field_descriptor_deserializes_with_defaults() {
        let f: FieldDescriptor = serde_json::from_value(serde_json::json!({
            "name": "items",
            "type": "Vec",
            "element": "com.acme.Item",
        })).unwrap();
        assert_eq!(f.ty.as_str(), "Vec");
        assert_eq!(f.element, Some(TypeRef::from("com.acme.Item")));
        assert!(!f.is_static);
        assert!(f.tags.is_empty());
    }
}
