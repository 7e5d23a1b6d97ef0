//! JSON type catalogs: a [`TypeProvider`] backed by declared types plus a
//! built-in table of primitive, boxed, text, date/time and collection names.
//!
//! ```json
//! { "types": [
//!     { "name": "shop.Status", "kind": "enumeration", "constants": ["OPEN", "CLOSED"] },
//!     { "name": "shop.Order", "parent": "shop.Entity", "fields": [
//!         { "name": "lines", "type": "java.util.List", "element": "shop.Line",
//!           "tags": [{ "name": "OneToMany" }] }
//!     ]}
//! ] }
//! ```
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorError, FieldDescriptor, TypeKind, TypeProvider, TypeRef};
use crate::path_de::{self, PathError};

// ------------------------------- Builtins -------------------------------- //

static BUILTINS: Lazy<HashMap<&'static str, TypeKind>> = Lazy::new(|| {
    let mut table = HashMap::new();
    let mut add = |kind: TypeKind, names: &[&'static str]| {
        for name in names {
            table.insert(*name, kind);
        }
    };
    add(TypeKind::Integer, &[
        "i8", "i16", "i32", "i64", "i128", "isize",
        "u8", "u16", "u32", "u64", "u128", "usize",
        "byte", "short", "int", "long",
        "Byte", "Short", "Integer", "Long",
        "java.lang.Byte", "java.lang.Short", "java.lang.Integer", "java.lang.Long",
        "BigInt", "BigUint", "num_bigint::BigInt", "num_bigint::BigUint",
        "BigInteger", "java.math.BigInteger",
        "AtomicI8", "AtomicI16", "AtomicI32", "AtomicI64", "AtomicIsize",
        "AtomicU8", "AtomicU16", "AtomicU32", "AtomicU64", "AtomicUsize",
        "AtomicInteger", "AtomicLong",
        "java.util.concurrent.atomic.AtomicInteger", "java.util.concurrent.atomic.AtomicLong",
    ]);
    add(TypeKind::Float, &[
        "f32", "f64", "float", "double",
        "Float", "Double", "java.lang.Float", "java.lang.Double",
        "BigDecimal", "java.math.BigDecimal", "Decimal", "rust_decimal::Decimal",
    ]);
    add(TypeKind::Boolean, &["bool", "boolean", "Boolean", "java.lang.Boolean", "AtomicBool"]);
    add(TypeKind::Character, &["char", "Character", "java.lang.Character"]);
    add(TypeKind::Text, &["str", "String", "java.lang.String"]);
    add(TypeKind::DateTime, &[
        "Date", "java.util.Date", "java.sql.Date", "java.sql.Timestamp",
        "Instant", "java.time.Instant", "LocalDateTime", "java.time.LocalDateTime",
        "OffsetDateTime", "java.time.OffsetDateTime", "ZonedDateTime", "java.time.ZonedDateTime",
        "DateTime", "NaiveDateTime", "chrono::DateTime", "chrono::NaiveDateTime",
        "SystemTime", "std::time::SystemTime",
    ]);
    add(TypeKind::Collection, &[
        "Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet", "BinaryHeap", "IndexSet",
        "Collection", "List", "ArrayList", "Set", "SortedSet", "TreeSet", "Queue", "Deque",
        "java.util.Collection", "java.util.List", "java.util.ArrayList", "java.util.LinkedList",
        "java.util.Set", "java.util.HashSet", "java.util.SortedSet", "java.util.TreeSet",
        "java.util.Queue", "java.util.Deque",
    ]);
    table
});

/// Kind of a built-in type name, if it is one. Generic arguments are ignored
/// (`Vec<Item>` is `Vec`) and `T[]` / `[T; N]` are native arrays.
pub fn builtin_kind(name: &str) -> Option<TypeKind> {
    if let Some(kind) = BUILTINS.get(name) {
        return Some(*kind);
    }
    if name.ends_with("[]") || (name.starts_with('[') && name.ends_with(']')) {
        return Some(TypeKind::Array);
    }
    let base = name.split('<').next()?.trim();
    if base.len() < name.len() {
        return BUILTINS.get(base).copied();
    }
    None
}

// ------------------------------- Documents ------------------------------- //

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: TypeRef,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: PathError,
    },
    #[error("type `{0}` is declared more than once")]
    Duplicate(TypeRef),
    #[error("type `{ty}` extends undeclared type `{parent}`")]
    UnknownParent { ty: TypeRef, parent: TypeRef },
    #[error("type `{0}` has a cyclic inheritance chain")]
    CyclicParent(TypeRef),
}

// -------------------------------- Catalog -------------------------------- //

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    types: IndexMap<TypeRef, TypeDecl>,
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    pub fn from_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        let doc = path_de::from_value_with_path::<CatalogDocument>(value)
            .map_err(|source| CatalogError::Parse { origin: "<inline>".into(), source })?;
        let mut catalog = Self::new();
        catalog.extend(doc)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Merge every file, then validate the combined set of declarations.
    pub fn load<I>(paths: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut catalog = Self::new();
        for path in paths {
            let path = path.as_ref();
            let source = std::fs::read_to_string(path)
                .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
            let doc = path_de::from_str_with_path::<CatalogDocument>(&source).map_err(|source| {
                CatalogError::Parse { origin: path.display().to_string(), source }
            })?;
            tracing::debug!(path = %path.display(), types = doc.types.len(), "loaded catalog");
            catalog.extend(doc)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Add declarations without validating parents (they may live in a later document).
    pub fn extend(&mut self, doc: CatalogDocument) -> Result<(), CatalogError> {
        for decl in doc.types {
            if self.types.contains_key(&decl.name) {
                return Err(CatalogError::Duplicate(decl.name));
            }
            self.types.insert(decl.name.clone(), decl);
        }
        Ok(())
    }

    /// Every parent must be declared, and no chain may loop.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for decl in self.types.values() {
            let mut chain = IndexSet::new();
            chain.insert(&decl.name);
            let mut current = decl;
            while let Some(parent) = &current.parent {
                let Some(next) = self.types.get(parent) else {
                    return Err(CatalogError::UnknownParent { ty: current.name.clone(), parent: parent.clone() });
                };
                if !chain.insert(&next.name) {
                    return Err(CatalogError::CyclicParent(decl.name.clone()));
                }
                current = next;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize { self.types.len() }

    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    /// Declared composite types, in declaration order.
    pub fn composite_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.types
            .values()
            .filter(|decl| decl.kind == TypeKind::Composite)
            .map(|decl| &decl.name)
    }
}

impl Catalog {
    /// Exact declaration, else the declaration of the generic base (`Page<Item>` → `Page`).
    fn decl(&self, ty: &TypeRef) -> Option<&TypeDecl> {
        self.types.get(ty).or_else(|| {
            let base = ty.base();
            if base.len() < ty.as_str().len() {
                self.types.get(&TypeRef::from(base))
            } else {
                None
            }
        })
    }
}

impl TypeProvider for Catalog {
    fn kind_of(&self, ty: &TypeRef) -> Result<TypeKind, DescriptorError> {
        match self.decl(ty) {
            Some(decl) => Ok(decl.kind),
            None => builtin_kind(ty.as_str()).ok_or_else(|| DescriptorError::UnknownType(ty.clone())),
        }
    }

    fn enum_constants(&self, ty: &TypeRef) -> Result<Vec<String>, DescriptorError> {
        match self.decl(ty) {
            Some(decl) if decl.kind == TypeKind::Enumeration => Ok(decl.constants.clone()),
            Some(_) => Err(DescriptorError::NotAnEnumeration(ty.clone())),
            None if builtin_kind(ty.as_str()).is_some() => Err(DescriptorError::NotAnEnumeration(ty.clone())),
            None => Err(DescriptorError::UnknownType(ty.clone())),
        }
    }

    /// Fields without an explicit `element` take the first generic argument of their type.
    fn declared_fields(&self, ty: &TypeRef) -> Result<Vec<FieldDescriptor>, DescriptorError> {
        match self.decl(ty) {
            Some(decl) => Ok(decl
                .fields
                .iter()
                .cloned()
                .map(|mut field| {
                    if field.element.is_none() {
                        field.element = field.ty.first_generic_argument();
                    }
                    field
                })
                .collect()),
            None if builtin_kind(ty.as_str()).is_some() => Ok(Vec::new()),
            None => Err(DescriptorError::UnknownType(ty.clone())),
        }
    }

    fn parent_type(&self, ty: &TypeRef) -> Result<Option<TypeRef>, DescriptorError> {
        match self.decl(ty) {
            Some(decl) => Ok(decl.parent.clone()),
            None if builtin_kind(ty.as_str()).is_some() => Ok(None),
            None => Err(DescriptorError::UnknownType(ty.clone())),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
