//! Output tree: JSON-Schema-like descriptors of a type's serialized form.
use indexmap::IndexMap;
use serde::Serialize;

/// Reserved key naming the type a back-reference points at.
pub const SCHEMA_KEY: &str = "@schema";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Validation vocabulary emitted by the generator. New kinds are new variants;
/// the node shape never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Validation {
    #[serde(rename = "enum")]
    Enumeration,
    #[serde(rename = "format")]
    Format,
    #[serde(rename = "items")]
    Items,
    #[serde(rename = "@autogenerated")]
    Autogenerated,
    /// Back-reference; serialized under [`SCHEMA_KEY`].
    #[serde(rename = "@schema")]
    Reference,
    /// Metadata that was present but not acted on.
    #[serde(rename = "debug")]
    Diagnostic,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidationValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
    Schema(Box<SchemaNode>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    kind: SchemaKind,
    /// `Some` only for expanded objects (possibly with zero properties).
    #[serde(skip_serializing_if = "is_absent_or_empty")]
    properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(flatten)]
    validations: IndexMap<Validation, ValidationValue>,
    /// Key this node takes in its parent's `properties`, when not the field name.
    #[serde(skip)]
    custom_key: Option<String>,
}

fn is_absent_or_empty(props: &Option<IndexMap<String, SchemaNode>>) -> bool {
    props.as_ref().is_none_or(IndexMap::is_empty)
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self { kind, properties: None, validations: IndexMap::new(), custom_key: None }
    }

    /// Object node that names `type_name` instead of expanding it.
    pub fn back_reference(type_name: impl Into<String>) -> Self {
        let mut node = Self::new(SchemaKind::Object);
        node.validations.insert(Validation::Reference, ValidationValue::Text(type_name.into()));
        node
    }

    /// Array node whose elements are described by `items`.
    pub fn array_of(items: SchemaNode) -> Self {
        let mut node = Self::new(SchemaKind::Array);
        node.validations.insert(Validation::Items, ValidationValue::Schema(Box::new(items)));
        node
    }

    pub fn kind(&self) -> SchemaKind { self.kind }

    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> { self.properties.as_ref() }

    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }

    pub fn validations(&self) -> &IndexMap<Validation, ValidationValue> { &self.validations }

    pub fn validation(&self, key: Validation) -> Option<&ValidationValue> { self.validations.get(&key) }

    pub fn custom_key(&self) -> Option<&str> { self.custom_key.as_deref() }

    /// Name of the type this node back-references, if it is a back-reference.
    pub fn reference(&self) -> Option<&str> {
        match self.validations.get(&Validation::Reference) {
            Some(ValidationValue::Text(name)) => Some(name),
            _ => None,
        }
    }

    /// Element schema of an array node.
    pub fn items(&self) -> Option<&SchemaNode> {
        match self.validations.get(&Validation::Items) {
            Some(ValidationValue::Schema(node)) => Some(node),
            _ => None,
        }
    }

    pub fn is_autogenerated(&self) -> bool {
        matches!(self.validations.get(&Validation::Autogenerated), Some(ValidationValue::Flag(true)))
    }

    // -- assembly (crate-internal: nodes are immutable once returned) --

    /// Last write wins on key collision.
    pub(crate) fn set_validation(&mut self, key: Validation, value: ValidationValue) {
        self.validations.insert(key, value);
    }

    pub(crate) fn set_custom_key(&mut self, key: impl Into<String>) {
        self.custom_key = Some(key.into());
    }

    pub(crate) fn begin_properties(&mut self) {
        self.properties.get_or_insert_with(IndexMap::new);
    }

    /// Insert under `name`. A repeated name keeps its first position and takes the new value.
    pub(crate) fn insert_property(&mut self, name: String, node: SchemaNode) {
        self.properties.get_or_insert_with(IndexMap::new).insert(name, node);
    }
}

// ------------------------------- Tests ------------------------------------ //
