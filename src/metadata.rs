//! Interpretation of per-field metadata tags.
//!
//! Three families of tags change the schema: values filled in by the
//! persistence/audit layer (`@autogenerated`), explicit external names
//! (custom key), and relationship cardinality (handled by the assembler).
//! Every other tag is kept verbatim in the `debug` validation.
use std::fmt;

use crate::descriptor::{FieldDescriptor, MetadataTag};
use crate::schema::{SchemaNode, Validation, ValidationValue, SCHEMA_KEY};

/// Property names that are always infrastructure-populated.
pub const AUTOGENERATED_FIELD_NAMES: &[&str] = &[SCHEMA_KEY];

const AUTOGENERATED_TAGS: &[&str] = &[
    "generatedvalue",
    "createdby",
    "createddate",
    "lastmodifiedby",
    "lastmodifieddate",
];

const RENAME_TAGS: &[&str] = &["jsonproperty", "rename"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
    ManyToMany,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::OneToMany => f.write_str("one-to-many"),
            Cardinality::ManyToMany => f.write_str("many-to-many"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagRole<'a> {
    Autogenerated,
    /// `None` when the tag asks for the default name.
    Rename(Option<&'a str>),
    Relationship(Cardinality),
    Unrecognized,
}

/// `javax.persistence.OneToMany`, `OneToMany`, `one_to_many` → `onetomany`.
fn canonical_name(name: &str) -> String {
    let last = name.rsplit("::").next().unwrap_or(name);
    let last = last.rsplit('.').next().unwrap_or(last);
    last.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn role(tag: &MetadataTag) -> TagRole<'_> {
    let name = canonical_name(&tag.name);
    if AUTOGENERATED_TAGS.contains(&name.as_str()) {
        return TagRole::Autogenerated;
    }
    if RENAME_TAGS.contains(&name.as_str()) {
        let external = tag.value.as_deref().filter(|v| !v.is_empty());
        return TagRole::Rename(external);
    }
    match name.as_str() {
        "onetomany" => TagRole::Relationship(Cardinality::OneToMany),
        "manytomany" => TagRole::Relationship(Cardinality::ManyToMany),
        _ => TagRole::Unrecognized,
    }
}

pub fn relationship(field: &FieldDescriptor) -> Option<Cardinality> {
    field.tags.iter().find_map(|tag| match role(tag) {
        TagRole::Relationship(c) => Some(c),
        _ => None,
    })
}

/// Apply `field`'s tags to its freshly generated node.
pub fn interpret(field: &FieldDescriptor, node: &mut SchemaNode) {
    let mut unacted = Vec::new();
    for tag in &field.tags {
        match role(tag) {
            TagRole::Autogenerated => {
                node.set_validation(Validation::Autogenerated, ValidationValue::Flag(true));
            }
            TagRole::Rename(Some(external)) => node.set_custom_key(external),
            TagRole::Rename(None) | TagRole::Relationship(_) => {}
            TagRole::Unrecognized => unacted.push(tag.to_string()),
        }
    }
    if !unacted.is_empty() {
        tracing::debug!(field = %field.name, tags = ?unacted, "found metadata tags that are not acted on");
        node.set_validation(Validation::Diagnostic, ValidationValue::List(unacted));
    }
}

/// Flag properties whose final key is reserved for infrastructure.
pub fn flag_reserved_key(key: &str, node: &mut SchemaNode) {
    if AUTOGENERATED_FIELD_NAMES.contains(&key) {
        node.set_validation(Validation::Autogenerated, ValidationValue::Flag(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;

    #[test]
    fn recognizes_tags_by_canonical_name() {
        assert_eq!(role(&MetadataTag::new("javax.persistence.GeneratedValue")), TagRole::Autogenerated);
        assert_eq!(role(&MetadataTag::new("last_modified_date")), TagRole::Autogenerated);
        assert_eq!(role(&MetadataTag::new("OneToMany")), TagRole::Relationship(Cardinality::OneToMany));
        assert_eq!(role(&MetadataTag::new("many-to-many")), TagRole::Relationship(Cardinality::ManyToMany));
        assert_eq!(role(&MetadataTag::new("serde::rename").with_value("x")), TagRole::Rename(Some("x")));
        assert_eq!(role(&MetadataTag::new("JsonProperty").with_value("")), TagRole::Rename(None));
        assert_eq!(role(&MetadataTag::new("Column")), TagRole::Unrecognized);
    }

    #[test]
    fn interpret_sets_flags_key_and_diagnostics() {
        let field = FieldDescriptor::new("createdAt", "Date")
            .with_tag(MetadataTag::new("CreatedDate"))
            .with_tag(MetadataTag::new("JsonProperty").with_value("created_at"))
            .with_tag(MetadataTag::new("Column").with_value("created"));
        let mut node = SchemaNode::new(SchemaKind::String);
        interpret(&field, &mut node);
        assert!(node.is_autogenerated());
        assert_eq!(node.custom_key(), Some("created_at"));
        assert_eq!(
            node.validation(Validation::Diagnostic),
            Some(&ValidationValue::List(vec![r#"@Column("created")"#.into()]))
        );
    }

    #[test]
    fn untagged_field_gets_nothing() {
        let field = FieldDescriptor::new("name", "String");
        let mut node = SchemaNode::new(SchemaKind::String);
        interpret(&field, &mut node);
        assert!(node.validations().is_empty());
        assert_eq!(node.custom_key(), None);
    }

    #[test]
    fn reserved_key_is_autogenerated() {
        let mut node = SchemaNode::new(SchemaKind::String);
        flag_reserved_key("name", &mut node);
        assert!(!node.is_autogenerated());
        flag_reserved_key(SCHEMA_KEY, &mut node);
        assert!(node.is_autogenerated());
    }
}
