//! Structural type definitions → JSON-Schema-like descriptor trees.
//!
//! Types are described by a [`TypeProvider`] (see [`catalog::Catalog`] for a
//! JSON-backed one). [`generate`] walks a root type depth-first and returns a
//! [`SchemaNode`] tree: leaf kinds come from a coarse classification, composite
//! types expand into ordered `properties` across their inheritance chain, and
//! any composite type already expanded in the same call is replaced by a
//! back-reference naming it under [`SCHEMA_KEY`]. Field metadata tags mark
//! infrastructure-populated fields, rename properties, turn relationship
//! fields into arrays of their element type, and are otherwise kept verbatim
//! for inspection.
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod descriptor;
pub mod fields;
pub mod generate;
pub mod jq_exec;
pub mod metadata;
pub mod path_de;
pub mod schema;
pub mod tracker;

pub use catalog::{Catalog, CatalogError};
pub use descriptor::{DescriptorError, FieldDescriptor, MetadataTag, TypeKind, TypeProvider, TypeRef};
pub use generate::{generate, generate_with_known, GenerateError, GenerateOptions, SchemaGenerator};
pub use schema::{SchemaKind, SchemaNode, Validation, ValidationValue, SCHEMA_KEY};
