//! Recursive class-to-schema generation.
//!
//! A call walks the type graph depth-first. Composite types are expanded at
//! most once per call; every later encounter (including cycles back to a type
//! still being expanded) becomes an object node carrying a back-reference
//! under [`crate::schema::SCHEMA_KEY`].
use indexmap::IndexSet;

use crate::classify::{classify, Classification};
use crate::descriptor::{DescriptorError, FieldDescriptor, TypeProvider, TypeRef};
use crate::fields::{eligible_fields, DeclaredField};
use crate::metadata::{self, Cardinality};
use crate::schema::{SchemaKind, SchemaNode};
use crate::tracker::VisitedTypes;

// ------------------------------- Errors ---------------------------------- //

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error("field `{field}` of `{owner}` is marked {cardinality} but declares no element type")]
    MissingElementType {
        owner: TypeRef,
        field: String,
        cardinality: Cardinality,
    },
}

// ------------------------------- Options --------------------------------- //

#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Types emitted as back-references instead of being inlined.
    pub known: IndexSet<TypeRef>,
    /// When `false`, the root is expanded even if it is in `known`.
    pub reference_root: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { known: IndexSet::new(), reference_root: true }
    }
}

impl GenerateOptions {
    pub fn with_known<I, T>(known: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeRef>,
    {
        Self { known: known.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn expand_root(mut self) -> Self {
        self.reference_root = false;
        self
    }
}

// ------------------------------ Front API -------------------------------- //

pub fn generate<P: TypeProvider + ?Sized>(provider: &P, root: &TypeRef) -> Result<SchemaNode, GenerateError> {
    SchemaGenerator::new(provider).generate(root)
}

/// Pre-seeds the tracker: reachable types in `known` become back-references.
pub fn generate_with_known<'a, P, I>(provider: &P, root: &TypeRef, known: I) -> Result<SchemaNode, GenerateError>
where
    P: TypeProvider + ?Sized,
    I: IntoIterator<Item = &'a TypeRef>,
{
    let options = GenerateOptions { known: known.into_iter().cloned().collect(), ..GenerateOptions::default() };
    SchemaGenerator::new(provider).generate_with(root, &options)
}

/// Stateless between calls; holds only the provider.
pub struct SchemaGenerator<P> {
    provider: P,
}

impl<P: TypeProvider> SchemaGenerator<P> {
    pub fn new(provider: P) -> Self { Self { provider } }

    pub fn generate(&self, root: &TypeRef) -> Result<SchemaNode, GenerateError> {
        self.generate_with(root, &GenerateOptions::default())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(root = %root, known = options.known.len()))]
    pub fn generate_with(&self, root: &TypeRef, options: &GenerateOptions) -> Result<SchemaNode, GenerateError> {
        let mut visited = VisitedTypes::seeded(&options.known);
        self.type_schema(root, &mut visited, options.reference_root)
    }

    // -- recursion --

    fn type_schema(
        &self,
        ty: &TypeRef,
        visited: &mut VisitedTypes,
        reference_visited: bool,
    ) -> Result<SchemaNode, GenerateError> {
        match classify(&self.provider, ty)? {
            Classification::Scalar { kind, validations } => {
                let mut node = SchemaNode::new(kind);
                for (key, value) in validations {
                    node.set_validation(key, value);
                }
                Ok(node)
            }
            Classification::Sequence => Ok(SchemaNode::new(SchemaKind::Array)),
            Classification::Composite => self.composite_schema(ty, visited, reference_visited),
        }
    }

    fn composite_schema(
        &self,
        ty: &TypeRef,
        visited: &mut VisitedTypes,
        reference_visited: bool,
    ) -> Result<SchemaNode, GenerateError> {
        if reference_visited && visited.contains(ty) {
            tracing::debug!(ty = %ty, "substituting back-reference");
            return Ok(SchemaNode::back_reference(ty.simple_name()));
        }
        visited.enter(ty);

        let mut node = SchemaNode::new(SchemaKind::Object);
        node.begin_properties();
        for DeclaredField { owner, field } in eligible_fields(&self.provider, ty)? {
            tracing::trace!(owner = %owner, field = %field.name, "expanding field");
            let mut child = self.field_schema(&owner, &field, visited)?;
            let key = child.custom_key().map_or_else(|| field.name.clone(), str::to_owned);
            metadata::flag_reserved_key(&key, &mut child);
            node.insert_property(key, child);
        }
        Ok(node)
    }

    fn field_schema(
        &self,
        owner: &TypeRef,
        field: &FieldDescriptor,
        visited: &mut VisitedTypes,
    ) -> Result<SchemaNode, GenerateError> {
        let mut node = match metadata::relationship(field) {
            Some(cardinality) => {
                let element = field.element.as_ref().ok_or_else(|| GenerateError::MissingElementType {
                    owner: owner.clone(),
                    field: field.name.clone(),
                    cardinality,
                })?;
                SchemaNode::array_of(self.type_schema(element, visited, true)?)
            }
            None => {
                let node = self.type_schema(&field.ty, visited, true)?;
                match &field.element {
                    // Plain collections describe their elements when the declaration names them.
                    Some(element) if node.kind() == SchemaKind::Array => {
                        SchemaNode::array_of(self.type_schema(element, visited, true)?)
                    }
                    _ => node,
                }
            }
        };
        metadata::interpret(field, &mut node);
        Ok(node)
    }
}

// ------------------------------- Tests ------------------------------------ //
