//! Field discovery across an inheritance chain.
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::descriptor::{DescriptorError, FieldDescriptor, TypeProvider, TypeRef};

/// Names injected by compilers, proxies and bytecode enhancers.
static SYNTHETIC_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$\$_").unwrap());

#[derive(Clone, Debug)]
pub struct DeclaredField {
    /// Type in the chain that declares the field.
    pub owner: TypeRef,
    pub field: FieldDescriptor,
}

pub fn is_eligible(field: &FieldDescriptor) -> bool {
    !field.is_static && !SYNTHETIC_FIELD.is_match(&field.name)
}

/// Eligible fields of `ty`: its own first, then each ancestor's, declaration order within each.
pub fn eligible_fields<P: TypeProvider + ?Sized>(
    provider: &P,
    ty: &TypeRef,
) -> Result<Vec<DeclaredField>, DescriptorError> {
    let mut out = Vec::new();
    let mut chain = IndexSet::new();
    let mut current = Some(ty.clone());
    while let Some(owner) = current {
        if !chain.insert(owner.clone()) {
            return Err(DescriptorError::Inspection {
                ty: ty.clone(),
                reason: format!("inheritance chain revisits `{owner}`"),
            });
        }
        for field in provider.declared_fields(&owner)? {
            if is_eligible(&field) {
                out.push(DeclaredField { owner: owner.clone(), field });
            } else {
                tracing::trace!(owner = %owner, field = %field.name, "skipping ineligible field");
            }
        }
        current = provider.parent_type(&owner)?;
    }
    Ok(out)
}
