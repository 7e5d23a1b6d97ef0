//! Composite types seen during one top-level generation call.
use indexmap::IndexSet;

use crate::descriptor::TypeRef;

/// Grows monotonically for the lifetime of one call; never shared between calls.
#[derive(Clone, Debug, Default)]
pub struct VisitedTypes {
    seen: IndexSet<TypeRef>,
}

impl VisitedTypes {
    /// Fresh tracker seeded with an owned copy of `known`.
    pub fn seeded<'a, I>(known: I) -> Self
    where
        I: IntoIterator<Item = &'a TypeRef>,
    {
        Self { seen: known.into_iter().cloned().collect() }
    }

    pub fn contains(&self, ty: &TypeRef) -> bool { self.seen.contains(ty) }

    /// Mark `ty` as being expanded. Returns `false` if it already was.
    pub fn enter(&mut self, ty: &TypeRef) -> bool {
        if self.seen.contains(ty) {
            return false;
        }
        self.seen.insert(ty.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_is_once_per_type() {
        let mut v = VisitedTypes::default();
        let a = TypeRef::from("A");
        assert!(v.enter(&a));
        assert!(!v.enter(&a));
        assert!(v.contains(&a));
        assert!(!v.contains(&TypeRef::from("B")));
    }

    #[test]
    fn seed_is_copied_not_borrowed() {
        let known = vec![TypeRef::from("B")];
        let mut v = VisitedTypes::seeded(&known);
        assert!(!v.enter(&TypeRef::from("B")));
        assert!(v.enter(&TypeRef::from("C")));
        assert_eq!(known.len(), 1);
        assert!(v.contains(&TypeRef::from("C")));
    }
}
