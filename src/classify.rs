//! Coarse, total mapping from provider kinds to schema kinds.
use crate::descriptor::{DescriptorError, TypeKind, TypeProvider, TypeRef};
use crate::schema::{SchemaKind, Validation, ValidationValue};

pub const DATE_TIME_FORMAT: &str = "date-time";

#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    /// Leaf kind plus the constraints the type carries on its own.
    Scalar {
        kind: SchemaKind,
        validations: Vec<(Validation, ValidationValue)>,
    },
    /// Array or collection; the element schema comes from the field context.
    Sequence,
    /// Needs field expansion (or a back-reference).
    Composite,
}

pub fn classify<P: TypeProvider + ?Sized>(
    provider: &P,
    ty: &TypeRef,
) -> Result<Classification, DescriptorError> {
    let scalar = |kind| Classification::Scalar { kind, validations: Vec::new() };
    let out = match provider.kind_of(ty)? {
        TypeKind::Enumeration => Classification::Scalar {
            kind: SchemaKind::String,
            validations: vec![(
                Validation::Enumeration,
                ValidationValue::List(provider.enum_constants(ty)?),
            )],
        },
        TypeKind::Integer => scalar(SchemaKind::Integer),
        TypeKind::Float => scalar(SchemaKind::Number),
        TypeKind::Boolean => scalar(SchemaKind::Boolean),
        TypeKind::Character | TypeKind::Text => scalar(SchemaKind::String),
        TypeKind::DateTime => Classification::Scalar {
            kind: SchemaKind::String,
            validations: vec![(Validation::Format, ValidationValue::Text(DATE_TIME_FORMAT.into()))],
        },
        TypeKind::Array | TypeKind::Collection => Classification::Sequence,
        TypeKind::Composite => Classification::Composite,
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::from_value(json!({
            "types": [
                { "name": "Color", "kind": "enumeration", "constants": ["RED", "GREEN", "BLUE"] },
                { "name": "Order", "fields": [] },
            ]
        })).unwrap()
    }

    fn kind(c: &Catalog, name: &str) -> Option<SchemaKind> {
        match classify(c, &TypeRef::from(name)).unwrap() {
            Classification::Scalar { kind, .. } => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn integral_names_are_integer() {
        let c = catalog();
        for name in ["i8", "i32", "u64", "int", "long", "java.lang.Integer", "java.math.BigInteger",
                     "AtomicI64", "java.util.concurrent.atomic.AtomicLong", "BigInt"] {
            assert_eq!(kind(&c, name), Some(SchemaKind::Integer), "{name}");
        }
    }

    #[test]
    fn floating_names_are_number() {
        let c = catalog();
        for name in ["f32", "f64", "float", "double", "java.lang.Double", "java.math.BigDecimal"] {
            assert_eq!(kind(&c, name), Some(SchemaKind::Number), "{name}");
        }
    }

    #[test]
    fn enumeration_keeps_declaration_order() {
        let c = catalog();
        let out = classify(&c, &TypeRef::from("Color")).unwrap();
        assert_eq!(out, Classification::Scalar {
            kind: SchemaKind::String,
            validations: vec![(
                Validation::Enumeration,
                ValidationValue::List(vec!["RED".into(), "GREEN".into(), "BLUE".into()]),
            )],
        });
    }

    #[test]
    fn dates_carry_format_and_text_is_plain() {
        let c = catalog();
        let out = classify(&c, &TypeRef::from("java.util.Date")).unwrap();
        assert_eq!(out, Classification::Scalar {
            kind: SchemaKind::String,
            validations: vec![(Validation::Format, ValidationValue::Text("date-time".into()))],
        });
        assert_eq!(kind(&c, "char"), Some(SchemaKind::String));
        assert_eq!(kind(&c, "String"), Some(SchemaKind::String));
        assert_eq!(kind(&c, "bool"), Some(SchemaKind::Boolean));
    }

    #[test]
    fn sequences_and_composites() {
        let c = catalog();
        assert_eq!(classify(&c, &TypeRef::from("Vec")).unwrap(), Classification::Sequence);
        assert_eq!(classify(&c, &TypeRef::from("java.util.Set")).unwrap(), Classification::Sequence);
        assert_eq!(classify(&c, &TypeRef::from("Order")).unwrap(), Classification::Composite);
    }
}
