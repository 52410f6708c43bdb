//! Declared types of parameters and members.

use std::fmt;

use crate::TypeHash;

/// A declared type as written on a parameter or member.
///
/// Type references are resolved by name against the declaration table; the
/// core never interprets generics beyond `List` element types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeRef {
    /// Accepts every value (also used for erased generic parameters).
    #[default]
    Any,
    Unit,
    Bool,
    Int,
    Float,
    String,
    /// A class or interface from the declaration table.
    Named(String),
    /// A callable value taking the given number of arguments.
    Function(usize),
    /// An ordered sequence of values of the element type.
    List(Box<TypeRef>),
    /// The inner type or `null`.
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    /// Reference a class or interface by name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// A list of `elem`.
    pub fn list(elem: TypeRef) -> Self {
        TypeRef::List(Box::new(elem))
    }

    /// `self` or `null`.
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Nullable(_) => self,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    /// Whether a trailing block may bind to a parameter of this type.
    pub fn is_callable(&self) -> bool {
        match self {
            TypeRef::Function(_) => true,
            TypeRef::Nullable(inner) => inner.is_callable(),
            _ => false,
        }
    }

    /// Name of the referenced class or interface, looking through nullability.
    pub fn named_type(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::Nullable(inner) | TypeRef::List(inner) => inner.named_type(),
            _ => None,
        }
    }

    /// Hash used when building member and constructor signatures.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.to_string())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Any => write!(f, "Any"),
            TypeRef::Unit => write!(f, "Unit"),
            TypeRef::Bool => write!(f, "Boolean"),
            TypeRef::Int => write!(f, "Int"),
            TypeRef::Float => write!(f, "Double"),
            TypeRef::String => write!(f, "String"),
            TypeRef::Named(name) => write!(f, "{name}"),
            TypeRef::Function(arity) => write!(f, "Function{arity}"),
            TypeRef::List(elem) => write!(f, "List<{elem}>"),
            TypeRef::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(TypeRef::list(TypeRef::named("Laptop")).to_string(), "List<Laptop>");
        assert_eq!(TypeRef::String.nullable().to_string(), "String?");
        assert_eq!(TypeRef::Function(0).to_string(), "Function0");
    }

    #[test]
    fn nullable_is_idempotent() {
        assert_eq!(TypeRef::Int.nullable().nullable(), TypeRef::Int.nullable());
    }

    #[test]
    fn callable_detection() {
        assert!(TypeRef::Function(0).is_callable());
        assert!(TypeRef::Function(1).nullable().is_callable());
        assert!(!TypeRef::Any.is_callable());
    }
}
