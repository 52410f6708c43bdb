//! Parameter declarations.

use crate::{DefaultExpr, MemberModifiers, TypeRef, Value, Visibility};

/// A primary-constructor parameter that also declares a property
/// (`val name: String` / `var name: String`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Promotion {
    /// `var` when true, `val` otherwise.
    pub mutable: bool,
    pub visibility: Visibility,
    pub modifiers: MemberModifiers,
}

impl Promotion {
    pub fn val() -> Self {
        Self::default()
    }

    pub fn var() -> Self {
        Self {
            mutable: true,
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A declared parameter of a function or constructor.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    /// Declared type; for a vararg this is the element type.
    pub ty: TypeRef,
    /// Evaluated when the call leaves the parameter unfilled.
    pub default: Option<DefaultExpr>,
    /// Set when the parameter declares a property.
    pub promotion: Option<Promotion>,
    pub vararg: bool,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            promotion: None,
            vararg: false,
        }
    }

    /// A vararg parameter collecting values of `elem`.
    pub fn vararg(name: impl Into<String>, elem: TypeRef) -> Self {
        Self {
            vararg: true,
            ..Self::new(name, elem)
        }
    }

    pub fn with_default(mut self, default: DefaultExpr) -> Self {
        self.default = Some(default);
        self
    }

    /// Constant default value.
    pub fn with_default_value(self, value: impl Into<Value>) -> Self {
        self.with_default(DefaultExpr::constant(value))
    }

    pub fn promoted(mut self, promotion: Promotion) -> Self {
        self.promotion = Some(promotion);
        self
    }

    /// `val name: T`
    pub fn val(self) -> Self {
        self.promoted(Promotion::val())
    }

    /// `var name: T`
    pub fn var(self) -> Self {
        self.promoted(Promotion::var())
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Type used in signatures: `List<elem>` for a vararg.
    pub fn signature_type(&self) -> TypeRef {
        if self.vararg {
            TypeRef::list(self.ty.clone())
        } else {
            self.ty.clone()
        }
    }
}
