//! Member slots of classes and interfaces.

use std::fmt;

use crate::{Body, MemberModifiers, TypeHash, TypeRef, Visibility};

use super::ParamDecl;

/// Whether a member is a property or a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Function,
}

impl MemberKind {
    /// Tag mixed into signature hashes.
    pub fn tag(self) -> u8 {
        match self {
            MemberKind::Property => 0,
            MemberKind::Function => 1,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Property => write!(f, "property"),
            MemberKind::Function => write!(f, "function"),
        }
    }
}

/// How a member is implemented in its declaring type.
#[derive(Debug, Clone)]
pub enum MemberImpl {
    /// Function body.
    Function(Body),
    /// Backing field on every instance.
    Stored {
        /// `var` when true.
        mutable: bool,
    },
    /// Computed property without a backing field.
    Getter(Body),
    /// No implementation here; a subtype must provide one.
    Abstract,
}

impl MemberImpl {
    pub fn has_body(&self) -> bool {
        !matches!(self, MemberImpl::Abstract)
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, MemberImpl::Stored { .. })
    }
}

/// Identity used for overriding and overloading: name, kind and parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub kind: MemberKind,
    pub params: Vec<TypeRef>,
}

impl Signature {
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            params: Vec::new(),
        }
    }

    pub fn function(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Function,
            params,
        }
    }

    /// Owner-independent hash, shared by an override and what it overrides.
    pub fn hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(TypeRef::type_hash).collect();
        TypeHash::from_signature(&self.name, self.kind.tag(), &params)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Property => write!(f, "{}", self.name),
            MemberKind::Function => {
                write!(f, "{}(", self.name)?;
                for (i, param) in self.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A property or function declared by a class or interface.
#[derive(Debug, Clone)]
pub struct MemberSlot {
    pub name: String,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub modifiers: MemberModifiers,
    /// Parameters (functions only).
    pub params: Vec<ParamDecl>,
    /// Property type or function return type.
    pub ty: TypeRef,
    pub implementation: MemberImpl,
}

impl MemberSlot {
    fn new(name: impl Into<String>, kind: MemberKind, ty: TypeRef, implementation: MemberImpl) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            modifiers: MemberModifiers::empty(),
            params: Vec::new(),
            ty,
            implementation,
        }
    }

    /// `fun name(params) { body }`
    pub fn function(name: impl Into<String>, params: Vec<ParamDecl>, body: Body) -> Self {
        let mut slot = Self::new(name, MemberKind::Function, TypeRef::Any, MemberImpl::Function(body));
        slot.params = params;
        slot
    }

    /// `abstract fun name(params)`, or an interface function without default body.
    pub fn abstract_function(name: impl Into<String>, params: Vec<ParamDecl>) -> Self {
        let mut slot = Self::new(name, MemberKind::Function, TypeRef::Any, MemberImpl::Abstract);
        slot.params = params;
        slot.modifiers = MemberModifiers::ABSTRACT;
        slot
    }

    /// `val name: T` with a backing field.
    pub fn val(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::new(name, MemberKind::Property, ty, MemberImpl::Stored { mutable: false })
    }

    /// `var name: T` with a backing field.
    pub fn var(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::new(name, MemberKind::Property, ty, MemberImpl::Stored { mutable: true })
    }

    /// `val name: T get() = body`
    pub fn getter(name: impl Into<String>, ty: TypeRef, body: Body) -> Self {
        Self::new(name, MemberKind::Property, ty, MemberImpl::Getter(body))
    }

    /// `abstract val name: T`, or an interface property without getter.
    pub fn abstract_property(name: impl Into<String>, ty: TypeRef) -> Self {
        let mut slot = Self::new(name, MemberKind::Property, ty, MemberImpl::Abstract);
        slot.modifiers = MemberModifiers::ABSTRACT;
        slot
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add modifiers to the ones already set.
    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = ty;
        self
    }

    pub fn open(self) -> Self {
        self.with_modifiers(MemberModifiers::OPEN)
    }

    pub fn overriding(self) -> Self {
        self.with_modifiers(MemberModifiers::OVERRIDE)
    }

    /// `final override`
    pub fn final_override(self) -> Self {
        self.with_modifiers(MemberModifiers::OVERRIDE | MemberModifiers::FINAL)
    }

    pub fn signature(&self) -> Signature {
        match self.kind {
            MemberKind::Property => Signature::property(&self.name),
            MemberKind::Function => Signature::function(
                &self.name,
                self.params.iter().map(ParamDecl::signature_type).collect(),
            ),
        }
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    pub fn is_function(&self) -> bool {
        self.kind == MemberKind::Function
    }

    /// Abstract by modifier or for lack of a body.
    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract() || !self.implementation.has_body()
    }

    /// Whether the property can be reassigned.
    pub fn is_mutable(&self) -> bool {
        matches!(self.implementation, MemberImpl::Stored { mutable: true })
    }
}
