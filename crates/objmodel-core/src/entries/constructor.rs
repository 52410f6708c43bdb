//! Primary and secondary constructor declarations.

use crate::{Body, DelegationArgs, TypeHash, TypeRef, Visibility};

use super::ParamDecl;

/// Primary constructor declared in the class header.
#[derive(Debug, Clone, Default)]
pub struct PrimaryCtor {
    pub params: Vec<ParamDecl>,
    pub visibility: Visibility,
    /// Arguments of the header superclass call (`: Animal(name)`). `None`
    /// means an implicit `super()`.
    pub super_args: Option<DelegationArgs>,
}

impl PrimaryCtor {
    pub fn new(params: Vec<ParamDecl>) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_super_args(mut self, args: DelegationArgs) -> Self {
        self.super_args = Some(args);
        self
    }
}

/// Target of a secondary constructor's delegation.
#[derive(Debug, Clone)]
pub enum Delegation {
    /// `: this(args)`
    This(DelegationArgs),
    /// `: super(args)`
    Super(DelegationArgs),
    /// No delegation clause: `super()` when the class has a superclass.
    Implicit,
}

/// A secondary constructor (`constructor(...) : delegation { body }`).
#[derive(Debug, Clone)]
pub struct SecondaryCtorDecl {
    pub params: Vec<ParamDecl>,
    pub visibility: Visibility,
    pub delegation: Delegation,
    /// Runs after the class's init units.
    pub body: Option<Body>,
}

impl SecondaryCtorDecl {
    pub fn new(params: Vec<ParamDecl>, delegation: Delegation) -> Self {
        Self {
            params,
            visibility: Visibility::Public,
            delegation,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Parameter types of a constructor, used for duplicate detection.
pub fn constructor_signature(class: &str, params: &[ParamDecl]) -> (TypeHash, String) {
    let types: Vec<TypeRef> = params.iter().map(ParamDecl::signature_type).collect();
    let hashes: Vec<TypeHash> = types.iter().map(TypeRef::type_hash).collect();
    let rendered: Vec<String> = types.iter().map(ToString::to_string).collect();
    (
        TypeHash::from_constructor(TypeHash::from_name(class), &hashes),
        format!("{class}({})", rendered.join(", ")),
    )
}
