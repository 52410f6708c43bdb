//! Core data model for the object-model evaluator.
//!
//! This crate holds everything the declaration table and the runtime share:
//!
//! - [`ClassDecl`], [`InterfaceDecl`], [`DeclEntry`] - declarations
//! - [`MemberSlot`], [`ParamDecl`], constructors and [`InitUnit`]s
//! - [`Value`], [`ObjectHandle`], [`TypeRef`] - runtime values and declared types
//! - [`Body`] and the [`CallContext`] trait bodies execute against
//! - [`CallArgs`] - call-site arguments
//! - [`TypeHash`] - deterministic identities
//! - error types for every phase

pub mod body;
pub mod call_args;
pub mod entries;
pub mod error;
pub mod modifiers;
pub mod type_hash;
pub mod type_ref;
pub mod value;
pub mod visibility;

pub use body::{ArgScope, Body, CallContext, DefaultExpr, DelegationArgs};
pub use call_args::{Arg, CallArgs};
pub use entries::{
    ClassDecl, DeclEntry, Delegation, InitUnit, InterfaceDecl, MemberImpl, MemberKind, MemberSlot,
    ParamDecl, PrimaryCtor, Promotion, SecondaryCtorDecl, Signature, constructor_signature,
};
pub use error::{
    BindError, ConstructionError, DeclarationError, DeclarationErrors, ModelError, RuntimeError,
};
pub use modifiers::{ClassModality, Dispatch, MemberModifiers};
pub use type_hash::{TypeHash, hash_constants};
pub use type_ref::TypeRef;
pub use value::{FunctionValue, ObjectHandle, Value};
pub use visibility::Visibility;
