//! Declaration entry types.
//!
//! - [`DeclEntry`] - Unified enum wrapping classes and interfaces
//! - [`ClassDecl`] - Class declarations with constructors and init units
//! - [`InterfaceDecl`] - Interface declarations
//!
//! Supporting types:
//! - [`MemberSlot`], [`Signature`] - Properties and functions
//! - [`ParamDecl`], [`Promotion`] - Parameters
//! - [`PrimaryCtor`], [`SecondaryCtorDecl`], [`Delegation`] - Constructors
//! - [`InitUnit`] - Property initializers and init blocks

mod class;
mod constructor;
mod decl_entry;
mod init_unit;
mod interface;
mod member;
mod param;

pub use class::ClassDecl;
pub use constructor::{Delegation, PrimaryCtor, SecondaryCtorDecl, constructor_signature};
pub use decl_entry::DeclEntry;
pub use init_unit::InitUnit;
pub use interface::InterfaceDecl;
pub use member::{MemberImpl, MemberKind, MemberSlot, Signature};
pub use param::{ParamDecl, Promotion};
