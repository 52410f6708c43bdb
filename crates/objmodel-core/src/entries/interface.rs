//! Interface declarations.

use crate::{MemberSlot, TypeHash};

/// Declaration of an interface.
///
/// Members are implicitly open. A member without a body is abstract; one with
/// a body is a default implementation.
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_hash: TypeHash,
    /// Super-interfaces in declaration order.
    pub supers: Vec<String>,
    pub members: Vec<MemberSlot>,
}

impl InterfaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            supers: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn with_super(mut self, name: impl Into<String>) -> Self {
        self.supers.push(name.into());
        self
    }

    pub fn with_member(mut self, member: MemberSlot) -> Self {
        self.members.push(member);
        self
    }
}
