//! Unified declaration entry.

use crate::{MemberSlot, TypeHash};

use super::{ClassDecl, InterfaceDecl};

/// A registered type: class or interface.
#[derive(Debug, Clone)]
pub enum DeclEntry {
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

impl DeclEntry {
    pub fn name(&self) -> &str {
        match self {
            DeclEntry::Class(c) => &c.name,
            DeclEntry::Interface(i) => &i.name,
        }
    }

    pub fn type_hash(&self) -> TypeHash {
        match self {
            DeclEntry::Class(c) => c.type_hash,
            DeclEntry::Interface(i) => i.type_hash,
        }
    }

    pub fn members(&self) -> &[MemberSlot] {
        match self {
            DeclEntry::Class(c) => &c.members,
            DeclEntry::Interface(i) => &i.members,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, DeclEntry::Interface(_))
    }

    pub fn as_class(&self) -> Option<&ClassDecl> {
        match self {
            DeclEntry::Class(c) => Some(c),
            DeclEntry::Interface(_) => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match self {
            DeclEntry::Interface(i) => Some(i),
            DeclEntry::Class(_) => None,
        }
    }

    /// Direct supertypes: superclass first, then interfaces in order.
    pub fn direct_supertypes(&self) -> Vec<&str> {
        match self {
            DeclEntry::Class(c) => c
                .superclass
                .iter()
                .chain(c.interfaces.iter())
                .map(String::as_str)
                .collect(),
            DeclEntry::Interface(i) => i.supers.iter().map(String::as_str).collect(),
        }
    }
}

impl From<ClassDecl> for DeclEntry {
    fn from(class: ClassDecl) -> Self {
        DeclEntry::Class(class)
    }
}

impl From<InterfaceDecl> for DeclEntry {
    fn from(interface: InterfaceDecl) -> Self {
        DeclEntry::Interface(interface)
    }
}
