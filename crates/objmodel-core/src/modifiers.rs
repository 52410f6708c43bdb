//! Inheritance modifiers for classes and members, and the dispatch tag
//! computed for every member when the declaration table is frozen.

use std::fmt;

use bitflags::bitflags;

use crate::TypeHash;

bitflags! {
    /// Modifiers written on a member declaration.
    ///
    /// ```rust
    /// use objmodel_core::MemberModifiers;
    ///
    /// // `final override fun draw()`
    /// let sealed = MemberModifiers::OVERRIDE | MemberModifiers::FINAL;
    /// assert!(sealed.contains(MemberModifiers::FINAL));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberModifiers: u8 {
        /// Member may be overridden by subclasses.
        const OPEN = 0b0001;
        /// Member overrides an ancestor member.
        const OVERRIDE = 0b0010;
        /// Member may not be overridden further.
        const FINAL = 0b0100;
        /// Member has no implementation in its declaring type.
        const ABSTRACT = 0b1000;
    }
}

impl MemberModifiers {
    /// Check for the `override` modifier.
    pub fn is_override(self) -> bool {
        self.contains(MemberModifiers::OVERRIDE)
    }

    /// Check for the `final` modifier.
    pub fn is_final(self) -> bool {
        self.contains(MemberModifiers::FINAL)
    }

    /// Check for the `abstract` modifier.
    pub fn is_abstract(self) -> bool {
        self.contains(MemberModifiers::ABSTRACT)
    }

    /// Check for the `open` modifier.
    pub fn is_open(self) -> bool {
        self.contains(MemberModifiers::OPEN)
    }
}

/// Modality of a class declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassModality {
    /// Cannot be subclassed (the default).
    #[default]
    Final,
    /// May be subclassed.
    Open,
    /// May be subclassed, cannot be instantiated directly.
    Abstract,
}

impl ClassModality {
    /// Whether subclasses may extend a class with this modality.
    pub fn is_inheritable(self) -> bool {
        !matches!(self, ClassModality::Final)
    }
}

impl fmt::Display for ClassModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassModality::Final => write!(f, "final"),
            ClassModality::Open => write!(f, "open"),
            ClassModality::Abstract => write!(f, "abstract"),
        }
    }
}

/// How calls to a member are dispatched, fixed once at freeze time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// Neither open nor override: resolves statically to the declaring type.
    NonVirtual,
    /// Open member that subclasses may override.
    Open,
    /// Abstract member with no body in its declaring type.
    Abstract,
    /// Overrides the member declared on `ancestor`; still overridable.
    Override {
        /// Type declaring the overridden member.
        ancestor: TypeHash,
    },
    /// Overrides the member declared on `ancestor` and forbids further overriding.
    FinalOverride {
        /// Type declaring the overridden member.
        ancestor: TypeHash,
    },
}

impl Dispatch {
    /// Whether calls through a base-typed reference redispatch on the runtime class.
    pub fn is_virtual(self) -> bool {
        !matches!(self, Dispatch::NonVirtual)
    }

    /// Whether a subclass may override a member with this tag.
    pub fn is_overridable(self) -> bool {
        matches!(
            self,
            Dispatch::Open | Dispatch::Abstract | Dispatch::Override { .. }
        )
    }

    /// The overridden ancestor, if any.
    pub fn ancestor(self) -> Option<TypeHash> {
        match self {
            Dispatch::Override { ancestor } | Dispatch::FinalOverride { ancestor } => {
                Some(ancestor)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_override_is_not_overridable() {
        let ancestor = TypeHash::from_name("Shape");
        assert!(Dispatch::Override { ancestor }.is_overridable());
        assert!(!Dispatch::FinalOverride { ancestor }.is_overridable());
        assert!(!Dispatch::NonVirtual.is_overridable());
        assert!(Dispatch::Abstract.is_overridable());
    }

    #[test]
    fn only_non_virtual_is_static() {
        assert!(!Dispatch::NonVirtual.is_virtual());
        assert!(Dispatch::Open.is_virtual());
        assert!(
            Dispatch::FinalOverride {
                ancestor: TypeHash::EMPTY
            }
            .is_virtual()
        );
    }

    #[test]
    fn modality_inheritance() {
        assert!(!ClassModality::Final.is_inheritable());
        assert!(ClassModality::Open.is_inheritable());
        assert!(ClassModality::Abstract.is_inheritable());
    }
}
