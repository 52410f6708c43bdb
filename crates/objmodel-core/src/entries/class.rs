//! Class declarations.

use crate::{Body, ClassModality, MemberSlot, TypeHash};

use super::{InitUnit, PrimaryCtor, SecondaryCtorDecl};

/// Declaration of a class.
///
/// Built with the `with_*` methods and registered in the declaration table.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    /// Hash of `name`.
    pub type_hash: TypeHash,
    pub superclass: Option<String>,
    /// Implemented interfaces, in declaration order.
    pub interfaces: Vec<String>,
    pub modality: ClassModality,
    /// Enclosing class of an `inner` class.
    pub enclosing: Option<String>,
    pub primary: Option<PrimaryCtor>,
    /// Declared members, including properties declared by primary parameters.
    pub members: Vec<MemberSlot>,
    pub secondaries: Vec<SecondaryCtorDecl>,
    pub init_units: Vec<InitUnit>,
}

impl ClassDecl {
    /// Final class with no supertypes, members or constructors.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_hash: TypeHash::from_name(&name),
            name,
            superclass: None,
            interfaces: Vec::new(),
            modality: ClassModality::Final,
            enclosing: None,
            primary: None,
            members: Vec::new(),
            secondaries: Vec::new(),
            init_units: Vec::new(),
        }
    }

    // === Builder Methods ===

    pub fn with_superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn with_modality(mut self, modality: ClassModality) -> Self {
        self.modality = modality;
        self
    }

    /// `open class`
    pub fn open(self) -> Self {
        self.with_modality(ClassModality::Open)
    }

    /// `inner class` nested in `enclosing`.
    pub fn inner_of(mut self, enclosing: impl Into<String>) -> Self {
        self.enclosing = Some(enclosing.into());
        self
    }

    /// Set the primary constructor. Promoted parameters also declare
    /// stored properties.
    pub fn with_primary(mut self, primary: PrimaryCtor) -> Self {
        for param in &primary.params {
            if let Some(promotion) = param.promotion {
                let slot = if promotion.mutable {
                    MemberSlot::var(&param.name, param.ty.clone())
                } else {
                    MemberSlot::val(&param.name, param.ty.clone())
                };
                self.members.push(
                    slot.with_visibility(promotion.visibility)
                        .with_modifiers(promotion.modifiers),
                );
            }
        }
        self.primary = Some(primary);
        self
    }

    pub fn with_secondary(mut self, ctor: SecondaryCtorDecl) -> Self {
        self.secondaries.push(ctor);
        self
    }

    /// Add a member without an initializer.
    pub fn with_member(mut self, member: MemberSlot) -> Self {
        self.members.push(member);
        self
    }

    /// Add a stored property together with its initializer, placed next in
    /// the init sequence.
    pub fn with_property(mut self, member: MemberSlot, initializer: Body) -> Self {
        self.init_units
            .push(InitUnit::property(member.name.clone(), initializer));
        self.members.push(member);
        self
    }

    /// Append an `init { ... }` block to the init sequence.
    pub fn with_init(mut self, body: Body) -> Self {
        self.init_units.push(InitUnit::block(body));
        self
    }

    // === Queries ===

    pub fn is_abstract(&self) -> bool {
        self.modality == ClassModality::Abstract
    }

    pub fn is_inner(&self) -> bool {
        self.enclosing.is_some()
    }

    /// Neither a primary nor a secondary constructor was declared.
    pub fn has_implicit_primary(&self) -> bool {
        self.primary.is_none() && self.secondaries.is_empty()
    }

    /// Own members with the given name.
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberSlot> {
        self.members.iter().filter(move |m| m.name == name)
    }

    /// Own stored property by name.
    pub fn stored_property(&self, name: &str) -> Option<&MemberSlot> {
        self.members
            .iter()
            .find(|m| m.is_property() && m.name == name && m.implementation.is_stored())
    }
}
