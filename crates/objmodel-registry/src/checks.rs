//! Structural declaration checks.
//!
//! Everything that can be judged one declaration at a time: supertype
//! references, modifier combinations, duplicate members and constructors,
//! parameter lists and init units. Override legality needs completed
//! ancestors and lives in [`crate::override_check`].

use objmodel_core::{
    ClassDecl, DeclEntry, DeclarationError, Delegation, InitUnit, InterfaceDecl, MemberModifiers,
    MemberSlot, ParamDecl, constructor_signature,
};
use rustc_hash::FxHashSet;

use crate::DeclTable;

/// Run every structural check over the table.
pub(crate) fn check_declarations(table: &DeclTable) -> Vec<DeclarationError> {
    let mut checker = Checker {
        table,
        errors: Vec::new(),
    };
    for entry in table.entries() {
        match entry {
            DeclEntry::Class(class) => checker.check_class(class),
            DeclEntry::Interface(interface) => checker.check_interface(interface),
        }
    }
    checker.errors
}

struct Checker<'a> {
    table: &'a DeclTable,
    errors: Vec<DeclarationError>,
}

impl Checker<'_> {
    fn check_class(&mut self, class: &ClassDecl) {
        if let Some(superclass) = &class.superclass {
            match self.table.lookup(superclass).ok() {
                None => self.unknown(superclass, &class.name),
                Some(DeclEntry::Interface(_)) => self.errors.push(DeclarationError::InvalidSupertype {
                    class: class.name.clone(),
                    supertype: superclass.clone(),
                    reason: "an interface cannot be extended, only implemented",
                }),
                Some(DeclEntry::Class(parent)) if !parent.modality.is_inheritable() => {
                    self.errors.push(DeclarationError::FinalSuperclass {
                        class: class.name.clone(),
                        superclass: superclass.clone(),
                    })
                }
                Some(DeclEntry::Class(_)) => {}
            }
        }

        for interface in &class.interfaces {
            match self.table.lookup(interface).ok() {
                None => self.unknown(interface, &class.name),
                Some(DeclEntry::Class(_)) => self.errors.push(DeclarationError::InvalidSupertype {
                    class: class.name.clone(),
                    supertype: interface.clone(),
                    reason: "a class cannot be implemented, only extended",
                }),
                Some(DeclEntry::Interface(_)) => {}
            }
        }

        if let Some(enclosing) = &class.enclosing {
            match self.table.lookup(enclosing).ok() {
                None => self.unknown(enclosing, &class.name),
                Some(DeclEntry::Interface(_)) => self.errors.push(DeclarationError::InvalidSupertype {
                    class: class.name.clone(),
                    supertype: enclosing.clone(),
                    reason: "an inner class must be nested in a class",
                }),
                Some(DeclEntry::Class(_)) => {}
            }
        }

        self.check_members(&class.name, &class.members, false);
        self.check_constructors(class);

        for unit in &class.init_units {
            if let InitUnit::Property { name, .. } = unit
                && class.stored_property(name).is_none()
            {
                self.errors.push(DeclarationError::InitializerWithoutProperty {
                    class: class.name.clone(),
                    property: name.clone(),
                });
            }
        }
    }

    fn check_interface(&mut self, interface: &InterfaceDecl) {
        for parent in &interface.supers {
            match self.table.lookup(parent).ok() {
                None => self.unknown(parent, &interface.name),
                Some(DeclEntry::Class(_)) => self.errors.push(DeclarationError::InvalidSupertype {
                    class: interface.name.clone(),
                    supertype: parent.clone(),
                    reason: "an interface can only extend interfaces",
                }),
                Some(DeclEntry::Interface(_)) => {}
            }
        }

        for member in &interface.members {
            if member.implementation.is_stored() {
                self.errors.push(DeclarationError::StoredPropertyInInterface {
                    interface: interface.name.clone(),
                    member: member.name.clone(),
                });
            }
        }
        self.check_members(&interface.name, &interface.members, true);
    }

    fn check_members(&mut self, owner: &str, members: &[MemberSlot], in_interface: bool) {
        let mut seen = FxHashSet::default();
        for member in members {
            let signature = member.signature();
            if !seen.insert(signature.hash()) {
                self.errors.push(DeclarationError::DuplicateMember {
                    owner: owner.to_string(),
                    signature: signature.to_string(),
                });
            }

            if let Some(detail) = conflicting_modifiers(member, in_interface) {
                self.errors.push(DeclarationError::ConflictingModifiers {
                    owner: owner.to_string(),
                    member: member.name.clone(),
                    detail,
                });
            }

            if let Some(name) = member.ty.named_type() {
                self.check_type_ref(name, owner);
            }
            self.check_params(owner, &signature.to_string(), &member.params);
            for param in member.params.iter().filter(|p| p.promotion.is_some()) {
                self.errors.push(DeclarationError::PromotionOutsidePrimary {
                    class: owner.to_string(),
                    param: param.name.clone(),
                });
            }
        }
    }

    fn check_constructors(&mut self, class: &ClassDecl) {
        let mut seen = FxHashSet::default();

        if let Some(primary) = &class.primary {
            let (hash, rendered) = constructor_signature(&class.name, &primary.params);
            seen.insert(hash);
            self.check_params(&class.name, &rendered, &primary.params);
            if primary.super_args.is_some() && class.superclass.is_none() {
                self.errors.push(DeclarationError::SuperCallWithoutSuperclass {
                    class: class.name.clone(),
                });
            }
        }

        for (index, ctor) in class.secondaries.iter().enumerate() {
            let (hash, rendered) = constructor_signature(&class.name, &ctor.params);
            if !seen.insert(hash) {
                self.errors.push(DeclarationError::DuplicateConstructor {
                    class: class.name.clone(),
                    signature: rendered.clone(),
                });
            }
            self.check_params(&class.name, &rendered, &ctor.params);

            for param in ctor.params.iter().filter(|p| p.promotion.is_some()) {
                self.errors.push(DeclarationError::PromotionOutsidePrimary {
                    class: class.name.clone(),
                    param: param.name.clone(),
                });
            }

            match &ctor.delegation {
                Delegation::This(_) => {}
                _ if class.primary.is_some() => {
                    self.errors.push(DeclarationError::MissingPrimaryDelegation {
                        class: class.name.clone(),
                        index,
                    })
                }
                Delegation::Super(_) if class.superclass.is_none() => {
                    self.errors.push(DeclarationError::SuperCallWithoutSuperclass {
                        class: class.name.clone(),
                    })
                }
                _ => {}
            }
        }
    }

    fn check_params(&mut self, owner: &str, callable: &str, params: &[ParamDecl]) {
        if params.iter().filter(|p| p.vararg).count() > 1 {
            self.errors.push(DeclarationError::MultipleVarargs {
                owner: owner.to_string(),
                callable: callable.to_string(),
            });
        }
        for param in params {
            if let Some(name) = param.ty.named_type() {
                self.check_type_ref(name, owner);
            }
        }
    }

    fn check_type_ref(&mut self, name: &str, referenced_by: &str) {
        if !self.table.contains(name) {
            self.unknown(name, referenced_by);
        }
    }

    fn unknown(&mut self, name: &str, referenced_by: &str) {
        self.errors.push(DeclarationError::UnknownType {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        });
    }
}

fn conflicting_modifiers(member: &MemberSlot, in_interface: bool) -> Option<&'static str> {
    let modifiers = member.modifiers;
    if modifiers.contains(MemberModifiers::FINAL | MemberModifiers::ABSTRACT) {
        Some("final and abstract")
    } else if modifiers.contains(MemberModifiers::FINAL | MemberModifiers::OPEN) {
        Some("final and open")
    } else if modifiers.is_abstract() && member.implementation.has_body() {
        Some("abstract member with a body")
    } else if in_interface && modifiers.is_final() {
        Some("interface members cannot be final")
    } else if member.is_property() && !member.params.is_empty() {
        Some("properties take no parameters")
    } else {
        None
    }
}
