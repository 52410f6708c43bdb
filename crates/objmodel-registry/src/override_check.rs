//! Override legality and dispatch tags.
//!
//! Each member is judged against the ancestor declarations of its signature:
//! the nearest one in the superclass chain and those reachable through
//! interfaces. Ancestors are always completed first, so their dispatch tags
//! are already known.

use objmodel_core::{DeclarationError, Dispatch, MemberSlot, TypeHash};

use crate::vtable::MemberRef;

/// An ancestor declaration with the same signature as the member being checked.
#[derive(Debug, Clone, Copy)]
pub struct Ancestor<'a> {
    pub member: MemberRef,
    pub slot: &'a MemberSlot,
    pub dispatch: Dispatch,
    /// Name of the declaring type.
    pub owner: &'a str,
}

impl Ancestor<'_> {
    fn is_final(&self) -> bool {
        matches!(self.dispatch, Dispatch::FinalOverride { .. }) || self.slot.modifiers.is_final()
    }
}

/// Outcome of checking one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked {
    pub dispatch: Dispatch,
    pub overrides: Option<MemberRef>,
}

/// Check one member and compute its dispatch tag.
///
/// `class_match` is the nearest declaration in the superclass chain;
/// `interface_matches` are declarations reachable through interfaces.
pub fn check_member(
    owner: &str,
    member: &MemberSlot,
    in_interface: bool,
    class_match: Option<Ancestor<'_>>,
    interface_matches: &[Ancestor<'_>],
) -> Result<Checked, DeclarationError> {
    let signature = || member.signature().to_string();

    if member.modifiers.is_override() {
        let ancestors = class_match.iter().chain(interface_matches);
        if let Some(sealed) = ancestors.clone().find(|a| a.is_final()) {
            return Err(DeclarationError::OverrideOfFinal {
                owner: owner.to_string(),
                signature: signature(),
                ancestor: sealed.owner.to_string(),
            });
        }
        if class_match.is_some_and(|a| a.dispatch == Dispatch::NonVirtual) {
            return Err(DeclarationError::IllegalOverride {
                owner: owner.to_string(),
                signature: signature(),
            });
        }
        let Some(target) = ancestors.clone().next() else {
            return Err(DeclarationError::IllegalOverride {
                owner: owner.to_string(),
                signature: signature(),
            });
        };
        if let Some(param) = member.params.iter().find(|p| p.has_default()) {
            return Err(DeclarationError::OverrideRedeclaresDefault {
                owner: owner.to_string(),
                signature: signature(),
                param: param.name.clone(),
            });
        }

        let ancestor = target.member.owner;
        return Ok(Checked {
            dispatch: override_dispatch(member, ancestor),
            overrides: Some(target.member),
        });
    }

    let hidden = class_match.iter().chain(interface_matches);
    if let Some(open) = hidden.clone().find(|a| a.dispatch.is_overridable()) {
        return Err(DeclarationError::MissingOverrideModifier {
            owner: owner.to_string(),
            signature: signature(),
            ancestor: open.owner.to_string(),
        });
    }
    if let Some(sealed) = hidden.clone().find(|a| a.is_final()) {
        return Err(DeclarationError::OverrideOfFinal {
            owner: owner.to_string(),
            signature: signature(),
            ancestor: sealed.owner.to_string(),
        });
    }

    // Redeclaring a non-virtual member shadows it.
    Ok(Checked {
        dispatch: own_dispatch(member, in_interface),
        overrides: None,
    })
}

fn override_dispatch(member: &MemberSlot, ancestor: TypeHash) -> Dispatch {
    if member.modifiers.is_final() {
        Dispatch::FinalOverride { ancestor }
    } else if member.is_abstract() {
        Dispatch::Abstract
    } else {
        Dispatch::Override { ancestor }
    }
}

/// Tag of a member that overrides nothing.
pub fn own_dispatch(member: &MemberSlot, in_interface: bool) -> Dispatch {
    if member.is_abstract() {
        Dispatch::Abstract
    } else if member.modifiers.is_open() || in_interface {
        Dispatch::Open
    } else {
        Dispatch::NonVirtual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::{Body, MemberModifiers, ParamDecl, TypeRef, Value};

    fn func(name: &str) -> MemberSlot {
        MemberSlot::function(name, vec![], Body::new(|_| Ok(Value::Unit)))
    }

    fn ancestor<'a>(owner: &'a str, slot: &'a MemberSlot, dispatch: Dispatch) -> Ancestor<'a> {
        Ancestor {
            member: MemberRef::new(TypeHash::from_name(owner), 0),
            slot,
            dispatch,
            owner,
        }
    }

    #[test]
    fn override_of_open_member() {
        let base = func("draw").open();
        let member = func("draw").overriding();
        let checked = check_member(
            "Mordor",
            &member,
            false,
            Some(ancestor("Shape", &base, Dispatch::Open)),
            &[],
        )
        .unwrap();
        assert_eq!(
            checked.dispatch,
            Dispatch::Override {
                ancestor: TypeHash::from_name("Shape")
            }
        );
    }

    #[test]
    fn override_of_final_override_fails() {
        let sealed = func("draw").final_override();
        let member = func("draw").overriding();
        let err = check_member(
            "MordorExecutor",
            &member,
            false,
            Some(ancestor(
                "Mordor",
                &sealed,
                Dispatch::FinalOverride {
                    ancestor: TypeHash::from_name("Shape"),
                },
            )),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::OverrideOfFinal { ancestor, .. } if ancestor == "Mordor"));
    }

    #[test]
    fn override_of_nothing_or_non_virtual_is_illegal() {
        let member = func("fly").overriding();
        assert!(matches!(
            check_member("Cat", &member, false, None, &[]),
            Err(DeclarationError::IllegalOverride { .. })
        ));

        let base = func("fly");
        assert!(matches!(
            check_member(
                "Cat",
                &member,
                false,
                Some(ancestor("Animal", &base, Dispatch::NonVirtual)),
                &[]
            ),
            Err(DeclarationError::IllegalOverride { .. })
        ));
    }

    #[test]
    fn hiding_open_member_needs_override() {
        let base = func("speak").open();
        let member = func("speak");
        assert!(matches!(
            check_member(
                "Dog",
                &member,
                false,
                Some(ancestor("Animal", &base, Dispatch::Open)),
                &[]
            ),
            Err(DeclarationError::MissingOverrideModifier { .. })
        ));
    }

    #[test]
    fn shadowing_non_virtual_is_allowed() {
        let base = func("describe");
        let member = func("describe");
        let checked = check_member(
            "Dog",
            &member,
            false,
            Some(ancestor("Animal", &base, Dispatch::NonVirtual)),
            &[],
        )
        .unwrap();
        assert_eq!(checked.dispatch, Dispatch::NonVirtual);
        assert_eq!(checked.overrides, None);
    }

    #[test]
    fn interface_member_can_be_overridden() {
        let base = MemberSlot::abstract_function("click", vec![]);
        let member = func("click").overriding();
        let checked = check_member(
            "Button",
            &member,
            false,
            None,
            &[ancestor("Clickable", &base, Dispatch::Abstract)],
        )
        .unwrap();
        assert_eq!(
            checked.overrides,
            Some(MemberRef::new(TypeHash::from_name("Clickable"), 0))
        );
    }

    #[test]
    fn override_may_not_redeclare_defaults() {
        let base = MemberSlot::function(
            "foo",
            vec![ParamDecl::new("i", TypeRef::Int).with_default_value(10)],
            Body::new(|_| Ok(Value::Unit)),
        )
        .open();
        let member = MemberSlot::function(
            "foo",
            vec![ParamDecl::new("i", TypeRef::Int).with_default_value(20)],
            Body::new(|_| Ok(Value::Unit)),
        )
        .with_modifiers(MemberModifiers::OVERRIDE);
        assert!(matches!(
            check_member(
                "B",
                &member,
                false,
                Some(ancestor("A", &base, Dispatch::Open)),
                &[]
            ),
            Err(DeclarationError::OverrideRedeclaresDefault { param, .. }) if param == "i"
        ));
    }

    #[test]
    fn own_dispatch_tags() {
        assert_eq!(own_dispatch(&func("a"), false), Dispatch::NonVirtual);
        assert_eq!(own_dispatch(&func("a").open(), false), Dispatch::Open);
        assert_eq!(own_dispatch(&func("a"), true), Dispatch::Open);
        assert_eq!(
            own_dispatch(&MemberSlot::abstract_function("a", vec![]), true),
            Dispatch::Abstract
        );
    }
}
