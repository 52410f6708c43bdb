//! Member resolution over frozen vtables.
//!
//! Three receivers are supported:
//!
//! - **Virtual**: `obj.m()` binds to whatever the runtime class's vtable holds.
//! - **Static**: a call typed against a supertype. Non-virtual members bind to
//!   the static type's declaration, everything else redispatches on the
//!   runtime class.
//! - **Super**: `super.m()` / `super<T>.m()` looks in the superclass or the
//!   named direct supertype of the executing type.
//!
//! Overloads are kept apart by signature. The `resolve*` operations demand a
//! single candidate, `candidates*` return every implemented overload for the
//! caller to rank.

use objmodel_core::{
    DeclEntry, Dispatch, MemberKind, MemberSlot, ParamDecl, RuntimeError, Signature,
};
use tracing::trace;

use crate::DeclTable;
use crate::vtable::{MemberRef, VTable, VTableEntry};

/// Where member lookup starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver<'n> {
    /// Dispatch on the runtime class.
    Virtual { class: &'n str },
    /// Call typed against `static_class` on an instance of `runtime_class`.
    Static {
        static_class: &'n str,
        runtime_class: &'n str,
    },
    /// `super` call made by code declared in `executing`.
    Super {
        executing: &'n str,
        qualifier: Option<&'n str>,
    },
}

/// A member implementation a call binds to.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub member: MemberRef,
    pub slot: &'a MemberSlot,
    /// Declaring type of the implementation.
    pub owner: &'a DeclEntry,
    pub signature: &'a Signature,
    pub dispatch: Dispatch,
    /// Parameters with inherited defaults.
    pub params: &'a [ParamDecl],
}

impl<'a> Resolved<'a> {
    pub fn owner_name(&self) -> &'a str {
        self.owner.name()
    }
}

impl DeclTable {
    /// Virtual dispatch of `name` on `runtime_class`.
    pub fn resolve(&self, runtime_class: &str, name: &str) -> Result<Resolved<'_>, RuntimeError> {
        self.resolve_with(Receiver::Virtual { class: runtime_class }, name, None)
    }

    /// Resolution through a reference typed as `static_class`.
    pub fn resolve_static(
        &self,
        static_class: &str,
        runtime_class: &str,
        name: &str,
    ) -> Result<Resolved<'_>, RuntimeError> {
        self.resolve_with(
            Receiver::Static {
                static_class,
                runtime_class,
            },
            name,
            None,
        )
    }

    /// `super.name` (no qualifier) or `super<qualifier>.name` from code
    /// declared in `executing`.
    pub fn resolve_super(
        &self,
        executing: &str,
        qualifier: Option<&str>,
        name: &str,
    ) -> Result<Resolved<'_>, RuntimeError> {
        self.resolve_with(
            Receiver::Super {
                executing,
                qualifier,
            },
            name,
            None,
        )
    }

    /// Every implemented overload of `name` visible on `class`.
    pub fn candidates(&self, class: &str, name: &str) -> Result<Vec<Resolved<'_>>, RuntimeError> {
        self.lookup_member(Receiver::Virtual { class }, name, None)
    }

    /// Resolve a single member, optionally restricted to one kind.
    pub fn resolve_with(
        &self,
        receiver: Receiver<'_>,
        name: &str,
        kind: Option<MemberKind>,
    ) -> Result<Resolved<'_>, RuntimeError> {
        let mut found = self.lookup_member(receiver, name, kind)?;
        if found.len() > 1 {
            return Err(RuntimeError::AmbiguousMember {
                type_name: receiver_type(receiver).to_string(),
                member: name.to_string(),
                candidates: found.iter().map(|r| r.signature.to_string()).collect(),
            });
        }
        found.pop().ok_or_else(|| RuntimeError::NoImplementation {
            type_name: receiver_type(receiver).to_string(),
            member: name.to_string(),
        })
    }

    /// All implemented candidates for `name`, optionally restricted to one kind.
    ///
    /// Fails with `UnknownMember` when nothing of that name is declared and
    /// with `NoImplementation` when every match is abstract.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lookup_member(
        &self,
        receiver: Receiver<'_>,
        name: &str,
        kind: Option<MemberKind>,
    ) -> Result<Vec<Resolved<'_>>, RuntimeError> {
        let type_name = receiver_type(receiver);
        let matches_kind = |e: &&VTableEntry| kind.is_none_or(|k| e.signature.kind == k);

        let entries: Vec<&VTableEntry> = match receiver {
            Receiver::Virtual { class } => self.vtable_of(class)?.named(name).filter(matches_kind).collect(),
            Receiver::Static {
                static_class,
                runtime_class,
            } => {
                let runtime = self.vtable_of(runtime_class)?;
                self.vtable_of(static_class)?
                    .named(name)
                    .filter(matches_kind)
                    .map(|entry| {
                        if self.declared_dispatch(entry) == Some(Dispatch::NonVirtual) {
                            entry
                        } else {
                            runtime.get(entry.hash).unwrap_or(entry)
                        }
                    })
                    .collect()
            }
            Receiver::Super {
                executing,
                qualifier,
            } => {
                let target = self.super_target(executing, qualifier)?;
                self.vtable_of(target)?.named(name).filter(matches_kind).collect()
            }
        };

        if entries.is_empty() {
            return Err(RuntimeError::UnknownMember {
                type_name: type_name.to_string(),
                member: name.to_string(),
            });
        }

        let resolved: Vec<Resolved<'_>> = entries
            .into_iter()
            .filter_map(|entry| self.resolved(entry))
            .collect();
        if resolved.is_empty() {
            return Err(RuntimeError::NoImplementation {
                type_name: type_name.to_string(),
                member: name.to_string(),
            });
        }

        trace!(
            type_name,
            member = name,
            candidates = resolved.len(),
            owner = resolved[0].owner_name(),
            "resolved member"
        );
        Ok(resolved)
    }

    /// The type a `super` call starts at.
    fn super_target(&self, executing: &str, qualifier: Option<&str>) -> Result<&str, RuntimeError> {
        let entry = self
            .lookup(executing)
            .map_err(|_| RuntimeError::UnknownType(executing.to_string()))?;
        let direct = entry.direct_supertypes();

        let target = match (qualifier, entry) {
            (Some(q), _) => direct.iter().find(|d| **d == q).copied(),
            (None, DeclEntry::Class(class)) if class.superclass.is_some() => {
                class.superclass.as_deref()
            }
            (None, _) => match direct.as_slice() {
                [only] => Some(*only),
                _ => None,
            },
        };
        target.ok_or_else(|| RuntimeError::InvalidSuperQualifier {
            class: executing.to_string(),
            qualifier: qualifier.unwrap_or("super").to_string(),
        })
    }

    fn vtable_of(&self, name: &str) -> Result<&VTable, RuntimeError> {
        self.vtable(name)
            .ok_or_else(|| RuntimeError::UnknownType(name.to_string()))
    }

    fn declared_dispatch(&self, entry: &VTableEntry) -> Option<Dispatch> {
        self.member_info(entry.declaration).map(|info| info.dispatch)
    }

    fn resolved<'a>(&'a self, entry: &'a VTableEntry) -> Option<Resolved<'a>> {
        let member = entry.implementation?;
        let owner = self.get(member.owner)?;
        let slot = owner.members().get(member.index)?;
        let info = self.member_info(member)?;
        Some(Resolved {
            member,
            slot,
            owner,
            signature: &entry.signature,
            dispatch: info.dispatch,
            params: &info.params,
        })
    }
}

fn receiver_type<'n>(receiver: Receiver<'n>) -> &'n str {
    match receiver {
        Receiver::Virtual { class } => class,
        Receiver::Static { static_class, .. } => static_class,
        Receiver::Super { executing, .. } => executing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::{Body, ClassDecl, ClassModality, InterfaceDecl, TypeRef, Value};

    fn unit() -> Body {
        Body::new(|_| Ok(Value::Unit))
    }

    fn owner_of(resolved: Result<Resolved<'_>, RuntimeError>) -> String {
        resolved.unwrap().owner_name().to_string()
    }

    fn table() -> DeclTable {
        let mut table = DeclTable::new();
        table
            .register_interface(
                InterfaceDecl::new("Clickable")
                    .with_member(MemberSlot::abstract_function("click", vec![]))
                    .with_member(MemberSlot::function("showOff", vec![], unit())),
            )
            .unwrap();
        table
            .register_interface(
                InterfaceDecl::new("Focusable")
                    .with_member(MemberSlot::function("showOff", vec![], unit())),
            )
            .unwrap();
        table
            .register_class(
                ClassDecl::new("Animal")
                    .open()
                    .with_member(MemberSlot::function("speak", vec![], unit()).open())
                    .with_member(MemberSlot::function("describe", vec![], unit()))
                    .with_member(MemberSlot::function("feed", vec![], unit()))
                    .with_member(MemberSlot::function(
                        "feed",
                        vec![ParamDecl::new("food", TypeRef::String)],
                        unit(),
                    )),
            )
            .unwrap();
        table
            .register_class(
                ClassDecl::new("Dog")
                    .with_superclass("Animal")
                    .with_member(MemberSlot::function("speak", vec![], unit()).overriding())
                    .with_member(MemberSlot::function("describe", vec![], unit())),
            )
            .unwrap();
        table
            .register_class(
                ClassDecl::new("Button")
                    .with_interface("Clickable")
                    .with_interface("Focusable")
                    .with_member(MemberSlot::function("click", vec![], unit()).overriding())
                    .with_member(MemberSlot::function("showOff", vec![], unit()).overriding()),
            )
            .unwrap();
        table
            .register_class(
                ClassDecl::new("Shape")
                    .with_modality(ClassModality::Abstract)
                    .with_member(MemberSlot::abstract_function("area", vec![])),
            )
            .unwrap();
        table.freeze().unwrap();
        table
    }

    #[test]
    fn virtual_dispatch_uses_runtime_class() {
        let table = table();
        assert_eq!(owner_of(table.resolve("Dog", "speak")), "Dog");
        assert_eq!(owner_of(table.resolve("Animal", "speak")), "Animal");
    }

    #[test]
    fn static_resolution_of_non_virtual_member() {
        let table = table();
        assert_eq!(owner_of(table.resolve_static("Animal", "Dog", "describe")), "Animal");
        assert_eq!(owner_of(table.resolve_static("Animal", "Dog", "speak")), "Dog");
    }

    #[test]
    fn super_resolution() {
        let table = table();
        assert_eq!(owner_of(table.resolve_super("Dog", None, "speak")), "Animal");
        assert_eq!(
            owner_of(table.resolve_super("Button", Some("Focusable"), "showOff")),
            "Focusable"
        );
        assert!(matches!(
            table.resolve_super("Button", None, "showOff"),
            Err(RuntimeError::InvalidSuperQualifier { .. })
        ));
        assert!(matches!(
            table.resolve_super("Dog", Some("Clickable"), "click"),
            Err(RuntimeError::InvalidSuperQualifier { .. })
        ));
    }

    #[test]
    fn abstract_only_member_has_no_implementation() {
        let table = table();
        assert!(matches!(
            table.resolve("Shape", "area"),
            Err(RuntimeError::NoImplementation { .. })
        ));
        assert!(matches!(
            table.resolve_super("Button", Some("Clickable"), "click"),
            Err(RuntimeError::NoImplementation { .. })
        ));
        assert!(matches!(
            table.resolve("Dog", "fly"),
            Err(RuntimeError::UnknownMember { .. })
        ));
    }

    #[test]
    fn overloads_are_candidates_not_a_single_resolution() {
        let table = table();
        assert_eq!(table.candidates("Dog", "feed").unwrap().len(), 2);
        assert!(matches!(
            table.resolve("Dog", "feed"),
            Err(RuntimeError::AmbiguousMember { candidates, .. }) if candidates.len() == 2
        ));
    }

    #[test]
    fn kind_filter() {
        let table = table();
        assert!(matches!(
            table.resolve_with(Receiver::Virtual { class: "Dog" }, "speak", Some(MemberKind::Property)),
            Err(RuntimeError::UnknownMember { .. })
        ));
    }
}
