//! Completion Pass - dispatch tags, override legality and vtables.
//!
//! Runs during freeze once the hierarchy is known to be acyclic.
//!
//! ## Algorithm
//!
//! 1. Visit types base first, so every supertype's vtable is complete
//! 2. For each type:
//!    - check each own member against the matching ancestor declarations
//!      and record its dispatch tag and effective parameters
//!    - start from a copy of the superclass vtable
//!    - merge interface members, keeping only the most specific declarers;
//!      unrelated defaults for the same signature are ambiguous
//!    - overlay own members
//!    - a concrete class must end with a body for every entry
//!
//! ## Example
//!
//! ```text
//! open class Shape { open fun draw() }
//! class Mordor : Shape() { final override fun draw() }
//!
//! After completion:
//! - Shape: draw -> Shape.draw (Open)
//! - Mordor: draw -> Mordor.draw (FinalOverride(Shape))
//! ```

use objmodel_core::{DeclEntry, DeclarationError, Dispatch, ParamDecl, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::hierarchy::Hierarchy;
use crate::override_check::{Ancestor, check_member, own_dispatch};
use crate::table::MemberInfo;
use crate::vtable::{MemberRef, VTable, VTableEntry};
use crate::DeclTable;

/// Output of the completion pass.
#[derive(Debug, Default)]
pub(crate) struct CompletionOutput {
    pub(crate) vtables: FxHashMap<TypeHash, VTable>,
    pub(crate) members: FxHashMap<MemberRef, MemberInfo>,
    /// Collected errors.
    pub(crate) errors: Vec<DeclarationError>,
}

pub(crate) struct CompletionPass<'a> {
    table: &'a DeclTable,
    hierarchy: &'a Hierarchy,
    output: CompletionOutput,
}

impl<'a> CompletionPass<'a> {
    pub(crate) fn new(table: &'a DeclTable, hierarchy: &'a Hierarchy) -> Self {
        Self {
            table,
            hierarchy,
            output: CompletionOutput::default(),
        }
    }

    /// Complete every type in `order` (supertypes first).
    pub(crate) fn run(mut self, order: &[TypeHash]) -> CompletionOutput {
        let table = self.table;
        for &hash in order {
            if let Some(entry) = table.get(hash) {
                self.complete(entry);
            }
        }
        self.output
    }

    fn complete(&mut self, entry: &'a DeclEntry) {
        let hash = entry.type_hash();
        let (superclass, interfaces): (Option<&str>, Vec<&str>) = match entry {
            DeclEntry::Class(class) => (
                class.superclass.as_deref(),
                class.interfaces.iter().map(String::as_str).collect(),
            ),
            DeclEntry::Interface(interface) => {
                (None, interface.supers.iter().map(String::as_str).collect())
            }
        };

        let base = superclass
            .and_then(|name| self.table.class(name))
            .and_then(|class| self.output.vtables.get(&class.type_hash))
            .cloned()
            .unwrap_or_default();
        let direct: Vec<TypeHash> = interfaces
            .iter()
            .filter_map(|name| self.table.interface(name))
            .map(|i| i.type_hash)
            .collect();

        self.check_own_members(entry, &base, &direct);

        let mut vtable = base;
        let ambiguous = self.merge_interfaces(&mut vtable, &direct);
        let own_signatures = self.overlay_own_members(entry, &mut vtable);

        if let DeclEntry::Class(class) = entry {
            for (signature, declarers) in ambiguous {
                if own_signatures.contains(&signature.hash) {
                    continue;
                }
                self.output.errors.push(DeclarationError::AmbiguousOverride {
                    class: class.name.clone(),
                    signature: signature.signature.to_string(),
                    interfaces: declarers,
                });
            }

            if !class.is_abstract() {
                for slot in vtable.entries() {
                    if slot.implementation.is_some() || self.is_reported(&class.name, slot) {
                        continue;
                    }
                    self.output
                        .errors
                        .push(DeclarationError::AbstractMemberNotImplemented {
                            class: class.name.clone(),
                            signature: slot.signature.to_string(),
                            declared_in: self.owner_name(slot.declaration.owner).to_string(),
                        });
                }
            }
        }

        trace!(type_name = entry.name(), members = vtable.len(), "completed vtable");
        self.output.vtables.insert(hash, vtable);
    }

    /// Record dispatch tags and effective parameters of the type's own members.
    fn check_own_members(&mut self, entry: &'a DeclEntry, base: &VTable, direct: &[TypeHash]) {
        let owner = entry.type_hash();
        let in_interface = entry.is_interface();

        for (index, member) in entry.members().iter().enumerate() {
            let member_ref = MemberRef::new(owner, index);
            let hash = member.signature().hash();

            let mut class_match = None;
            let mut interface_matches = Vec::new();
            if let Some(inherited) = base.get(hash)
                && let Some(ancestor) = self.ancestor(inherited.declaration)
            {
                if self.is_interface(inherited.declaration.owner) {
                    interface_matches.push(ancestor);
                } else {
                    class_match = Some(ancestor);
                }
            }
            for &interface in direct {
                if let Some(inherited) = self.output.vtables.get(&interface).and_then(|v| v.get(hash))
                    && let Some(ancestor) = self.ancestor(inherited.declaration)
                    && !interface_matches
                        .iter()
                        .any(|a: &Ancestor<'_>| a.member == ancestor.member)
                {
                    interface_matches.push(ancestor);
                }
            }

            let checked = check_member(
                entry.name(),
                member,
                in_interface,
                class_match,
                &interface_matches,
            );
            let (dispatch, overrides) = match checked {
                Ok(checked) => (checked.dispatch, checked.overrides),
                Err(error) => {
                    self.output.errors.push(error);
                    (own_dispatch(member, in_interface), None)
                }
            };

            let params = match overrides.and_then(|a| self.output.members.get(&a)) {
                Some(ancestor) => inherit_defaults(&member.params, &ancestor.params),
                None => member.params.clone(),
            };
            self.output.members.insert(
                member_ref,
                MemberInfo {
                    dispatch,
                    overrides,
                    params,
                },
            );
        }
    }

    /// Merge members declared by direct interfaces. Returns the signatures
    /// that several unrelated interfaces provide with at least one default
    /// body, together with the declaring interface names.
    fn merge_interfaces(
        &self,
        vtable: &mut VTable,
        direct: &[TypeHash],
    ) -> Vec<(VTableEntry, Vec<String>)> {
        let mut order: Vec<TypeHash> = Vec::new();
        let mut candidates: FxHashMap<TypeHash, Vec<VTableEntry>> = FxHashMap::default();
        for interface in direct {
            let Some(table) = self.output.vtables.get(interface) else {
                continue;
            };
            for entry in table.entries() {
                let group = candidates.entry(entry.hash).or_insert_with(|| {
                    order.push(entry.hash);
                    Vec::new()
                });
                if !group.iter().any(|c| c.declaration == entry.declaration) {
                    group.push(entry.clone());
                }
            }
        }

        let mut ambiguous = Vec::new();
        for hash in order {
            let Some(mut group) = candidates.remove(&hash) else {
                continue;
            };

            let existing = vtable.get(hash).cloned();
            if let Some(existing) = &existing {
                if self.is_interface(existing.declaration.owner) {
                    if !group.iter().any(|c| c.declaration == existing.declaration) {
                        group.push(existing.clone());
                    }
                } else if existing.implementation.is_some() {
                    // A class in the chain implements it.
                    continue;
                }
            }

            let group = self.most_specific(group);
            let chosen = match group.as_slice() {
                [single] => single.clone(),
                [first, ..] => {
                    if group.iter().any(|c| c.implementation.is_some()) {
                        let names = group
                            .iter()
                            .map(|c| self.owner_name(c.declaration.owner).to_string())
                            .collect();
                        ambiguous.push((first.clone(), names));
                        VTableEntry {
                            implementation: None,
                            ..first.clone()
                        }
                    } else {
                        first.clone()
                    }
                }
                [] => continue,
            };

            match existing {
                // Abstract in the class chain: an interface default fills it.
                Some(existing) if !self.is_interface(existing.declaration.owner) => {
                    vtable.insert(VTableEntry {
                        implementation: chosen.implementation,
                        ..existing
                    });
                }
                _ => vtable.insert(chosen),
            }
        }
        ambiguous
    }

    /// Overlay the type's own members. Returns their signature hashes.
    fn overlay_own_members(&self, entry: &DeclEntry, vtable: &mut VTable) -> FxHashSet<TypeHash> {
        let owner = entry.type_hash();
        let mut own = FxHashSet::default();
        for (index, member) in entry.members().iter().enumerate() {
            let member_ref = MemberRef::new(owner, index);
            let signature = member.signature();
            let hash = signature.hash();
            own.insert(hash);
            vtable.insert(VTableEntry {
                signature,
                hash,
                declaration: member_ref,
                implementation: member.implementation.has_body().then_some(member_ref),
            });
        }
        own
    }

    /// Drop candidates whose declaring interface is a supertype of another
    /// candidate's declaring interface.
    fn most_specific(&self, group: Vec<VTableEntry>) -> Vec<VTableEntry> {
        group
            .iter()
            .filter(|c| {
                !group.iter().any(|other| {
                    other.declaration.owner != c.declaration.owner
                        && self
                            .hierarchy
                            .is_subtype(other.declaration.owner, c.declaration.owner)
                })
            })
            .cloned()
            .collect()
    }

    fn ancestor(&self, member: MemberRef) -> Option<Ancestor<'a>> {
        let table: &'a DeclTable = self.table;
        let owner = table.get(member.owner)?;
        let slot = owner.members().get(member.index)?;
        let dispatch = self
            .output
            .members
            .get(&member)
            .map(|info| info.dispatch)
            .unwrap_or(Dispatch::NonVirtual);
        Some(Ancestor {
            member,
            slot,
            dispatch,
            owner: owner.name(),
        })
    }

    fn is_interface(&self, hash: TypeHash) -> bool {
        self.table.get(hash).is_some_and(DeclEntry::is_interface)
    }

    fn owner_name(&self, hash: TypeHash) -> &'a str {
        let table: &'a DeclTable = self.table;
        table.type_name(hash).unwrap_or_default()
    }

    fn is_reported(&self, class: &str, slot: &VTableEntry) -> bool {
        let signature = slot.signature.to_string();
        self.output.errors.iter().any(|e| {
            matches!(e, DeclarationError::AmbiguousOverride { class: c, signature: s, .. }
                if c == class && *s == signature)
        })
    }
}

/// An override's parameters take the defaults of the declaration it overrides.
fn inherit_defaults(own: &[ParamDecl], ancestor: &[ParamDecl]) -> Vec<ParamDecl> {
    own.iter()
        .zip(ancestor.iter().map(Some).chain(std::iter::repeat(None)))
        .map(|(param, inherited)| match (&param.default, inherited) {
            (None, Some(inherited)) if inherited.default.is_some() => ParamDecl {
                default: inherited.default.clone(),
                ..param.clone()
            },
            _ => param.clone(),
        })
        .collect()
}
