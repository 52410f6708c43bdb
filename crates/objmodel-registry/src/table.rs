//! DeclTable - the registry of class and interface declarations.
//!
//! # Lifecycle
//!
//! - **Registration phase**: declarations are added with [`DeclTable::register`].
//!   Names are unique; forward references are fine because nothing is
//!   resolved until freeze.
//!
//! - **Freeze**: [`DeclTable::freeze`] runs every declaration-time check,
//!   computes dispatch tags and builds the per-type vtables. All errors are
//!   collected. Only a freeze that finds none marks the table frozen.
//!
//! - **Execution phase**: the frozen table is read-only and `Send + Sync`, so
//!   several runtimes may share it through an `Arc`.
//!
//! # Example
//!
//! ```
//! use objmodel_core::{Body, ClassDecl, MemberSlot, Value};
//! use objmodel_registry::DeclTable;
//!
//! let mut table = DeclTable::new();
//! table
//!     .register_class(
//!         ClassDecl::new("Shape")
//!             .open()
//!             .with_member(MemberSlot::function("draw", vec![], Body::new(|_| Ok(Value::Unit))).open()),
//!     )
//!     .unwrap();
//! table.freeze().unwrap();
//! assert!(table.is_frozen());
//! ```

use objmodel_core::{
    ClassDecl, DeclEntry, DeclarationError, DeclarationErrors, Dispatch, InterfaceDecl,
    MemberSlot, ParamDecl, TypeHash,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::checks::check_declarations;
use crate::completion::CompletionPass;
use crate::hierarchy::Hierarchy;
use crate::vtable::{MemberRef, VTable};

/// Facts about one member declaration fixed at freeze.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub dispatch: Dispatch,
    /// The ancestor declaration this member overrides.
    pub overrides: Option<MemberRef>,
    /// Parameters with defaults inherited from the overridden declaration.
    pub params: Vec<ParamDecl>,
}

/// Everything computed by a successful freeze.
#[derive(Debug, Default)]
pub(crate) struct Completed {
    pub(crate) hierarchy: Hierarchy,
    pub(crate) vtables: FxHashMap<TypeHash, VTable>,
    pub(crate) members: FxHashMap<MemberRef, MemberInfo>,
}

/// Registry of class and interface declarations.
#[derive(Debug, Default)]
pub struct DeclTable {
    /// Entries in registration order.
    entries: Vec<DeclEntry>,
    /// Type hash to entry position.
    by_hash: FxHashMap<TypeHash, usize>,
    /// Set by a successful freeze.
    completed: Option<Completed>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class or interface.
    pub fn register(&mut self, entry: DeclEntry) -> Result<(), DeclarationError> {
        if self.is_frozen() {
            return Err(DeclarationError::TableFrozen {
                name: entry.name().to_string(),
            });
        }
        let hash = entry.type_hash();
        if self.by_hash.contains_key(&hash) {
            return Err(DeclarationError::DuplicateType(entry.name().to_string()));
        }
        self.by_hash.insert(hash, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn register_class(&mut self, class: ClassDecl) -> Result<(), DeclarationError> {
        self.register(DeclEntry::Class(class))
    }

    pub fn register_interface(&mut self, interface: InterfaceDecl) -> Result<(), DeclarationError> {
        self.register(DeclEntry::Interface(interface))
    }

    // ==========================================================================
    // Freeze
    // ==========================================================================

    /// Validate every declaration and build dispatch tables.
    ///
    /// Returns every error found. A table that is already frozen is left
    /// untouched.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn freeze(&mut self) -> Result<(), DeclarationErrors> {
        if self.is_frozen() {
            return Ok(());
        }

        let mut errors = DeclarationErrors::new();
        errors.extend(check_declarations(self));

        let hierarchy = Hierarchy::build(self.entries.iter());
        for cycle in hierarchy.cycles() {
            let name = cycle
                .iter()
                .filter_map(|&h| self.get(h).map(DeclEntry::name))
                .min()
                .unwrap_or_default()
                .to_string();
            errors.push(DeclarationError::CircularInheritance { name });
        }

        let completed = match hierarchy.base_first() {
            Ok(order) => {
                let output = CompletionPass::new(self, &hierarchy).run(&order);
                errors.extend(output.errors);
                Some(Completed {
                    hierarchy,
                    vtables: output.vtables,
                    members: output.members,
                })
            }
            // Already reported as CircularInheritance.
            Err(_) => None,
        };

        if !errors.is_empty() {
            warn!(errors = errors.len(), "declaration table rejected");
            return Err(errors);
        }

        if let Some(completed) = completed {
            debug!(
                types = self.entries.len(),
                members = completed.members.len(),
                "declaration table frozen"
            );
            self.completed = Some(completed);
        }
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.completed.is_some()
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Entry by name.
    pub fn lookup(&self, name: &str) -> Result<&DeclEntry, DeclarationError> {
        self.get(TypeHash::from_name(name))
            .ok_or_else(|| DeclarationError::UnknownType {
                name: name.to_string(),
                referenced_by: "lookup".to_string(),
            })
    }

    /// Entry by type hash.
    pub fn get(&self, hash: TypeHash) -> Option<&DeclEntry> {
        self.by_hash.get(&hash).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_hash.contains_key(&TypeHash::from_name(name))
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.get(TypeHash::from_name(name))
            .and_then(DeclEntry::as_class)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.get(TypeHash::from_name(name))
            .and_then(DeclEntry::as_interface)
    }

    /// All entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &DeclEntry> {
        self.entries.iter()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.entries.iter().filter_map(DeclEntry::as_class)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of a registered type.
    pub fn type_name(&self, hash: TypeHash) -> Option<&str> {
        self.get(hash).map(DeclEntry::name)
    }

    /// Whether `sub` is `sup` or inherits from it.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let (sub, sup) = (TypeHash::from_name(sub), TypeHash::from_name(sup));
        match &self.completed {
            Some(completed) => completed.hierarchy.is_subtype(sub, sup),
            None => Hierarchy::build(self.entries.iter()).is_subtype(sub, sup),
        }
    }

    /// Superclasses of a class from its immediate parent to the root.
    pub fn superclass_chain(&self, name: &str) -> Vec<&ClassDecl> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = self.class(name);

        while let Some(class) = current
            && seen.insert(class.type_hash)
            && let Some(superclass) = class.superclass.as_deref()
            && let Some(parent) = self.class(superclass)
        {
            chain.push(parent);
            current = Some(parent);
        }

        chain
    }

    // ==========================================================================
    // Frozen Data
    // ==========================================================================

    /// Member declaration by reference.
    pub fn member(&self, member: MemberRef) -> Option<&MemberSlot> {
        self.get(member.owner)
            .and_then(|e| e.members().get(member.index))
    }

    /// Dispatch tag, overridden ancestor and effective parameters of a member.
    pub fn member_info(&self, member: MemberRef) -> Option<&MemberInfo> {
        self.completed.as_ref()?.members.get(&member)
    }

    /// `member` followed by every declaration it overrides, nearest first.
    pub fn override_chain(
        &self,
        member: MemberRef,
    ) -> impl Iterator<Item = (&DeclEntry, &MemberSlot)> + '_ {
        std::iter::successors(Some(member), |m| {
            self.member_info(*m).and_then(|info| info.overrides)
        })
        .filter_map(|m| Some((self.get(m.owner)?, self.member(m)?)))
    }

    /// Vtable of a type; `None` before freeze.
    pub fn vtable(&self, name: &str) -> Option<&VTable> {
        self.vtable_by_hash(TypeHash::from_name(name))
    }

    pub fn vtable_by_hash(&self, hash: TypeHash) -> Option<&VTable> {
        self.completed.as_ref()?.vtables.get(&hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::{Body, MemberModifiers, PrimaryCtor, TypeRef, Value};

    fn unit() -> Body {
        Body::new(|_| Ok(Value::Unit))
    }

    #[test]
    fn duplicate_type_error() {
        let mut table = DeclTable::new();
        table.register_class(ClassDecl::new("Cat")).unwrap();
        let result = table.register_class(ClassDecl::new("Cat"));
        assert_eq!(result, Err(DeclarationError::DuplicateType("Cat".into())));
    }

    #[test]
    fn register_after_freeze_fails() {
        let mut table = DeclTable::new();
        table.register_class(ClassDecl::new("Cat")).unwrap();
        table.freeze().unwrap();
        let result = table.register_class(ClassDecl::new("Dog"));
        assert!(matches!(result, Err(DeclarationError::TableFrozen { .. })));
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut table = DeclTable::new();
        table.register_class(ClassDecl::new("Cat")).unwrap();
        assert!(table.freeze().is_ok());
        assert!(table.freeze().is_ok());
        assert!(table.is_frozen());
    }

    #[test]
    fn failed_freeze_collects_every_error_and_stays_unfrozen() {
        let mut table = DeclTable::new();
        table
            .register_class(ClassDecl::new("Shape").with_member(MemberSlot::function(
                "draw",
                vec![],
                unit(),
            )))
            .unwrap();
        table
            .register_class(
                ClassDecl::new("Circle")
                    .with_superclass("Shape")
                    .with_interface("Missing"),
            )
            .unwrap();

        let errors = table.freeze().unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, DeclarationError::FinalSuperclass { .. }))
        );
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, DeclarationError::UnknownType { name, .. } if name == "Missing"))
        );
        assert!(!table.is_frozen());
        assert!(table.vtable("Shape").is_none());
    }

    #[test]
    fn circular_inheritance_is_reported_once_per_cycle() {
        let mut table = DeclTable::new();
        table
            .register_class(ClassDecl::new("A").open().with_superclass("B"))
            .unwrap();
        table
            .register_class(ClassDecl::new("B").open().with_superclass("A"))
            .unwrap();
        let errors = table.freeze().unwrap_err();
        let cycles: Vec<_> = errors
            .iter()
            .filter(|e| matches!(e, DeclarationError::CircularInheritance { .. }))
            .collect();
        assert_eq!(
            cycles,
            [&DeclarationError::CircularInheritance { name: "A".into() }]
        );
        assert!(table.superclass_chain("A").len() <= 2);
    }

    #[test]
    fn superclass_chain_is_parent_first() {
        let mut table = DeclTable::new();
        table.register_class(ClassDecl::new("Animal").open()).unwrap();
        table
            .register_class(ClassDecl::new("Cat").open().with_superclass("Animal"))
            .unwrap();
        table
            .register_class(ClassDecl::new("Garfield").with_superclass("Cat"))
            .unwrap();
        let names: Vec<&str> = table
            .superclass_chain("Garfield")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Cat", "Animal"]);
        assert!(table.is_subtype("Garfield", "Animal"));
        assert!(!table.is_subtype("Animal", "Cat"));
    }

    #[test]
    fn frozen_member_info_inherits_defaults() {
        let mut table = DeclTable::new();
        table
            .register_class(ClassDecl::new("A").open().with_member(
                MemberSlot::function(
                    "foo",
                    vec![ParamDecl::new("i", TypeRef::Int).with_default_value(10)],
                    unit(),
                )
                .open(),
            ))
            .unwrap();
        table
            .register_class(
                ClassDecl::new("B")
                    .with_superclass("A")
                    .with_primary(PrimaryCtor::new(vec![]))
                    .with_member(
                        MemberSlot::function("foo", vec![ParamDecl::new("i", TypeRef::Int)], unit())
                            .with_modifiers(MemberModifiers::OVERRIDE),
                    ),
            )
            .unwrap();
        table.freeze().unwrap();

        let b_foo = MemberRef::new(TypeHash::from_name("B"), 0);
        let info = table.member_info(b_foo).unwrap();
        assert!(info.params[0].has_default());
        assert_eq!(info.overrides, Some(MemberRef::new(TypeHash::from_name("A"), 0)));
        assert_eq!(
            info.dispatch,
            Dispatch::Override {
                ancestor: TypeHash::from_name("A")
            }
        );
    }

    #[test]
    fn override_chain_walks_to_the_root_declaration() {
        let mut table = DeclTable::new();
        for (name, parent, member) in [
            ("A", None, MemberSlot::function("run", vec![], unit()).open()),
            ("B", Some("A"), MemberSlot::function("run", vec![], unit()).overriding()),
            ("C", Some("B"), MemberSlot::function("run", vec![], unit()).overriding()),
        ] {
            let mut class = ClassDecl::new(name).open().with_member(member);
            if let Some(parent) = parent {
                class = class.with_superclass(parent);
            }
            table.register_class(class).unwrap();
        }
        table.freeze().unwrap();

        let owners: Vec<&str> = table
            .override_chain(MemberRef::new(TypeHash::from_name("C"), 0))
            .map(|(owner, _)| owner.name())
            .collect();
        assert_eq!(owners, ["C", "B", "A"]);
    }
}
