//! Constructor selection and delegation.
//!
//! Constructing a class runs one *level* per class in its superclass chain.
//! A level selects a constructor by binding the arguments to every
//! candidate, then follows the winner's delegation:
//!
//! - primary constructor: the superclass level (header arguments or an
//!   implicit `super()`), then this class's initialization;
//! - `this(...)`: another level of the same class, then the secondary body;
//! - `super(...)`: the superclass level, then this class's initialization
//!   and the secondary body.
//!
//! A visited set over constructor signatures rejects `this(...)` cycles.

use std::sync::Arc;

use objmodel_core::{
    ArgScope, CallArgs, ClassDecl, ConstructionError, Delegation, DelegationArgs, ObjectHandle,
    ParamDecl, PrimaryCtor, RuntimeError, SecondaryCtorDecl, TypeHash, Value, Visibility,
    constructor_signature,
};
use objmodel_registry::DeclTable;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::binder::{BoundArgs, bind};
use crate::instance::Instance;
use crate::overload::{NoMatch, OverloadMatch, find_best_match};
use crate::runtime::{Runtime, RuntimeTypes, is_accessible};

/// One constructor of a class.
#[derive(Debug, Clone, Copy)]
enum Ctor<'a> {
    Primary(&'a PrimaryCtor),
    /// Public zero-parameter constructor of a class that declares none.
    Implicit,
    Secondary(&'a SecondaryCtorDecl),
}

impl<'a> Ctor<'a> {
    fn params(self) -> &'a [ParamDecl] {
        match self {
            Ctor::Primary(primary) => &primary.params,
            Ctor::Implicit => &[],
            Ctor::Secondary(secondary) => &secondary.params,
        }
    }

    fn visibility(self) -> Visibility {
        match self {
            Ctor::Primary(primary) => primary.visibility,
            Ctor::Implicit => Visibility::Public,
            Ctor::Secondary(secondary) => secondary.visibility,
        }
    }

    fn signature(self, class: &str) -> (TypeHash, String) {
        constructor_signature(class, self.params())
    }
}

fn candidates(class: &ClassDecl) -> Vec<Ctor<'_>> {
    let mut out = Vec::with_capacity(class.secondaries.len() + 1);
    if let Some(primary) = &class.primary {
        out.push(Ctor::Primary(primary));
    } else if class.has_implicit_primary() {
        out.push(Ctor::Implicit);
    }
    out.extend(class.secondaries.iter().map(Ctor::Secondary));
    out
}

/// Errors raised by bodies run for `class`.
fn failed_in(class: &ClassDecl) -> impl Fn(RuntimeError) -> ConstructionError + '_ {
    move |source| ConstructionError::Runtime {
        class: class.name.clone(),
        source: Box::new(source),
    }
}

fn delegation_args(
    class: &ClassDecl,
    args: &DelegationArgs,
    bound: &BoundArgs,
) -> Result<CallArgs, ConstructionError> {
    args.eval(ArgScope::new(&bound.values))
        .map_err(failed_in(class))
}

impl Runtime {
    /// Create an instance of `class`.
    ///
    /// All or nothing: on failure the partially built instance is freed.
    /// Lines already emitted by ancestor initialization stay in the journal.
    pub fn construct(&mut self, class: &str, args: CallArgs) -> Result<Value, ConstructionError> {
        self.instantiate(class, args, None, None)
    }

    /// Create an instance of the inner class `class` bound to `outer`.
    pub fn construct_inner(
        &mut self,
        outer: ObjectHandle,
        class: &str,
        args: CallArgs,
    ) -> Result<Value, ConstructionError> {
        self.instantiate(class, args, Some(outer), None)
    }

    /// `caller` is the type whose body requests the construction, if any.
    pub(crate) fn instantiate(
        &mut self,
        class: &str,
        args: CallArgs,
        outer: Option<ObjectHandle>,
        caller: Option<&str>,
    ) -> Result<Value, ConstructionError> {
        let table = Arc::clone(&self.table);
        let decl = instantiable(&table, class)?;
        let outer = self.outer_for(&table, decl, outer)?;

        let handle = self
            .heap
            .allocate(Instance::new(decl.type_hash, &decl.name, outer));
        debug!(class, %handle, args = %args.describe(), "constructing");

        let mut visited = FxHashSet::default();
        match self.construct_level(&table, decl, handle, &args, caller, &mut visited) {
            Ok(()) => {
                debug!(class, %handle, "constructed");
                Ok(Value::Object(handle))
            }
            Err(error) => {
                self.heap.free(handle);
                debug!(class, %error, "construction failed");
                Err(error)
            }
        }
    }

    /// The outer instance an inner class is bound to.
    fn outer_for(
        &self,
        table: &DeclTable,
        decl: &ClassDecl,
        outer: Option<ObjectHandle>,
    ) -> Result<Option<ObjectHandle>, ConstructionError> {
        let Some(enclosing) = &decl.enclosing else {
            return Ok(None);
        };
        match outer {
            Some(handle)
                if self
                    .class_of(handle)
                    .is_ok_and(|class| table.is_subtype(class, enclosing)) =>
            {
                Ok(Some(handle))
            }
            _ => Err(ConstructionError::MissingOuterInstance {
                class: decl.name.clone(),
                enclosing: enclosing.clone(),
            }),
        }
    }

    /// Run one class level of a construction.
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn construct_level(
        &mut self,
        table: &DeclTable,
        decl: &ClassDecl,
        handle: ObjectHandle,
        args: &CallArgs,
        caller: Option<&str>,
        visited: &mut FxHashSet<TypeHash>,
    ) -> Result<(), ConstructionError> {
        self.enter()
            .map_err(|limit| ConstructionError::DepthLimitExceeded { limit })?;
        let result = self.run_level(table, decl, handle, args, caller, visited);
        self.leave();
        result
    }

    fn run_level(
        &mut self,
        table: &DeclTable,
        decl: &ClassDecl,
        handle: ObjectHandle,
        args: &CallArgs,
        caller: Option<&str>,
        visited: &mut FxHashSet<TypeHash>,
    ) -> Result<(), ConstructionError> {
        let (ctor, bound) = self.select_constructor(table, decl, args, caller)?;
        let (hash, signature) = ctor.signature(&decl.name);
        if !visited.insert(hash) {
            return Err(ConstructionError::CyclicDelegation {
                class: decl.name.clone(),
                constructor: signature,
            });
        }
        trace!(class = %decl.name, constructor = %signature, "selected constructor");

        match ctor {
            Ctor::Primary(primary) => {
                self.delegate_super(table, decl, handle, primary.super_args.as_ref(), &bound, visited)?;
                self.initialize(decl, handle, &bound.values)
            }
            Ctor::Implicit => {
                self.delegate_super(table, decl, handle, None, &bound, visited)?;
                self.initialize(decl, handle, &[])
            }
            Ctor::Secondary(secondary) => {
                match &secondary.delegation {
                    Delegation::This(this_args) => {
                        let args = delegation_args(decl, this_args, &bound)?;
                        debug!(class = %decl.name, from = %signature, "delegating to this(...)");
                        self.construct_level(table, decl, handle, &args, Some(&decl.name), visited)?;
                    }
                    Delegation::Super(super_args) => {
                        self.delegate_super(table, decl, handle, Some(super_args), &bound, visited)?;
                        self.initialize(decl, handle, &[])?;
                    }
                    Delegation::Implicit => {
                        self.delegate_super(table, decl, handle, None, &bound, visited)?;
                        self.initialize(decl, handle, &[])?;
                    }
                }
                if let Some(body) = &secondary.body {
                    self.run_body(body, Some(handle), &decl.name, bound.values)
                        .map_err(failed_in(decl))?;
                }
                Ok(())
            }
        }
    }

    /// Bind `args` to every constructor of `decl` and pick the best.
    fn select_constructor<'d>(
        &self,
        table: &DeclTable,
        decl: &'d ClassDecl,
        args: &CallArgs,
        caller: Option<&str>,
    ) -> Result<(Ctor<'d>, BoundArgs), ConstructionError> {
        let class = decl.name.as_str();
        let all = candidates(decl);
        let types = RuntimeTypes::new(&self.heap, table);
        let attempts = all
            .iter()
            .map(|&ctor| (ctor, bind(ctor.params(), args, &types)))
            .collect();

        let OverloadMatch { candidate, bound } =
            find_best_match(attempts).map_err(|error| match error {
                NoMatch::Rejected(ctor, source) => ConstructionError::Bind {
                    class: class.to_string(),
                    constructor: ctor.signature(class).1,
                    source,
                },
                NoMatch::NoneViable => ConstructionError::NoMatchingConstructor {
                    class: class.to_string(),
                    candidates: all.iter().map(|c| c.signature(class).1).collect(),
                },
                NoMatch::Ambiguous(tied) => ConstructionError::AmbiguousConstructor {
                    class: class.to_string(),
                    candidates: tied.iter().map(|c| c.signature(class).1).collect(),
                },
            })?;

        let visibility = candidate.visibility();
        if !is_accessible(table, visibility, class, caller) {
            return Err(ConstructionError::InaccessibleConstructor {
                class: class.to_string(),
                constructor: candidate.signature(class).1,
                visibility,
            });
        }
        Ok((candidate, bound))
    }

    /// Run the superclass level for `decl`, if it has a superclass.
    ///
    /// Without explicit arguments this is an implicit `super()`, which needs
    /// a superclass constructor accepting zero arguments.
    fn delegate_super(
        &mut self,
        table: &DeclTable,
        decl: &ClassDecl,
        handle: ObjectHandle,
        super_args: Option<&DelegationArgs>,
        bound: &BoundArgs,
        visited: &mut FxHashSet<TypeHash>,
    ) -> Result<(), ConstructionError> {
        let Some(superclass) = &decl.superclass else {
            return Ok(());
        };
        let super_decl = table
            .class(superclass)
            .ok_or_else(|| ConstructionError::UnknownType(superclass.clone()))?;

        let Some(super_args) = super_args else {
            trace!(class = %decl.name, superclass = %superclass, "implicit super()");
            // Errors past selection propagate unchanged.
            self.select_constructor(table, super_decl, &CallArgs::new(), Some(&decl.name))
                .map_err(|error| match error {
                    ConstructionError::NoMatchingConstructor { .. }
                    | ConstructionError::AmbiguousConstructor { .. }
                    | ConstructionError::Bind { .. } => ConstructionError::NoDefaultSuperConstructor {
                        class: decl.name.clone(),
                        superclass: superclass.clone(),
                    },
                    other => other,
                })?;
            return self.construct_level(table, super_decl, handle, &CallArgs::new(), Some(&decl.name), visited);
        };

        let args = delegation_args(decl, super_args, bound)?;
        debug!(class = %decl.name, superclass = %superclass, args = %args.describe(), "delegating to super(...)");
        self.construct_level(table, super_decl, handle, &args, Some(&decl.name), visited)
    }
}

fn instantiable<'t>(table: &'t DeclTable, class: &str) -> Result<&'t ClassDecl, ConstructionError> {
    let entry = table
        .lookup(class)
        .map_err(|_| ConstructionError::UnknownType(class.to_string()))?;
    let Some(decl) = entry.as_class() else {
        return Err(ConstructionError::NotInstantiable {
            name: class.to_string(),
        });
    };
    if decl.is_abstract() {
        return Err(ConstructionError::AbstractInstantiation {
            class: class.to_string(),
        });
    }
    Ok(decl)
}
