//! The runtime facade: instances, member access and invocation.

use std::sync::Arc;

use objmodel_core::{
    BindError, Body, CallArgs, ConstructionError, FunctionValue, MemberImpl, MemberKind, ObjectHandle,
    RuntimeError, TypeHash, Value, Visibility,
};
use objmodel_registry::{DeclTable, Receiver, Resolved};
use tracing::{debug, trace, warn};

use crate::binder::{BoundArgs, TypeCheck, bind};
use crate::config::RuntimeConfig;
use crate::context::Frame;
use crate::heap::ObjectHeap;
use crate::instance::Instance;
use crate::journal::Journal;
use crate::overload::{NoMatch, OverloadMatch, find_best_match};

/// How a member access picks its implementation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Route<'a> {
    /// Dispatch on the receiver's runtime class.
    Virtual,
    /// Call through a reference typed as the given type.
    Static(&'a str),
    /// `super` from code declared in `executing`.
    Super {
        executing: &'a str,
        qualifier: Option<&'a str>,
    },
}

impl<'a> Route<'a> {
    fn receiver(self, runtime_class: &'a str) -> Receiver<'a> {
        match self {
            Route::Virtual => Receiver::Virtual {
                class: runtime_class,
            },
            Route::Static(static_class) => Receiver::Static {
                static_class,
                runtime_class,
            },
            Route::Super {
                executing,
                qualifier,
            } => Receiver::Super {
                executing,
                qualifier,
            },
        }
    }
}

/// Type conformance of runtime values against the declaration table.
pub(crate) struct RuntimeTypes<'a> {
    heap: &'a ObjectHeap,
    table: &'a DeclTable,
}

impl<'a> RuntimeTypes<'a> {
    pub(crate) fn new(heap: &'a ObjectHeap, table: &'a DeclTable) -> Self {
        Self { heap, table }
    }
}

impl TypeCheck for RuntimeTypes<'_> {
    fn object_cost(&self, handle: ObjectHandle, type_name: &str) -> Option<u32> {
        let class = self.table.type_name(self.heap.get(handle)?.class())?;
        if class == type_name {
            return Some(0);
        }
        if let Some(distance) = self
            .table
            .superclass_chain(class)
            .iter()
            .position(|c| c.name == type_name)
        {
            return Some(distance as u32 + 1);
        }
        self.table.is_subtype(class, type_name).then_some(1)
    }
}

/// Evaluates constructions and member calls against a frozen [`DeclTable`].
///
/// A runtime owns its instances and its journal. The table is shared, so
/// several runtimes can work from one set of declarations.
///
/// ```
/// use std::sync::Arc;
/// use objmodel_core::{Body, CallArgs, ClassDecl, MemberSlot, Value};
/// use objmodel_registry::DeclTable;
/// use objmodel_runtime::Runtime;
///
/// let mut table = DeclTable::new();
/// table
///     .register_class(ClassDecl::new("Greeter").with_member(MemberSlot::function(
///         "greet",
///         vec![],
///         Body::new(|ctx| {
///             ctx.emit("hello".into());
///             Ok(Value::Unit)
///         }),
///     )))
///     .unwrap();
/// table.freeze().unwrap();
///
/// let mut runtime = Runtime::with_table(Arc::new(table)).unwrap();
/// let greeter = runtime.construct("Greeter", CallArgs::new()).unwrap();
/// let handle = greeter.as_object().unwrap();
/// runtime.invoke(handle, "greet", CallArgs::new()).unwrap();
/// assert_eq!(runtime.journal().lines(), ["hello"]);
/// ```
#[derive(Debug)]
pub struct Runtime {
    pub(crate) table: Arc<DeclTable>,
    config: RuntimeConfig,
    pub(crate) heap: ObjectHeap,
    pub(crate) journal: Journal,
    depth: usize,
}

impl Runtime {
    /// Create a runtime over a frozen table.
    pub fn new(table: Arc<DeclTable>, config: RuntimeConfig) -> Result<Self, ConstructionError> {
        if !table.is_frozen() {
            return Err(ConstructionError::TableNotFrozen);
        }
        debug!(types = table.len(), max_depth = config.max_depth, "runtime created");
        Ok(Self {
            table,
            journal: Journal::new(config.journal),
            config,
            heap: ObjectHeap::new(),
            depth: 0,
        })
    }

    /// Create a runtime with the default configuration.
    pub fn with_table(table: Arc<DeclTable>) -> Result<Self, ConstructionError> {
        Self::new(table, RuntimeConfig::default())
    }

    pub fn table(&self) -> &DeclTable {
        &self.table
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Remove and return every journal line recorded so far.
    pub fn take_journal(&mut self) -> Vec<String> {
        self.journal.take()
    }

    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    pub fn instance(&self, handle: ObjectHandle) -> Result<&Instance, RuntimeError> {
        self.heap
            .get(handle)
            .ok_or(RuntimeError::StaleHandle(handle))
    }

    pub(crate) fn instance_mut(&mut self, handle: ObjectHandle) -> Result<&mut Instance, RuntimeError> {
        self.heap
            .get_mut(handle)
            .ok_or(RuntimeError::StaleHandle(handle))
    }

    /// Runtime class of an instance.
    pub fn class_of(&self, handle: ObjectHandle) -> Result<&str, RuntimeError> {
        self.instance(handle).map(Instance::class_name)
    }

    /// Whether the instance's class is `type_name` or one of its subtypes.
    pub fn is_instance_of(&self, handle: ObjectHandle, type_name: &str) -> bool {
        self.class_of(handle)
            .is_ok_and(|class| self.table.is_subtype(class, type_name))
    }

    /// Read the slot `owner` declares for `name` without dispatch.
    pub fn field(&self, handle: ObjectHandle, owner: &str, name: &str) -> Result<Value, RuntimeError> {
        self.read_slot(handle, TypeHash::from_name(owner), owner, name)
    }

    /// Drop an instance. Returns false for a stale handle.
    pub fn free(&mut self, handle: ObjectHandle) -> bool {
        self.heap.free(handle)
    }

    // ==========================================================================
    // Member access
    // ==========================================================================

    /// Call a member function with virtual dispatch.
    pub fn invoke(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError> {
        self.call_member(handle, Route::Virtual, name, args, None)
    }

    /// Call a member function through a reference typed as `static_class`.
    ///
    /// Non-virtual members bind to the static type's declaration.
    pub fn invoke_as(
        &mut self,
        handle: ObjectHandle,
        static_class: &str,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError> {
        let class = self.class_of(handle)?;
        if !self.table.is_subtype(class, static_class) {
            return Err(RuntimeError::IncompatibleReceiver {
                class: class.to_string(),
                static_class: static_class.to_string(),
            });
        }
        self.call_member(handle, Route::Static(static_class), name, args, None)
    }

    /// Read a property with virtual dispatch.
    pub fn get(&mut self, handle: ObjectHandle, name: &str) -> Result<Value, RuntimeError> {
        self.read_property(handle, Route::Virtual, name, None)
    }

    /// Assign a `var` property.
    pub fn set(&mut self, handle: ObjectHandle, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.write_property(handle, Route::Virtual, name, value, None)
    }

    /// Append to a list held by a stored property.
    pub fn append(&mut self, handle: ObjectHandle, name: &str, value: Value) -> Result<(), RuntimeError> {
        self.append_property(handle, name, value, None)
    }

    /// Invoke a callable value outside any instance.
    pub fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        self.run_function(function, None, "", args)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn call_member(
        &mut self,
        this: ObjectHandle,
        route: Route<'_>,
        name: &str,
        args: CallArgs,
        caller: Option<&str>,
    ) -> Result<Value, RuntimeError> {
        let table = Arc::clone(&self.table);
        let class = self.class_in(&table, this)?;
        let candidates =
            table.lookup_member(route.receiver(class), name, Some(MemberKind::Function))?;

        let types = RuntimeTypes::new(&self.heap, &table);
        let attempts: Vec<(Resolved<'_>, _)> = candidates
            .into_iter()
            .map(|r| {
                let bound = bind(r.params, &args, &types);
                (r, bound)
            })
            .collect();
        let OverloadMatch {
            candidate: resolved,
            bound,
        } = find_best_match(attempts).map_err(|error| match error {
            NoMatch::Rejected(_, source) => RuntimeError::Bind {
                member: name.to_string(),
                source,
            },
            NoMatch::NoneViable => RuntimeError::NoMatchingOverload {
                type_name: class.to_string(),
                member: name.to_string(),
            },
            NoMatch::Ambiguous(tied) => RuntimeError::AmbiguousMember {
                type_name: class.to_string(),
                member: name.to_string(),
                candidates: tied.iter().map(|r| r.signature.to_string()).collect(),
            },
        })?;
        check_visible(&table, &resolved, caller)?;

        let MemberImpl::Function(body) = &resolved.slot.implementation else {
            return Err(RuntimeError::WrongMemberKind {
                type_name: resolved.owner_name().to_string(),
                member: name.to_string(),
                expected: "function",
            });
        };
        trace!(
            class,
            member = %resolved.signature,
            owner = resolved.owner_name(),
            "dispatch"
        );
        let BoundArgs { values, .. } = bound;
        self.run_body(body, Some(this), resolved.owner_name(), values)
    }

    pub(crate) fn read_property(
        &mut self,
        this: ObjectHandle,
        route: Route<'_>,
        name: &str,
        caller: Option<&str>,
    ) -> Result<Value, RuntimeError> {
        let table = Arc::clone(&self.table);
        let class = self.class_in(&table, this)?;
        let resolved =
            table.resolve_with(route.receiver(class), name, Some(MemberKind::Property))?;
        check_visible(&table, &resolved, caller)?;

        match &resolved.slot.implementation {
            MemberImpl::Stored { .. } => self.read_slot(
                this,
                resolved.owner.type_hash(),
                resolved.owner_name(),
                name,
            ),
            MemberImpl::Getter(body) => {
                self.run_body(body, Some(this), resolved.owner_name(), Vec::new())
            }
            MemberImpl::Function(_) | MemberImpl::Abstract => Err(RuntimeError::WrongMemberKind {
                type_name: resolved.owner_name().to_string(),
                member: name.to_string(),
                expected: "property",
            }),
        }
    }

    /// Assign a stored property.
    ///
    /// A `val` may be assigned once by its declaring class, while its slot
    /// is still unwritten.
    pub(crate) fn write_property(
        &mut self,
        this: ObjectHandle,
        route: Route<'_>,
        name: &str,
        value: Value,
        caller: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let table = Arc::clone(&self.table);
        let class = self.class_in(&table, this)?;
        let resolved =
            table.resolve_with(route.receiver(class), name, Some(MemberKind::Property))?;
        check_visible(&table, &resolved, caller)?;

        let owner = resolved.owner.type_hash();
        let writable = match resolved.slot.implementation {
            MemberImpl::Stored { mutable: true } => true,
            MemberImpl::Stored { mutable: false } => {
                caller == Some(resolved.owner_name())
                    && !self.instance(this)?.is_written(owner, name)
            }
            _ => false,
        };
        if !writable {
            return Err(RuntimeError::ReadOnlyProperty {
                type_name: resolved.owner_name().to_string(),
                member: name.to_string(),
            });
        }

        trace!(class, member = name, %value, "assign");
        self.instance_mut(this)?.write(owner, name, value);
        Ok(())
    }

    pub(crate) fn append_property(
        &mut self,
        this: ObjectHandle,
        name: &str,
        value: Value,
        caller: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let table = Arc::clone(&self.table);
        let class = self.class_in(&table, this)?;
        let resolved = table.resolve_with(
            Receiver::Virtual { class },
            name,
            Some(MemberKind::Property),
        )?;
        check_visible(&table, &resolved, caller)?;

        let not_a_list = || RuntimeError::NotAList {
            type_name: resolved.owner_name().to_string(),
            member: name.to_string(),
        };
        if !resolved.slot.implementation.is_stored() {
            return Err(not_a_list());
        }
        match self
            .instance_mut(this)?
            .read_mut(resolved.owner.type_hash(), name)
        {
            Some(Value::List(items)) => {
                items.push(value);
                Ok(())
            }
            _ => Err(not_a_list()),
        }
    }

    /// Value of a backing field.
    pub(crate) fn read_slot(
        &self,
        this: ObjectHandle,
        owner: TypeHash,
        owner_name: &str,
        name: &str,
    ) -> Result<Value, RuntimeError> {
        if let Some(value) = self.instance(this)?.read(owner, name) {
            return Ok(value.clone());
        }
        if self.config.strict_uninitialized {
            return Err(RuntimeError::UninitializedProperty {
                owner: owner_name.to_string(),
                member: name.to_string(),
            });
        }
        warn!(owner = owner_name, property = name, "property read before initialization");
        Ok(Value::Null)
    }

    // ==========================================================================
    // Execution
    // ==========================================================================

    /// Run a body in a fresh frame.
    pub(crate) fn run_body(
        &mut self,
        body: &Body,
        this: Option<ObjectHandle>,
        owner: &str,
        args: Vec<(String, Value)>,
    ) -> Result<Value, RuntimeError> {
        self.enter()
            .map_err(|limit| RuntimeError::DepthLimitExceeded { limit })?;
        let result = {
            let mut frame = Frame::new(self, this, owner, args);
            body.call(&mut frame)
        };
        self.leave();
        result
    }

    /// Call a function value. Its single parameter is named `it`, otherwise
    /// parameters are named `p0`, `p1` and so on.
    pub(crate) fn run_function(
        &mut self,
        function: &FunctionValue,
        this: Option<ObjectHandle>,
        owner: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.arity {
            let source = if args.len() > function.arity {
                BindError::TooManyArguments {
                    expected: function.arity,
                    got: args.len(),
                }
            } else {
                BindError::MissingArgument {
                    param: function_param(args.len(), function.arity),
                }
            };
            return Err(RuntimeError::Bind {
                member: "invoke".to_string(),
                source,
            });
        }
        let arity = function.arity;
        let named = args
            .into_iter()
            .enumerate()
            .map(|(i, value)| (function_param(i, arity), value))
            .collect();
        self.run_body(&function.body, this, owner, named)
    }

    /// Enter one level of nesting.
    pub(crate) fn enter(&mut self) -> Result<(), usize> {
        if self.depth >= self.config.max_depth {
            return Err(self.config.max_depth);
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runtime class name of `handle`, borrowed from `table`.
    pub(crate) fn class_in<'t>(
        &self,
        table: &'t DeclTable,
        handle: ObjectHandle,
    ) -> Result<&'t str, RuntimeError> {
        let instance = self.instance(handle)?;
        table
            .type_name(instance.class())
            .ok_or_else(|| RuntimeError::UnknownType(instance.class_name().to_string()))
    }
}

fn function_param(index: usize, arity: usize) -> String {
    if arity == 1 {
        "it".to_string()
    } else {
        format!("p{index}")
    }
}

/// Whether `caller` may use the resolved member.
///
/// An override is usable wherever a declaration it overrides is.
pub(crate) fn check_visible(
    table: &DeclTable,
    resolved: &Resolved<'_>,
    caller: Option<&str>,
) -> Result<(), RuntimeError> {
    let visible = table
        .override_chain(resolved.member)
        .any(|(entry, slot)| is_accessible(table, slot.visibility, entry.name(), caller));
    if visible {
        return Ok(());
    }
    let owner = resolved.owner_name();
    Err(RuntimeError::InaccessibleMember {
        type_name: owner.to_string(),
        member: resolved.slot.name.clone(),
        visibility: resolved.slot.visibility,
    })
}

/// Private: only the declaring type. Protected: the declaring type and its
/// subtypes. Calls from outside any body have no caller.
pub(crate) fn is_accessible(
    table: &DeclTable,
    visibility: Visibility,
    owner: &str,
    caller: Option<&str>,
) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Private => caller == Some(owner),
        Visibility::Protected => caller.is_some_and(|c| c == owner || table.is_subtype(c, owner)),
    }
}
