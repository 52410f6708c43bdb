//! Executable code attached to declarations.
//!
//! Member functions, getters, init blocks, property initializers and
//! constructor bodies are all [`Body`] values: native closures that receive a
//! [`CallContext`] implemented by the runtime. Default-value expressions and
//! delegation arguments only see the parameters bound so far, so they take an
//! [`ArgScope`] instead.

use std::fmt;
use std::sync::Arc;

use crate::{CallArgs, FunctionValue, ObjectHandle, RuntimeError, Value};

type BodyFn = dyn Fn(&mut dyn CallContext) -> Result<Value, RuntimeError> + Send + Sync;

/// Type-erased executable body.
///
/// Cloning shares the underlying closure.
#[derive(Clone)]
pub struct Body {
    inner: Arc<BodyFn>,
}

impl Body {
    /// Wrap a closure as a body.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn CallContext) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Run the body.
    pub fn call(&self, ctx: &mut dyn CallContext) -> Result<Value, RuntimeError> {
        (self.inner)(ctx)
    }

    /// Whether both bodies share the same closure.
    pub fn ptr_eq(&self, other: &Body) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

/// Interface through which bodies interact with the running object model.
///
/// The runtime implements this for every frame it executes. Member lookups
/// through `get`, `set` and `call` dispatch virtually on the receiver's
/// runtime class; `field` reads the slot owned by the class whose body is
/// running.
pub trait CallContext {
    /// The receiver, if the body runs on an instance.
    fn this(&self) -> Option<ObjectHandle>;

    /// Name of the class or interface declaring the running body.
    fn owner(&self) -> &str;

    /// Bound parameter by name.
    fn arg(&self, name: &str) -> Result<Value, RuntimeError>;

    /// Bound parameter by position.
    fn arg_at(&self, index: usize) -> Result<Value, RuntimeError>;

    /// Number of bound parameters.
    fn arg_count(&self) -> usize;

    /// Read a property of the receiver (virtual).
    fn get(&mut self, name: &str) -> Result<Value, RuntimeError>;

    /// Assign a property of the receiver (virtual).
    fn set(&mut self, name: &str, value: Value) -> Result<(), RuntimeError>;

    /// Read the backing field the running class owns for `name`.
    fn field(&self, name: &str) -> Result<Value, RuntimeError>;

    /// Call a member function of the receiver (virtual).
    fn call(&mut self, name: &str, args: CallArgs) -> Result<Value, RuntimeError>;

    /// `super.name(args)`: starts lookup at the superclass of the running class.
    fn call_super(&mut self, name: &str, args: CallArgs) -> Result<Value, RuntimeError>;

    /// `super<qualifier>.name(args)`.
    fn call_super_of(
        &mut self,
        qualifier: &str,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError>;

    /// Outer instance of an inner-class receiver.
    fn outer(&self) -> Option<ObjectHandle>;

    /// `super@Outer.name(args)` from an inner class body: calls the
    /// implementation the outer instance's class inherits from `qualifier`.
    fn call_outer_super(
        &mut self,
        qualifier: &str,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError>;

    /// Read a property of another instance.
    fn get_on(&mut self, target: ObjectHandle, name: &str) -> Result<Value, RuntimeError>;

    /// Assign a property of another instance.
    fn set_on(&mut self, target: ObjectHandle, name: &str, value: Value)
    -> Result<(), RuntimeError>;

    /// Append to a list-valued property of another instance.
    fn append_to(
        &mut self,
        target: ObjectHandle,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError>;

    /// Call a member function of another instance.
    fn invoke_on(
        &mut self,
        target: ObjectHandle,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError>;

    /// Instantiate a class.
    fn construct(&mut self, class: &str, args: CallArgs) -> Result<Value, RuntimeError>;

    /// Invoke a callable value.
    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError>;

    /// Record an observable side effect in the journal.
    fn emit(&mut self, line: String);

    /// The receiver as a value.
    fn this_value(&self) -> Result<Value, RuntimeError> {
        self.this().map(Value::Object).ok_or(RuntimeError::NoReceiver)
    }

    /// Bound string parameter.
    fn arg_str(&self, name: &str) -> Result<String, RuntimeError> {
        match self.arg(name)? {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::TypeMismatch {
                expected: "String",
                found: other.type_name(),
            }),
        }
    }

    /// Bound integer parameter.
    fn arg_int(&self, name: &str) -> Result<i64, RuntimeError> {
        let value = self.arg(name)?;
        value.as_int().ok_or(RuntimeError::TypeMismatch {
            expected: "Int",
            found: value.type_name(),
        })
    }
}

/// The parameters bound so far, visible to default expressions and
/// delegation arguments.
#[derive(Debug, Clone, Copy)]
pub struct ArgScope<'a> {
    bound: &'a [(String, Value)],
}

impl<'a> ArgScope<'a> {
    pub fn new(bound: &'a [(String, Value)]) -> Self {
        Self { bound }
    }

    /// Value of an already bound parameter.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.bound
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeError::UnknownParameter {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

type DefaultFn = dyn Fn(ArgScope<'_>) -> Result<Value, RuntimeError> + Send + Sync;

/// Default value of a parameter, evaluated at each call that omits it.
#[derive(Clone)]
pub struct DefaultExpr {
    inner: Arc<DefaultFn>,
}

impl DefaultExpr {
    /// Default computed from earlier parameters.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ArgScope<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// A constant default.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self::new(move |_| Ok(value.clone()))
    }

    pub fn eval(&self, scope: ArgScope<'_>) -> Result<Value, RuntimeError> {
        (self.inner)(scope)
    }
}

impl fmt::Debug for DefaultExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultExpr").finish_non_exhaustive()
    }
}

type DelegationFn = dyn Fn(ArgScope<'_>) -> Result<CallArgs, RuntimeError> + Send + Sync;

/// Arguments passed by `this(...)`, `super(...)` or a primary constructor's
/// superclass call, computed from the delegating constructor's parameters.
#[derive(Clone)]
pub struct DelegationArgs {
    inner: Arc<DelegationFn>,
}

impl DelegationArgs {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ArgScope<'_>) -> Result<CallArgs, RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// No arguments: `super()` / `this()`.
    pub fn none() -> Self {
        Self::new(|_| Ok(CallArgs::new()))
    }

    /// Forward the named parameters positionally, in order.
    pub fn forward(params: &[&str]) -> Self {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        Self::new(move |scope| {
            let mut args = CallArgs::new();
            for param in &params {
                args = args.positional(scope.get(param)?);
            }
            Ok(args)
        })
    }

    pub fn eval(&self, scope: ArgScope<'_>) -> Result<CallArgs, RuntimeError> {
        (self.inner)(scope)
    }
}

impl fmt::Debug for DelegationArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegationArgs").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_clone_shares_closure() {
        let body = Body::new(|_ctx| Ok(Value::Unit));
        assert!(body.ptr_eq(&body.clone()));
        assert!(!body.ptr_eq(&Body::new(|_ctx| Ok(Value::Unit))));
    }

    #[test]
    fn default_reads_earlier_params() {
        let bound = vec![("name".to_string(), Value::from("Tom"))];
        let expr = DefaultExpr::new(|scope| {
            let name = scope.get("name")?;
            Ok(Value::string(format!("{name}!")))
        });
        assert_eq!(expr.eval(ArgScope::new(&bound)).unwrap(), Value::from("Tom!"));
    }

    #[test]
    fn scope_rejects_unbound_names() {
        let scope = ArgScope::new(&[]);
        assert!(matches!(
            scope.get("later"),
            Err(RuntimeError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn forward_delegation_keeps_order() {
        let bound = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
        ];
        let args = DelegationArgs::forward(&["b", "a"])
            .eval(ArgScope::new(&bound))
            .unwrap();
        assert_eq!(args.positional_values(), vec![Value::from(2), Value::from(1)]);
    }
}
