//! Call frames handed to bodies.

use objmodel_core::{
    CallArgs, CallContext, FunctionValue, ObjectHandle, RuntimeError, TypeHash, Value,
};
use tracing::trace;

use crate::runtime::{Route, Runtime};

/// One executing body.
///
/// Member access on `this` resolves through the body's declaring type, so a
/// non-virtual member binds to what that type sees while open members still
/// dispatch on the runtime class.
pub(crate) struct Frame<'r> {
    runtime: &'r mut Runtime,
    this: Option<ObjectHandle>,
    owner: String,
    args: Vec<(String, Value)>,
}

impl<'r> Frame<'r> {
    pub(crate) fn new(
        runtime: &'r mut Runtime,
        this: Option<ObjectHandle>,
        owner: &str,
        args: Vec<(String, Value)>,
    ) -> Self {
        Self {
            runtime,
            this,
            owner: owner.to_string(),
            args,
        }
    }

    fn receiver(&self) -> Result<ObjectHandle, RuntimeError> {
        self.this.ok_or(RuntimeError::NoReceiver)
    }

    /// Class the running type is nested in.
    fn enclosing(&self) -> Option<String> {
        self.runtime
            .table()
            .class(&self.owner)
            .and_then(|class| class.enclosing.clone())
    }
}

impl CallContext for Frame<'_> {
    fn this(&self) -> Option<ObjectHandle> {
        self.this
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn arg(&self, name: &str) -> Result<Value, RuntimeError> {
        self.args
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeError::UnknownParameter {
                name: name.to_string(),
            })
    }

    fn arg_at(&self, index: usize) -> Result<Value, RuntimeError> {
        self.args
            .get(index)
            .map(|(_, v)| v.clone())
            .ok_or(RuntimeError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn get(&mut self, name: &str) -> Result<Value, RuntimeError> {
        let this = self.receiver()?;
        self.runtime
            .read_property(this, Route::Static(&self.owner), name, Some(&self.owner))
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let this = self.receiver()?;
        self.runtime.write_property(
            this,
            Route::Static(&self.owner),
            name,
            value,
            Some(&self.owner),
        )
    }

    fn field(&self, name: &str) -> Result<Value, RuntimeError> {
        let this = self.receiver()?;
        self.runtime
            .read_slot(this, TypeHash::from_name(&self.owner), &self.owner, name)
    }

    fn call(&mut self, name: &str, args: CallArgs) -> Result<Value, RuntimeError> {
        let this = self.receiver()?;
        self.runtime.call_member(
            this,
            Route::Static(&self.owner),
            name,
            args,
            Some(&self.owner),
        )
    }

    fn call_super(&mut self, name: &str, args: CallArgs) -> Result<Value, RuntimeError> {
        let this = self.receiver()?;
        let route = Route::Super {
            executing: &self.owner,
            qualifier: None,
        };
        self.runtime
            .call_member(this, route, name, args, Some(&self.owner))
    }

    fn call_super_of(
        &mut self,
        qualifier: &str,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError> {
        let this = self.receiver()?;
        let route = Route::Super {
            executing: &self.owner,
            qualifier: Some(qualifier),
        };
        self.runtime
            .call_member(this, route, name, args, Some(&self.owner))
    }

    fn outer(&self) -> Option<ObjectHandle> {
        let this = self.this?;
        self.runtime.instance(this).ok()?.outer()
    }

    fn call_outer_super(
        &mut self,
        qualifier: &str,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError> {
        let no_outer = || RuntimeError::NoOuterInstance {
            class: self.owner.clone(),
        };
        let outer = self.outer().ok_or_else(no_outer)?;
        let enclosing = self.enclosing().ok_or_else(no_outer)?;
        let route = Route::Super {
            executing: &enclosing,
            qualifier: Some(qualifier),
        };
        self.runtime
            .call_member(outer, route, name, args, Some(&enclosing))
    }

    fn get_on(&mut self, target: ObjectHandle, name: &str) -> Result<Value, RuntimeError> {
        self.runtime
            .read_property(target, Route::Virtual, name, Some(&self.owner))
    }

    fn set_on(
        &mut self,
        target: ObjectHandle,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        self.runtime
            .write_property(target, Route::Virtual, name, value, Some(&self.owner))
    }

    fn append_to(
        &mut self,
        target: ObjectHandle,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        self.runtime
            .append_property(target, name, value, Some(&self.owner))
    }

    fn invoke_on(
        &mut self,
        target: ObjectHandle,
        name: &str,
        args: CallArgs,
    ) -> Result<Value, RuntimeError> {
        self.runtime
            .call_member(target, Route::Virtual, name, args, Some(&self.owner))
    }

    /// An inner class constructed from a body gets the receiver as its
    /// outer instance.
    fn construct(&mut self, class: &str, args: CallArgs) -> Result<Value, RuntimeError> {
        let is_inner = self
            .runtime
            .table()
            .class(class)
            .is_some_and(|decl| decl.is_inner());
        let outer = if is_inner { self.this } else { None };
        Ok(self
            .runtime
            .instantiate(class, args, outer, Some(&self.owner))?)
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        self.runtime
            .run_function(function, self.this, &self.owner, args)
    }

    fn emit(&mut self, line: String) {
        trace!(owner = %self.owner, %line, "emit");
        self.runtime.journal.push(line);
    }
}
