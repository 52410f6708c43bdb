//! Per-class initialization.
//!
//! Runs once for each class level of a construction, after the level's
//! superclass path has completed: promoted primary parameters are written
//! first, then the init units in declaration order. A secondary constructor
//! body runs afterwards, from the delegator.

use objmodel_core::{ClassDecl, ConstructionError, InitUnit, ObjectHandle, RuntimeError, Value};
use tracing::trace;

use crate::runtime::Runtime;

impl Runtime {
    /// Initialize the `decl` level of `handle`.
    ///
    /// `primary_args` are the bound primary constructor parameters; property
    /// initializers and init blocks can read them.
    pub(crate) fn initialize(
        &mut self,
        decl: &ClassDecl,
        handle: ObjectHandle,
        primary_args: &[(String, Value)],
    ) -> Result<(), ConstructionError> {
        let fail = |source: RuntimeError| ConstructionError::Runtime {
            class: decl.name.clone(),
            source: Box::new(source),
        };

        if let Some(primary) = &decl.primary {
            let instance = self.instance_mut(handle).map_err(fail)?;
            for param in primary.params.iter().filter(|p| p.promotion.is_some()) {
                if let Some((_, value)) = primary_args.iter().find(|(name, _)| *name == param.name) {
                    instance.write(decl.type_hash, &param.name, value.clone());
                }
            }
        }

        for unit in &decl.init_units {
            let value = self
                .run_body(unit.body(), Some(handle), &decl.name, primary_args.to_vec())
                .map_err(fail)?;
            if let InitUnit::Property { name, .. } = unit {
                trace!(class = %decl.name, property = %name, %value, "initialized property");
                self.instance_mut(handle)
                    .map_err(fail)?
                    .write(decl.type_hash, name, value);
            }
        }
        Ok(())
    }
}
