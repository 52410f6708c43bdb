//! Evaluator for a class-based object model.
//!
//! Declarations are registered in a [`DeclTable`] and checked when the table
//! is frozen. A [`Runtime`] then constructs instances and dispatches member
//! calls against the frozen table:
//!
//! ```
//! use objmodel::prelude::*;
//!
//! let table = objmodel::freeze_table([
//!     ClassDecl::new("Base")
//!         .open()
//!         .with_init(Body::new(|ctx| {
//!             ctx.emit("base".into());
//!             Ok(Value::Unit)
//!         }))
//!         .into(),
//!     ClassDecl::new("Derived")
//!         .with_superclass("Base")
//!         .with_init(Body::new(|ctx| {
//!             ctx.emit("derived".into());
//!             Ok(Value::Unit)
//!         }))
//!         .into(),
//! ])
//! .unwrap();
//!
//! let mut runtime = Runtime::with_table(table).unwrap();
//! runtime.construct("Derived", CallArgs::new()).unwrap();
//! assert_eq!(runtime.journal().lines(), ["base", "derived"]);
//! ```

use std::sync::Arc;

use tracing::debug;

pub mod tracing_config;

pub use objmodel_core::{
    CallArgs, ClassDecl, DeclEntry, InterfaceDecl, ModelError, ObjectHandle, Value,
};
pub use objmodel_registry::DeclTable;
pub use objmodel_runtime::{Runtime, RuntimeConfig};
pub use tracing_config::init_tracing;

pub mod prelude {
    pub use objmodel_core::{
        Arg, ArgScope, BindError, Body, CallArgs, CallContext, ClassDecl, ClassModality,
        ConstructionError, DeclEntry, DeclarationError, DeclarationErrors, DefaultExpr,
        Delegation, DelegationArgs, FunctionValue, InterfaceDecl, MemberModifiers, MemberSlot,
        ModelError, ObjectHandle, ParamDecl, PrimaryCtor, Promotion, RuntimeError,
        SecondaryCtorDecl, TypeRef, Value, Visibility,
    };
    pub use objmodel_registry::{DeclTable, Receiver};
    pub use objmodel_runtime::{Journal, Runtime, RuntimeConfig};
}

/// Register `entries` into a fresh table and freeze it.
///
/// Registration stops at the first rejected entry; freezing reports every
/// declaration error at once.
pub fn freeze_table(
    entries: impl IntoIterator<Item = DeclEntry>,
) -> Result<Arc<DeclTable>, ModelError> {
    let mut table = DeclTable::new();
    for entry in entries {
        table.register(entry)?;
    }
    table.freeze()?;
    debug!(types = table.len(), "declaration table ready");
    Ok(Arc::new(table))
}
