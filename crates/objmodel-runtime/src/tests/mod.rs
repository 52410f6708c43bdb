//! Runtime tests over small hand-built declaration tables.

mod construction_test;

use std::sync::Arc;

use objmodel_core::{Body, DeclEntry, ObjectHandle, Value};
use objmodel_registry::DeclTable;

use crate::{Runtime, RuntimeConfig};

fn table(entries: Vec<DeclEntry>) -> Arc<DeclTable> {
    let mut table = DeclTable::new();
    for entry in entries {
        table.register(entry).unwrap();
    }
    table.freeze().unwrap();
    Arc::new(table)
}

fn runtime(entries: Vec<DeclEntry>) -> Runtime {
    Runtime::with_table(table(entries)).unwrap()
}

fn runtime_with(entries: Vec<DeclEntry>, config: RuntimeConfig) -> Runtime {
    Runtime::new(table(entries), config).unwrap()
}

/// Body that journals a fixed line.
fn emit(line: &'static str) -> Body {
    Body::new(move |ctx| {
        ctx.emit(line.to_string());
        Ok(Value::Unit)
    })
}

/// Body returning a fixed value.
fn returns(value: impl Into<Value>) -> Body {
    let value = value.into();
    Body::new(move |_| Ok(value.clone()))
}

fn object(value: Value) -> ObjectHandle {
    value.as_object().unwrap()
}
