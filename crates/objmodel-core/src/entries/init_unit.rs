//! Class initialization units.

use crate::Body;

/// One step of a class's initialization, run in declaration order.
///
/// Property initializers and `init` blocks share a single ordered sequence,
/// so interleavings such as `val a = ...; init { ... }; val b = ...` are kept
/// exactly as declared.
#[derive(Debug, Clone)]
pub enum InitUnit {
    /// `val name = initializer`: the result is written to the class's slot.
    Property { name: String, initializer: Body },
    /// `init { ... }`: run for effect.
    Block(Body),
}

impl InitUnit {
    pub fn property(name: impl Into<String>, initializer: Body) -> Self {
        InitUnit::Property {
            name: name.into(),
            initializer,
        }
    }

    pub fn block(body: Body) -> Self {
        InitUnit::Block(body)
    }

    pub fn body(&self) -> &Body {
        match self {
            InitUnit::Property { initializer, .. } => initializer,
            InitUnit::Block(body) => body,
        }
    }
}
