//! Runtime objects.

use objmodel_core::{MemberKind, ObjectHandle, TypeHash, Value};
use rustc_hash::FxHashMap;

/// Key of a backing field: the declaring class plus the property name.
///
/// A subclass overriding a stored property gets its own slot next to the
/// superclass's.
fn slot_key(owner: TypeHash, name: &str) -> TypeHash {
    TypeHash::from_member(
        owner,
        TypeHash::from_signature(name, MemberKind::Property.tag(), &[]),
    )
}

/// An instance of a class.
#[derive(Debug, Clone)]
pub struct Instance {
    class: TypeHash,
    class_name: String,
    slots: FxHashMap<TypeHash, Value>,
    /// Enclosing instance of an inner-class object. Not owned.
    outer: Option<ObjectHandle>,
}

impl Instance {
    pub fn new(class: TypeHash, class_name: impl Into<String>, outer: Option<ObjectHandle>) -> Self {
        Self {
            class,
            class_name: class_name.into(),
            slots: FxHashMap::default(),
            outer,
        }
    }

    /// Exact runtime class.
    pub fn class(&self) -> TypeHash {
        self.class
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn outer(&self) -> Option<ObjectHandle> {
        self.outer
    }

    /// Value of the slot `owner` declares for `name`, if written.
    pub fn read(&self, owner: TypeHash, name: &str) -> Option<&Value> {
        self.slots.get(&slot_key(owner, name))
    }

    pub fn read_mut(&mut self, owner: TypeHash, name: &str) -> Option<&mut Value> {
        self.slots.get_mut(&slot_key(owner, name))
    }

    pub fn write(&mut self, owner: TypeHash, name: &str, value: Value) {
        self.slots.insert(slot_key(owner, name), value);
    }

    pub fn is_written(&self, owner: TypeHash, name: &str) -> bool {
        self.slots.contains_key(&slot_key(owner, name))
    }

    /// Number of written slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
