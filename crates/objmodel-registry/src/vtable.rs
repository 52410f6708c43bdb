//! Per-type member tables built when the declaration table is frozen.

use objmodel_core::{Signature, TypeHash};
use rustc_hash::FxHashMap;

/// Reference to a member declaration: declaring type and index into its
/// member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub owner: TypeHash,
    pub index: usize,
}

impl MemberRef {
    pub fn new(owner: TypeHash, index: usize) -> Self {
        Self { owner, index }
    }
}

/// What a signature binds to on one type.
#[derive(Debug, Clone, PartialEq)]
pub struct VTableEntry {
    pub signature: Signature,
    /// Hash of `signature`.
    pub hash: TypeHash,
    /// Most-derived declaration of the member (may be abstract).
    pub declaration: MemberRef,
    /// Member whose body a call binds to; `None` while only abstract.
    pub implementation: Option<MemberRef>,
}

/// Member table for dispatch.
///
/// Maps signature hashes to entries and provides name-based lookup for
/// overload resolution. Entries keep the position they were first inserted
/// at, so inherited members precede the ones a subtype adds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VTable {
    entries: Vec<VTableEntry>,
    /// Signature hash to entry position.
    index: FxHashMap<TypeHash, usize>,
    /// Member name to entry positions, one per overload.
    by_name: FxHashMap<String, Vec<usize>>,
}

impl VTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for a signature hash.
    pub fn get(&self, hash: TypeHash) -> Option<&VTableEntry> {
        self.index.get(&hash).map(|&i| &self.entries[i])
    }

    /// Every entry with the given member name.
    pub fn named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a VTableEntry> + 'a {
        self.by_name
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.entries[i])
    }

    /// Insert an entry, replacing the one with the same signature in place.
    pub fn insert(&mut self, entry: VTableEntry) {
        if let Some(&i) = self.index.get(&entry.hash) {
            self.entries[i] = entry;
            return;
        }
        let i = self.entries.len();
        self.index.insert(entry.hash, i);
        self.by_name
            .entry(entry.signature.name.clone())
            .or_default()
            .push(i);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[VTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::TypeRef;

    fn entry(owner: &str, sig: Signature, index: usize) -> VTableEntry {
        let member = MemberRef::new(TypeHash::from_name(owner), index);
        VTableEntry {
            hash: sig.hash(),
            signature: sig,
            declaration: member,
            implementation: Some(member),
        }
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut vt = VTable::new();
        vt.insert(entry("Shape", Signature::function("draw", vec![]), 0));
        vt.insert(entry("Shape", Signature::property("size"), 1));
        vt.insert(entry("Mordor", Signature::function("draw", vec![]), 0));

        assert_eq!(vt.len(), 2);
        assert_eq!(
            vt.entries()[0].declaration.owner,
            TypeHash::from_name("Mordor")
        );
    }

    #[test]
    fn named_returns_overloads() {
        let mut vt = VTable::new();
        vt.insert(entry("A", Signature::function("foo", vec![]), 0));
        vt.insert(entry("A", Signature::function("foo", vec![TypeRef::Int]), 1));
        vt.insert(entry("A", Signature::function("bar", vec![]), 2));

        assert_eq!(vt.named("foo").count(), 2);
        assert_eq!(vt.named("missing").count(), 0);
    }
}
