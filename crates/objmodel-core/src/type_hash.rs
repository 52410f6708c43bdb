//! Deterministic hash-based identity for declarations.
//!
//! [`TypeHash`] is a 64-bit hash computed from names and signatures. It is used
//! as the key for classes, interfaces, member signatures and constructors, so
//! lookups never depend on registration order and forward references hash the
//! same as the declaration they point to.
//!
//! # Examples
//!
//! ```
//! use objmodel_core::TypeHash;
//!
//! let cat = TypeHash::from_name("Cat");
//! assert_eq!(cat, TypeHash::from_name("Cat"));
//!
//! let draw = TypeHash::from_signature("draw", 1, &[]);
//! let draw_int = TypeHash::from_signature("draw", 1, &[TypeHash::from_name("Int")]);
//! assert_ne!(draw, draw_int);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Each entity kind gets its own constant so that a type and a member that
/// happen to share a name never collide.
pub mod hash_constants {
    /// Separator constant for chained components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for member signature hashes.
    pub const SIGNATURE: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for owner-qualified member hashes.
    pub const MEMBER: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for constructor hashes.
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Parameter position mixing constants. Parameter order matters.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit hash identifying a type, signature, member or constructor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a member signature: name, member kind tag and parameter types.
    ///
    /// The owner is deliberately excluded so an override and the member it
    /// overrides share the same signature hash.
    #[inline]
    pub fn from_signature(name: &str, kind: u8, param_hashes: &[TypeHash]) -> Self {
        let base = hash_constants::SIGNATURE ^ xxh64(name.as_bytes(), 0) ^ u64::from(kind);
        TypeHash(mix_params(base, param_hashes))
    }

    /// Hash of a member signature qualified by its declaring type.
    #[inline]
    pub fn from_member(owner: TypeHash, signature: TypeHash) -> Self {
        TypeHash(
            (hash_constants::MEMBER ^ owner.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(signature.0),
        )
    }

    /// Hash of a constructor: owning class and parameter types.
    #[inline]
    pub fn from_constructor(owner: TypeHash, param_hashes: &[TypeHash]) -> Self {
        TypeHash(mix_params(hash_constants::CONSTRUCTOR ^ owner.0, param_hashes))
    }

    /// Check if this is the empty hash.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

fn mix_params(mut hash: u64, param_hashes: &[TypeHash]) -> u64 {
    for (i, param) in param_hashes.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps the mix order-sensitive
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
