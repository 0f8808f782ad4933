//! Runtime type identity for native types.
//!
//! This module provides [`TypeKey`], the identity token the registry uses for
//! every native type it knows about. Keys are built from Rust's own reflection
//! facility ([`TypeId`]), so two distinct types can never share a key and no
//! registration step is needed before a key can be compared or ordered.
//!
//! # Examples
//!
//! ```
//! use scriptbind_core::TypeKey;
//!
//! struct Player;
//! struct Enemy;
//!
//! assert_eq!(TypeKey::of::<Player>(), TypeKey::of::<Player>());
//! assert_ne!(TypeKey::of::<Player>(), TypeKey::of::<Enemy>());
//! ```

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque, totally-ordered identity of one native type.
///
/// Equality, ordering and hashing look only at the underlying [`TypeId`].
/// The Rust type name is carried along for diagnostics and as the default
/// class name, but never takes part in comparisons.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying reflection token.
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.id
    }

    /// The Rust type name this key was created from.
    #[inline]
    pub fn type_name(self) -> &'static str {
        self.name
    }

    /// Check whether this key identifies `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
