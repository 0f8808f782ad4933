//! Runtime type tags and inheritance declarations.
//!
//! Rust has no class inheritance, so scriptbind models a native "class
//! hierarchy" with prefix layout: a derived type is `#[repr(C)]` and stores its
//! base as the first field. A pointer to the derived object is then also a
//! valid pointer to the base, which makes upcasting a pure reinterpretation.
//!
//! Narrowing the other way needs to know what the object really is. Every base
//! that can be narrowed stores a [`TypeTag`] naming the concrete type it was
//! constructed as, and exposes it through [`Tagged`].
//!
//! # Example
//!
//! ```
//! use scriptbind_core::{Inherits, Lineage, Tagged, TypeKey, TypeTag};
//!
//! #[repr(C)]
//! struct Shape {
//!     tag: TypeTag,
//!     sides: u32,
//! }
//!
//! impl Lineage for Shape {}
//!
//! impl Tagged for Shape {
//!     fn type_tag(&self) -> TypeTag {
//!         self.tag
//!     }
//! }
//!
//! #[repr(C)]
//! struct Square {
//!     base: Shape,
//!     side: f64,
//! }
//!
//! impl Lineage for Square {}
//!
//! // SAFETY: `Square` is `repr(C)` and starts with its `Shape`.
//! unsafe impl Inherits<Shape> for Square {}
//!
//! let square = Square {
//!     base: Shape { tag: TypeTag::of::<Square>(), sides: 4 },
//!     side: 2.0,
//! };
//! assert!(square.base.type_tag().is_a(TypeKey::of::<Square>()));
//! ```

use std::fmt;

use crate::TypeKey;

/// Reports which types an object of `Self` may be viewed as.
///
/// The default only accepts `Self`. A type that sits below another derived
/// type overrides [`is_a`](Lineage::is_a) to also accept its ancestors, so a
/// narrowing check for the intermediate type still succeeds:
///
/// ```
/// use scriptbind_core::{Lineage, TypeKey};
///
/// struct Widget;
/// struct Button;
///
/// impl Lineage for Widget {}
///
/// impl Lineage for Button {
///     fn is_a(key: TypeKey) -> bool {
///         key == TypeKey::of::<Button>() || Widget::is_a(key)
///     }
/// }
///
/// assert!(Button::is_a(TypeKey::of::<Widget>()));
/// assert!(!Widget::is_a(TypeKey::of::<Button>()));
/// ```
pub trait Lineage: 'static {
    /// Whether an instance of `Self` is an instance of the type `key`.
    fn is_a(key: TypeKey) -> bool
    where
        Self: Sized,
    {
        key == TypeKey::of::<Self>()
    }
}

/// Explicit runtime type tag stored inside a base object.
#[derive(Clone, Copy)]
pub struct TypeTag {
    concrete: TypeKey,
    is_a: fn(TypeKey) -> bool,
}

impl TypeTag {
    /// Tag for an object constructed as `T`.
    pub fn of<T: Lineage>() -> Self {
        Self {
            concrete: TypeKey::of::<T>(),
            is_a: T::is_a,
        }
    }

    /// The type the tagged object was constructed as.
    #[inline]
    pub fn concrete(&self) -> TypeKey {
        self.concrete
    }

    /// Whether the tagged object may be viewed as `key`.
    #[inline]
    pub fn is_a(&self, key: TypeKey) -> bool {
        (self.is_a)(key)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.concrete).finish()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.concrete == other.concrete
    }
}

impl Eq for TypeTag {}

/// A base type whose instances carry a [`TypeTag`].
pub trait Tagged: 'static {
    /// The tag set when the enclosing object was constructed.
    fn type_tag(&self) -> TypeTag;
}

/// Declares that `Self` is laid out as an extension of `Base`.
///
/// # Safety
///
/// `Self` must be `#[repr(C)]` and its first field must be `Base`, either
/// directly or as the first field of its own first field. A pointer to a
/// `Self` must therefore be a valid, correctly aligned pointer to a `Base`.
/// Every constructor of `Self` must store `TypeTag::of::<Self>()` (or the tag
/// of a further-derived type) in the embedded base.
pub unsafe trait Inherits<Base: Tagged>: Lineage {}
