//! Direct pointer conversions between related native types.
//!
//! A [`ConversionGraph`] stores one [`Conversion`] per ordered pair of types.
//! Declaring that `Derived` inherits from `Base` installs exactly two edges:
//!
//! - `Derived -> Base`: the address is returned unchanged. Prefix layout
//!   guarantees it is already a valid `Base` pointer.
//! - `Base -> Derived`: the base's [`TypeTag`](scriptbind_core::TypeTag) is
//!   read, and the address is returned only if the object is a `Derived`.
//!
//! Lookups never search. If `A -> B` and `B -> C` are declared, `A -> C` is
//! still unavailable until it is declared itself.

use std::ptr::NonNull;

use rustc_hash::FxHashMap;
use scriptbind_core::{Inherits, Tagged, TypeKey};
use tracing::debug;

/// One direction of one declared relation.
///
/// # Safety
///
/// Callers must pass a pointer derived from the whole allocation of a live
/// object of the edge's source type.
pub type Conversion = unsafe fn(NonNull<()>) -> Option<NonNull<()>>;

fn to_base(obj: NonNull<()>) -> Option<NonNull<()>> {
    Some(obj)
}

unsafe fn to_derived<D: Inherits<B>, B: Tagged>(obj: NonNull<()>) -> Option<NonNull<()>> {
    // SAFETY: the caller promises `obj` points at a live `B`.
    let base = unsafe { obj.cast::<B>().as_ref() };
    base.type_tag().is_a(TypeKey::of::<D>()).then_some(obj)
}

/// Conversion edges keyed by (source, target).
///
/// Holds only keys and function pointers, so a graph can be shared across
/// threads once registration is over.
#[derive(Debug, Default, Clone)]
pub struct ConversionGraph {
    edges: FxHashMap<(TypeKey, TypeKey), Conversion>,
}

impl ConversionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install both edges for `D` inheriting from `B`, replacing any earlier
    /// edges between the two.
    pub fn declare<D: Inherits<B>, B: Tagged>(&mut self) {
        let derived = TypeKey::of::<D>();
        let base = TypeKey::of::<B>();
        debug!(%derived, %base, "declare relation");
        self.edges.insert((derived, base), to_base);
        self.edges.insert((base, derived), to_derived::<D, B>);
    }

    /// The direct edge from `from` to `to`, if one was declared.
    pub fn edge(&self, from: TypeKey, to: TypeKey) -> Option<Conversion> {
        self.edges.get(&(from, to)).copied()
    }

    /// Check whether `from` can be viewed as `to` without touching an object.
    ///
    /// Downcast edges can still refuse a particular object at conversion time.
    pub fn can_convert(&self, from: TypeKey, to: TypeKey) -> bool {
        from == to || self.edges.contains_key(&(from, to))
    }

    /// Number of edges (two per declared relation).
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check whether no relation has been declared.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// View `obj`, an object of type `from`, as type `to`.
    ///
    /// Returns `obj` itself when `from == to`, the result of the direct edge
    /// when there is one, and `None` otherwise.
    ///
    /// # Safety
    ///
    /// Unless `from == to`, `obj` must be derived from the whole allocation of
    /// a live object whose type is `from`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub unsafe fn convert(&self, from: TypeKey, to: TypeKey, obj: NonNull<()>) -> Option<NonNull<()>> {
        if from == to {
            return Some(obj);
        }
        let edge = self.edge(from, to)?;
        // SAFETY: forwarded from this function's contract.
        unsafe { edge(obj) }
    }

    /// Read-only form of [`convert`](Self::convert). A null `obj` converts
    /// only to its own type.
    ///
    /// # Safety
    ///
    /// Same as [`convert`](Self::convert).
    pub unsafe fn convert_const(&self, from: TypeKey, to: TypeKey, obj: *const ()) -> Option<*const ()> {
        if from == to {
            return Some(obj);
        }
        let obj = NonNull::new(obj.cast_mut())?;
        // SAFETY: forwarded from this function's contract.
        unsafe { self.convert(from, to, obj) }.map(|p| p.as_ptr().cast_const())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptbind_core::{Lineage, TypeTag};

    #[repr(C)]
    struct Base {
        tag: TypeTag,
        id: u32,
    }

    impl Lineage for Base {}

    impl Tagged for Base {
        fn type_tag(&self) -> TypeTag {
            self.tag
        }
    }

    #[repr(C)]
    struct Derived {
        base: Base,
        extra: u64,
    }

    impl Lineage for Derived {}

    unsafe impl Inherits<Base> for Derived {}

    struct Unrelated;

    fn base(id: u32) -> Base {
        Base {
            tag: TypeTag::of::<Base>(),
            id,
        }
    }

    fn derived(id: u32) -> Derived {
        Derived {
            base: Base {
                tag: TypeTag::of::<Derived>(),
                id,
            },
            extra: 99,
        }
    }

    fn erase<T>(value: &mut T) -> NonNull<()> {
        NonNull::from(value).cast()
    }

    #[test]
    fn declare_installs_two_edges() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();
        assert_eq!(graph.len(), 2);
        assert!(graph.edge(TypeKey::of::<Derived>(), TypeKey::of::<Base>()).is_some());
        assert!(graph.edge(TypeKey::of::<Base>(), TypeKey::of::<Derived>()).is_some());
    }

    #[test]
    fn redeclaring_keeps_two_edges() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();
        graph.declare::<Derived, Base>();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn identity_without_edges() {
        let graph = ConversionGraph::new();
        let mut value = Unrelated;
        let ptr = erase(&mut value);
        let key = TypeKey::of::<Unrelated>();
        assert_eq!(unsafe { graph.convert(key, key, ptr) }, Some(ptr));
        assert!(graph.can_convert(key, key));
    }

    #[test]
    fn upcast_keeps_address() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();

        let mut d = derived(7);
        let ptr = erase(&mut d);
        let up = unsafe { graph.convert(TypeKey::of::<Derived>(), TypeKey::of::<Base>(), ptr) };
        assert_eq!(up, Some(ptr));

        let base_ref = unsafe { up.unwrap().cast::<Base>().as_ref() };
        assert_eq!(base_ref.id, 7);
    }

    #[test]
    fn downcast_accepts_real_derived() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();

        let mut d = derived(3);
        let ptr = erase(&mut d);
        let down = unsafe { graph.convert(TypeKey::of::<Base>(), TypeKey::of::<Derived>(), ptr) };
        assert_eq!(down, Some(ptr));
        assert_eq!(unsafe { down.unwrap().cast::<Derived>().as_ref() }.extra, 99);
    }

    #[test]
    fn downcast_rejects_plain_base() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();

        let mut b = base(1);
        let ptr = erase(&mut b);
        let down = unsafe { graph.convert(TypeKey::of::<Base>(), TypeKey::of::<Derived>(), ptr) };
        assert!(down.is_none());
    }

    #[test]
    fn unrelated_types_do_not_convert() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();

        let mut d = derived(1);
        let ptr = erase(&mut d);
        let result = unsafe { graph.convert(TypeKey::of::<Derived>(), TypeKey::of::<Unrelated>(), ptr) };
        assert!(result.is_none());
        assert!(!graph.can_convert(TypeKey::of::<Derived>(), TypeKey::of::<Unrelated>()));
    }

    #[test]
    fn const_form_matches_mutable_form() {
        let mut graph = ConversionGraph::new();
        graph.declare::<Derived, Base>();

        let d = derived(5);
        let ptr = &d as *const Derived as *const ();
        let up = unsafe { graph.convert_const(TypeKey::of::<Derived>(), TypeKey::of::<Base>(), ptr) };
        assert_eq!(up, Some(ptr));

        let b = base(5);
        let ptr = &b as *const Base as *const ();
        let down = unsafe { graph.convert_const(TypeKey::of::<Base>(), TypeKey::of::<Derived>(), ptr) };
        assert!(down.is_none());
    }

    #[test]
    fn const_form_null_pointer() {
        let graph = ConversionGraph::new();
        let key = TypeKey::of::<Base>();
        let null = std::ptr::null::<()>();
        assert_eq!(unsafe { graph.convert_const(key, key, null) }, Some(null));
        assert!(unsafe { graph.convert_const(key, TypeKey::of::<Derived>(), null) }.is_none());
    }

    #[test]
    fn graph_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConversionGraph>();
    }
}
