//! TypeRegistry - the authority on native type identity.
//!
//! This module provides [`TypeRegistry`], which maps [`TypeKey`]s to
//! [`ClassNode`]s, resolves script-facing names back to keys, owns the
//! [`ConversionGraph`], and owns the global namespace table that is installed
//! into every VM wired to it.
//!
//! # Threading
//!
//! The registry is single-threaded. Registration happens in a startup phase
//! before scripts run; afterwards the registry is read-mostly. Because it owns
//! an `Rc`-based [`Table`], it is neither `Send` nor `Sync`. The conversion
//! graph on its own is, and can be cloned out with
//! [`conversions`](TypeRegistry::conversions) if another thread needs it.
//!
//! # Example
//!
//! ```
//! use scriptbind_registry::TypeRegistry;
//! use scriptbind_core::TypeKey;
//!
//! struct Player;
//!
//! let mut registry = TypeRegistry::new();
//! let key = TypeKey::of::<Player>();
//! registry.get_or_create_class(key);
//! registry.rename_class(key, "Player");
//!
//! assert_eq!(registry.get_class_by_name("Player").unwrap().key(), key);
//! ```
//!
//! The registry cannot be copied:
//!
//! ```compile_fail
//! use scriptbind_registry::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//! let copy: TypeRegistry = registry.clone();
//! ```

use std::cell::RefCell;
use std::collections::hash_map::{Entry, VacantEntry};
use std::ptr::NonNull;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use scriptbind_core::{
    Inherits, MetaMethod, RuntimeError, SharedObject, TABLE_METATABLE, Table, Tagged, TypeKey, Vm,
};
use tracing::debug;

use crate::{ClassNode, ConversionGraph};

/// Name the global namespace is bound to in every wired VM.
pub const GLOBAL_NAME: &str = "native";

thread_local! {
    static DEFAULT: RefCell<TypeRegistry> = RefCell::new(TypeRegistry::new());
}

/// Type identity, naming and conversion authority.
pub struct TypeRegistry {
    /// One node per type.
    classes: FxHashMap<TypeKey, ClassNode>,

    /// Name index: canonical name -> key.
    names: FxHashMap<String, TypeKey>,

    conversions: ConversionGraph,

    /// Root of the global namespace.
    global: Rc<Table>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry with an empty global namespace.
    pub fn new() -> Self {
        Self {
            classes: FxHashMap::default(),
            names: FxHashMap::default(),
            conversions: ConversionGraph::new(),
            global: Rc::new(Table::namespace()),
        }
    }

    /// Run `f` against this thread's default registry, creating it on first use.
    ///
    /// # Panics
    ///
    /// Panics if called again from inside `f`.
    pub fn with_default<R>(f: impl FnOnce(&mut TypeRegistry) -> R) -> R {
        DEFAULT.with(|registry| f(&mut registry.borrow_mut()))
    }

    // ==========================================================================
    // Class lookup
    // ==========================================================================

    /// Get the node for `key`.
    pub fn get_class(&self, key: TypeKey) -> Option<&ClassNode> {
        self.classes.get(&key)
    }

    /// Get the node for `key` mutably.
    pub fn get_class_mut(&mut self, key: TypeKey) -> Option<&mut ClassNode> {
        self.classes.get_mut(&key)
    }

    /// Get the node currently named `name`.
    pub fn get_class_by_name(&self, name: &str) -> Option<&ClassNode> {
        let key = self.names.get(name)?;
        self.classes.get(key)
    }

    /// Get the node currently named `name` mutably.
    pub fn get_class_by_name_mut(&mut self, name: &str) -> Option<&mut ClassNode> {
        let key = *self.names.get(name)?;
        self.classes.get_mut(&key)
    }

    /// Get the node for the Rust type `T`.
    pub fn class_of<T: 'static>(&self) -> Option<&ClassNode> {
        self.get_class(TypeKey::of::<T>())
    }

    /// Get the node for `key`, creating it if this is the first request.
    ///
    /// A new node is named after the Rust type. The same key always yields
    /// the same node.
    pub fn get_or_create_class(&mut self, key: TypeKey) -> &mut ClassNode {
        match self.classes.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => Self::add_class_node(&mut self.names, entry, ClassNode::new(key)),
        }
    }

    /// Insert a node into a slot known to be empty, so no key is ever
    /// registered twice.
    ///
    /// If another class already holds the node's name, the node is given the
    /// first free `name#N` instead.
    fn add_class_node<'a>(
        names: &mut FxHashMap<String, TypeKey>,
        slot: VacantEntry<'a, TypeKey, ClassNode>,
        mut node: ClassNode,
    ) -> &'a mut ClassNode {
        if names.contains_key(node.name()) {
            let mut suffix = 2;
            let mut candidate = format!("{}#{suffix}", node.name());
            while names.contains_key(&candidate) {
                suffix += 1;
                candidate = format!("{}#{suffix}", node.name());
            }
            debug!(key = %node.key(), taken = node.name(), name = %candidate, "class name taken");
            node.set_name(candidate);
        }
        debug!(key = %node.key(), name = node.name(), "create class");
        names.insert(node.name().to_owned(), node.key());
        slot.insert(node)
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Iterate over all registered classes in no particular order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassNode> {
        self.classes.values()
    }

    // ==========================================================================
    // Naming
    // ==========================================================================

    /// Move `key`'s canonical name from `old_name` to `new_name`.
    ///
    /// The old name stops resolving, the new name resolves to `key`, and the
    /// node's name is updated, all under one exclusive borrow. Returns
    /// `false`, changing nothing, when no node exists for `key`, when
    /// `old_name` is not its current name, or when `new_name` already names
    /// another class.
    pub fn rename(&mut self, old_name: &str, new_name: &str, key: TypeKey) -> bool {
        let Some(node) = self.classes.get_mut(&key) else {
            return false;
        };
        if node.name() != old_name {
            debug!(%key, old_name, current = node.name(), "rename refused: stale name");
            return false;
        }
        if let Some(holder) = self.names.get(new_name) {
            if *holder != key {
                debug!(%key, new_name, holder = %holder, "rename refused: name taken");
                return false;
            }
        }
        self.names.remove(old_name);
        self.names.insert(new_name.to_owned(), key);
        node.set_name(new_name.to_owned());
        debug!(%key, old_name, new_name, "rename class");
        true
    }

    /// [`rename`](Self::rename) `key` from whatever it is currently called.
    pub fn rename_class(&mut self, key: TypeKey, new_name: &str) -> bool {
        let Some(old_name) = self.classes.get(&key).map(|node| node.name().to_owned()) else {
            return false;
        };
        self.rename(&old_name, new_name, key)
    }

    // ==========================================================================
    // Global namespace
    // ==========================================================================

    /// Bind `value` at a path in the global namespace; `None` removes it.
    pub fn set(&self, name: &str, value: Option<SharedObject>) -> Result<(), RuntimeError> {
        self.global.set(name, value)
    }

    /// The global namespace table.
    pub fn global(&self) -> &Rc<Table> {
        &self.global
    }

    /// Install the table metatable and the global namespace into `vm`.
    ///
    /// Calling this again on the same VM replaces the bindings with the same
    /// values.
    pub fn wire_into_vm(&self, vm: &mut dyn Vm) {
        vm.install_metatable(TABLE_METATABLE, &MetaMethod::TABLE);
        let global: SharedObject = self.global.clone();
        vm.set_global(GLOBAL_NAME, global);
        debug!(classes = self.classes.len(), "wired registry into vm");
    }

    // ==========================================================================
    // Conversions
    // ==========================================================================

    /// Declare that `D` derives from `B`, installing the upcast and the
    /// checked downcast, and making sure both types have class nodes.
    pub fn declare_relation<D: Inherits<B>, B: Tagged>(&mut self) {
        self.get_or_create_class(TypeKey::of::<D>());
        self.get_or_create_class(TypeKey::of::<B>());
        self.conversions.declare::<D, B>();
    }

    /// The conversion graph.
    pub fn conversions(&self) -> &ConversionGraph {
        &self.conversions
    }

    /// View `obj`, an object of type `from`, as type `to`.
    ///
    /// See [`ConversionGraph::convert`].
    ///
    /// # Safety
    ///
    /// Unless `from == to`, `obj` must be derived from the whole allocation of
    /// a live object whose type is `from`.
    pub unsafe fn convert(&self, from: TypeKey, to: TypeKey, obj: NonNull<()>) -> Option<NonNull<()>> {
        // SAFETY: forwarded from this function's contract.
        unsafe { self.conversions.convert(from, to, obj) }
    }

    /// Read-only form of [`convert`](Self::convert).
    ///
    /// # Safety
    ///
    /// Same as [`convert`](Self::convert).
    pub unsafe fn convert_const(&self, from: TypeKey, to: TypeKey, obj: *const ()) -> Option<*const ()> {
        // SAFETY: forwarded from this function's contract.
        unsafe { self.conversions.convert_const(from, to, obj) }
    }
}
