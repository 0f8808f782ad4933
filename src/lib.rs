//! scriptbind - expose native types and nested values to an embedded
//! scripting runtime.
//!
//! Native code registers its types once with a [`TypeRegistry`], declares
//! which types derive from which, and publishes values into symbol
//! [`Table`]s. A VM bridge then serves script lookups from those tables and
//! asks the registry to convert object pointers along declared relations.
//!
//! ```
//! use std::rc::Rc;
//! use scriptbind::{IndexKey, ScriptTable, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! registry.set("config::window::width", Some(Rc::new(800i64))).unwrap();
//!
//! let lookup = registry.global().index(IndexKey::Str("config::window::width")).unwrap();
//! assert!(lookup.is_found());
//! assert!(lookup.cache);
//! ```

pub use scriptbind_core::{
    DEFAULT_SEPARATOR, IndexKey, Inherits, Lineage, Lookup, MetaMethod, Object, RuntimeError,
    ScriptTable, SharedObject, TABLE_METATABLE, Table, TableFind, TableId, Tagged, TypeKey,
    TypeTag, Vm,
};
pub use scriptbind_registry::{ClassNode, Conversion, ConversionGraph, GLOBAL_NAME, TypeRegistry};
