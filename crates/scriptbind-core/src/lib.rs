//! Core types for binding native values into an embedded scripting runtime.
//!
//! - [`TypeKey`]: runtime identity of a native type
//! - [`TypeTag`], [`Lineage`], [`Tagged`], [`Inherits`]: the pieces that let a
//!   base pointer be checked and narrowed to a derived type
//! - [`Table`], [`ScriptTable`]: hierarchical symbol tables and the metamethod
//!   surface scripts see
//! - [`Vm`], [`IndexKey`], [`Lookup`], [`MetaMethod`]: the VM boundary
//! - [`RuntimeError`]: errors raised back into scripts

mod bridge;
mod error;
mod lineage;
mod object;
mod table;
mod type_key;

pub use bridge::{IndexKey, Lookup, MetaMethod, TABLE_METATABLE, Vm};
pub use error::RuntimeError;
pub use lineage::{Inherits, Lineage, Tagged, TypeTag};
pub use object::{Object, SharedObject};
pub use table::{DEFAULT_SEPARATOR, ScriptTable, Table, TableFind, TableId};
pub use type_key::TypeKey;
