//! Opaque values stored in symbol tables.

use std::any::Any;
use std::rc::Rc;

use crate::table::{ScriptTable, Table};

/// A value that can live in a symbol table and be handed to a VM.
///
/// How a value is pushed onto a VM stack belongs to the bridge; the core only
/// needs to know a value's native type name and whether it can be walked as a
/// table.
pub trait Object: Any {
    /// Native type name used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The table data behind this value, if it can hold nested entries.
    ///
    /// Path resolution descends only into values that return `Some` here.
    fn as_table(&self) -> Option<&Table> {
        None
    }

    /// The metamethod surface of this value, if it behaves as a script table.
    fn as_script_table(&self) -> Option<&dyn ScriptTable> {
        None
    }
}

/// Shared handle to a stored value; the value lives as long as its longest holder.
pub type SharedObject = Rc<dyn Object>;

impl Object for i64 {}
impl Object for f64 {}
impl Object for bool {}
impl Object for String {}
