//! scriptbind registry crate.
//!
//! Holds the [`TypeRegistry`] (class nodes, names, the global namespace) and
//! the [`ConversionGraph`] of direct upcast/downcast edges between related
//! native types.

mod class_node;
mod conversion;
mod registry;

pub use class_node::ClassNode;
pub use conversion::{Conversion, ConversionGraph};
pub use registry::{GLOBAL_NAME, TypeRegistry};
