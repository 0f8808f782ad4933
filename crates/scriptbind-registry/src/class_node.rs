//! Per-type metadata records.

use scriptbind_core::TypeKey;

/// Metadata the registry keeps for one native type.
///
/// Nodes are only built by [`TypeRegistry`](crate::TypeRegistry), which holds
/// at most one per [`TypeKey`]. The name is changed through
/// [`TypeRegistry::rename`](crate::TypeRegistry::rename) so the name index
/// stays in step with it.
#[derive(Debug, PartialEq, Eq)]
pub struct ClassNode {
    key: TypeKey,
    name: String,
}

impl ClassNode {
    /// A node named after the Rust type behind `key`.
    pub(crate) fn new(key: TypeKey) -> Self {
        Self {
            key,
            name: key.type_name().to_owned(),
        }
    }

    /// The type this node describes.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The canonical script-facing name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
