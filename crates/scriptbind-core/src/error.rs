//! Errors surfaced at the VM boundary.
//!
//! Lookups in scriptbind never fail: a missing class, name, table entry or
//! conversion edge is reported as `None`. The only errors are operations a
//! script attempted that the native side does not support, and those are
//! returned as [`RuntimeError`] so the bridge can raise them as catchable
//! script errors instead of faulting.

use thiserror::Error;

use crate::bridge::MetaMethod;
use crate::table::TableId;

/// Errors raised by symbol tables on behalf of a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The key's runtime kind is neither string nor integer.
    #[error("Table ({table}) can not use {type_name} as key")]
    KeyType {
        /// The table that was indexed.
        table: TableId,
        /// Runtime type name of the offending key.
        type_name: &'static str,
    },

    /// A metamethod the table does not implement was invoked.
    #[error("Table ({table}) {operation} metamethod not implemented")]
    Unsupported {
        /// The table the operation was attempted on.
        table: TableId,
        /// The attempted metamethod.
        operation: MetaMethod,
    },

    /// A path segment on the way to `key` holds a value that is not a table.
    #[error("Table ({table}) can not reach '{key}': a path segment is not a table")]
    NoSuchTable {
        /// The table the path was resolved from.
        table: TableId,
        /// The full path that failed to resolve.
        key: String,
    },
}

impl RuntimeError {
    /// The table that raised this error.
    pub fn table(&self) -> TableId {
        match self {
            RuntimeError::KeyType { table, .. } => *table,
            RuntimeError::Unsupported { table, .. } => *table,
            RuntimeError::NoSuchTable { table, .. } => *table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_display() {
        let err = RuntimeError::KeyType {
            table: TableId::from_raw(0x10),
            type_name: "boolean",
        };
        assert_eq!(format!("{err}"), "Table (0x10) can not use boolean as key");
    }

    #[test]
    fn unsupported_display_names_metamethod() {
        let err = RuntimeError::Unsupported {
            table: TableId::from_raw(0x20),
            operation: MetaMethod::NewIndex,
        };
        assert_eq!(
            format!("{err}"),
            "Table (0x20) __newindex metamethod not implemented"
        );
    }

    #[test]
    fn no_such_table_display() {
        let err = RuntimeError::NoSuchTable {
            table: TableId::from_raw(0x30),
            key: "a.b".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Table (0x30) can not reach 'a.b': a path segment is not a table"
        );
    }

    #[test]
    fn table_accessor() {
        let id = TableId::from_raw(0x40);
        let err = RuntimeError::Unsupported {
            table: id,
            operation: MetaMethod::Call,
        };
        assert_eq!(err.table(), id);
    }
}
