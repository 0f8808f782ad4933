//! Hierarchical symbol tables.
//!
//! A [`Table`] maps string keys to shared values. When it has a non-empty
//! separator, a key containing that separator is a path: `"a.b.c"` names the
//! entry `c` inside the table stored at `b` inside the table stored at `a`.
//! Reads walk existing tables only; writes create missing intermediate tables
//! on the way down.
//!
//! Scripts reach tables through [`ScriptTable`], the metamethod surface a
//! bridge dispatches to. A bare table answers index operations and renders
//! diagnostics; every other metamethod is an explicit [`RuntimeError`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use scriptbind_core::{Object, SharedObject, Table};
//!
//! let table = Table::new(".", false);
//! let speed: SharedObject = Rc::new(3.5f64);
//! table.set("game.player.speed", Some(speed.clone())).unwrap();
//!
//! let found = table.get("game.player.speed").unwrap();
//! assert!(Rc::ptr_eq(&found, &speed));
//! assert!(table.get("game.player").unwrap().as_table().is_some());
//! assert!(table.get("game.enemy.speed").is_none());
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::bridge::{IndexKey, Lookup, MetaMethod};
use crate::error::RuntimeError;
use crate::object::{Object, SharedObject};

/// Separator used by namespace tables.
pub const DEFAULT_SEPARATOR: &str = "::";

/// Identity of a table instance, used to name it in errors and diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    /// Identity of `table`.
    pub fn of(table: &Table) -> Self {
        Self(table as *const Table as usize)
    }

    /// Build an identity from a raw address.
    pub const fn from_raw(addr: usize) -> Self {
        Self(addr)
    }

    /// The address this identity was taken from.
    pub const fn addr(self) -> usize {
        self.0
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({:#x})", self.0)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A key -> value container with optional path semantics.
///
/// The separator and the cacheable flag are fixed at construction. Entries
/// live behind a `RefCell`, so a table shared through an `Rc` can still be
/// written to; tables are confined to one thread.
pub struct Table {
    separator: String,
    cacheable: bool,
    elements: RefCell<BTreeMap<String, SharedObject>>,
}

/// Result of [`Table::resolve_table`]: the table holding the final path
/// segment, and that segment.
pub struct TableFind<'t, 'k> {
    root: &'t Table,
    nested: Option<SharedObject>,
    key: &'k str,
}

impl<'k> TableFind<'_, 'k> {
    /// The table that owns [`key`](Self::key).
    pub fn table(&self) -> &Table {
        self.nested
            .as_deref()
            .and_then(|value| value.as_table())
            .unwrap_or(self.root)
    }

    /// The final, unsplit key segment.
    pub fn key(&self) -> &'k str {
        self.key
    }

    /// Whether resolution descended below the table it started from.
    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }
}

impl Default for Table {
    /// A flat, non-cacheable table.
    fn default() -> Self {
        Self::new("", false)
    }
}

impl Table {
    /// Create an empty table.
    ///
    /// An empty `separator` disables path semantics: every key is a single
    /// entry, whatever characters it contains.
    pub fn new(separator: impl Into<String>, cacheable: bool) -> Self {
        Self {
            separator: separator.into(),
            cacheable,
            elements: RefCell::new(BTreeMap::new()),
        }
    }

    /// A cacheable table using [`DEFAULT_SEPARATOR`].
    pub fn namespace() -> Self {
        Self::new(DEFAULT_SEPARATOR, true)
    }

    /// Identity of this table.
    pub fn id(&self) -> TableId {
        TableId::of(self)
    }

    /// The path separator; empty when paths are disabled.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Whether resolved values may be memoized by the caller.
    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Number of local entries.
    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    /// Check whether the table has no local entries.
    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Local keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.elements.borrow().keys().cloned().collect()
    }

    // ==========================================================================
    // Single-level access
    // ==========================================================================

    /// Look up `name` in this table only, without path interpretation.
    pub fn raw_get(&self, name: &str) -> Option<SharedObject> {
        let found = self.elements.borrow().get(name).cloned();
        trace!(table = %self.id(), key = name, hit = found.is_some(), "table access");
        found
    }

    /// Set `name` in this table only. `None` removes the entry.
    pub fn raw_set(&self, name: &str, value: Option<SharedObject>) {
        // Displaced values are dropped after the borrow ends, so their
        // destructors may touch this table.
        let _displaced = match value {
            Some(value) => {
                debug!(table = %self.id(), key = name, value = ?Rc::as_ptr(&value), "table set");
                self.elements.borrow_mut().insert(name.to_owned(), value)
            }
            None => {
                debug!(table = %self.id(), key = name, "table remove");
                self.elements.borrow_mut().remove(name)
            }
        };
    }

    // ==========================================================================
    // Path access
    // ==========================================================================

    /// Find the table that owns the last segment of `key`.
    ///
    /// The key is split at the first separator occurrence; the head must name
    /// a table-capable value, and resolution continues with the rest inside
    /// it, using that table's own separator. When `create` is set, a missing
    /// head is filled with a new empty table carrying the same settings as
    /// its parent. Returns `None` when a head is missing (and `create` is not
    /// set) or holds a value that is not a table.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_table<'k>(&self, key: &'k str, create: bool) -> Option<TableFind<'_, 'k>> {
        let mut nested: Option<SharedObject> = None;
        let mut rest = key;

        loop {
            let table = match &nested {
                Some(value) => value.as_table()?,
                None => self,
            };
            if table.separator.is_empty() {
                break;
            }
            let Some((head, tail)) = rest.split_once(table.separator.as_str()) else {
                break;
            };

            let next = match table.raw_get(head) {
                Some(value) if value.as_table().is_some() => value,
                Some(_) => return None,
                None if create => {
                    debug!(table = %table.id(), head, tail, "create subtable");
                    let subtable: SharedObject =
                        Rc::new(Table::new(table.separator.clone(), table.cacheable));
                    table.raw_set(head, Some(subtable.clone()));
                    subtable
                }
                None => return None,
            };
            nested = Some(next);
            rest = tail;
        }

        Some(TableFind {
            root: self,
            nested,
            key: rest,
        })
    }

    /// Look up a path. Never creates anything.
    pub fn get(&self, key: &str) -> Option<SharedObject> {
        let find = self.resolve_table(key, false)?;
        find.table().raw_get(find.key())
    }

    /// Set a path, creating intermediate tables as needed. `None` removes the
    /// final entry.
    pub fn set(&self, key: &str, value: Option<SharedObject>) -> Result<(), RuntimeError> {
        let find = self
            .resolve_table(key, true)
            .ok_or_else(|| RuntimeError::NoSuchTable {
                table: self.id(),
                key: key.to_owned(),
            })?;
        find.table().raw_set(find.key(), value);
        Ok(())
    }

    /// Store `value` at a path.
    pub fn insert<T: Object>(&self, key: &str, value: T) -> Result<(), RuntimeError> {
        self.set(key, Some(Rc::new(value)))
    }

    /// Remove the entry at a path, returning it. Missing intermediate tables
    /// are not created.
    pub fn remove(&self, key: &str) -> Option<SharedObject> {
        let find = self.resolve_table(key, false)?;
        let table = find.table();
        let removed = table.elements.borrow_mut().remove(find.key());
        if removed.is_some() {
            debug!(table = %table.id(), key = find.key(), "table remove");
        }
        removed
    }

    /// Check whether a path resolves to a value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    /// Render this table and its local entries, labelling the table with
    /// `type_name`. Not a stable format.
    pub fn describe_as(&self, type_name: &str) -> String {
        let mut out = format!("Table({:p}) [{}] with keys:", self, type_name);
        for (key, value) in self.elements.borrow().iter() {
            let _ = write!(
                out,
                "\n\t{} -> {:p} [{}]",
                key,
                Rc::as_ptr(value) as *const (),
                value.type_name()
            );
        }
        out
    }

    /// The error a bare table raises for an unimplemented metamethod.
    pub fn unsupported(&self, operation: MetaMethod) -> RuntimeError {
        RuntimeError::Unsupported {
            table: self.id(),
            operation,
        }
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        // Uniquely owned subtables are emptied here so deep paths drop
        // without recursing once per level.
        let mut pending: Vec<SharedObject> =
            std::mem::take(self.elements.get_mut()).into_values().collect();
        while let Some(value) = pending.pop() {
            if Rc::strong_count(&value) == 1 {
                if let Some(table) = value.as_table() {
                    pending.extend(table.elements.take().into_values());
                }
            }
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id())
            .field("separator", &self.separator)
            .field("cacheable", &self.cacheable)
            .field("keys", &self.keys())
            .finish()
    }
}

impl Object for Table {
    fn as_table(&self) -> Option<&Table> {
        Some(self)
    }

    fn as_script_table(&self) -> Option<&dyn ScriptTable> {
        Some(self)
    }
}

/// The metamethod surface a bridge dispatches script operations to.
///
/// Every default method gives bare-table behaviour. A table variant wraps a
/// [`Table`], returns it from [`table`](ScriptTable::table), and overrides
/// whichever operations it actually supports.
pub trait ScriptTable: Object {
    /// The entries behind this script table.
    fn table(&self) -> &Table;

    /// Resolve a string key. Defaults to path lookup.
    fn index_str(&self, key: &str) -> Option<SharedObject> {
        self.table().get(key)
    }

    /// Resolve an integer key. A bare table has no integer entries.
    fn index_int(&self, _key: i64) -> Option<SharedObject> {
        None
    }

    /// `__index`: resolve a key coming from the VM.
    ///
    /// On success the returned [`Lookup`] asks the bridge to memoize the value
    /// whenever the table is cacheable and a value was found.
    fn index(&self, key: IndexKey<'_>) -> Result<Lookup, RuntimeError> {
        let value = match key {
            IndexKey::Str(name) => self.index_str(name),
            IndexKey::Int(i) => self.index_int(i),
            IndexKey::Other(type_name) => {
                return Err(RuntimeError::KeyType {
                    table: self.table().id(),
                    type_name,
                });
            }
        };
        let cache = self.table().is_cacheable() && value.is_some();
        if cache {
            trace!(table = %self.table().id(), ?key, "value may be cached by caller");
        }
        Ok(Lookup { value, cache })
    }

    /// `__newindex`: write a key coming from the VM.
    fn new_index(&self, _key: IndexKey<'_>, _value: Option<SharedObject>) -> Result<(), RuntimeError> {
        Err(self.table().unsupported(MetaMethod::NewIndex))
    }

    /// `__call`: invoke the table directly.
    fn call(&self, _args: &[SharedObject]) -> Result<Vec<SharedObject>, RuntimeError> {
        Err(self.table().unsupported(MetaMethod::Call))
    }

    /// `__gc`: the VM is releasing its reference.
    fn collect(&self) -> Result<(), RuntimeError> {
        Err(self.table().unsupported(MetaMethod::Gc))
    }

    /// `__tostring`: diagnostic rendering.
    fn describe(&self) -> String {
        self.table().describe_as(self.type_name())
    }
}

impl ScriptTable for Table {
    fn table(&self) -> &Table {
        self
    }
}
