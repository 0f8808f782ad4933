//! The narrow boundary between scriptbind and an embedding VM.
//!
//! scriptbind does not run scripts. A bridge adapts the VM's own stack API to
//! these types: it translates a script-side key into an [`IndexKey`], asks a
//! [`ScriptTable`](crate::ScriptTable) to resolve it, pushes the resulting
//! [`Lookup`] and raises any [`RuntimeError`](crate::RuntimeError) as a script
//! error. In the other direction, the registry wires itself into a VM through
//! the [`Vm`] trait.

use std::fmt;

use crate::object::SharedObject;

/// Name of the metatable a bridge installs for script tables.
pub const TABLE_METATABLE: &str = "scriptbind.Table";

/// Metamethods a script table responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaMethod {
    /// Read access (`t[k]`).
    Index,
    /// Write access (`t[k] = v`).
    NewIndex,
    /// Direct invocation (`t(...)`).
    Call,
    /// Destruction hook run by the VM's collector.
    Gc,
    /// String conversion.
    ToString,
}

impl MetaMethod {
    /// Every metamethod installed on the table metatable.
    pub const TABLE: [MetaMethod; 5] = [
        MetaMethod::Index,
        MetaMethod::NewIndex,
        MetaMethod::ToString,
        MetaMethod::Call,
        MetaMethod::Gc,
    ];

    /// Script-side metamethod name.
    pub fn as_str(self) -> &'static str {
        match self {
            MetaMethod::Index => "__index",
            MetaMethod::NewIndex => "__newindex",
            MetaMethod::Call => "__call",
            MetaMethod::Gc => "__gc",
            MetaMethod::ToString => "__tostring",
        }
    }
}

impl fmt::Display for MetaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key handed over from the VM for an index operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexKey<'a> {
    /// A string key; subject to path resolution.
    Str(&'a str),
    /// An integer key.
    Int(i64),
    /// Any other key kind, identified by its runtime type name.
    Other(&'static str),
}

impl IndexKey<'_> {
    /// Runtime type name of the key, as a script would report it.
    pub fn type_name(&self) -> &'static str {
        match self {
            IndexKey::Str(_) => "string",
            IndexKey::Int(_) => "number",
            IndexKey::Other(name) => name,
        }
    }
}

/// The single value an index operation yields to the VM.
#[derive(Clone, Default)]
pub struct Lookup {
    /// The resolved value, or `None` for the VM's "no value" sentinel.
    pub value: Option<SharedObject>,
    /// Whether the bridge may memoize `value` in the VM's own table under the
    /// original key. This is a one-shot signal; scriptbind keeps no cache.
    pub cache: bool,
}

impl Lookup {
    /// A lookup that found nothing.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Check whether a value was resolved.
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("value", &self.value.as_ref().map(|v| v.type_name()))
            .field("cache", &self.cache)
            .finish()
    }
}

/// Operations scriptbind needs from one VM instance.
pub trait Vm {
    /// Bind `value` as a global named `name`, replacing any earlier binding.
    fn set_global(&mut self, name: &str, value: SharedObject);

    /// Install (or replace) the metatable `name` with the given metamethods.
    fn install_metatable(&mut self, name: &str, methods: &[MetaMethod]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn metamethod_names() {
        assert_eq!(MetaMethod::Index.as_str(), "__index");
        assert_eq!(MetaMethod::NewIndex.as_str(), "__newindex");
        assert_eq!(MetaMethod::Call.as_str(), "__call");
        assert_eq!(MetaMethod::Gc.as_str(), "__gc");
        assert_eq!(format!("{}", MetaMethod::ToString), "__tostring");
    }

    #[test]
    fn table_metatable_covers_every_metamethod() {
        for method in [
            MetaMethod::Index,
            MetaMethod::NewIndex,
            MetaMethod::Call,
            MetaMethod::Gc,
            MetaMethod::ToString,
        ] {
            assert!(MetaMethod::TABLE.contains(&method));
        }
    }

    #[test]
    fn index_key_type_names() {
        assert_eq!(IndexKey::Str("a").type_name(), "string");
        assert_eq!(IndexKey::Int(3).type_name(), "number");
        assert_eq!(IndexKey::Other("boolean").type_name(), "boolean");
    }

    #[test]
    fn lookup_not_found() {
        let lookup = Lookup::not_found();
        assert!(!lookup.is_found());
        assert!(!lookup.cache);
    }

    #[test]
    fn lookup_debug_shows_value_type() {
        let lookup = Lookup {
            value: Some(Rc::new(1i64)),
            cache: true,
        };
        assert_eq!(
            format!("{lookup:?}"),
            "Lookup { value: Some(\"i64\"), cache: true }"
        );
    }
}
