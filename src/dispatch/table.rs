//! Dispatch table mapping entry point names to handlers.

use std::collections::HashMap;

use crate::{
    dispatch::{
        entry::InternalCall,
        types::{CallArg, CallReturn},
    },
    Error, Result,
};

/// Table of named entry points.
///
/// The table is created when the managed runtime is brought up and passed by
/// reference to whoever registers or invokes entry points. Names are unique.
///
/// # Examples
///
/// ```rust
/// use gcbridge::dispatch::{CallArg, CallReturn, DispatchTable, InternalCall};
///
/// let mut table = DispatchTable::new();
/// table.register(InternalCall::object("Test.Object::Ping@1", |_| {}))?;
///
/// assert!(table.contains("Test.Object::Ping@1"));
/// assert_eq!(
///     table.invoke("Test.Object::Ping@1", &[CallArg::Object(1)])?,
///     CallReturn::Void
/// );
/// # Ok::<(), gcbridge::Error>(())
/// ```
#[derive(Default)]
pub struct DispatchTable {
    calls: HashMap<String, InternalCall>,
}

impl DispatchTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntryPoint`] if the name is taken. The table is
    /// left untouched.
    pub fn register(&mut self, call: InternalCall) -> Result<()> {
        if self.calls.contains_key(call.name()) {
            return Err(Error::DuplicateEntryPoint(call.name().to_string()));
        }
        self.calls.insert(call.name().to_string(), call);
        Ok(())
    }

    /// Looks up an entry point by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InternalCall> {
        self.calls.get(name)
    }

    /// Returns `true` if an entry point is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    /// Invokes the entry point registered under `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::EntryPointNotFound`] if nothing is registered under `name`
    /// - [`Error::ArgumentMismatch`] if `args` do not match the calling convention
    pub fn invoke(&self, name: &str, args: &[CallArg<'_>]) -> Result<CallReturn> {
        self.calls
            .get(name)
            .ok_or_else(|| Error::EntryPointNotFound(name.to_string()))?
            .invoke(args)
    }

    /// Returns the number of registered entry points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if no entry points are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.calls.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("entry_points", &self.names())
            .finish()
    }
}
