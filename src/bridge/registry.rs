//! Binding registry pairing native objects with their managed peers.
//!
//! The registry maps an [`ObjectId`] to the [`BindingRecord`] that holds the managed
//! peer's [`ScriptHandle`]. It is shared by every thread that may destroy native
//! objects and by the finalizer thread, so it is backed by a sharded [`DashMap`].
//!
//! # Locking
//!
//! A shard lock is held only for the duration of a single registry call. Handles
//! that must be released are moved out of the record and returned to the caller,
//! which releases them after the lock is gone. Nothing in this module calls into a
//! script instance.

use dashmap::DashMap;
use strum::Display;

use crate::{
    bridge::ScriptHandle,
    runtime::{GcHandleKind, ObjectId, ObjectKind, RawGcHandle},
};

/// Binding state of a native object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum BindingState {
    /// No live managed peer is attached.
    Unbound,
    /// A live managed peer is attached to a plain object.
    BoundPlain,
    /// A live managed peer is attached to a ref-counted object and holds its
    /// implicit reference.
    BoundRefCounted,
}

/// Pairing of one native object with its managed peer.
#[derive(Debug)]
pub struct BindingRecord {
    initialized: bool,
    handle: ScriptHandle,
    kind: ObjectKind,
}

impl BindingRecord {
    /// Returns `true` while the record holds a live managed peer.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns the wrapped handle.
    #[must_use]
    pub fn handle(&self) -> &ScriptHandle {
        &self.handle
    }

    /// Returns the lifetime policy of the native object, which decides whether the
    /// managed peer owns an implicit reference.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Moves the handle out, leaving the record un-initialized.
    #[must_use]
    pub fn into_handle(mut self) -> ScriptHandle {
        self.initialized = false;
        self.handle.take()
    }

    fn state(&self) -> BindingState {
        if !self.initialized || self.handle.is_released() {
            return BindingState::Unbound;
        }
        match self.kind {
            ObjectKind::Plain => BindingState::BoundPlain,
            ObjectKind::RefCounted => BindingState::BoundRefCounted,
        }
    }
}

/// Copy of a binding record's observable fields, taken under the shard lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingSnapshot {
    /// Whether the record holds a live managed peer.
    pub initialized: bool,
    /// The raw handle, `None` once released.
    pub handle: Option<RawGcHandle>,
    /// Strength of the handle.
    pub handle_kind: GcHandleKind,
    /// Lifetime policy of the native object.
    pub kind: ObjectKind,
}

/// Concurrent map from native identity to binding record.
///
/// # Examples
///
/// ```rust,ignore
/// let registry = BindingRegistry::new();
/// registry.bind(id, ObjectKind::Plain, ScriptHandle::strong(raw))?;
/// assert_eq!(registry.state(id), BindingState::BoundPlain);
///
/// if let Some(mut handle) = registry.take_live_handle(id) {
///     handle.release(runtime);
/// }
/// assert_eq!(registry.state(id), BindingState::Unbound);
/// ```
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: DashMap<ObjectId, BindingRecord>,
}

impl BindingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a managed peer to a native object.
    ///
    /// Creates the record on first access, or re-initializes a record whose previous
    /// peer has been released.
    ///
    /// # Errors
    ///
    /// Returns the handle back if the object already has a live managed peer.
    #[allow(clippy::result_large_err)]
    pub fn bind(
        &self,
        id: ObjectId,
        kind: ObjectKind,
        handle: ScriptHandle,
    ) -> std::result::Result<(), ScriptHandle> {
        let mut record = self.bindings.entry(id).or_insert_with(|| BindingRecord {
            initialized: false,
            handle: ScriptHandle::released(handle.kind()),
            kind,
        });

        if record.state() != BindingState::Unbound {
            return Err(handle);
        }

        record.handle = handle;
        record.kind = kind;
        record.initialized = true;
        Ok(())
    }

    /// Looks up the binding of a native object.
    #[must_use]
    pub fn lookup(&self, id: ObjectId) -> Option<BindingSnapshot> {
        self.bindings.get(&id).map(|record| BindingSnapshot {
            initialized: record.initialized,
            handle: record.handle.raw(),
            handle_kind: record.handle.kind(),
            kind: record.kind,
        })
    }

    /// Returns the binding state of a native object.
    #[must_use]
    pub fn state(&self, id: ObjectId) -> BindingState {
        self.bindings
            .get(&id)
            .map_or(BindingState::Unbound, |record| record.state())
    }

    /// Moves a live handle out of an initialized record and marks it un-initialized.
    ///
    /// Returns `None` if there is no record, the record is not initialized, or its
    /// handle has already been released. The record itself stays in place.
    #[must_use]
    pub fn take_live_handle(&self, id: ObjectId) -> Option<ScriptHandle> {
        let mut record = self.bindings.get_mut(&id)?;
        if !record.initialized || record.handle.is_released() {
            return None;
        }
        record.initialized = false;
        Some(record.handle.take())
    }

    /// Installs `replacement` in an initialized record that still holds `expected`.
    ///
    /// The replacement is produced by the caller without any lock held, so the record
    /// may have been released, torn down or swapped in the meantime. Returns the
    /// previous handle on success and hands `replacement` back otherwise; either way
    /// the caller releases what it gets.
    #[allow(clippy::result_large_err)]
    pub fn replace_handle(
        &self,
        id: ObjectId,
        expected: RawGcHandle,
        replacement: ScriptHandle,
    ) -> std::result::Result<ScriptHandle, ScriptHandle> {
        let Some(mut record) = self.bindings.get_mut(&id) else {
            return Err(replacement);
        };
        if !record.initialized || record.handle.raw() != Some(expected) {
            return Err(replacement);
        }
        Ok(std::mem::replace(&mut record.handle, replacement))
    }

    /// Removes the record of a native object whose binding is being torn down.
    ///
    /// Called exactly once per object. Any live handle inside the returned record
    /// must be released by the caller.
    #[must_use]
    pub fn remove(&self, id: ObjectId) -> Option<BindingRecord> {
        self.bindings.remove(&id).map(|(_, record)| record)
    }

    /// Removes every record, returning the live handles for release.
    #[must_use]
    pub fn drain(&self) -> Vec<(ObjectId, ScriptHandle)> {
        let ids: Vec<ObjectId> = self.bindings.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter_map(|id| self.remove(id).map(|record| (id, record.into_handle())))
            .filter(|(_, handle)| !handle.is_released())
            .collect()
    }

    /// Returns the number of records, initialized or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the registry holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
