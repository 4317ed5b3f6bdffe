//! Releasable wrapper around a managed GC handle.
//!
//! [`ScriptHandle`] owns one slot of the managed runtime's handle table. It is moved,
//! never cloned: two live wrappers for one slot would free it twice.

use std::fmt;

use crate::{
    runtime::{GcHandleKind, ManagedRuntime, RawGcHandle},
    Error, Result,
};

/// An owned, releasable reference into the managed runtime's handle table.
///
/// # Release Semantics
///
/// A handle is released at most once. [`release`](Self::release) panics on an already
/// released handle; [`try_release`](Self::try_release) reports
/// [`Error::HandleReleased`] instead. Callers check [`is_released`](Self::is_released)
/// before acting.
///
/// Dropping a handle that was never released leaks its slot; the leak is logged.
///
/// # Examples
///
/// ```rust,ignore
/// let mut handle = ScriptHandle::strong(raw);
/// assert!(!handle.is_released());
/// handle.release(runtime.as_ref());
/// assert!(handle.is_released());
/// ```
pub struct ScriptHandle {
    slot: Option<RawGcHandle>,
    kind: GcHandleKind,
}

impl ScriptHandle {
    /// Takes ownership of a runtime handle of the given kind.
    #[must_use]
    pub fn new(handle: RawGcHandle, kind: GcHandleKind) -> Self {
        Self {
            slot: Some(handle),
            kind,
        }
    }

    /// Takes ownership of a strong runtime handle.
    #[must_use]
    pub fn strong(handle: RawGcHandle) -> Self {
        Self::new(handle, GcHandleKind::Strong)
    }

    /// Takes ownership of a weak runtime handle.
    #[must_use]
    pub fn weak(handle: RawGcHandle) -> Self {
        Self::new(handle, GcHandleKind::Weak)
    }

    /// Creates a placeholder in the released state.
    #[must_use]
    pub fn released(kind: GcHandleKind) -> Self {
        Self { slot: None, kind }
    }

    /// Returns `true` once the handle has been released or moved out.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.slot.is_none()
    }

    /// Returns the raw handle while it is live.
    #[must_use]
    pub fn raw(&self) -> Option<RawGcHandle> {
        self.slot
    }

    /// Returns the strength of the handle.
    #[must_use]
    pub fn kind(&self) -> GcHandleKind {
        self.kind
    }

    /// Frees the handle slot in the managed runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandleReleased`] if the handle was already released.
    pub fn try_release(&mut self, runtime: &dyn ManagedRuntime) -> Result<()> {
        let handle = self.slot.take().ok_or(Error::HandleReleased)?;
        runtime.free_handle(handle);
        Ok(())
    }

    /// Frees the handle slot in the managed runtime.
    ///
    /// # Panics
    ///
    /// Panics if the handle was already released. A second release is a broken
    /// invariant, not a recoverable condition.
    pub fn release(&mut self, runtime: &dyn ManagedRuntime) {
        assert!(
            !self.is_released(),
            "managed handle released twice ({} handle)",
            self.kind
        );
        if let Some(handle) = self.slot.take() {
            runtime.free_handle(handle);
        }
    }

    /// Moves the live handle out, leaving a released placeholder of the same kind.
    #[must_use]
    pub fn take(&mut self) -> ScriptHandle {
        let kind = self.kind;
        std::mem::replace(self, Self::released(kind))
    }
}

impl Drop for ScriptHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.slot {
            log::warn!("{} {} dropped without release, slot leaked", self.kind, handle);
        }
    }
}

impl fmt::Debug for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptHandle")
            .field("slot", &self.slot)
            .field("kind", &self.kind)
            .finish()
    }
}
