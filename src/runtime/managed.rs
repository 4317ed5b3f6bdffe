//! Managed runtime handles and the managed runtime interface.
//!
//! The managed runtime keeps a table of GC handles. A strong handle keeps its
//! target reachable, a weak handle lets the garbage collector reclaim it. The bridge
//! never dereferences a handle; it only hands raw values back to the runtime.

use std::{fmt, num::NonZeroU64};

use strum::Display;

/// Raw value of a GC handle as exchanged across the ABI.
///
/// Like [`ObjectId`](crate::runtime::ObjectId), the raw value `0` is the null handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawGcHandle(NonZeroU64);

impl RawGcHandle {
    /// Creates a handle from its raw ABI value, `None` for the null handle.
    #[must_use]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw ABI value of this handle.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RawGcHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GcHandle({})", self.0)
    }
}

/// Strength of a GC handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum GcHandleKind {
    /// Keeps the managed target alive.
    Strong,
    /// Does not keep the managed target alive.
    Weak,
}

/// The managed runtime's handle table and peer operations, as seen by the bridge.
///
/// Every method may be called from any thread, including the finalizer thread.
pub trait ManagedRuntime: Send + Sync {
    /// Frees a handle slot. Called exactly once per live handle.
    fn free_handle(&self, handle: RawGcHandle);

    /// Allocates a new handle of `kind` to the target of `handle`.
    ///
    /// Returns `None` if the target has already been collected.
    fn retarget(&self, handle: RawGcHandle, kind: GcHandleKind) -> Option<RawGcHandle>;

    /// Clears the native pointer stored in the managed peer behind `handle`,
    /// if the peer has not been collected yet.
    fn clear_native_pointer(&self, handle: RawGcHandle);

    /// Resumes the suspended managed computation referenced by `awaiter`.
    fn resume_awaiter(&self, awaiter: RawGcHandle, signal: &str);
}
