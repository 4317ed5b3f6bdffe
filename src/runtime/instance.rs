//! Script instance capability interface.
//!
//! When a native object carries a script instance, the instance, not the raw
//! binding record, owns the cross-runtime relationship of that object. The bridge
//! consults it first on every disposal and never touches the binding registry for
//! an object whose live instance handled the event.

use std::sync::atomic::{AtomicUsize, Ordering};

use strum::Display;

use crate::bridge::{ConnectStatus, SignalAwaiter};

/// Lifecycle state of a script instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum InstanceState {
    /// The instance accepts disposal notifications.
    Live,
    /// The instance is tearing itself down. Disposal notifications are not delivered
    /// to it, since they would re-enter its teardown.
    Destructing,
}

/// Outcome of a managed-side disposal of a ref-counted object, as decided by its
/// script instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum DisposalDecision {
    /// The native object must be destroyed now.
    DeleteOwner,
    /// The script instance must be detached; the native object stays alive.
    RemoveInstance,
    /// The disposal was already handled elsewhere; nothing to do.
    AlreadyHandled,
}

/// Capability set of a script instance attached to a native object.
pub trait ScriptInstance: Send + Sync {
    /// Reports whether the instance is live or mid-teardown.
    fn state(&self) -> InstanceState;

    /// The managed peer of a plain object was disposed.
    fn notify_disposed(&self);

    /// The managed peer of a ref-counted object was disposed, explicitly or by the
    /// finalizer.
    fn decide_ref_counted_disposal(&self, is_finalizer: bool) -> DisposalDecision;

    /// Connects the managed event backing `signal` to the native signal of the same name.
    fn connect_event_signal(&self, signal: &str);

    /// Registers a one-shot listener that fires `awaiter` when its signal is emitted.
    ///
    /// Instances without a listener capability keep the default, which drops the
    /// awaiter (releasing its handle) and reports [`ConnectStatus::NotConnected`].
    fn register_awaiter(&self, awaiter: SignalAwaiter) -> ConnectStatus {
        drop(awaiter);
        ConnectStatus::NotConnected
    }
}

/// Reentrancy flag for [`ScriptInstance`] implementations.
///
/// Holds [`InstanceState::Destructing`] while any [`TeardownGuard`] is alive. Guards
/// nest: a teardown started from inside another one ends with the outermost guard.
///
/// # Examples
///
/// ```rust
/// use gcbridge::runtime::{InstanceState, TeardownFlag};
///
/// let flag = TeardownFlag::new();
/// assert_eq!(flag.state(), InstanceState::Live);
/// {
///     let _guard = flag.begin();
///     assert_eq!(flag.state(), InstanceState::Destructing);
/// }
/// assert_eq!(flag.state(), InstanceState::Live);
/// ```
#[derive(Debug, Default)]
pub struct TeardownFlag(AtomicUsize);

impl TeardownFlag {
    /// Creates a flag in the [`InstanceState::Live`] state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the instance as destructing until the returned guard is dropped.
    #[must_use]
    pub fn begin(&self) -> TeardownGuard<'_> {
        self.0.fetch_add(1, Ordering::AcqRel);
        TeardownGuard(self)
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> InstanceState {
        if self.0.load(Ordering::Acquire) > 0 {
            InstanceState::Destructing
        } else {
            InstanceState::Live
        }
    }
}

/// Guard returned by [`TeardownFlag::begin`].
#[derive(Debug)]
pub struct TeardownGuard<'a>(&'a TeardownFlag);

impl Drop for TeardownGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.fetch_sub(1, Ordering::AcqRel);
    }
}
