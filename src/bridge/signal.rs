//! One-shot subscriptions of managed awaiters to native signals.
//!
//! A managed computation suspended on a native signal is represented by a
//! [`SignalAwaiter`]. The target object's script instance registers it as a one-shot
//! listener; firing consumes the awaiter, resumes the managed computation and
//! releases the awaiter's handle.

use std::{fmt, sync::Arc};

use strum::{Display, EnumIter, FromRepr};

use crate::{
    bridge::{LifetimeBridge, ScriptHandle},
    runtime::{ManagedRuntime, ObjectId, RawGcHandle},
};

/// Status code returned across the ABI by `SignalAwaiter.Connect`.
///
/// # Examples
///
/// ```rust
/// use gcbridge::bridge::ConnectStatus;
///
/// assert_eq!(ConnectStatus::Connected.code(), 0);
/// assert_eq!(ConnectStatus::from_code(2), Some(ConnectStatus::NotConnected));
/// assert_eq!(ConnectStatus::from_code(-1), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(i32)]
pub enum ConnectStatus {
    /// The awaiter is registered and will fire once.
    Connected = 0,
    /// The target's script instance failed to register the awaiter.
    Failed = 1,
    /// The target has no script instance or no listener capability.
    NotConnected = 2,
    /// A required parameter was null, empty or unknown to the host.
    InvalidParameter = 31,
    /// The target already has a one-shot listener for this awaiter.
    AlreadyConnected = 32,
}

impl ConnectStatus {
    /// Returns the ABI value of this status.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Converts an ABI value back to a status.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_repr(code)
    }

    /// Returns `true` for [`ConnectStatus::Connected`].
    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

/// A suspended managed computation waiting for one emission of a native signal.
///
/// Owns the handle of the managed awaiter. [`fire`](Self::fire) resumes it and
/// consumes the awaiter, so it cannot fire twice. An awaiter dropped without firing
/// (its listener was disconnected, its source destroyed) releases the handle without
/// resuming.
pub struct SignalAwaiter {
    source: ObjectId,
    signal: String,
    handle: ScriptHandle,
    runtime: Arc<dyn ManagedRuntime>,
}

impl SignalAwaiter {
    /// Creates an awaiter for `signal` emitted by `source`.
    #[must_use]
    pub fn new(
        source: ObjectId,
        signal: impl Into<String>,
        handle: ScriptHandle,
        runtime: Arc<dyn ManagedRuntime>,
    ) -> Self {
        Self {
            source,
            signal: signal.into(),
            handle,
            runtime,
        }
    }

    /// Returns the object emitting the awaited signal.
    #[must_use]
    pub fn source(&self) -> ObjectId {
        self.source
    }

    /// Returns the awaited signal name.
    #[must_use]
    pub fn signal(&self) -> &str {
        &self.signal
    }

    /// Returns the managed awaiter handle.
    #[must_use]
    pub fn handle(&self) -> Option<RawGcHandle> {
        self.handle.raw()
    }

    /// Resumes the managed awaiter and discards the listener.
    pub fn fire(self) {
        if let Some(raw) = self.handle.raw() {
            self.runtime.resume_awaiter(raw, &self.signal);
        }
    }

    /// Discards the listener without resuming the awaiter.
    pub fn cancel(self) {}
}

impl Drop for SignalAwaiter {
    fn drop(&mut self) {
        if !self.handle.is_released() {
            self.handle.release(self.runtime.as_ref());
        }
    }
}

impl fmt::Debug for SignalAwaiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalAwaiter")
            .field("source", &self.source)
            .field("signal", &self.signal)
            .field("handle", &self.handle)
            .finish()
    }
}

impl LifetimeBridge {
    /// Subscribes a managed awaiter to one emission of `signal` on `source`.
    ///
    /// The target's script instance registers the listener. Ownership of the
    /// awaiter handle passes to the bridge unless the call returns
    /// [`ConnectStatus::InvalidParameter`]; on every other status the handle is
    /// released by the bridge once the listener fires or is discarded.
    ///
    /// A missing signal name is treated as the empty name, which is rejected.
    pub fn connect_signal_awaiter(
        &self,
        source: Option<ObjectId>,
        signal: Option<&str>,
        target: Option<ObjectId>,
        awaiter: Option<RawGcHandle>,
    ) -> ConnectStatus {
        let (Some(source), Some(target), Some(awaiter)) = (source, target, awaiter) else {
            return ConnectStatus::InvalidParameter;
        };
        let signal = signal.unwrap_or_default();
        if signal.is_empty() || self.host().kind(source).is_none() {
            return ConnectStatus::InvalidParameter;
        }

        let awaiter = SignalAwaiter::new(
            source,
            signal,
            ScriptHandle::strong(awaiter),
            Arc::clone(self.runtime()),
        );

        match self.host().script_instance(target) {
            Some(instance) => instance.register_awaiter(awaiter),
            None => {
                awaiter.cancel();
                ConnectStatus::NotConnected
            }
        }
    }

    /// Connects the managed event backing `signal` on the object's script instance.
    ///
    /// Returns `false` if the object has no script instance.
    pub fn connect_event_signal(&self, id: ObjectId, signal: &str) -> bool {
        match self.host().script_instance(id) {
            Some(instance) => {
                instance.connect_event_signal(signal);
                true
            }
            None => false,
        }
    }
}
