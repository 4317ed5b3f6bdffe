//! Dual-ownership protocol for native objects with managed peers.
//!
//! [`LifetimeBridge`] decides, for every disposal event, which side owns destruction
//! of a native object whose managed peer is alive, and releases the peer's handle
//! exactly once.
//!
//! # Event Directions
//!
//! ```text
//!   managed runtime                         native host
//!   ───────────────                         ───────────
//!   Object.Disposed ──────► object_disposed
//!   RefCounted.Disposed ──► ref_counted_disposed ──► ObjectHost::destroy
//!                           reference_added    ◄──── reference taken
//!                           reference_dropped  ◄──── reference dropped
//!                           native_destroyed   ◄──── object destroyed
//! ```
//!
//! # Ownership Precedence
//!
//! A live [`ScriptInstance`](crate::runtime::ScriptInstance) attached to the object is
//! the authoritative owner of the cross-runtime relationship. When one is present the
//! bridge only relays the event to it and never touches the binding registry. The
//! registry path is the fallback for objects that never received a script instance.
//!
//! # Serialization
//!
//! At most one disposal sequence runs per object. A sequence re-entered on the same
//! thread (a script instance tearing down, a host forwarding its destructor) is
//! skipped with [`Disposition::Reentrant`]. A managed disposal entered from a second
//! thread while one is in flight is a contract violation.
//!
//! A native destruction is never dropped. If it arrives while a sequence is in flight
//! it is recorded on that sequence, which tears the binding down before it ends.

use std::{
    fmt,
    sync::Arc,
    thread::{self, ThreadId},
};

use dashmap::{mapref::entry::Entry, DashMap};
use strum::Display;

use crate::{
    bridge::{BindingRegistry, BindingState, ScriptHandle, UnsafeRefLedger},
    config::BridgeConfig,
    runtime::{
        DisposalDecision, GcHandleKind, InstanceState, ManagedRuntime, ObjectHost, ObjectId,
        ObjectKind, RawGcHandle,
    },
    Error, Result,
};

/// Branch taken by a lifetime event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Disposition {
    /// The live script instance was notified and detached.
    InstanceNotified,
    /// The script instance is mid-teardown; nothing was delivered to it.
    InstanceDestructing,
    /// The script instance decided the native object must die; it was destroyed.
    OwnerDeleted,
    /// The script instance decided to detach itself; the native object lives on.
    InstanceRemoved,
    /// The script instance reported the disposal as handled elsewhere.
    AlreadyHandled,
    /// The implicit managed reference was the last one; the native object was destroyed.
    Destroyed,
    /// The managed peer's handle was released.
    HandleReleased,
    /// No live managed peer was attached; nothing to do.
    NoPeer,
    /// A disposal sequence for this object is already running on this thread.
    Reentrant,
    /// A disposal sequence for this object is running on another thread; the native
    /// destruction was recorded and the binding is torn down when that sequence ends.
    Deferred,
    /// The event broke a caller contract and was dropped.
    Rejected,
}

/// The lifetime bridge between a native host and a managed runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let bridge = LifetimeBridge::new(host, runtime, BridgeConfig::default());
/// bridge.bind_managed_peer(id, ScriptHandle::strong(raw))?;
///
/// // The managed peer is disposed explicitly:
/// match bridge.ref_counted_disposed(id, false) {
///     Disposition::Destroyed => println!("managed peer was the last owner"),
///     Disposition::HandleReleased => println!("native side still holds the object"),
///     other => println!("{}", other),
/// }
/// ```
pub struct LifetimeBridge {
    host: Arc<dyn ObjectHost>,
    runtime: Arc<dyn ManagedRuntime>,
    registry: BindingRegistry,
    ledger: UnsafeRefLedger,
    in_flight: DashMap<ObjectId, InFlight>,
    config: BridgeConfig,
}

/// A running disposal sequence.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    owner: ThreadId,
    native_destroyed: bool,
}

/// Marks a disposal sequence as running until dropped.
///
/// Native destructions recorded while the sequence ran are applied before the
/// marker goes away.
struct DisposalGuard<'a> {
    bridge: &'a LifetimeBridge,
    id: ObjectId,
}

impl Drop for DisposalGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.bridge.in_flight;
        while in_flight
            .remove_if(&self.id, |_, flight| !flight.native_destroyed)
            .is_none()
        {
            match in_flight.get_mut(&self.id) {
                Some(mut flight) => flight.native_destroyed = false,
                None => break,
            }
            trace_disposal!(self.bridge.config, self.id, "applying deferred native destruction");
            self.bridge.teardown_binding(self.id);
        }
    }
}

impl LifetimeBridge {
    /// Creates a bridge between `host` and `runtime`.
    #[must_use]
    pub fn new(
        host: Arc<dyn ObjectHost>,
        runtime: Arc<dyn ManagedRuntime>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            host,
            runtime,
            registry: BindingRegistry::new(),
            ledger: UnsafeRefLedger::new(),
            in_flight: DashMap::new(),
            config,
        }
    }

    /// Returns the native host.
    #[must_use]
    pub fn host(&self) -> &Arc<dyn ObjectHost> {
        &self.host
    }

    /// Returns the managed runtime.
    #[must_use]
    pub fn runtime(&self) -> &Arc<dyn ManagedRuntime> {
        &self.runtime
    }

    /// Returns the binding registry.
    #[must_use]
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Returns the implicit reference ledger.
    #[must_use]
    pub fn ledger(&self) -> &UnsafeRefLedger {
        &self.ledger
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Converts a raw identity received at the ABI surface.
    ///
    /// The null identity is a contract violation reported against `entry`.
    pub fn resolve(&self, raw: u64, entry: &str) -> Option<ObjectId> {
        let id = ObjectId::new(raw);
        if id.is_none() {
            contract_violation!(self.config.contracts, "{}: {}", entry, Error::NullIdentity);
        }
        id
    }

    /// Attaches a managed peer to a native object on first cross-runtime access.
    ///
    /// For a ref-counted object the peer takes the implicit managed reference.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownObject`] if the host does not know `id`
    /// - [`Error::AlreadyBound`] if a live peer is already attached; the rejected
    ///   handle is released
    pub fn bind_managed_peer(&self, id: ObjectId, handle: ScriptHandle) -> Result<()> {
        let Some(kind) = self.host.kind(id) else {
            self.release(handle, id);
            return Err(Error::UnknownObject(id));
        };

        if let Err(rejected) = self.registry.bind(id, kind, handle) {
            self.release(rejected, id);
            return Err(Error::AlreadyBound(id));
        }

        if kind == ObjectKind::RefCounted {
            self.host.reference(id);
            if self.config.track_unsafe_references {
                self.ledger.post_unsafe_reference(id);
            }
        }
        Ok(())
    }

    /// Returns the binding state of a native object.
    #[must_use]
    pub fn state(&self, id: ObjectId) -> BindingState {
        self.registry.state(id)
    }

    /// The managed peer of a plain object was disposed.
    pub fn object_disposed(&self, id: ObjectId) -> Disposition {
        let _guard = match self.enter(id) {
            Ok(guard) => guard,
            Err(disposition) => return disposition,
        };

        if let Some(instance) = self.host.script_instance(id) {
            return match instance.state() {
                InstanceState::Live => {
                    instance.notify_disposed();
                    self.host.detach_script_instance(id);
                    trace_disposal!(self.config, id, "script instance notified and detached");
                    Disposition::InstanceNotified
                }
                InstanceState::Destructing => {
                    trace_disposal!(self.config, id, "script instance mid-teardown, skipped");
                    Disposition::InstanceDestructing
                }
            };
        }

        self.release_binding_handle(id)
    }

    /// The managed peer of a ref-counted object was disposed, explicitly or by the
    /// finalizer.
    ///
    /// Without a script instance this performs the unsafe decrement: the implicit
    /// managed reference is dropped through the host's plain `unreference`, which
    /// does not re-enter this notification.
    pub fn ref_counted_disposed(&self, id: ObjectId, is_finalizer: bool) -> Disposition {
        let _guard = match self.enter(id) {
            Ok(guard) => guard,
            Err(disposition) => return disposition,
        };

        if self.host.kind(id) != Some(ObjectKind::RefCounted) {
            contract_violation!(
                self.config.contracts,
                "RefCounted.Disposed called for {} which is not ref-counted",
                id
            );
            return Disposition::Rejected;
        }

        if let Some(instance) = self.host.script_instance(id) {
            if instance.state() == InstanceState::Destructing {
                trace_disposal!(self.config, id, "script instance mid-teardown, skipped");
                return Disposition::InstanceDestructing;
            }

            let decision = instance.decide_ref_counted_disposal(is_finalizer);
            trace_disposal!(
                self.config,
                id,
                "script instance decided {} (finalizer: {})",
                decision,
                is_finalizer
            );
            return match decision {
                DisposalDecision::DeleteOwner => {
                    self.destroy_native(id);
                    Disposition::OwnerDeleted
                }
                DisposalDecision::RemoveInstance => {
                    self.host.detach_script_instance(id);
                    Disposition::InstanceRemoved
                }
                DisposalDecision::AlreadyHandled => Disposition::AlreadyHandled,
            };
        }

        if self.config.track_unsafe_references {
            if let Err(error) = self.ledger.pre_unsafe_unreference(id) {
                contract_violation!(self.config.contracts, "{}", error);
                return Disposition::Rejected;
            }
        }

        if self.host.unreference(id) {
            trace_disposal!(self.config, id, "implicit reference was the last one");
            self.destroy_native(id);
            return Disposition::Destroyed;
        }

        self.release_binding_handle(id)
    }

    /// The host took a reference on a ref-counted object.
    ///
    /// If native code references the object again after the managed peer was its
    /// only owner, the peer's weak handle is replaced by a strong one so the garbage
    /// collector cannot reclaim the peer while native code uses the object.
    pub fn reference_added(&self, id: ObjectId) {
        // The managed peer counts as one reference.
        if self.host.reference_count(id) > 1 {
            self.swap_handle(id, GcHandleKind::Weak, GcHandleKind::Strong);
        }
    }

    /// The host dropped a reference on a ref-counted object.
    ///
    /// If only the managed peer still references the object, its strong handle is
    /// replaced by a weak one: the peer becomes responsible for the object, and its
    /// finalizer drives [`ref_counted_disposed`](Self::ref_counted_disposed) once the
    /// garbage collector reclaims it.
    ///
    /// Returns `true` if the object has no references left and may be destroyed.
    pub fn reference_dropped(&self, id: ObjectId) -> bool {
        let count = self.host.reference_count(id);
        if count == 1 {
            self.swap_handle(id, GcHandleKind::Strong, GcHandleKind::Weak);
        }
        count == 0
    }

    /// The host destroyed a native object.
    ///
    /// Tears the binding down: the record leaves the registry, the managed peer
    /// forgets its native pointer and a still-live handle is released.
    ///
    /// While another disposal sequence is in flight for `id` the teardown is recorded
    /// on it and runs when it ends, reported as [`Disposition::Reentrant`] on the same
    /// thread and [`Disposition::Deferred`] from another.
    pub fn native_destroyed(&self, id: ObjectId) -> Disposition {
        let _guard = match self.enter_native(id) {
            Ok(guard) => guard,
            Err(disposition) => return disposition,
        };
        self.teardown_binding(id)
    }

    /// Releases every remaining managed handle. Called at runtime shutdown.
    pub fn shutdown(&self) {
        for (id, handle) in self.registry.drain() {
            if let Some(raw) = handle.raw() {
                self.runtime.clear_native_pointer(raw);
            }
            self.release(handle, id);
        }
    }

    fn enter(&self, id: ObjectId) -> std::result::Result<DisposalGuard<'_>, Disposition> {
        self.begin_sequence(id, false)
    }

    fn enter_native(&self, id: ObjectId) -> std::result::Result<DisposalGuard<'_>, Disposition> {
        self.begin_sequence(id, true)
    }

    fn begin_sequence(
        &self,
        id: ObjectId,
        native: bool,
    ) -> std::result::Result<DisposalGuard<'_>, Disposition> {
        let current = thread::current().id();
        let owner = match self.in_flight.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(InFlight {
                    owner: current,
                    native_destroyed: false,
                });
                return Ok(DisposalGuard { bridge: self, id });
            }
            Entry::Occupied(mut entry) => {
                let flight = entry.get_mut();
                flight.native_destroyed |= native;
                flight.owner
            }
        };

        if owner == current {
            trace_disposal!(self.config, id, "disposal re-entered, skipped");
            return Err(Disposition::Reentrant);
        }
        if native {
            trace_disposal!(self.config, id, "native destruction deferred to {:?}", owner);
            return Err(Disposition::Deferred);
        }

        contract_violation!(
            self.config.contracts,
            "concurrent disposal of {} from {:?} while {:?} is disposing it",
            id,
            current,
            owner
        );
        Err(Disposition::Rejected)
    }

    fn release_binding_handle(&self, id: ObjectId) -> Disposition {
        match self.registry.take_live_handle(id) {
            Some(handle) => {
                self.release(handle, id);
                trace_disposal!(self.config, id, "binding handle released");
                Disposition::HandleReleased
            }
            None => Disposition::NoPeer,
        }
    }

    fn destroy_native(&self, id: ObjectId) {
        self.teardown_binding(id);
        self.host.destroy(id);
    }

    fn teardown_binding(&self, id: ObjectId) -> Disposition {
        self.ledger.forget(id);

        let Some(record) = self.registry.remove(id) else {
            return Disposition::NoPeer;
        };
        let handle = record.into_handle();
        let Some(raw) = handle.raw() else {
            return Disposition::NoPeer;
        };

        self.runtime.clear_native_pointer(raw);
        self.release(handle, id);
        trace_disposal!(self.config, id, "binding torn down");
        Disposition::HandleReleased
    }

    fn swap_handle(&self, id: ObjectId, from: GcHandleKind, to: GcHandleKind) {
        let Some(current) = self.live_handle_of_kind(id, from) else {
            return;
        };
        // No registry lock is held while the runtime allocates.
        let Some(new) = self.runtime.retarget(current, to) else {
            return;
        };

        match self
            .registry
            .replace_handle(id, current, ScriptHandle::new(new, to))
        {
            Ok(previous) => {
                if self.config.tracing.handle_swaps {
                    log::trace!("[{}] managed peer handle {} -> {}", id, from, to);
                }
                self.release(previous, id);
            }
            Err(stale) => {
                trace_disposal!(self.config, id, "binding changed during handle swap");
                self.release(stale, id);
            }
        }
    }

    fn live_handle_of_kind(&self, id: ObjectId, kind: GcHandleKind) -> Option<RawGcHandle> {
        self.registry
            .lookup(id)
            .filter(|snapshot| snapshot.initialized && snapshot.handle_kind == kind)
            .and_then(|snapshot| snapshot.handle)
    }

    fn release(&self, mut handle: ScriptHandle, id: ObjectId) {
        if let Err(error) = handle.try_release(self.runtime.as_ref()) {
            contract_violation!(self.config.contracts, "{}: {}", id, error);
        }
    }
}

impl fmt::Debug for LifetimeBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeBridge")
            .field("bindings", &self.registry.len())
            .field("implicit_references", &self.ledger.len())
            .field("config", &self.config)
            .finish()
    }
}
