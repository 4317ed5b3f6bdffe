//! Native object identity and the host object registry interface.
//!
//! The host engine owns its objects completely: it creates them, counts their
//! references and destroys them. The bridge only observes that lifecycle through
//! the [`ObjectHost`] trait and addresses objects by [`ObjectId`].

use std::{fmt, num::NonZeroU64, sync::Arc};

use strum::Display;

use crate::runtime::ScriptInstance;

/// Identity of a native object.
///
/// Identities are non-zero. The raw value `0` is the null identity of the ABI surface
/// and never names an object, which is why the constructor is fallible.
///
/// # Examples
///
/// ```rust
/// use gcbridge::runtime::ObjectId;
///
/// assert!(ObjectId::new(0).is_none());
/// let id = ObjectId::new(0x1000).unwrap();
/// assert_eq!(id.raw(), 0x1000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(NonZeroU64);

impl ObjectId {
    /// Creates an identity from its raw ABI value, `None` for the null identity.
    #[must_use]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw ABI value of this identity.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object(0x{:x})", self.0)
    }
}

/// Lifetime policy of a native object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum ObjectKind {
    /// Destroyed explicitly by its owner. A managed peer never keeps it alive.
    Plain,
    /// Destroyed when its atomic reference count reaches zero. A managed peer
    /// holds one implicit reference.
    RefCounted,
}

/// The host engine's object registry, as seen by the bridge.
///
/// Implementations are shared between every thread that may destroy native
/// objects and the managed runtime's finalizer thread.
///
/// # Reentrancy
///
/// [`destroy`](Self::destroy) is invoked by the bridge after it has torn down the
/// object's binding. Implementations may forward their own destruction notification
/// to [`LifetimeBridge::native_destroyed`](crate::bridge::LifetimeBridge::native_destroyed);
/// it is a no-op for an object whose binding is already gone.
pub trait ObjectHost: Send + Sync {
    /// Returns the lifetime policy of the object, `None` if the identity is unknown.
    fn kind(&self, id: ObjectId) -> Option<ObjectKind>;

    /// Returns the script instance attached to the object, if any.
    fn script_instance(&self, id: ObjectId) -> Option<Arc<dyn ScriptInstance>>;

    /// Detaches the script instance from the object without destroying either.
    fn detach_script_instance(&self, id: ObjectId);

    /// Destroys the native object immediately.
    fn destroy(&self, id: ObjectId);

    /// Takes a reference on a ref-counted object and returns the new count.
    fn reference(&self, id: ObjectId) -> u32;

    /// Drops a reference on a ref-counted object.
    ///
    /// Returns `true` if the count reached zero. The host must not destroy the object
    /// on its own in that case; the caller decides.
    fn unreference(&self, id: ObjectId) -> bool;

    /// Returns the current reference count of a ref-counted object.
    fn reference_count(&self, id: ObjectId) -> u32;
}
