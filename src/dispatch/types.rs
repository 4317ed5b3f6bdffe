//! Argument, return and handler types of the call dispatch table.

use std::{fmt, sync::Arc};

use crate::config::BridgeConfig;

/// One argument passed to an entry point, as it arrives from the managed side.
///
/// Object identities and handles travel as raw integers; `0` is the null value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallArg<'a> {
    /// Raw native object identity.
    Object(u64),
    /// A boolean flag.
    Bool(bool),
    /// A possibly-null name.
    Name(Option<&'a str>),
    /// Raw managed GC handle.
    Handle(u64),
}

impl CallArg<'_> {
    /// Short type name used in argument mismatch messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            CallArg::Object(_) => "object",
            CallArg::Bool(_) => "bool",
            CallArg::Name(_) => "name",
            CallArg::Handle(_) => "handle",
        }
    }
}

/// Value returned by an entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallReturn {
    /// The entry point returns nothing.
    Void,
    /// A status code.
    I32(i32),
}

/// Handler of `Object::Disposed`.
pub type ObjectCallFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Handler of `RefCounted::Disposed`.
pub type RefCountedCallFn = Arc<dyn Fn(u64, bool) + Send + Sync>;

/// Handler of `Object::ConnectEventSignal`.
pub type EventSignalCallFn = Arc<dyn Fn(u64, Option<&str>) + Send + Sync>;

/// Handler of `SignalAwaiter::Connect`; returns a
/// [`ConnectStatus`](crate::bridge::ConnectStatus) code.
pub type AwaiterConnectCallFn = Arc<dyn Fn(u64, Option<&str>, u64, u64) -> i32 + Send + Sync>;

/// Type-erased handler, one variant per calling convention.
#[derive(Clone)]
pub enum CallHandler {
    /// `(object)`
    Object(ObjectCallFn),
    /// `(object, bool)`
    RefCounted(RefCountedCallFn),
    /// `(object, name)`
    EventSignal(EventSignalCallFn),
    /// `(object, name, object, handle) -> i32`
    AwaiterConnect(AwaiterConnectCallFn),
}

impl CallHandler {
    /// Returns the parameter list of the calling convention.
    #[must_use]
    pub fn signature(&self) -> &'static str {
        match self {
            CallHandler::Object(_) => "(object)",
            CallHandler::RefCounted(_) => "(object, bool)",
            CallHandler::EventSignal(_) => "(object, name)",
            CallHandler::AwaiterConnect(_) => "(object, name, object, handle)",
        }
    }
}

impl fmt::Debug for CallHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallHandler{}", self.signature())
    }
}

/// The versioned names under which the bridge entry points are registered.
///
/// Names have the form `{namespace}.{Type}::{Method}@{abi_version}`.
///
/// # Examples
///
/// ```rust
/// use gcbridge::{config::BridgeConfig, dispatch::EntryPoints};
///
/// let names = EntryPoints::new(&BridgeConfig::release().with_namespace("Engine"));
/// assert_eq!(names.object_disposed, "Engine.Object::Disposed@1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoints {
    /// Managed peer of a plain object disposed.
    pub object_disposed: String,
    /// Managed peer of a ref-counted object disposed.
    pub ref_counted_disposed: String,
    /// Managed event connected to a native signal.
    pub connect_event_signal: String,
    /// Managed awaiter subscribed to a native signal.
    pub awaiter_connect: String,
}

impl EntryPoints {
    /// Builds the entry point names from the namespace and ABI version of `config`.
    #[must_use]
    pub fn new(config: &BridgeConfig) -> Self {
        let name = |method: &str| format!("{}.{}@{}", config.namespace, method, config.abi_version);
        Self {
            object_disposed: name("Object::Disposed"),
            ref_counted_disposed: name("RefCounted::Disposed"),
            connect_event_signal: name("Object::ConnectEventSignal"),
            awaiter_connect: name("SignalAwaiter::Connect"),
        }
    }

    /// Returns all four names.
    #[must_use]
    pub fn all(&self) -> [&str; 4] {
        [
            self.object_disposed.as_str(),
            self.ref_counted_disposed.as_str(),
            self.connect_event_signal.as_str(),
            self.awaiter_connect.as_str(),
        ]
    }
}
