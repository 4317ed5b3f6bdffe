//! Call dispatch table for the managed-side entry points.
//!
//! The managed runtime reaches the bridge through a small set of named entry
//! points. This module provides the table those names are registered in, the
//! argument and return types crossing it, and the registration of the bridge's own
//! entry points.
//!
//! # Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `types` | [`CallArg`], [`CallReturn`], handler aliases and [`EntryPoints`] |
//! | `entry` | [`InternalCall`], a named handler with argument checking |
//! | `table` | [`DispatchTable`] for registration and lookup |
//! | `calls` | [`register_bridge_calls`] |
//!
//! # Entry Points
//!
//! | Name | Arguments | Returns |
//! |------|-----------|---------|
//! | `Object::Disposed` | object | - |
//! | `RefCounted::Disposed` | object, is_finalizer | - |
//! | `Object::ConnectEventSignal` | object, signal | - |
//! | `SignalAwaiter::Connect` | source, signal, target, awaiter | status code |
//!
//! Each name is prefixed with the configured namespace and suffixed with the ABI
//! version, for example `Bridge.Object::Disposed@1`.

mod calls;
mod entry;
mod table;
mod types;

pub use calls::register_bridge_calls;
pub use entry::InternalCall;
pub use table::DispatchTable;
pub use types::{
    AwaiterConnectCallFn, CallArg, CallHandler, CallReturn, EntryPoints, EventSignalCallFn,
    ObjectCallFn, RefCountedCallFn,
};
