//! The object-lifetime bridge.
//!
//! This module keeps a native object and its managed peer consistent when each side
//! follows its own lifetime policy: reference counting on the native side, garbage
//! collection on the managed side.
//!
//! # Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | `handle` | [`ScriptHandle`], the release-once GC handle wrapper |
//! | `registry` | [`BindingRegistry`] from native identity to [`BindingRecord`] |
//! | `ledger` | [`UnsafeRefLedger`] of implicit managed references |
//! | `lifetime` | [`LifetimeBridge`], the dual-ownership protocol |
//! | `signal` | [`SignalAwaiter`] one-shot subscriptions and [`ConnectStatus`] |
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LifetimeBridge                         │
//! │   ObjectHost ◄──┐                          ┌──► ManagedRuntime
//! │                 │   ┌───────────────────┐  │                │
//! │   ScriptInstance◄──►│  BindingRegistry  │──┘                │
//! │                     │  ObjectId → record│                   │
//! │                     │  (ScriptHandle)   │                   │
//! │                     └───────────────────┘                   │
//! │                     UnsafeRefLedger                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - Each managed handle is released exactly once, whichever side tears down first.
//! - A bound ref-counted object carries exactly one implicit managed reference.
//! - At most one disposal sequence runs per object at a time.

mod handle;
mod ledger;
mod lifetime;
mod registry;
mod signal;

pub use handle::ScriptHandle;
pub use ledger::UnsafeRefLedger;
pub use lifetime::{Disposition, LifetimeBridge};
pub use registry::{BindingRecord, BindingRegistry, BindingSnapshot, BindingState};
pub use signal::{ConnectStatus, SignalAwaiter};
