// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # gcbridge
//!
//! Object-lifetime bridge between a reference-counted native object model and a
//! garbage-collected managed runtime.
//!
//! A native object may have a managed peer. The native side destroys objects when
//! their reference count reaches zero; the managed side finalizes peers whenever
//! its collector decides to. `gcbridge` keeps the two consistent: it decides which
//! side owns destruction for every disposal event and guarantees that each managed
//! GC handle is released exactly once, whichever side tears down first.
//!
//! ## Features
//!
//! - **Binding registry** - Concurrent map from native identity to the managed peer's handle
//! - **Dual ownership** - Script instances take precedence; the registry is the fallback
//! - **Implicit references** - The managed peer of a ref-counted object holds one
//!   reference, dropped through the unsafe decrement and tracked in a ledger
//! - **Handle promotion** - Strong and weak handles follow the native reference count
//! - **Signal awaiters** - One-shot subscriptions of managed awaiters to native signals
//! - **Dispatch table** - Named, versioned entry points for the managed side
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gcbridge::prelude::*;
//!
//! let bridge = Arc::new(LifetimeBridge::new(host, runtime, BridgeConfig::default()));
//!
//! let mut table = DispatchTable::new();
//! register_bridge_calls(&mut table, &bridge)?;
//!
//! // First access from managed code creates the peer.
//! bridge.bind_managed_peer(id, ScriptHandle::strong(raw))?;
//!
//! // The managed runtime reports disposal through the table.
//! let names = EntryPoints::new(bridge.config());
//! table.invoke(&names.ref_counted_disposed, &[CallArg::Object(id.raw()), CallArg::Bool(false)])?;
//! # Ok::<(), gcbridge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`runtime`] - Traits of the native host, the managed runtime and script instances
//! - [`bridge`] - The lifetime bridge, binding registry, handle wrapper and awaiters
//! - [`dispatch`] - Entry point table exposed to the managed side
//! - [`config`] - Contract policy, namespaces and tracing options
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Lifetime notifications never fail across the boundary: every branch, including
//! "nothing to do", is a [`bridge::Disposition`]. Broken caller contracts are
//! reported according to [`config::ContractPolicy`]. Setup and dispatch operations
//! return [`Result`].
//!
//! ## Logging
//!
//! All diagnostics go through the [`log`](https://docs.rs/log) facade. Enable
//! [`config::TracingConfig`] to see every disposal decision and handle promotion.

#[macro_use]
pub(crate) mod macros;

pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use gcbridge::prelude::*;
///
/// let config = BridgeConfig::release().with_contracts(ContractPolicy::Log);
/// let names = EntryPoints::new(&config);
/// assert!(names.awaiter_connect.starts_with("Bridge."));
/// ```
pub mod prelude;

/// Bridge configuration: contract policy, entry point naming and tracing.
pub mod config;

/// Interfaces of the native host, the managed runtime and script instances.
pub mod runtime;

/// The object-lifetime bridge.
///
/// # Key Types
///
/// - [`bridge::LifetimeBridge`] - Routes every lifetime event and owns the registry
/// - [`bridge::BindingRegistry`] - Native identity to managed peer handle
/// - [`bridge::ScriptHandle`] - Release-once wrapper of a managed GC handle
/// - [`bridge::SignalAwaiter`] - One-shot awaiter subscription
pub mod bridge;

/// Named entry points exposed to the managed runtime.
pub mod dispatch;

/// `gcbridge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `gcbridge` Error type
///
/// # Examples
///
/// ```rust
/// use gcbridge::{dispatch::DispatchTable, Error};
///
/// let table = DispatchTable::new();
/// match table.invoke("Bridge.Object::Disposed@1", &[]) {
///     Err(Error::EntryPointNotFound(name)) => println!("not registered: {}", name),
///     Err(e) => println!("Error: {}", e),
///     Ok(_) => println!("invoked"),
/// }
/// ```
pub use error::Error;
