//! # gcbridge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the gcbridge library. Import this module to get quick access to everything an
//! embedder needs to wire a native host and a managed runtime together.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all gcbridge operations
pub use crate::Error;

/// The result type used throughout gcbridge
pub use crate::Result;

/// Bridge configuration
pub use crate::config::{BridgeConfig, ContractPolicy, TracingConfig};

// ================================================================================================
// Collaborator Interfaces
// ================================================================================================

/// Traits implemented by the embedder
pub use crate::runtime::{ManagedRuntime, ObjectHost, ScriptInstance};

/// Identities, handles and script instance answers
pub use crate::runtime::{
    DisposalDecision, GcHandleKind, InstanceState, ObjectId, ObjectKind, RawGcHandle,
    TeardownFlag,
};

// ================================================================================================
// Lifetime Bridge
// ================================================================================================

/// The bridge and its outcome type
pub use crate::bridge::{Disposition, LifetimeBridge};

/// Managed peer bindings
pub use crate::bridge::{BindingState, ScriptHandle};

/// Signal awaiters
pub use crate::bridge::{ConnectStatus, SignalAwaiter};

// ================================================================================================
// Dispatch
// ================================================================================================

/// Entry point table and registration
pub use crate::dispatch::{
    register_bridge_calls, CallArg, CallReturn, DispatchTable, EntryPoints, InternalCall,
};
