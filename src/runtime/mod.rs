//! Interfaces of the collaborators the bridge connects to.
//!
//! The bridge does not own an object model, a garbage collector or an event system.
//! It consumes them through three traits:
//!
//! | Trait | Provided by | Used for |
//! |-------|-------------|----------|
//! | [`ObjectHost`] | native engine | identity, kind, reference counts, destruction |
//! | [`ManagedRuntime`] | managed runtime | GC handle table, awaiter resumption |
//! | [`ScriptInstance`] | native engine | authoritative disposal decisions |
//!
//! Identities ([`ObjectId`]) and handles ([`RawGcHandle`]) are non-zero, so the null
//! value of the ABI surface is rejected at the boundary rather than deep inside the
//! disposal logic.

mod instance;
mod managed;
mod object;

pub use instance::{DisposalDecision, InstanceState, ScriptInstance, TeardownFlag, TeardownGuard};
pub use managed::{GcHandleKind, ManagedRuntime, RawGcHandle};
pub use object::{ObjectHost, ObjectId, ObjectKind};
