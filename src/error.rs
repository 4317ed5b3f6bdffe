use thiserror::Error;

use crate::runtime::ObjectId;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Lifetime notifications (disposal of either peer) are never fallible across the
/// native/managed boundary, so most of these variants surface from the setup surface:
/// binding managed peers, registering entry points, and invoking entry points by name.
///
/// # Error Categories
///
/// ## Contract Errors
/// - [`Error::NullIdentity`] - A null native identity reached a non-null parameter
/// - [`Error::HandleReleased`] - A handle wrapper was released a second time
/// - [`Error::UnsafeReferenceUnderflow`] - An implicit managed reference was dropped twice
///
/// ## Binding Errors
/// - [`Error::AlreadyBound`] - A second live managed peer was attached to one native object
/// - [`Error::UnknownObject`] - The host does not know the native identity
///
/// ## Dispatch Errors
/// - [`Error::DuplicateEntryPoint`] - An entry point name was registered twice
/// - [`Error::EntryPointNotFound`] - No entry point exists under the requested name
/// - [`Error::ArgumentMismatch`] - An entry point was invoked with the wrong arguments
///
/// # Examples
///
/// ```rust
/// use gcbridge::{dispatch::DispatchTable, Error};
///
/// let table = DispatchTable::new();
/// match table.invoke("Bridge.Object::Disposed", &[]) {
///     Err(Error::EntryPointNotFound(name)) => println!("missing: {}", name),
///     Err(e) => println!("other error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A null native identity was passed where an object is required.
    ///
    /// Native objects cannot be anonymous. The raw identity `0` is reserved as
    /// the null value of the ABI surface. Reported through the contract policy by
    /// [`LifetimeBridge::resolve`](crate::bridge::LifetimeBridge::resolve).
    #[error("Null native object identity")]
    NullIdentity,

    /// A handle wrapper was released after it had already been released.
    ///
    /// Releasing a managed handle twice would free a slot of the managed handle
    /// table that may already belong to another object.
    #[error("Managed handle has already been released")]
    HandleReleased,

    /// The implicit managed reference of an object was dropped more often than it was taken.
    ///
    /// Every bound ref-counted object carries exactly one implicit reference on behalf
    /// of its managed peer. Dropping it twice would free the object while native code
    /// still holds it.
    #[error("Implicit managed reference of {0} dropped more than once")]
    UnsafeReferenceUnderflow(ObjectId),

    /// A managed peer is already attached to this native object.
    ///
    /// At most one live managed peer may exist per native object, otherwise the
    /// implicit reference accounting breaks.
    #[error("Native object {0} already has a live managed peer")]
    AlreadyBound(ObjectId),

    /// The host object registry does not know this native identity.
    #[error("Native object {0} is unknown to the host")]
    UnknownObject(ObjectId),

    /// An entry point with the same name has already been registered.
    ///
    /// The dispatch table is left untouched when this error is returned.
    #[error("Entry point '{0}' is already registered")]
    DuplicateEntryPoint(String),

    /// No entry point is registered under this name.
    #[error("Entry point '{0}' is not registered")]
    EntryPointNotFound(String),

    /// An entry point was invoked with arguments that do not match its signature.
    ///
    /// # Fields
    ///
    /// * `entry` - The name of the entry point being invoked
    /// * `message` - Description of the mismatch
    #[error("Argument mismatch for '{entry}': {message}")]
    ArgumentMismatch {
        /// The entry point that rejected the arguments
        entry: String,
        /// What was wrong with the arguments
        message: String,
    },
}
