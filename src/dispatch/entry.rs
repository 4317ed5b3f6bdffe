//! A named entry point and its handler.

use std::sync::Arc;

use crate::{
    dispatch::types::{CallArg, CallHandler, CallReturn},
    Error, Result,
};

/// A named entry point callable from the managed side.
///
/// # Examples
///
/// ```rust
/// use gcbridge::dispatch::{CallArg, CallReturn, InternalCall};
///
/// let call = InternalCall::awaiter_connect("Test.Connect@1", |_, _, _, _| 2);
/// let status = call.invoke(&[
///     CallArg::Object(1),
///     CallArg::Name(Some("ready")),
///     CallArg::Object(2),
///     CallArg::Handle(3),
/// ])?;
/// assert_eq!(status, CallReturn::I32(2));
/// # Ok::<(), gcbridge::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct InternalCall {
    name: String,
    handler: CallHandler,
}

impl InternalCall {
    /// Creates an entry point from a type-erased handler.
    #[must_use]
    pub fn new(name: impl Into<String>, handler: CallHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Creates an `(object)` entry point.
    #[must_use]
    pub fn object<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        Self::new(name, CallHandler::Object(Arc::new(f)))
    }

    /// Creates an `(object, bool)` entry point.
    #[must_use]
    pub fn ref_counted<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(u64, bool) + Send + Sync + 'static,
    {
        Self::new(name, CallHandler::RefCounted(Arc::new(f)))
    }

    /// Creates an `(object, name)` entry point.
    #[must_use]
    pub fn event_signal<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(u64, Option<&str>) + Send + Sync + 'static,
    {
        Self::new(name, CallHandler::EventSignal(Arc::new(f)))
    }

    /// Creates an `(object, name, object, handle) -> i32` entry point.
    #[must_use]
    pub fn awaiter_connect<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(u64, Option<&str>, u64, u64) -> i32 + Send + Sync + 'static,
    {
        Self::new(name, CallHandler::AwaiterConnect(Arc::new(f)))
    }

    /// Returns the registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &CallHandler {
        &self.handler
    }

    /// Calls the handler after checking `args` against its calling convention.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentMismatch`] if the number or types of `args` do not
    /// match. The handler is not called in that case.
    pub fn invoke(&self, args: &[CallArg<'_>]) -> Result<CallReturn> {
        match (&self.handler, args) {
            (CallHandler::Object(f), [CallArg::Object(id)]) => {
                f(*id);
                Ok(CallReturn::Void)
            }
            (CallHandler::RefCounted(f), [CallArg::Object(id), CallArg::Bool(is_finalizer)]) => {
                f(*id, *is_finalizer);
                Ok(CallReturn::Void)
            }
            (CallHandler::EventSignal(f), [CallArg::Object(id), CallArg::Name(signal)]) => {
                f(*id, *signal);
                Ok(CallReturn::Void)
            }
            (
                CallHandler::AwaiterConnect(f),
                [CallArg::Object(source), CallArg::Name(signal), CallArg::Object(target), CallArg::Handle(awaiter)],
            ) => Ok(CallReturn::I32(f(*source, *signal, *target, *awaiter))),
            (handler, _) => {
                let got: Vec<&str> = args.iter().map(CallArg::type_name).collect();
                Err(Error::ArgumentMismatch {
                    entry: self.name.clone(),
                    message: format!(
                        "expected {}, got ({})",
                        handler.signature(),
                        got.join(", ")
                    ),
                })
            }
        }
    }
}
