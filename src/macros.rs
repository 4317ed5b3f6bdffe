#![allow(unused_macros)]

/// Helper macro for reporting a broken caller contract
///
/// Depending on the [`ContractPolicy`](crate::config::ContractPolicy) this either aborts
/// via `panic!` or records the violation with `log::error!` and lets the caller continue
/// on its no-op branch.
///
/// ```rust, ignore
///  if raw == 0 {
///      contract_violation!(self.config.contracts, "null identity passed to {}", entry);
///      return Disposition::Rejected;
///  }
/// ```
macro_rules! contract_violation {
    ($policy:expr, $($arg:tt)*) => {
        match $policy {
            crate::config::ContractPolicy::Abort => panic!($($arg)*),
            crate::config::ContractPolicy::Log => log::error!($($arg)*),
        }
    };
}

/// Helper macro for tracing a disposal decision when disposal tracing is enabled
///
/// ```rust, ignore
///  trace_disposal!(self.config, id, "released binding handle");
/// ```
macro_rules! trace_disposal {
    ($config:expr, $id:expr, $($arg:tt)*) => {
        if $config.tracing.disposals {
            log::debug!("[{}] {}", $id, format_args!($($arg)*));
        }
    };
}
