//! Bridge configuration types.
//!
//! This module provides the configuration consumed by the
//! [`LifetimeBridge`](crate::bridge::LifetimeBridge) and by the dispatch
//! registration step.
//!
//! # Overview
//!
//! - [`BridgeConfig`] - Top-level configuration container
//! - [`ContractPolicy`] - What happens when a caller breaks a contract
//! - [`TracingConfig`] - Logging options for lifetime events
//!
//! # Configuration Presets
//!
//! - [`BridgeConfig::debug()`] - Aborts on contract violations, tracks unsafe references
//! - [`BridgeConfig::release()`] - Logs contract violations, skips unsafe reference tracking
//!
//! The [`Default`] configuration picks one of the two based on `debug_assertions`.
//!
//! # Example
//!
//! ```rust
//! use gcbridge::config::{BridgeConfig, ContractPolicy};
//!
//! let config = BridgeConfig::release()
//!     .with_namespace("Engine")
//!     .with_contracts(ContractPolicy::Abort);
//!
//! assert_eq!(config.namespace, "Engine");
//! assert!(!config.track_unsafe_references);
//! ```

use strum::{Display, EnumString};

/// Default namespace under which the bridge entry points are exposed.
pub const DEFAULT_NAMESPACE: &str = "Bridge";

/// Version of the entry point ABI exposed by this crate.
///
/// Bump whenever the name or calling convention of an entry point changes.
pub const ABI_VERSION: u32 = 1;

/// How broken caller contracts are reported.
///
/// Contract violations are programmer errors: a null identity, a second release of a
/// managed handle, a second drop of the implicit managed reference, or two threads
/// disposing the same object concurrently. None of them are recoverable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum ContractPolicy {
    /// Abort by panicking. The default in debug builds.
    Abort,
    /// Log the violation with `log::error!` and take the no-op branch.
    Log,
}

/// Logging options for lifetime events.
///
/// All output goes through the `log` facade.
#[derive(Clone, Debug, Default)]
pub struct TracingConfig {
    /// Log every disposal decision at `debug` level.
    pub disposals: bool,

    /// Log strong/weak handle promotions at `trace` level.
    pub handle_swaps: bool,
}

/// Top-level bridge configuration.
///
/// # Presets
///
/// - [`debug()`](Self::debug) - Strict contracts and unsafe reference tracking
/// - [`release()`](Self::release) - Logged contracts without reference tracking
///
/// # Example
///
/// ```rust
/// use gcbridge::config::BridgeConfig;
///
/// let config = BridgeConfig {
///     track_unsafe_references: true,
///     ..BridgeConfig::release()
/// };
/// assert!(config.track_unsafe_references);
/// ```
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Policy applied to contract violations.
    pub contracts: ContractPolicy,

    /// Whether the implicit managed references are recorded in the
    /// [`UnsafeRefLedger`](crate::bridge::UnsafeRefLedger).
    ///
    /// When enabled, dropping the implicit reference of an object twice is
    /// detected and reported as a contract violation.
    pub track_unsafe_references: bool,

    /// Namespace prefix of the registered entry point names.
    pub namespace: String,

    /// ABI version appended to the registered entry point names.
    pub abi_version: u32,

    /// Logging options.
    pub tracing: TracingConfig,
}

impl BridgeConfig {
    /// Strict preset used by debug builds.
    ///
    /// Contract violations panic, implicit references are tracked and disposal
    /// decisions are logged.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            contracts: ContractPolicy::Abort,
            track_unsafe_references: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            abi_version: ABI_VERSION,
            tracing: TracingConfig {
                disposals: true,
                handle_swaps: false,
            },
        }
    }

    /// Lenient preset used by release builds.
    #[must_use]
    pub fn release() -> Self {
        Self {
            contracts: ContractPolicy::Log,
            track_unsafe_references: false,
            namespace: DEFAULT_NAMESPACE.to_string(),
            abi_version: ABI_VERSION,
            tracing: TracingConfig::default(),
        }
    }

    /// Sets the contract policy.
    #[must_use]
    pub fn with_contracts(mut self, contracts: ContractPolicy) -> Self {
        self.contracts = contracts;
        self
    }

    /// Sets the entry point namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Enables or disables implicit reference tracking.
    #[must_use]
    pub fn with_unsafe_reference_tracking(mut self, enabled: bool) -> Self {
        self.track_unsafe_references = enabled;
        self
    }

    /// Sets the logging options.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::debug()
        } else {
            Self::release()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_presets() {
        let debug = BridgeConfig::debug();
        assert_eq!(debug.contracts, ContractPolicy::Abort);
        assert!(debug.track_unsafe_references);
        assert!(debug.tracing.disposals);

        let release = BridgeConfig::release();
        assert_eq!(release.contracts, ContractPolicy::Log);
        assert!(!release.track_unsafe_references);
        assert_eq!(release.abi_version, ABI_VERSION);
    }

    #[test]
    fn test_builder() {
        let config = BridgeConfig::release()
            .with_namespace("Engine")
            .with_unsafe_reference_tracking(true)
            .with_tracing(TracingConfig {
                disposals: false,
                handle_swaps: true,
            });

        assert_eq!(config.namespace, "Engine");
        assert!(config.track_unsafe_references);
        assert!(config.tracing.handle_swaps);
    }

    #[test]
    fn test_contract_policy_parse() {
        assert_eq!(ContractPolicy::from_str("Log").unwrap(), ContractPolicy::Log);
        assert_eq!(ContractPolicy::Abort.to_string(), "Abort");
        assert!(ContractPolicy::from_str("Ignore").is_err());
    }
}
