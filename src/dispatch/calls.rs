//! Registration of the bridge entry points.

use std::sync::Arc;

use crate::{
    bridge::LifetimeBridge,
    dispatch::{entry::InternalCall, table::DispatchTable, types::EntryPoints},
    runtime::{ObjectId, RawGcHandle},
    Error, Result,
};

/// Exposes the bridge's four entry points in `table`.
///
/// Names come from [`EntryPoints::new`] applied to the bridge configuration. Every
/// handler holds a clone of `bridge`.
///
/// Registration is idempotent: if all four names are already present the call is
/// logged and returns `Ok(false)`.
///
/// # Errors
///
/// Returns [`Error::DuplicateEntryPoint`] if only some of the names are taken,
/// which means another component registered under the bridge's namespace. Nothing
/// is registered in that case.
///
/// # Examples
///
/// ```rust,ignore
/// let mut table = DispatchTable::new();
/// assert!(register_bridge_calls(&mut table, &bridge)?);
/// assert!(!register_bridge_calls(&mut table, &bridge)?);
/// ```
pub fn register_bridge_calls(
    table: &mut DispatchTable,
    bridge: &Arc<LifetimeBridge>,
) -> Result<bool> {
    let names = EntryPoints::new(bridge.config());

    let present: Vec<&str> = names
        .all()
        .into_iter()
        .filter(|name| table.contains(name))
        .collect();
    if present.len() == names.all().len() {
        log::warn!(
            "bridge entry points under '{}' are already registered",
            bridge.config().namespace
        );
        return Ok(false);
    }
    if let Some(name) = present.first() {
        return Err(Error::DuplicateEntryPoint((*name).to_string()));
    }

    for call in bridge_calls(&names, bridge) {
        table.register(call)?;
    }
    log::debug!(
        "registered {} bridge entry points under '{}'",
        names.all().len(),
        bridge.config().namespace
    );
    Ok(true)
}

fn bridge_calls(names: &EntryPoints, bridge: &Arc<LifetimeBridge>) -> [InternalCall; 4] {
    let object_disposed = {
        let bridge = Arc::clone(bridge);
        let entry = names.object_disposed.clone();
        InternalCall::object(names.object_disposed.clone(), move |raw| {
            if let Some(id) = bridge.resolve(raw, &entry) {
                bridge.object_disposed(id);
            }
        })
    };

    let ref_counted_disposed = {
        let bridge = Arc::clone(bridge);
        let entry = names.ref_counted_disposed.clone();
        InternalCall::ref_counted(names.ref_counted_disposed.clone(), move |raw, is_finalizer| {
            if let Some(id) = bridge.resolve(raw, &entry) {
                bridge.ref_counted_disposed(id, is_finalizer);
            }
        })
    };

    let connect_event_signal = {
        let bridge = Arc::clone(bridge);
        let entry = names.connect_event_signal.clone();
        InternalCall::event_signal(names.connect_event_signal.clone(), move |raw, signal| {
            let Some(id) = bridge.resolve(raw, &entry) else {
                return;
            };
            match signal {
                Some(signal) if !signal.is_empty() => {
                    bridge.connect_event_signal(id, signal);
                }
                _ => log::warn!("{} called for {} without a signal name", entry, id),
            }
        })
    };

    let awaiter_connect = {
        let bridge = Arc::clone(bridge);
        InternalCall::awaiter_connect(
            names.awaiter_connect.clone(),
            move |source, signal, target, awaiter| {
                bridge
                    .connect_signal_awaiter(
                        ObjectId::new(source),
                        signal,
                        ObjectId::new(target),
                        RawGcHandle::new(awaiter),
                    )
                    .code()
            },
        )
    };

    [
        object_disposed,
        ref_counted_disposed,
        connect_event_signal,
        awaiter_connect,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bridge::{BindingState, ConnectStatus, ScriptHandle},
        config::{BridgeConfig, ContractPolicy},
        dispatch::{CallArg, CallReturn},
        runtime::{GcHandleKind, ObjectHost, ObjectKind},
        test::{create_test_bridge, TestInstance},
    };

    #[test]
    fn test_register_is_idempotent() {
        let (_, _, bridge) = create_test_bridge(BridgeConfig::debug());
        let mut table = DispatchTable::new();

        assert!(register_bridge_calls(&mut table, &bridge).unwrap());
        assert_eq!(table.len(), 4);
        assert!(!register_bridge_calls(&mut table, &bridge).unwrap());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_partial_collision_registers_nothing() {
        let (_, _, bridge) = create_test_bridge(BridgeConfig::debug());
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        table
            .register(InternalCall::object(names.object_disposed.clone(), |_| {}))
            .unwrap();

        let err = register_bridge_calls(&mut table, &bridge).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntryPoint(name) if name == names.object_disposed));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let (_, _, first) = create_test_bridge(BridgeConfig::debug());
        let (_, _, second) = create_test_bridge(BridgeConfig::debug().with_namespace("Editor"));
        let mut table = DispatchTable::new();

        assert!(register_bridge_calls(&mut table, &first).unwrap());
        assert!(register_bridge_calls(&mut table, &second).unwrap());
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_invoke_disposal_entry_points() {
        let (host, runtime, bridge) = create_test_bridge(BridgeConfig::debug());
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();

        let plain = host.create(ObjectKind::Plain, 0);
        let raw = runtime.alloc(GcHandleKind::Strong);
        bridge
            .bind_managed_peer(plain, ScriptHandle::strong(raw))
            .unwrap();
        let result = table
            .invoke(&names.object_disposed, &[CallArg::Object(plain.raw())])
            .unwrap();
        assert_eq!(result, CallReturn::Void);
        assert_eq!(bridge.state(plain), BindingState::Unbound);
        assert_eq!(runtime.free_count(raw), 1);

        let counted = host.create(ObjectKind::RefCounted, 0);
        let raw = runtime.alloc(GcHandleKind::Strong);
        bridge
            .bind_managed_peer(counted, ScriptHandle::strong(raw))
            .unwrap();
        table
            .invoke(
                &names.ref_counted_disposed,
                &[CallArg::Object(counted.raw()), CallArg::Bool(true)],
            )
            .unwrap();
        assert_eq!(host.destroy_count(counted), 1);
        assert_eq!(host.reference_count(counted), 0);
    }

    #[test]
    fn test_invoke_null_identity_is_logged() {
        let (_, _, bridge) =
            create_test_bridge(BridgeConfig::debug().with_contracts(ContractPolicy::Log));
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();

        let result = table.invoke(&names.object_disposed, &[CallArg::Object(0)]);
        assert_eq!(result.unwrap(), CallReturn::Void);
    }

    #[test]
    fn test_invoke_argument_mismatch() {
        let (_, _, bridge) = create_test_bridge(BridgeConfig::debug());
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();

        let result = table.invoke(&names.ref_counted_disposed, &[CallArg::Object(1)]);
        assert!(matches!(result, Err(Error::ArgumentMismatch { entry, .. }) if entry == names.ref_counted_disposed));
    }

    #[test]
    fn test_invoke_awaiter_connect_status_codes() {
        let (host, runtime, bridge) = create_test_bridge(BridgeConfig::debug());
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();

        let source = host.create(ObjectKind::Plain, 0);
        let target = host.create(ObjectKind::Plain, 0);
        let awaiter = runtime.alloc(GcHandleKind::Strong);
        let connect = |target: u64, signal: Option<&str>| {
            table
                .invoke(
                    &names.awaiter_connect,
                    &[
                        CallArg::Object(source.raw()),
                        CallArg::Name(signal),
                        CallArg::Object(target),
                        CallArg::Handle(awaiter.raw()),
                    ],
                )
                .unwrap()
        };

        assert_eq!(
            connect(0, Some("ready")),
            CallReturn::I32(ConnectStatus::InvalidParameter.code())
        );
        assert_eq!(
            connect(target.raw(), None),
            CallReturn::I32(ConnectStatus::InvalidParameter.code())
        );
        assert_eq!(runtime.free_count(awaiter), 0);

        assert_eq!(connect(target.raw(), Some("ready")), CallReturn::I32(2));
        assert_eq!(runtime.free_count(awaiter), 1);
    }

    #[test]
    fn test_invoke_connect_event_signal() {
        let (host, _, bridge) = create_test_bridge(BridgeConfig::debug());
        let names = EntryPoints::new(bridge.config());
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();

        let id = host.create(ObjectKind::Plain, 0);
        let instance = TestInstance::new();
        host.attach(id, instance.clone());

        for signal in [Some("pressed"), None, Some("")] {
            table
                .invoke(
                    &names.connect_event_signal,
                    &[CallArg::Object(id.raw()), CallArg::Name(signal)],
                )
                .unwrap();
        }
        assert_eq!(instance.event_signals(), vec!["pressed".to_string()]);
    }
}
