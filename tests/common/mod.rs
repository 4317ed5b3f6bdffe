//! Host and runtime doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use gcbridge::prelude::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct Object {
    kind: Option<ObjectKind>,
    refcount: u32,
    instance: Option<Arc<dyn ScriptInstance>>,
    destroyed: u32,
}

/// Native object table.
#[derive(Default)]
pub struct Host {
    objects: Mutex<HashMap<ObjectId, Object>>,
    next: AtomicU64,
}

impl Host {
    pub fn create(&self, kind: ObjectKind, refcount: u32) -> ObjectId {
        let id = ObjectId::new(self.next.fetch_add(1, Ordering::Relaxed) + 1).unwrap();
        self.objects.lock().unwrap().insert(
            id,
            Object {
                kind: Some(kind),
                refcount,
                ..Object::default()
            },
        );
        id
    }

    pub fn attach(&self, id: ObjectId, instance: Arc<dyn ScriptInstance>) {
        self.objects.lock().unwrap().get_mut(&id).unwrap().instance = Some(instance);
    }

    pub fn destroyed(&self, id: ObjectId) -> u32 {
        self.objects.lock().unwrap()[&id].destroyed
    }
}

impl ObjectHost for Host {
    fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        let objects = self.objects.lock().unwrap();
        let object = objects.get(&id)?;
        if object.destroyed > 0 {
            return None;
        }
        object.kind
    }

    fn script_instance(&self, id: ObjectId) -> Option<Arc<dyn ScriptInstance>> {
        self.objects.lock().unwrap().get(&id)?.instance.clone()
    }

    fn detach_script_instance(&self, id: ObjectId) {
        if let Some(object) = self.objects.lock().unwrap().get_mut(&id) {
            object.instance = None;
        }
    }

    fn destroy(&self, id: ObjectId) {
        let mut objects = self.objects.lock().unwrap();
        let object = objects.get_mut(&id).unwrap();
        object.destroyed += 1;
        object.instance = None;
    }

    fn reference(&self, id: ObjectId) -> u32 {
        let mut objects = self.objects.lock().unwrap();
        let object = objects.get_mut(&id).unwrap();
        object.refcount += 1;
        object.refcount
    }

    fn unreference(&self, id: ObjectId) -> bool {
        let mut objects = self.objects.lock().unwrap();
        let object = objects.get_mut(&id).unwrap();
        object.refcount -= 1;
        object.refcount == 0
    }

    fn reference_count(&self, id: ObjectId) -> u32 {
        self.objects.lock().unwrap()[&id].refcount
    }
}

/// Managed handle table counting frees per handle.
#[derive(Default)]
pub struct Runtime {
    frees: Mutex<HashMap<RawGcHandle, u32>>,
    resumed: Mutex<Vec<(RawGcHandle, String)>>,
    next: AtomicU64,
}

impl Runtime {
    pub fn alloc(&self) -> RawGcHandle {
        let handle = RawGcHandle::new(self.next.fetch_add(1, Ordering::Relaxed) + 1).unwrap();
        self.frees.lock().unwrap().insert(handle, 0);
        handle
    }

    pub fn frees(&self, handle: RawGcHandle) -> u32 {
        self.frees.lock().unwrap()[&handle]
    }

    /// Handles allocated and not freed.
    pub fn live(&self) -> usize {
        self.frees
            .lock()
            .unwrap()
            .values()
            .filter(|frees| **frees == 0)
            .count()
    }

    pub fn resumed(&self) -> Vec<(RawGcHandle, String)> {
        self.resumed.lock().unwrap().clone()
    }
}

impl ManagedRuntime for Runtime {
    fn free_handle(&self, handle: RawGcHandle) {
        *self.frees.lock().unwrap().get_mut(&handle).unwrap() += 1;
    }

    fn retarget(&self, _handle: RawGcHandle, _kind: GcHandleKind) -> Option<RawGcHandle> {
        Some(self.alloc())
    }

    fn clear_native_pointer(&self, _handle: RawGcHandle) {}

    fn resume_awaiter(&self, awaiter: RawGcHandle, signal: &str) {
        self.resumed
            .lock()
            .unwrap()
            .push((awaiter, signal.to_string()));
    }
}

/// Script instance that keeps one-shot awaiters until a signal is emitted.
#[derive(Default)]
pub struct Listener {
    awaiters: Mutex<Vec<SignalAwaiter>>,
}

impl Listener {
    pub fn emit(&self, signal: &str) {
        let awaiters = std::mem::take(&mut *self.awaiters.lock().unwrap());
        let (fired, kept): (Vec<_>, Vec<_>) = awaiters
            .into_iter()
            .partition(|awaiter| awaiter.signal() == signal);
        self.awaiters.lock().unwrap().extend(kept);
        fired.into_iter().for_each(SignalAwaiter::fire);
    }
}

impl ScriptInstance for Listener {
    fn state(&self) -> InstanceState {
        InstanceState::Live
    }

    fn notify_disposed(&self) {}

    fn decide_ref_counted_disposal(&self, _is_finalizer: bool) -> DisposalDecision {
        DisposalDecision::DeleteOwner
    }

    fn connect_event_signal(&self, _signal: &str) {}

    fn register_awaiter(&self, awaiter: SignalAwaiter) -> ConnectStatus {
        self.awaiters.lock().unwrap().push(awaiter);
        ConnectStatus::Connected
    }
}

pub struct Fixture {
    pub host: Arc<Host>,
    pub runtime: Arc<Runtime>,
    pub bridge: Arc<LifetimeBridge>,
    pub table: DispatchTable,
    pub names: EntryPoints,
}

impl Fixture {
    pub fn new(config: BridgeConfig) -> Self {
        init_logging();
        let host = Arc::new(Host::default());
        let runtime = Arc::new(Runtime::default());
        let bridge = Arc::new(LifetimeBridge::new(host.clone(), runtime.clone(), config));
        let mut table = DispatchTable::new();
        register_bridge_calls(&mut table, &bridge).unwrap();
        let names = EntryPoints::new(bridge.config());
        Self {
            host,
            runtime,
            bridge,
            table,
            names,
        }
    }

    /// Creates an object with a bound managed peer.
    pub fn bound(&self, kind: ObjectKind, native_refs: u32) -> (ObjectId, RawGcHandle) {
        let id = self.host.create(kind, native_refs);
        let raw = self.runtime.alloc();
        self.bridge
            .bind_managed_peer(id, ScriptHandle::strong(raw))
            .unwrap();
        (id, raw)
    }

    pub fn object_disposed(&self, id: ObjectId) {
        self.table
            .invoke(&self.names.object_disposed, &[CallArg::Object(id.raw())])
            .unwrap();
    }

    pub fn ref_counted_disposed(&self, id: ObjectId, is_finalizer: bool) {
        self.table
            .invoke(
                &self.names.ref_counted_disposed,
                &[CallArg::Object(id.raw()), CallArg::Bool(is_finalizer)],
            )
            .unwrap();
    }

    pub fn connect(
        &self,
        source: ObjectId,
        signal: &str,
        target: ObjectId,
        awaiter: RawGcHandle,
    ) -> i32 {
        match self
            .table
            .invoke(
                &self.names.awaiter_connect,
                &[
                    CallArg::Object(source.raw()),
                    CallArg::Name(Some(signal)),
                    CallArg::Object(target.raw()),
                    CallArg::Handle(awaiter.raw()),
                ],
            )
            .unwrap()
        {
            CallReturn::I32(code) => code,
            CallReturn::Void => panic!("awaiter connect returned no status"),
        }
    }
}
