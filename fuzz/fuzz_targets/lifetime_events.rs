#![no_main]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use gcbridge::prelude::*;
use libfuzzer_sys::fuzz_target;

const OBJECTS: u64 = 4;

#[derive(Default)]
struct Host {
    refcounts: Mutex<HashMap<u64, u32>>,
    destroyed: Mutex<Vec<u64>>,
}

impl ObjectHost for Host {
    fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        if self.destroyed.lock().unwrap().contains(&id.raw()) {
            return None;
        }
        Some(if id.raw() % 2 == 0 {
            ObjectKind::RefCounted
        } else {
            ObjectKind::Plain
        })
    }

    fn script_instance(&self, _id: ObjectId) -> Option<Arc<dyn ScriptInstance>> {
        None
    }

    fn detach_script_instance(&self, _id: ObjectId) {}

    fn destroy(&self, id: ObjectId) {
        self.destroyed.lock().unwrap().push(id.raw());
    }

    fn reference(&self, id: ObjectId) -> u32 {
        let mut refcounts = self.refcounts.lock().unwrap();
        let count = refcounts.entry(id.raw()).or_insert(0);
        *count += 1;
        *count
    }

    fn unreference(&self, id: ObjectId) -> bool {
        let mut refcounts = self.refcounts.lock().unwrap();
        let count = refcounts.get_mut(&id.raw()).unwrap();
        *count -= 1;
        *count == 0
    }

    fn reference_count(&self, id: ObjectId) -> u32 {
        self.refcounts
            .lock()
            .unwrap()
            .get(&id.raw())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Default)]
struct Runtime {
    frees: Mutex<Vec<u32>>,
}

impl Runtime {
    fn alloc(&self) -> RawGcHandle {
        let mut frees = self.frees.lock().unwrap();
        frees.push(0);
        RawGcHandle::new(frees.len() as u64).unwrap()
    }
}

impl ManagedRuntime for Runtime {
    fn free_handle(&self, handle: RawGcHandle) {
        self.frees.lock().unwrap()[handle.raw() as usize - 1] += 1;
    }

    fn retarget(&self, _handle: RawGcHandle, _kind: GcHandleKind) -> Option<RawGcHandle> {
        Some(self.alloc())
    }

    fn clear_native_pointer(&self, _handle: RawGcHandle) {}

    fn resume_awaiter(&self, _awaiter: RawGcHandle, _signal: &str) {}
}

fuzz_target!(|data: &[u8]| {
    let host = Arc::new(Host::default());
    let runtime = Arc::new(Runtime::default());
    let bridge = LifetimeBridge::new(
        host.clone(),
        runtime.clone(),
        BridgeConfig::release()
            .with_contracts(ContractPolicy::Log)
            .with_unsafe_reference_tracking(true),
    );
    let mut native_refs = [0u32; OBJECTS as usize];

    for byte in data {
        let slot = u64::from(byte >> 3) % OBJECTS;
        let id = ObjectId::new(slot + 1).unwrap();
        let alive = host.kind(id).is_some();
        let refs = &mut native_refs[slot as usize];

        match byte & 7 {
            0 => {
                let _ = bridge.bind_managed_peer(id, ScriptHandle::strong(runtime.alloc()));
            }
            1 => match host.kind(id) {
                Some(ObjectKind::RefCounted) => {
                    bridge.ref_counted_disposed(id, false);
                }
                _ => {
                    bridge.object_disposed(id);
                }
            },
            2 => {
                bridge.ref_counted_disposed(id, true);
            }
            3 if alive => {
                host.reference(id);
                *refs += 1;
                bridge.reference_added(id);
            }
            4 if alive && *refs > 0 => {
                *refs -= 1;
                if host.unreference(id) {
                    host.destroy(id);
                    bridge.native_destroyed(id);
                } else {
                    bridge.reference_dropped(id);
                }
            }
            5 if alive => {
                host.destroy(id);
                bridge.native_destroyed(id);
            }
            _ => {}
        }
    }

    bridge.shutdown();
    assert!(runtime.frees.lock().unwrap().iter().all(|frees| *frees == 1));
});
