//! In-memory managed runtime double.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use crate::runtime::{GcHandleKind, ManagedRuntime, RawGcHandle};

struct Slot {
    target: u64,
    kind: GcHandleKind,
    frees: u32,
}

#[derive(Default)]
struct RuntimeState {
    slots: HashMap<RawGcHandle, Slot>,
    collected: HashSet<u64>,
    cleared: Vec<RawGcHandle>,
    resumed: Vec<(RawGcHandle, String)>,
}

/// Managed runtime double recording every handle operation.
///
/// Each [`alloc`](Self::alloc) creates a new managed target; `retarget` allocates a
/// second slot pointing at the same target. Frees are counted rather than rejected so
/// tests can assert the release-once property directly.
#[derive(Default)]
pub struct TestRuntime {
    state: Mutex<RuntimeState>,
    next: AtomicU64,
}

impl TestRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&self) -> RawGcHandle {
        let raw = self.next.fetch_add(1, Ordering::Relaxed) + 0x100;
        RawGcHandle::new(raw).unwrap()
    }

    /// Allocates a handle to a fresh managed target.
    pub fn alloc(&self, kind: GcHandleKind) -> RawGcHandle {
        let handle = self.next_handle();
        self.state.lock().unwrap().slots.insert(
            handle,
            Slot {
                target: handle.raw(),
                kind,
                frees: 0,
            },
        );
        handle
    }

    /// Simulates the garbage collector reclaiming the target of `handle`.
    pub fn collect(&self, handle: RawGcHandle) {
        let mut state = self.state.lock().unwrap();
        let target = state.slots[&handle].target;
        state.collected.insert(target);
    }

    pub fn free_count(&self, handle: RawGcHandle) -> u32 {
        self.state.lock().unwrap().slots[&handle].frees
    }

    pub fn kind_of(&self, handle: RawGcHandle) -> GcHandleKind {
        self.state.lock().unwrap().slots[&handle].kind
    }

    /// Number of allocated slots not freed yet.
    pub fn live_handles(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .slots
            .values()
            .filter(|slot| slot.frees == 0)
            .count()
    }

    /// Returns `true` if no slot was freed more than once.
    pub fn no_double_free(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .slots
            .values()
            .all(|slot| slot.frees <= 1)
    }

    pub fn cleared(&self) -> Vec<RawGcHandle> {
        self.state.lock().unwrap().cleared.clone()
    }

    pub fn resumed(&self) -> Vec<(RawGcHandle, String)> {
        self.state.lock().unwrap().resumed.clone()
    }
}

impl ManagedRuntime for TestRuntime {
    fn free_handle(&self, handle: RawGcHandle) {
        let mut state = self.state.lock().unwrap();
        state
            .slots
            .get_mut(&handle)
            .expect("freeing unknown handle")
            .frees += 1;
    }

    fn retarget(&self, handle: RawGcHandle, kind: GcHandleKind) -> Option<RawGcHandle> {
        let target = {
            let state = self.state.lock().unwrap();
            let target = state.slots[&handle].target;
            if state.collected.contains(&target) {
                return None;
            }
            target
        };

        let new = self.next_handle();
        self.state.lock().unwrap().slots.insert(
            new,
            Slot {
                target,
                kind,
                frees: 0,
            },
        );
        Some(new)
    }

    fn clear_native_pointer(&self, handle: RawGcHandle) {
        let mut state = self.state.lock().unwrap();
        let target = state.slots[&handle].target;
        if !state.collected.contains(&target) {
            state.cleared.push(handle);
        }
    }

    fn resume_awaiter(&self, awaiter: RawGcHandle, signal: &str) {
        self.state
            .lock()
            .unwrap()
            .resumed
            .push((awaiter, signal.to_string()));
    }
}
