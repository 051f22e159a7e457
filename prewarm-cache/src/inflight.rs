//! Per-key in-flight supplier coordination.
//!
//! `get_or_set` elects exactly one leader per missing key; concurrent
//! callers for the same key block on the leader's slot instead of running
//! the supplier again. A failed supplier wakes waiters with an error, and
//! the slot is removed so the next caller can retry.

use std::sync::{Arc, Condvar, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use prewarm_core::errors::{CacheError, PrewarmResult};

enum SlotState<V> {
    Pending,
    Done(V),
    Failed,
}

pub(crate) struct Slot<V> {
    state: Mutex<SlotState<V>>,
    ready: Condvar,
}

impl<V: Clone> Slot<V> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
        }
    }

    /// Publish the leader's outcome and wake every waiter.
    pub(crate) fn complete(&self, outcome: Option<V>) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = match outcome {
            Some(value) => SlotState::Done(value),
            None => SlotState::Failed,
        };
        self.ready.notify_all();
    }

    /// Block until the leader publishes, then return its outcome.
    pub(crate) fn wait(&self, key: &str) -> PrewarmResult<V> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while matches!(*state, SlotState::Pending) {
            state = match self.ready.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        match &*state {
            SlotState::Done(value) => Ok(value.clone()),
            SlotState::Failed => Err(CacheError::SupplierFailed {
                key: key.to_string(),
            }
            .into()),
            SlotState::Pending => unreachable!("woken while pending"),
        }
    }
}

pub(crate) enum Role<V> {
    /// This caller runs the supplier and must `complete` the slot.
    Leader(Arc<Slot<V>>),
    /// Another caller is already computing; wait on its slot.
    Waiter(Arc<Slot<V>>),
}

#[derive(Default)]
pub(crate) struct InFlightTable<V> {
    slots: DashMap<String, Arc<Slot<V>>>,
}

impl<V: Clone> InFlightTable<V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Join the in-flight computation for `key`, electing a leader if none.
    pub(crate) fn begin(&self, key: &str) -> Role<V> {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(occupied) => Role::Waiter(Arc::clone(occupied.get())),
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Slot::new());
                vacant.insert(Arc::clone(&slot));
                Role::Leader(slot)
            }
        }
    }

    /// Retire the slot after the leader has published its outcome.
    pub(crate) fn finish(&self, key: &str) {
        self.slots.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_caller_is_leader_second_waits() {
        let table: InFlightTable<u32> = InFlightTable::new();
        let Role::Leader(slot) = table.begin("k") else {
            panic!("expected leader");
        };
        assert!(matches!(table.begin("k"), Role::Waiter(_)));
        slot.complete(Some(7));
        table.finish("k");
        assert!(matches!(table.begin("k"), Role::Leader(_)));
    }

    #[test]
    fn waiters_observe_leader_failure() {
        let table: Arc<InFlightTable<u32>> = Arc::new(InFlightTable::new());
        let Role::Leader(slot) = table.begin("k") else {
            panic!("expected leader");
        };
        let Role::Waiter(waiter_slot) = table.begin("k") else {
            panic!("expected waiter");
        };
        let waiter = thread::spawn(move || waiter_slot.wait("k"));
        slot.complete(None);
        table.finish("k");
        assert!(waiter.join().unwrap().is_err());
    }
}
