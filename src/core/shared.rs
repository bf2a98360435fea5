//! State shared between a registry and all of its lanes.
//!
//! Lanes keep an `Arc<Shared>` so that tasks orphaned by a registry reset keep
//! publishing into (and untracking from) the instance they were born in, never
//! the live one.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::events::{Bus, Event};
use crate::lanes::Lane;
use crate::subscribers::SubscriberSet;
use crate::tasks::TaskId;

pub(crate) struct Shared {
    pub bus: Bus,
    pub subs: Arc<SubscriberSet>,
    /// Live (queued or running) task → owning lane.
    tasks: Mutex<HashMap<TaskId, Weak<Lane>>>,
}

impl Shared {
    pub fn new(bus_capacity: usize) -> Arc<Self> {
        let bus = Bus::new(bus_capacity);
        let subs = Arc::new(SubscriberSet::new(bus.clone()));
        Arc::new(Self {
            bus,
            subs,
            tasks: Mutex::new(HashMap::new()),
        })
    }

    /// Publishes to raw receivers and to subscribers. Never blocks.
    pub fn publish(&self, ev: Event) {
        self.subs.emit(&ev);
        self.bus.publish(ev);
    }

    // Lock order: lane state, then `tasks`. Callers never hold `tasks`
    // while taking a lane lock.
    pub fn track(&self, id: TaskId, lane: &Arc<Lane>) {
        self.tasks.lock().insert(id, Arc::downgrade(lane));
    }

    pub fn untrack(&self, id: TaskId) {
        self.tasks.lock().remove(&id);
    }

    pub fn lane_of(&self, id: TaskId) -> Option<Arc<Lane>> {
        self.tasks.lock().get(&id).and_then(Weak::upgrade)
    }
}
