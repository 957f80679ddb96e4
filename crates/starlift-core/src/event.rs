//! Status events and the priority-ordered event queue.
//!
//! The [`EventQueue`] is the only channel from system workers back to the
//! manager. Systems push from many threads; the manager is the sole
//! consumer. Ordering is by descending priority; events of equal priority
//! pop in the order they were pushed (FIFO within a priority band), which
//! is enforced by stamping each entry with a monotonically increasing
//! sequence number.

use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};

use crate::resource::{Resource, ResourceOutcome};

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Urgency of an event. Higher pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventPriority {
    Low,
    Medium,
    High,
}

/// An immutable status notification produced by a system.
///
/// Created on a worker thread, queued, popped exactly once by the manager,
/// then discarded.
#[derive(Debug, Clone)]
pub struct Event {
    /// Name of the originating system.
    pub system: Arc<str>,
    /// The resource involved, if any.
    pub resource: Option<Arc<Resource>>,
    /// What happened at the ledger.
    pub outcome: ResourceOutcome,
    pub priority: EventPriority,
    /// Context-dependent payload: the resource level observed when the
    /// event was emitted.
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Heap entry: priority first, then FIFO by sequence number within a band.
#[derive(Debug)]
struct QueuedEvent {
    event: Event,
    seq: u64,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: higher priority wins; among equals the *older* entry
        // (smaller seq) must surface first.
        self.event
            .priority
            .cmp(&other.event.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

/// Thread-safe priority queue of [`Event`]s.
///
/// Push and pop are individually atomic under one internal mutex; they are
/// not composed transactions. `pop` never blocks -- an empty queue returns
/// `None`, which is a normal condition rather than an error.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Mutex<QueueInner>,
}

impl EventQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert an event, keeping the queue ordered by descending priority.
    /// Safe to call concurrently from any number of producer threads.
    pub fn push(&self, event: Event) {
        let mut inner = self.inner.lock().expect("event queue mutex poisoned");
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(QueuedEvent { event, seq });
    }

    /// Remove and return the highest-priority pending event, or `None`
    /// when the queue is empty. Equal priorities pop first-in first-out.
    pub fn pop(&self) -> Option<Event> {
        let mut inner = self.inner.lock().expect("event queue mutex poisoned");
        inner.heap.pop().map(|queued| queued.event)
    }

    /// Current number of queued events. Diagnostic only; do not base
    /// control decisions on it.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("event queue mutex poisoned").heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
