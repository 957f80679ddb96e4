//! The system worker state machine.
//!
//! A [`System`] repeatedly converts its consumed resource into its produced
//! resource in two phases: *convert* (take inputs from the shared ledger,
//! simulate processing latency, buffer the output locally) and *store*
//! (move the local buffer into the produced resource, keeping whatever does
//! not fit). Splitting the phases lets a system hold produced units while
//! downstream capacity is full instead of losing them or blocking.
//!
//! Contention outcomes are reported to the manager as events; they never
//! abort the worker. The only way a worker exits is observing
//! [`SystemStatus::Terminate`] at the top of its loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use crate::event::{Event, EventPriority, EventQueue};
use crate::resource::{ResourceAmount, ResourceOutcome};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Throughput/lifecycle state of a system. Written only by the manager,
/// read only by the owning worker, so a single atomic scalar suffices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum SystemStatus {
    /// Nominal processing speed.
    Standard = 0,
    /// Throttled: processing takes twice as long.
    Slow = 1,
    /// Boosted: processing takes half as long.
    Fast = 2,
    /// Terminal. The worker exits at the top of its next iteration.
    Terminate = 3,
}

impl SystemStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SystemStatus::Standard,
            1 => SystemStatus::Slow,
            2 => SystemStatus::Fast,
            _ => SystemStatus::Terminate,
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SystemStatus::Standard => "standard",
            SystemStatus::Slow => "slow",
            SystemStatus::Fast => "fast",
            SystemStatus::Terminate => "terminate",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// A concurrent worker converting one resource into another over simulated
/// time.
///
/// Shared between the manager (which owns the collection and adjusts
/// `status`) and the worker thread (which runs [`System::run`]) via `Arc`.
/// `amount_stored` has a single writer -- the worker -- and may be read by
/// telemetry at any time.
#[derive(Debug)]
pub struct System {
    name: Arc<str>,
    consumed: ResourceAmount,
    produced: ResourceAmount,
    processing_time: Duration,
    backoff: Duration,
    status: AtomicU8,
    amount_stored: AtomicU32,
    queue: Arc<EventQueue>,
}

impl System {
    pub fn new(
        name: &str,
        consumed: ResourceAmount,
        produced: ResourceAmount,
        processing_time: Duration,
        queue: Arc<EventQueue>,
    ) -> Arc<Self> {
        let backoff = crate::sim::SimTiming::default().system_backoff;
        Self::with_backoff(name, consumed, produced, processing_time, backoff, queue)
    }

    /// Same as [`System::new`] with an explicit backoff pause, used when a
    /// scenario overrides the default pacing.
    pub fn with_backoff(
        name: &str,
        consumed: ResourceAmount,
        produced: ResourceAmount,
        processing_time: Duration,
        backoff: Duration,
        queue: Arc<EventQueue>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: Arc::from(name),
            consumed,
            produced,
            processing_time,
            backoff,
            status: AtomicU8::new(SystemStatus::Standard as u8),
            amount_stored: AtomicU32::new(0),
            queue,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn consumed(&self) -> &ResourceAmount {
        &self.consumed
    }

    pub fn produced(&self) -> &ResourceAmount {
        &self.produced
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Units produced but not yet stored downstream.
    pub fn amount_stored(&self) -> u32 {
        self.amount_stored.load(Ordering::Acquire)
    }

    /// Adjust throughput. A terminated system stays terminated; throttling
    /// never resurrects a worker that was told to exit.
    pub fn throttle(&self, status: SystemStatus) {
        let _ = self
            .status
            .fetch_update(Ordering::Release, Ordering::Acquire, |current| {
                if current == SystemStatus::Terminate as u8 {
                    None
                } else {
                    Some(status as u8)
                }
            });
    }

    /// One-way transition to [`SystemStatus::Terminate`]. Observed by the
    /// worker at the top of its next iteration, after any in-flight sleep.
    pub fn terminate(&self) {
        self.status
            .store(SystemStatus::Terminate as u8, Ordering::Release);
    }

    /// Worker entry point: loop until terminated.
    pub fn run(&self) {
        log::debug!("system '{}' worker started", self.name);
        while self.status() != SystemStatus::Terminate {
            self.step();
        }
        log::debug!("system '{}' worker exiting", self.name);
    }

    /// One iteration of the state machine: convert if the local buffer is
    /// empty, then store whatever is buffered.
    pub fn step(&self) {
        if self.amount_stored() == 0 {
            let outcome = self.convert();
            if outcome != ResourceOutcome::Ok {
                self.report(&self.consumed, outcome, EventPriority::High);
                thread::sleep(self.backoff);
            }
        }

        if self.amount_stored() > 0 {
            let outcome = self.store_produced();
            if outcome != ResourceOutcome::Ok {
                self.report(&self.produced, outcome, EventPriority::Low);
                thread::sleep(self.backoff);
            }
        }
    }

    /// Convert phase: consume inputs under the ledger lock, then simulate
    /// processing latency (no lock held), then buffer the output.
    fn convert(&self) -> ResourceOutcome {
        let outcome = match self.consumed.resource() {
            // No input configured: consumption is trivially successful.
            None => ResourceOutcome::Ok,
            Some(resource) => resource.try_consume(self.consumed.amount()),
        };

        if outcome == ResourceOutcome::Ok {
            self.simulate_processing();
            let produced = match self.produced.resource() {
                Some(_) => self.produced.amount(),
                None => 0,
            };
            if produced > 0 {
                self.amount_stored.fetch_add(produced, Ordering::AcqRel);
            }
        }

        outcome
    }

    /// Store phase: push the local buffer into the produced resource,
    /// keeping the leftover when capacity is short.
    fn store_produced(&self) -> ResourceOutcome {
        let Some(resource) = self.produced.resource() else {
            // No output configured: storage is trivially successful.
            self.amount_stored.store(0, Ordering::Release);
            return ResourceOutcome::Ok;
        };

        let pending = self.amount_stored();
        if pending == 0 {
            return ResourceOutcome::Ok;
        }

        let result = resource.try_store(pending);
        self.amount_stored.store(result.leftover, Ordering::Release);
        if result.leftover == 0 {
            ResourceOutcome::Ok
        } else {
            ResourceOutcome::Capacity
        }
    }

    /// Sleep for the nominal processing time scaled by the current status.
    fn simulate_processing(&self) {
        let adjusted = match self.status() {
            SystemStatus::Slow => self.processing_time * 2,
            SystemStatus::Fast => self.processing_time / 2,
            SystemStatus::Standard | SystemStatus::Terminate => self.processing_time,
        };
        thread::sleep(adjusted);
    }

    fn report(&self, side: &ResourceAmount, outcome: ResourceOutcome, priority: EventPriority) {
        let resource = side.resource();
        self.queue.push(Event {
            system: Arc::clone(&self.name),
            resource: resource.map(Arc::clone),
            outcome,
            priority,
            amount: resource.map(|r| r.amount()).unwrap_or(0),
        });
    }

    /// Read-only snapshot for telemetry.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            name: self.name.to_string(),
            status: self.status(),
            amount_stored: self.amount_stored(),
        }
    }
}

/// Point-in-time view of a system, safe to hand to display code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SystemSnapshot {
    pub name: String,
    pub status: SystemStatus,
    pub amount_stored: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use std::time::Duration;

    fn quick() -> (Duration, Duration) {
        (Duration::from_millis(1), Duration::from_millis(1))
    }

    #[test]
    fn convert_and_store_moves_units_downstream() {
        let (processing, backoff) = quick();
        let queue = EventQueue::new();
        let fuel = Resource::new("Fuel", 10, 100);
        let distance = Resource::new("Distance", 0, 5000);
        let system = System::with_backoff(
            "Propulsion",
            ResourceAmount::new(Arc::clone(&fuel), 5),
            ResourceAmount::new(Arc::clone(&distance), 25),
            processing,
            backoff,
            queue,
        );

        system.step();
        assert_eq!(fuel.amount(), 5);
        assert_eq!(distance.amount(), 25);
        assert_eq!(system.amount_stored(), 0);
    }

    #[test]
    fn empty_input_emits_high_priority_event() {
        let (processing, backoff) = quick();
        let queue = EventQueue::new();
        let fuel = Resource::new("Fuel", 0, 100);
        let system = System::with_backoff(
            "Propulsion",
            ResourceAmount::new(Arc::clone(&fuel), 5),
            ResourceAmount::none(),
            processing,
            backoff,
            Arc::clone(&queue),
        );

        system.step();
        let event = queue.pop().expect("starved system should report");
        assert_eq!(event.outcome, ResourceOutcome::Empty);
        assert_eq!(event.priority, EventPriority::High);
        assert_eq!(event.amount, 0);
        assert_eq!(&*event.system, "Propulsion");
    }

    #[test]
    fn full_output_buffers_leftover_and_emits_capacity() {
        let (processing, backoff) = quick();
        let queue = EventQueue::new();
        let distance = Resource::new("Distance", 4990, 5000);
        let system = System::with_backoff(
            "Propulsion",
            ResourceAmount::none(),
            ResourceAmount::new(Arc::clone(&distance), 25),
            processing,
            backoff,
            Arc::clone(&queue),
        );

        system.step();
        assert_eq!(distance.amount(), 5000);
        assert_eq!(system.amount_stored(), 15);

        let event = queue.pop().expect("capacity overflow should report");
        assert_eq!(event.outcome, ResourceOutcome::Capacity);
        assert_eq!(event.priority, EventPriority::Low);
        assert_eq!(event.amount, 5000);
    }

    #[test]
    fn null_producer_discards_output() {
        let (processing, backoff) = quick();
        let queue = EventQueue::new();
        let oxygen = Resource::new("Oxygen", 20, 50);
        let system = System::with_backoff(
            "Crew",
            ResourceAmount::new(Arc::clone(&oxygen), 1),
            ResourceAmount::none(),
            processing,
            backoff,
            Arc::clone(&queue),
        );

        system.step();
        assert_eq!(oxygen.amount(), 19);
        assert_eq!(system.amount_stored(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn throttle_cannot_undo_terminate() {
        let queue = EventQueue::new();
        let system = System::new(
            "Crew",
            ResourceAmount::none(),
            ResourceAmount::none(),
            Duration::from_millis(1),
            queue,
        );
        system.terminate();
        system.throttle(SystemStatus::Fast);
        assert_eq!(system.status(), SystemStatus::Terminate);
    }

    #[test]
    fn terminated_worker_exits_run_loop() {
        let queue = EventQueue::new();
        let system = System::new(
            "Crew",
            ResourceAmount::none(),
            ResourceAmount::none(),
            Duration::from_millis(1),
            queue,
        );
        system.terminate();
        let worker = {
            let system = Arc::clone(&system);
            std::thread::spawn(move || system.run())
        };
        worker.join().expect("worker should exit cleanly");
    }
}
