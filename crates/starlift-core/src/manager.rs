//! The manager: owner of global simulation state and the control loop.
//!
//! The manager owns the system and resource collections and the shared
//! event queue. [`Manager::run`] spawns one named worker thread per system,
//! then loops: drain all queued events, apply policy (critical-resource
//! termination, backpressure throttling), render telemetry at a bounded
//! rate, sleep, repeat. On shutdown every worker is signalled via its
//! status flag and joined before `run` returns.
//!
//! # Policy
//!
//! - An `Empty` event on a critical-empty resource ends the run as a
//!   [`MissionOutcome::Failure`]; a `Capacity` event on a critical-full
//!   resource ends it as a [`MissionOutcome::Success`]. Either way every
//!   system is set to `Terminate` immediately so workers exit promptly.
//! - Any other event throttles the producers of the affected resource:
//!   high-priority (scarcity) events set them to `Fast`, low-priority
//!   (saturation) events set them to `Slow`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crate::error::ManagerError;
use crate::event::{Event, EventPriority, EventQueue};
use crate::resource::{Resource, ResourceOutcome, ResourceSnapshot};
use crate::sim::{MissionOutcome, SimTiming};
use crate::system::{System, SystemSnapshot, SystemStatus};
use crate::telemetry::Telemetry;

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Summary of a completed simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: MissionOutcome,
    /// Total events drained from the queue over the whole run.
    pub events_processed: u64,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns the simulation: systems, resources, the event queue, and the
/// lifecycle flag. Lives for exactly one run; create a fresh manager per
/// simulation so runs and tests never interfere.
#[derive(Debug)]
pub struct Manager {
    systems: Vec<Arc<System>>,
    resources: Vec<Arc<Resource>>,
    queue: Arc<EventQueue>,
    critical_empty: Vec<Arc<Resource>>,
    critical_full: Vec<Arc<Resource>>,
    timing: SimTiming,
    running: AtomicBool,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_timing(SimTiming::default())
    }

    pub fn with_timing(timing: SimTiming) -> Self {
        Self {
            systems: Vec::new(),
            resources: Vec::new(),
            queue: EventQueue::new(),
            critical_empty: Vec::new(),
            critical_full: Vec::new(),
            timing,
            running: AtomicBool::new(false),
        }
    }

    /// The shared queue systems must be constructed with.
    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn timing(&self) -> SimTiming {
        self.timing
    }

    pub fn add_resource(&mut self, resource: Arc<Resource>) {
        self.resources.push(resource);
    }

    pub fn add_system(&mut self, system: Arc<System>) {
        self.systems.push(system);
    }

    /// Depletion of this resource ends the run as a failure.
    pub fn mark_critical_empty(&mut self, resource: &Arc<Resource>) {
        self.critical_empty.push(Arc::clone(resource));
    }

    /// Saturation of this resource ends the run as a success.
    pub fn mark_critical_full(&mut self, resource: &Arc<Resource>) {
        self.critical_full.push(Arc::clone(resource));
    }

    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    pub fn systems(&self) -> &[Arc<System>] {
        &self.systems
    }

    pub fn resource_snapshots(&self) -> Vec<ResourceSnapshot> {
        self.resources.iter().map(|r| r.snapshot()).collect()
    }

    pub fn system_snapshots(&self) -> Vec<SystemSnapshot> {
        self.systems.iter().map(|s| s.snapshot()).collect()
    }

    /// Run the simulation to completion.
    ///
    /// Spawns one worker thread per system, runs the control loop until a
    /// critical-resource event decides the outcome, then joins every
    /// worker before returning.
    pub fn run(&self, telemetry: &mut dyn Telemetry) -> Result<RunReport, ManagerError> {
        if self.systems.is_empty() {
            return Err(ManagerError::NoSystems);
        }

        log::info!(
            "starting simulation: {} systems, {} resources",
            self.systems.len(),
            self.resources.len()
        );
        self.running.store(true, Ordering::Release);

        let handles = self.spawn_workers()?;

        let mut events_processed = 0u64;
        let mut outcome = None;
        let mut last_render: Option<Instant> = None;

        while self.running.load(Ordering::Acquire) {
            while let Some(event) = self.queue.pop() {
                telemetry.record_event(&event);
                events_processed += 1;

                if outcome.is_none() {
                    if let Some(decided) = self.apply_policy(&event) {
                        outcome = Some(decided);
                        self.terminate_all();
                        self.running.store(false, Ordering::Release);
                    }
                }
            }

            let due = last_render
                .map(|at| at.elapsed() >= self.timing.display_interval)
                .unwrap_or(true);
            if due {
                telemetry.render(&self.resource_snapshots(), &self.system_snapshots());
                last_render = Some(Instant::now());
            }

            if self.running.load(Ordering::Acquire) {
                thread::sleep(self.timing.manager_poll);
            }
        }

        self.terminate_all();
        self.join_workers(handles)?;

        // The loop only exits after a policy decision set the outcome.
        let outcome = outcome.unwrap_or(MissionOutcome::Failure);
        log::info!(
            "simulation finished: {} ({} events processed)",
            outcome,
            events_processed
        );
        Ok(RunReport {
            outcome,
            events_processed,
        })
    }

    fn spawn_workers(&self) -> Result<Vec<(String, thread::JoinHandle<()>)>, ManagerError> {
        let mut handles = Vec::with_capacity(self.systems.len());
        for system in &self.systems {
            let worker = Arc::clone(system);
            let spawned = thread::Builder::new()
                .name(format!("system-{}", system.name()))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push((system.name().to_string(), handle)),
                Err(source) => {
                    // Unwind the workers that did start before reporting.
                    self.terminate_all();
                    for (_, handle) in handles {
                        let _ = handle.join();
                    }
                    return Err(ManagerError::Spawn {
                        name: system.name().to_string(),
                        source,
                    });
                }
            }
        }
        Ok(handles)
    }

    fn join_workers(
        &self,
        handles: Vec<(String, thread::JoinHandle<()>)>,
    ) -> Result<(), ManagerError> {
        let mut panicked = None;
        for (name, handle) in handles {
            if handle.join().is_err() && panicked.is_none() {
                panicked = Some(name);
            }
        }
        match panicked {
            Some(name) => Err(ManagerError::WorkerPanic { name }),
            None => Ok(()),
        }
    }

    fn terminate_all(&self) {
        for system in &self.systems {
            system.terminate();
        }
    }

    /// React to one event. Returns the mission outcome if the event ends
    /// the run, `None` if the simulation should continue.
    fn apply_policy(&self, event: &Event) -> Option<MissionOutcome> {
        let resource = event.resource.as_ref()?;

        match event.outcome {
            ResourceOutcome::Empty if is_marked(&self.critical_empty, resource) => {
                log::warn!("critical resource '{}' depleted", resource.name());
                Some(MissionOutcome::Failure)
            }
            ResourceOutcome::Capacity if is_marked(&self.critical_full, resource) => {
                log::info!("critical resource '{}' reached capacity", resource.name());
                Some(MissionOutcome::Success)
            }
            _ => {
                self.throttle_producers(event, resource);
                None
            }
        }
    }

    /// Backpressure propagation: adjust every system that produces the
    /// affected resource. Scarcity speeds producers up, saturation slows
    /// them down.
    fn throttle_producers(&self, event: &Event, resource: &Arc<Resource>) {
        let target = match event.priority {
            EventPriority::High => SystemStatus::Fast,
            EventPriority::Low => SystemStatus::Slow,
            EventPriority::Medium => return,
        };

        for system in &self.systems {
            let produces_it = system
                .produced()
                .resource()
                .is_some_and(|produced| Arc::ptr_eq(produced, resource));
            if produces_it {
                log::debug!(
                    "throttling system '{}' to {} (resource '{}')",
                    system.name(),
                    target,
                    resource.name()
                );
                system.throttle(target);
            }
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

/// Criticality is identity-based: the same ledger the systems share, not a
/// name match.
fn is_marked(marked: &[Arc<Resource>], resource: &Arc<Resource>) -> bool {
    marked.iter().any(|candidate| Arc::ptr_eq(candidate, resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceAmount;
    use crate::telemetry::NullTelemetry;
    use crate::test_utils::fast_timing;
    use std::time::Duration;

    #[test]
    fn run_with_no_systems_is_a_configuration_error() {
        let manager = Manager::new();
        let err = manager.run(&mut NullTelemetry).unwrap_err();
        assert!(matches!(err, ManagerError::NoSystems));
    }

    #[test]
    fn depleted_critical_resource_fails_the_mission() {
        let timing = fast_timing();
        let mut manager = Manager::with_timing(timing);
        let fuel = Resource::new("Fuel", 10, 100);
        manager.add_resource(Arc::clone(&fuel));
        manager.mark_critical_empty(&fuel);

        let propulsion = System::with_backoff(
            "Propulsion",
            ResourceAmount::new(Arc::clone(&fuel), 5),
            ResourceAmount::none(),
            Duration::from_millis(1),
            timing.system_backoff,
            manager.queue(),
        );
        manager.add_system(propulsion);

        let report = manager.run(&mut NullTelemetry).expect("run should finish");
        assert_eq!(report.outcome, MissionOutcome::Failure);
        assert_eq!(fuel.amount(), 0);
        for system in manager.systems() {
            assert_eq!(system.status(), SystemStatus::Terminate);
        }
    }

    #[test]
    fn capacity_event_slows_producers_of_the_resource() {
        let mut manager = Manager::with_timing(fast_timing());
        let oxygen = Resource::new("Oxygen", 50, 50);
        manager.add_resource(Arc::clone(&oxygen));
        let life_support = System::new(
            "Life Support",
            ResourceAmount::none(),
            ResourceAmount::new(Arc::clone(&oxygen), 4),
            Duration::from_millis(1),
            manager.queue(),
        );
        manager.add_system(Arc::clone(&life_support));

        let event = Event {
            system: Arc::from("Life Support"),
            resource: Some(Arc::clone(&oxygen)),
            outcome: ResourceOutcome::Capacity,
            priority: EventPriority::Low,
            amount: 50,
        };
        assert!(manager.apply_policy(&event).is_none());
        assert_eq!(life_support.status(), SystemStatus::Slow);
    }

    #[test]
    fn scarcity_event_speeds_up_producers_of_the_resource() {
        let mut manager = Manager::with_timing(fast_timing());
        let energy = Resource::new("Energy", 0, 50);
        manager.add_resource(Arc::clone(&energy));
        let generator = System::new(
            "Generator",
            ResourceAmount::none(),
            ResourceAmount::new(Arc::clone(&energy), 10),
            Duration::from_millis(1),
            manager.queue(),
        );
        manager.add_system(Arc::clone(&generator));

        // Energy is scarce but not marked critical, so the run continues
        // and its producers get a speed boost instead.
        let event = Event {
            system: Arc::from("Life Support"),
            resource: Some(Arc::clone(&energy)),
            outcome: ResourceOutcome::Empty,
            priority: EventPriority::High,
            amount: 0,
        };
        assert!(manager.apply_policy(&event).is_none());
        assert_eq!(generator.status(), SystemStatus::Fast);
    }

    #[test]
    fn saturated_critical_resource_completes_the_mission() {
        let timing = fast_timing();
        let mut manager = Manager::with_timing(timing);
        let distance = Resource::new("Distance", 4990, 5000);
        manager.add_resource(Arc::clone(&distance));
        manager.mark_critical_full(&distance);

        let propulsion = System::with_backoff(
            "Propulsion",
            ResourceAmount::none(),
            ResourceAmount::new(Arc::clone(&distance), 25),
            Duration::from_millis(1),
            timing.system_backoff,
            manager.queue(),
        );
        manager.add_system(propulsion);

        let report = manager.run(&mut NullTelemetry).expect("run should finish");
        assert_eq!(report.outcome, MissionOutcome::Success);
        assert_eq!(distance.amount(), 5000);
    }
}
