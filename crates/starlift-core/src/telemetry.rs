//! Observer seam between the engine and display/logging code.
//!
//! The manager forwards every drained event to the configured telemetry
//! sink and triggers a rate-limited render of the current resource levels
//! and system statuses. Telemetry is read-only: it receives snapshots, not
//! live handles, and must never mutate simulation state.

use crate::event::Event;
use crate::resource::ResourceSnapshot;
use crate::system::SystemSnapshot;

/// Receiver for simulation observations.
pub trait Telemetry: Send {
    /// Called once per event drained from the queue, in pop order.
    fn record_event(&mut self, event: &Event);

    /// Called at most once per display interval with the current state.
    fn render(&mut self, resources: &[ResourceSnapshot], systems: &[SystemSnapshot]);
}

/// Telemetry sink that forwards everything to the `log` facade.
#[derive(Debug, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn record_event(&mut self, event: &Event) {
        let resource = event
            .resource
            .as_deref()
            .map(|r| r.name())
            .unwrap_or("-");
        log::info!(
            "event: system [{}] resource [{}] outcome [{}] priority [{:?}] amount [{}]",
            event.system,
            resource,
            event.outcome,
            event.priority,
            event.amount,
        );
    }

    fn render(&mut self, resources: &[ResourceSnapshot], systems: &[SystemSnapshot]) {
        for resource in resources {
            log::info!(
                "resource {}: {} / {}",
                resource.name,
                resource.amount,
                resource.max_capacity
            );
        }
        for system in systems {
            log::info!(
                "system {}: {} (stored {})",
                system.name,
                system.status,
                system.amount_stored
            );
        }
    }
}

/// Telemetry sink that discards everything. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn record_event(&mut self, _event: &Event) {}

    fn render(&mut self, _resources: &[ResourceSnapshot], _systems: &[SystemSnapshot]) {}
}
