//! Shared helpers for unit, integration, and property tests.
//!
//! Gated behind the `test-utils` feature so downstream crates can build
//! quick scenarios without repeating construction boilerplate.

use std::sync::Arc;
use std::time::Duration;

use crate::event::EventQueue;
use crate::resource::{Resource, ResourceAmount};
use crate::sim::SimTiming;
use crate::system::System;

/// Timing tuned so a full run completes in tens of milliseconds.
pub fn fast_timing() -> SimTiming {
    SimTiming {
        system_backoff: Duration::from_millis(1),
        manager_poll: Duration::from_millis(2),
        display_interval: Duration::from_secs(3600),
    }
}

/// Build a system with millisecond pacing that consumes `consumed` and
/// produces `produced`.
pub fn quick_system(
    name: &str,
    consumed: Option<(&Arc<Resource>, u32)>,
    produced: Option<(&Arc<Resource>, u32)>,
    queue: Arc<EventQueue>,
) -> Arc<System> {
    let consumed = match consumed {
        Some((resource, amount)) => ResourceAmount::new(Arc::clone(resource), amount),
        None => ResourceAmount::none(),
    };
    let produced = match produced {
        Some((resource, amount)) => ResourceAmount::new(Arc::clone(resource), amount),
        None => ResourceAmount::none(),
    };
    System::with_backoff(
        name,
        consumed,
        produced,
        Duration::from_millis(1),
        Duration::from_millis(1),
        queue,
    )
}
