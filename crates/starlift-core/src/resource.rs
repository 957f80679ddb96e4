//! Capacity-bounded resource ledgers.
//!
//! A [`Resource`] is a named counter of available quantity with a fixed
//! maximum capacity. Systems consume from and store into resources
//! concurrently; every mutation happens under the resource's own mutex, so
//! `0 <= amount <= max_capacity` holds at every point observable outside a
//! critical section.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Ledger outcomes
// ---------------------------------------------------------------------------

/// Outcome of a ledger operation. These are normal backpressure signals,
/// not errors: a system translates them into events, never into faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ResourceOutcome {
    /// The operation completed in full.
    Ok,
    /// Consumption failed with nothing left at all.
    Empty,
    /// Consumption failed with some quantity left, but less than requested.
    Insufficient,
    /// Storage could not fit everything; some quantity is left over.
    Capacity,
}

impl std::fmt::Display for ResourceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceOutcome::Ok => "ok",
            ResourceOutcome::Empty => "empty",
            ResourceOutcome::Insufficient => "insufficient",
            ResourceOutcome::Capacity => "capacity",
        };
        f.write_str(s)
    }
}

/// Result of a [`Resource::try_store`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreResult {
    /// Quantity actually stored this call.
    pub stored: u32,
    /// Quantity that did not fit and remains the caller's responsibility.
    pub leftover: u32,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A named, capacity-bounded shared counter.
///
/// Shared between worker threads via `Arc`; the amount sits behind a
/// per-resource mutex. Lock hold time is bounded to the read-modify-write
/// itself -- callers never sleep or touch the event queue while holding it.
#[derive(Debug)]
pub struct Resource {
    name: Arc<str>,
    max_capacity: u32,
    amount: Mutex<u32>,
}

impl Resource {
    /// Create a new resource. `amount` is clamped to `max_capacity`.
    pub fn new(name: &str, amount: u32, max_capacity: u32) -> Arc<Self> {
        Arc::new(Self {
            name: Arc::from(name),
            max_capacity,
            amount: Mutex::new(amount.min(max_capacity)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Current quantity. Diagnostic read; the value may be stale by the
    /// time the caller looks at it.
    pub fn amount(&self) -> u32 {
        *self.amount.lock().expect("resource mutex poisoned")
    }

    /// Attempt to consume `amount` units.
    ///
    /// Under the lock: if enough is available, subtract and report
    /// [`ResourceOutcome::Ok`]. Otherwise report [`ResourceOutcome::Empty`]
    /// when the ledger is at zero, [`ResourceOutcome::Insufficient`] when
    /// something is left but not enough. Empty is the harder failure and is
    /// treated with more urgency downstream.
    pub fn try_consume(&self, amount: u32) -> ResourceOutcome {
        let mut current = self.amount.lock().expect("resource mutex poisoned");
        if *current >= amount {
            *current -= amount;
            ResourceOutcome::Ok
        } else if *current == 0 {
            ResourceOutcome::Empty
        } else {
            ResourceOutcome::Insufficient
        }
    }

    /// Store up to `amount` units, bounded by the remaining capacity.
    ///
    /// Stores `min(amount, max_capacity - current)` and returns how much
    /// was stored and how much is left over. Never exceeds `max_capacity`.
    pub fn try_store(&self, amount: u32) -> StoreResult {
        let mut current = self.amount.lock().expect("resource mutex poisoned");
        let available = self.max_capacity - *current;
        let stored = amount.min(available);
        *current += stored;
        StoreResult {
            stored,
            leftover: amount - stored,
        }
    }

    /// Read-only snapshot for telemetry.
    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            name: self.name.to_string(),
            amount: self.amount(),
            max_capacity: self.max_capacity,
        }
    }
}

/// Point-in-time view of a resource, safe to hand to display code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceSnapshot {
    pub name: String,
    pub amount: u32,
    pub max_capacity: u32,
}

// ---------------------------------------------------------------------------
// ResourceAmount
// ---------------------------------------------------------------------------

/// An immutable (resource, quantity) pairing describing one side of a
/// system's conversion: what it consumes per cycle or what it produces.
///
/// The resource reference is optional. `ResourceAmount::none()` means
/// "consumes/produces nothing" and that phase is trivially successful.
#[derive(Debug, Clone)]
pub struct ResourceAmount {
    resource: Option<Arc<Resource>>,
    amount: u32,
}

impl ResourceAmount {
    pub fn new(resource: Arc<Resource>, amount: u32) -> Self {
        Self {
            resource: Some(resource),
            amount,
        }
    }

    /// The no-op requirement: no resource, amount zero.
    pub fn none() -> Self {
        Self {
            resource: None,
            amount: 0,
        }
    }

    pub fn resource(&self) -> Option<&Arc<Resource>> {
        self.resource.as_ref()
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_subtracts_when_enough() {
        let fuel = Resource::new("Fuel", 10, 100);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Ok);
        assert_eq!(fuel.amount(), 5);
    }

    #[test]
    fn consume_distinguishes_empty_from_insufficient() {
        let fuel = Resource::new("Fuel", 3, 100);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Insufficient);
        assert_eq!(fuel.amount(), 3);
        assert_eq!(fuel.try_consume(3), ResourceOutcome::Ok);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Empty);
        assert_eq!(fuel.amount(), 0);
    }

    #[test]
    fn fuel_depletes_in_two_cycles() {
        // Resource("Fuel", 10, 100), consuming 5 per cycle: two successes,
        // then the third attempt finds the ledger empty.
        let fuel = Resource::new("Fuel", 10, 100);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Ok);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Ok);
        assert_eq!(fuel.amount(), 0);
        assert_eq!(fuel.try_consume(5), ResourceOutcome::Empty);
    }

    #[test]
    fn store_respects_capacity() {
        let distance = Resource::new("Distance", 4990, 5000);
        let result = distance.try_store(25);
        assert_eq!(result.stored, 10);
        assert_eq!(result.leftover, 15);
        assert_eq!(distance.amount(), 5000);
    }

    #[test]
    fn store_into_full_resource_keeps_everything_leftover() {
        let tank = Resource::new("Oxygen", 50, 50);
        let result = tank.try_store(4);
        assert_eq!(result.stored, 0);
        assert_eq!(result.leftover, 4);
        assert_eq!(tank.amount(), 50);
    }

    #[test]
    fn initial_amount_clamped_to_capacity() {
        let tank = Resource::new("Oxygen", 80, 50);
        assert_eq!(tank.amount(), 50);
    }

    #[test]
    fn none_requirement_is_zero() {
        let none = ResourceAmount::none();
        assert!(none.resource().is_none());
        assert_eq!(none.amount(), 0);
    }
}
