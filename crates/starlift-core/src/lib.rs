//! Starlift Core -- the concurrency engine for closed resource-economy
//! simulations.
//!
//! A simulation is a fixed set of [`system::System`]s, each converting one
//! resource into another, contending over shared capacity-bounded
//! [`resource::Resource`] ledgers. Each system runs on its own worker thread;
//! the [`manager::Manager`] runs the control loop that drains status events,
//! applies throttling and termination policy, and joins every worker on
//! shutdown.
//!
//! # Execution Model
//!
//! - One OS thread per system, plus the manager's control loop on the
//!   calling thread.
//! - Each resource ledger is guarded by its own mutex; locks are held only
//!   for the read-modify-write on the amount, never across a sleep or a
//!   queue operation, and never nested.
//! - The [`event::EventQueue`] is the sole channel from systems back to the
//!   manager: a priority-ordered queue under a single mutex, FIFO within a
//!   priority band.
//! - A system's status is a single atomic flag, written only by the manager
//!   and read only by that system's worker. `Terminate` is one-way.
//!
//! # Key Types
//!
//! - [`resource::Resource`] -- named, capacity-bounded counter with
//!   `try_consume` / `try_store` ledger operations.
//! - [`event::EventQueue`] -- priority-ordered, thread-safe event channel.
//! - [`system::System`] -- two-phase convert/store worker state machine.
//! - [`manager::Manager`] -- owns the collections, spawns and joins the
//!   workers, runs the policy loop.
//! - [`telemetry::Telemetry`] -- observer seam for event logging and
//!   rate-limited state rendering.

pub mod error;
pub mod event;
pub mod manager;
pub mod resource;
pub mod sim;
pub mod system;
pub mod telemetry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::ManagerError;
pub use event::{Event, EventPriority, EventQueue};
pub use manager::{Manager, RunReport};
pub use resource::{Resource, ResourceAmount, ResourceOutcome, StoreResult};
pub use sim::{MissionOutcome, SimTiming};
pub use system::{System, SystemStatus};
pub use telemetry::{LogTelemetry, NullTelemetry, Telemetry};
