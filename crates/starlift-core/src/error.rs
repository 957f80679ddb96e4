//! Error types for the simulation engine.
//!
//! Contention outcomes (empty, insufficient, capacity) are *not* errors --
//! they are [`crate::resource::ResourceOutcome`] values carried in events.
//! Errors here are the unrecoverable conditions: broken configuration and
//! infrastructure failures.

/// Errors that can occur while running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The simulation was started with no systems configured.
    #[error("no systems configured; simulation cannot run")]
    NoSystems,

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread for system '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked instead of exiting cleanly.
    #[error("worker thread for system '{name}' panicked")]
    WorkerPanic { name: String },
}
