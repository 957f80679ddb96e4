//! Simulation-wide timing knobs and run outcomes.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Pacing parameters for a simulation run.
///
/// The defaults match interactive use; tests shrink them so a full run
/// completes in milliseconds. None of these affect correctness, only how
/// often workers and the control loop wake up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTiming {
    /// Pause after a system emits a failure/capacity event, bounding the
    /// event-emission rate under starvation.
    pub system_backoff: Duration,
    /// Sleep between control-loop drain passes.
    pub manager_poll: Duration,
    /// Minimum interval between telemetry renders.
    pub display_interval: Duration,
}

impl Default for SimTiming {
    fn default() -> Self {
        Self {
            system_backoff: Duration::from_millis(10),
            manager_poll: Duration::from_millis(100),
            display_interval: Duration::from_secs(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MissionOutcome {
    /// A critical resource reached its maximum capacity (e.g. the distance
    /// target was covered in full).
    Success,
    /// A critical resource was fully depleted.
    Failure,
}

impl std::fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissionOutcome::Success => f.write_str("success"),
            MissionOutcome::Failure => f.write_str("failure"),
        }
    }
}
