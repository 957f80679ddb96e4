//! Starlift Data -- scenario definitions and loading.
//!
//! A scenario is a TOML document declaring resources, systems (with their
//! consumed/produced flows referencing resources by name), critical-resource
//! policy, and optional timing overrides. Loading resolves the references
//! and produces a ready-to-run [`starlift_core::Manager`].

pub mod builtin;
pub mod scenario;

pub use builtin::spacecraft;
pub use scenario::{ScenarioData, ScenarioError, load_scenario_file, load_scenario_toml};
