//! TOML scenario schema and manager construction.
//!
//! Systems reference resources by name; omitting `consumes` or `produces`
//! means that side of the conversion is a no-op (the crew consumes oxygen
//! and produces nothing). Every reference is validated before any thread
//! exists, so a malformed scenario fails fast at the manager boundary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use starlift_core::manager::Manager;
use starlift_core::resource::{Resource, ResourceAmount};
use starlift_core::sim::SimTiming;
use starlift_core::system::System;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("scenario defines no systems")]
    NoSystems,

    #[error("duplicate resource name '{name}'")]
    DuplicateResource { name: String },

    #[error("system '{system}' references unknown resource '{resource}'")]
    UnknownResourceRef { system: String, resource: String },

    #[error("critical resource list references unknown resource '{name}'")]
    UnknownCriticalRef { name: String },

    #[error("system '{system}' has a zero processing time")]
    ZeroProcessingTime { system: String },
}

// ---------------------------------------------------------------------------
// Scenario data structures
// ---------------------------------------------------------------------------

/// Top-level scenario document.
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceData>,
    #[serde(default)]
    pub systems: Vec<SystemData>,
    /// Resources whose depletion ends the run as a failure.
    #[serde(default)]
    pub critical_empty: Vec<String>,
    /// Resources whose saturation ends the run as a success.
    #[serde(default)]
    pub critical_full: Vec<String>,
    #[serde(default)]
    pub timing: TimingData,
}

/// Declaration of one resource ledger.
#[derive(Debug, serde::Deserialize)]
pub struct ResourceData {
    pub name: String,
    pub amount: u32,
    pub max_capacity: u32,
}

/// Declaration of one system and its conversion.
#[derive(Debug, serde::Deserialize)]
pub struct SystemData {
    pub name: String,
    #[serde(default)]
    pub consumes: Option<FlowData>,
    #[serde(default)]
    pub produces: Option<FlowData>,
    pub processing_time_ms: u64,
}

/// One side of a conversion: a resource reference and a per-cycle quantity.
#[derive(Debug, serde::Deserialize)]
pub struct FlowData {
    pub resource: String,
    pub amount: u32,
}

/// Optional pacing overrides, in milliseconds.
#[derive(Debug, Default, serde::Deserialize)]
pub struct TimingData {
    #[serde(default)]
    pub system_backoff_ms: Option<u64>,
    #[serde(default)]
    pub manager_poll_ms: Option<u64>,
    #[serde(default)]
    pub display_interval_ms: Option<u64>,
}

impl TimingData {
    fn to_timing(&self) -> SimTiming {
        let defaults = SimTiming::default();
        SimTiming {
            system_backoff: self
                .system_backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.system_backoff),
            manager_poll: self
                .manager_poll_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.manager_poll),
            display_interval: self
                .display_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.display_interval),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a scenario from a TOML string and build its manager.
pub fn load_scenario_toml(toml_str: &str) -> Result<Manager, ScenarioError> {
    let data: ScenarioData = toml::from_str(toml_str)?;
    build_manager(data)
}

/// Read and load a scenario file.
pub fn load_scenario_file(path: &Path) -> Result<Manager, ScenarioError> {
    let contents = std::fs::read_to_string(path)?;
    load_scenario_toml(&contents)
}

/// Resolve all name references and assemble a ready-to-run [`Manager`].
pub fn build_manager(data: ScenarioData) -> Result<Manager, ScenarioError> {
    if data.systems.is_empty() {
        return Err(ScenarioError::NoSystems);
    }

    let timing = data.timing.to_timing();
    let mut manager = Manager::with_timing(timing);

    let mut by_name: HashMap<String, Arc<Resource>> = HashMap::new();
    for resource_data in &data.resources {
        if by_name.contains_key(&resource_data.name) {
            return Err(ScenarioError::DuplicateResource {
                name: resource_data.name.clone(),
            });
        }
        let resource = Resource::new(
            &resource_data.name,
            resource_data.amount,
            resource_data.max_capacity,
        );
        by_name.insert(resource_data.name.clone(), Arc::clone(&resource));
        manager.add_resource(resource);
    }

    let resolve_flow = |system: &str, flow: &Option<FlowData>| -> Result<ResourceAmount, ScenarioError> {
        match flow {
            None => Ok(ResourceAmount::none()),
            Some(flow) => {
                let resource =
                    by_name
                        .get(&flow.resource)
                        .ok_or_else(|| ScenarioError::UnknownResourceRef {
                            system: system.to_string(),
                            resource: flow.resource.clone(),
                        })?;
                Ok(ResourceAmount::new(Arc::clone(resource), flow.amount))
            }
        }
    };

    let queue = manager.queue();
    for system_data in &data.systems {
        if system_data.processing_time_ms == 0 {
            return Err(ScenarioError::ZeroProcessingTime {
                system: system_data.name.clone(),
            });
        }
        let consumed = resolve_flow(&system_data.name, &system_data.consumes)?;
        let produced = resolve_flow(&system_data.name, &system_data.produces)?;
        manager.add_system(System::with_backoff(
            &system_data.name,
            consumed,
            produced,
            Duration::from_millis(system_data.processing_time_ms),
            timing.system_backoff,
            Arc::clone(&queue),
        ));
    }

    for name in &data.critical_empty {
        let resource = by_name
            .get(name)
            .ok_or_else(|| ScenarioError::UnknownCriticalRef { name: name.clone() })?;
        manager.mark_critical_empty(resource);
    }
    for name in &data.critical_full {
        let resource = by_name
            .get(name)
            .ok_or_else(|| ScenarioError::UnknownCriticalRef { name: name.clone() })?;
        manager.mark_critical_full(resource);
    }

    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        name = "minimal"
        critical_empty = ["Fuel"]

        [[resources]]
        name = "Fuel"
        amount = 10
        max_capacity = 100

        [[systems]]
        name = "Propulsion"
        consumes = { resource = "Fuel", amount = 5 }
        processing_time_ms = 2
    "#;

    #[test]
    fn minimal_scenario_builds() {
        let manager = load_scenario_toml(MINIMAL).expect("scenario should load");
        assert_eq!(manager.resources().len(), 1);
        assert_eq!(manager.systems().len(), 1);
        assert_eq!(manager.resources()[0].amount(), 10);
        assert_eq!(manager.systems()[0].name(), "Propulsion");
        assert!(manager.systems()[0].produced().resource().is_none());
    }

    #[test]
    fn unknown_resource_reference_is_rejected() {
        let toml_str = r#"
            [[systems]]
            name = "Propulsion"
            consumes = { resource = "Antimatter", amount = 5 }
            processing_time_ms = 2
        "#;
        let err = load_scenario_toml(toml_str).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::UnknownResourceRef { system, resource }
                if system == "Propulsion" && resource == "Antimatter"
        ));
    }

    #[test]
    fn zero_processing_time_is_rejected() {
        let toml_str = r#"
            [[systems]]
            name = "Propulsion"
            processing_time_ms = 0
        "#;
        let err = load_scenario_toml(toml_str).unwrap_err();
        assert!(matches!(err, ScenarioError::ZeroProcessingTime { system } if system == "Propulsion"));
    }

    #[test]
    fn empty_scenario_is_rejected() {
        let err = load_scenario_toml("").unwrap_err();
        assert!(matches!(err, ScenarioError::NoSystems));
    }

    #[test]
    fn duplicate_resource_names_are_rejected() {
        let toml_str = r#"
            [[resources]]
            name = "Fuel"
            amount = 10
            max_capacity = 100

            [[resources]]
            name = "Fuel"
            amount = 5
            max_capacity = 50

            [[systems]]
            name = "Propulsion"
            processing_time_ms = 2
        "#;
        let err = load_scenario_toml(toml_str).unwrap_err();
        assert!(matches!(err, ScenarioError::DuplicateResource { name } if name == "Fuel"));
    }

    #[test]
    fn timing_overrides_apply() {
        let toml_str = r#"
            [[systems]]
            name = "Propulsion"
            processing_time_ms = 2

            [timing]
            manager_poll_ms = 5
            display_interval_ms = 50
        "#;
        let manager = load_scenario_toml(toml_str).expect("scenario should load");
        assert_eq!(manager.timing().manager_poll, Duration::from_millis(5));
        assert_eq!(
            manager.timing().display_interval,
            Duration::from_millis(50)
        );
        assert_eq!(
            manager.timing().system_backoff,
            SimTiming::default().system_backoff
        );
    }

    #[test]
    fn unknown_critical_reference_is_rejected() {
        let toml_str = r#"
            critical_empty = ["Oxygen"]

            [[systems]]
            name = "Propulsion"
            processing_time_ms = 2
        "#;
        let err = load_scenario_toml(toml_str).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownCriticalRef { name } if name == "Oxygen"));
    }
}
