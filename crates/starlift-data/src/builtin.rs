//! The built-in spacecraft scenario.
//!
//! A small closed economy modelling a crewed flight: the generator burns
//! fuel into energy, life support turns energy into oxygen, the crew
//! breathes, and propulsion burns fuel into distance covered. The run ends
//! in failure when fuel or oxygen is depleted, or in success when the full
//! distance has been covered.

use starlift_core::manager::Manager;

use crate::scenario::{ScenarioError, load_scenario_toml};

const SPACECRAFT_TOML: &str = r#"
name = "spacecraft"
critical_empty = ["Fuel", "Oxygen"]
critical_full = ["Distance"]

[[resources]]
name = "Fuel"
amount = 1000
max_capacity = 1000

[[resources]]
name = "Oxygen"
amount = 20
max_capacity = 50

[[resources]]
name = "Energy"
amount = 30
max_capacity = 50

[[resources]]
name = "Distance"
amount = 0
max_capacity = 5000

[[systems]]
name = "Propulsion"
consumes = { resource = "Fuel", amount = 5 }
produces = { resource = "Distance", amount = 25 }
processing_time_ms = 50

[[systems]]
name = "Life Support"
consumes = { resource = "Energy", amount = 7 }
produces = { resource = "Oxygen", amount = 4 }
processing_time_ms = 10

[[systems]]
name = "Crew"
consumes = { resource = "Oxygen", amount = 1 }
processing_time_ms = 2

[[systems]]
name = "Generator"
consumes = { resource = "Fuel", amount = 5 }
produces = { resource = "Energy", amount = 10 }
processing_time_ms = 20
"#;

/// Build the spacecraft demo scenario.
pub fn spacecraft() -> Result<Manager, ScenarioError> {
    load_scenario_toml(SPACECRAFT_TOML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacecraft_scenario_loads() {
        let manager = spacecraft().expect("built-in scenario must be valid");
        assert_eq!(manager.resources().len(), 4);
        assert_eq!(manager.systems().len(), 4);

        let names: Vec<&str> = manager.systems().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Propulsion", "Life Support", "Crew", "Generator"]);

        let fuel = &manager.resources()[0];
        assert_eq!(fuel.name(), "Fuel");
        assert_eq!(fuel.amount(), 1000);
        assert_eq!(fuel.max_capacity(), 1000);
    }
}
