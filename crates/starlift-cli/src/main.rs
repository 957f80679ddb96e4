//! Starlift runner: loads a scenario (a TOML file path, or the built-in
//! spacecraft when none is given), runs the simulation, and renders the
//! resource levels and system statuses to the console.
//!
//! Run with: `cargo run --package starlift-cli [scenario.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use starlift_core::event::Event;
use starlift_core::manager::Manager;
use starlift_core::resource::ResourceSnapshot;
use starlift_core::sim::MissionOutcome;
use starlift_core::system::SystemSnapshot;
use starlift_core::telemetry::Telemetry;

const ANSI_CLEAR_HOME: &str = "\x1b[2J\x1b[H";

/// Console display: event log lines through the `log` facade, periodic
/// full-screen state table on stdout.
#[derive(Debug, Default)]
struct ConsoleTelemetry;

impl Telemetry for ConsoleTelemetry {
    fn record_event(&mut self, event: &Event) {
        let resource = event
            .resource
            .as_deref()
            .map(|r| r.name())
            .unwrap_or("-");
        log::info!(
            "event: [{}] resource [{}] status [{}] priority [{:?}] amount [{}]",
            event.system,
            resource,
            event.outcome,
            event.priority,
            event.amount,
        );
    }

    fn render(&mut self, resources: &[ResourceSnapshot], systems: &[SystemSnapshot]) {
        print!("{ANSI_CLEAR_HOME}");
        println!("Current Resource Amounts:");
        println!("-------------------------");
        for resource in resources {
            println!("{}: {} / {}", resource.name, resource.amount, resource.max_capacity);
        }
        println!();
        println!("System Statuses:");
        println!("----------------");
        for system in systems {
            println!("{}: {}", system.name, system.status);
        }
        println!();
    }
}

fn load_manager(path: Option<PathBuf>) -> Result<Manager, starlift_data::ScenarioError> {
    match path {
        Some(path) => {
            log::info!("loading scenario from {}", path.display());
            starlift_data::load_scenario_file(&path)
        }
        None => {
            log::info!("no scenario given; using the built-in spacecraft");
            starlift_data::spacecraft()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let manager = match load_manager(path) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut telemetry = ConsoleTelemetry;
    match manager.run(&mut telemetry) {
        Ok(report) => {
            telemetry.render(&manager.resource_snapshots(), &manager.system_snapshots());
            match report.outcome {
                MissionOutcome::Success => println!("Mission complete: distance covered."),
                MissionOutcome::Failure => println!("Mission failed: critical resource depleted."),
            }
            println!("Events processed: {}", report.events_processed);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
