//! Headless Doppler run: the realtime engine with a text readout.
//!
//! Starts a stationary 2 Hz source, waits for the observer to lock on,
//! then drives the source towards the observer and back, printing the
//! emitted and observed frequency every half second.
//!
//! Run with:
//!   RUST_LOG=doppler_engine=debug cargo run --example headless

use std::thread;
use std::time::Duration;

use doppler_engine::{EngineConfig, RealtimeConfig, RealtimeSimulation};
use tracing_subscriber::EnvFilter;

fn print_status(sim: &RealtimeSimulation) {
    if let Some(s) = sim.latest_snapshot() {
        println!(
            "tick {:>5}  x {:>7.1}  v {:>7.1}  mach {:.2}  emitted {:>5.2} Hz  heard {:>5.2} Hz{}",
            s.tick.0,
            s.source_position.x,
            s.source_velocity,
            s.mach_number,
            s.source_frequency,
            s.observed_frequency,
            if s.overloaded { "  [overloaded]" } else { "" },
        );
    }
}

fn run_phase(sim: &RealtimeSimulation, label: &str, seconds: u32) {
    println!("── {label} ──");
    for _ in 0..seconds * 2 {
        thread::sleep(Duration::from_millis(500));
        print_status(sim);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::default();
    let mut sim = RealtimeSimulation::new(config, RealtimeConfig::default())?;

    run_phase(&sim, "stationary", 5);

    sim.set_source_speed(-80.0)?;
    run_phase(&sim, "approaching at 80", 8);

    sim.set_source_frequency(3.0)?;
    run_phase(&sim, "3 Hz", 6);

    sim.set_source_frequency(0.0)?;
    run_phase(&sim, "silent", 4);

    let report = sim.shutdown();
    println!(
        "shut down in {} ms after {} ticks",
        report.total_ms,
        report.ticks_run.unwrap_or(0)
    );
    Ok(())
}
