//! Run the default hub scenario for one simulated hour, applying the classic
//! control walkthrough at fixed simulated times.
//!
//! Run with: cargo run -p hub_core --example scenario_run

use hub_core::clock::ONE_MIN_MS;
use hub_core::scenario::ScenarioParams;
use hub_core::simulation::Simulation;

fn main() {
    const SIMULATION_MINUTES: u64 = 60;

    let params = ScenarioParams::default().with_seed(123);
    let mut sim = match Simulation::new(&params) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid scenario: {err}");
            return;
        }
    };

    println!(
        "--- Hub scenario ({} vehicles, {} req/min, seed 123) ---",
        params.initial_fleet_size, params.arrival_rate_per_minute
    );
    for minute in 1..=SIMULATION_MINUTES {
        sim.run_until(minute * ONE_MIN_MS);
        match minute {
            10 => {
                let id = sim.add_vehicle();
                println!("---> added {id}");
            }
            25 => {
                if sim.set_arrival_rate(200.0).is_ok() {
                    println!("---> request rate set to 200/min");
                }
            }
            35 => match sim.remove_idle_vehicle() {
                Ok(id) => println!("---> removed {id}"),
                Err(err) => println!("---> {err}"),
            },
            _ => {}
        }
        println!("{}", sim.stats());
    }

    let trips: Vec<u64> = sim.vehicles().iter().map(|v| v.completed_trip_count).collect();
    println!("\nTrips per vehicle (registration order): {trips:?}");
}
