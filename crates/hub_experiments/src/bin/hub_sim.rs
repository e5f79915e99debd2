use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hub_core::clock::{ONE_HOUR_MS, ONE_MIN_MS, ONE_SEC_MS};
use hub_core::demand::ArrivalProcess;
use hub_core::profile::{DemandProfile, DEFAULT_DAILY_TOTAL};
use hub_core::scenario::{kmh_to_per_sec, ScenarioParams};
use hub_core::simulation::Simulation;
use hub_experiments::live::demo_script;
use hub_experiments::{
    export_to_csv, export_to_json, load_scenario_params, run_parallel_experiments,
    run_with_profile, smallest_fleet_meeting_target, LiveConfig, LiveDriver, ParameterSpace,
};
use log::info;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "hub_sim",
    about = "Discrete-event simulation of on-demand vehicles serving a transit hub"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print a status line every simulated minute
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Simulated minutes to run
        #[arg(long, default_value_t = 60)]
        minutes: u64,
        /// Print the final stats as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sweep fleet sizes and demand levels in parallel
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, value_delimiter = ',', default_values_t = [15, 20, 25, 30, 40])]
        fleet_sizes: Vec<usize>,
        /// Arrival rates (requests per minute)
        #[arg(long, value_delimiter = ',', default_values_t = [100.0])]
        rates: Vec<f64>,
        /// Seeds per combination
        #[arg(long, default_value_t = 3)]
        runs: usize,
        /// Simulated hours per run
        #[arg(long, default_value_t = 4)]
        hours: u64,
        #[arg(long)]
        threads: Option<usize>,
        /// Report the smallest fleet whose average wait stays under this many seconds
        #[arg(long)]
        max_wait_secs: Option<f64>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Pace the simulation against the wall clock
    Live {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Wall-clock seconds to run
        #[arg(long, default_value_t = 60)]
        seconds: u64,
        /// Wall-clock milliseconds between updates
        #[arg(long, default_value_t = 500)]
        tick_ms: u64,
        /// Simulated seconds advanced per update
        #[arg(long, default_value_t = 1)]
        sim_secs_per_tick: u64,
        /// Replay the scripted walkthrough: add a vehicle, raise demand, remove a vehicle
        #[arg(long)]
        demo: bool,
    },
    /// Drive the arrival rate from a time-of-day demand curve
    Profile {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(value_enum, long, default_value_t = ProfileShape::Bimodal)]
        shape: ProfileShape,
        /// Passengers per day
        #[arg(long, default_value_t = DEFAULT_DAILY_TOTAL)]
        daily_total: f64,
        /// Simulated hours to run
        #[arg(long, default_value_t = 24)]
        hours: u64,
        /// Simulated minutes between rate updates and status lines
        #[arg(long, default_value_t = 60)]
        interval_minutes: u64,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// Scenario JSON file; flags below override its fields
    #[arg(long, env = "HUB_SIM_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    fleet: Option<usize>,
    /// Requests per minute
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long)]
    speed_kmh: Option<f64>,
    #[arg(long)]
    radius: Option<f64>,
    #[arg(value_enum, long)]
    process: Option<ProcessArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProcessArg {
    Poisson,
    Fixed,
}

impl From<ProcessArg> for ArrivalProcess {
    fn from(arg: ProcessArg) -> Self {
        match arg {
            ProcessArg::Poisson => ArrivalProcess::Poisson,
            ProcessArg::Fixed => ArrivalProcess::FixedInterval,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileShape {
    /// Morning and evening gamma peaks
    Bimodal,
    /// Four commute peaks with a night floor
    Normal,
    /// Constant at the scenario's rate
    Flat,
}

// ── helpers ────────────────────────────────────────────────────────

impl ScenarioArgs {
    fn params(&self) -> Result<ScenarioParams, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => load_scenario_params(path)?,
            None => ScenarioParams::default(),
        };
        if let Some(seed) = self.seed {
            params = params.with_seed(seed);
        }
        if let Some(fleet) = self.fleet {
            params = params.with_fleet_size(fleet);
        }
        if let Some(rate) = self.rate {
            params = params.with_arrival_rate(rate);
        }
        if let Some(kmh) = self.speed_kmh {
            params = params.with_speed(kmh_to_per_sec(kmh));
        }
        if let Some(radius) = self.radius {
            params = params.with_service_radius(radius);
        }
        if let Some(process) = self.process {
            params = params.with_arrival_process(process.into());
        }
        params.validate()?;
        Ok(params)
    }
}

fn print_summary(sim: &Simulation) {
    let stats = sim.stats();
    println!("\n--- Final Simulation Stats ---");
    println!("Total Completed Requests: {}", stats.completed_count);
    println!("Average Waiting Time: {:.2} s", stats.avg_wait_secs());
    println!("Average Travel Time: {:.2} s", stats.avg_service_secs());
    println!("Final Queue Length: {}", stats.backlog_length);
}

// ── commands ───────────────────────────────────────────────────────

fn run(scenario: &ScenarioArgs, minutes: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = Simulation::new(&scenario.params()?)?;
    for minute in 1..=minutes {
        sim.run_until(minute * ONE_MIN_MS);
        if !json {
            println!("{}", sim.stats());
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&sim.stats())?);
    } else {
        print_summary(&sim);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sweep(
    scenario: &ScenarioArgs,
    fleet_sizes: Vec<usize>,
    rates: Vec<f64>,
    runs: usize,
    hours: u64,
    threads: Option<usize>,
    max_wait_secs: Option<f64>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let sets = ParameterSpace::grid()
        .with_base(scenario.params()?)
        .fleet_size(fleet_sizes)
        .arrival_rate(rates)
        .runs_per_combination(runs)
        .duration_ms(hours * ONE_HOUR_MS)
        .generate();
    info!("running {} simulations", sets.len());

    let results = run_parallel_experiments(&sets, threads).map_err(|err| err.to_string())?;

    println!(
        "{:<10} {:>6} {:>8} {:>10} {:>12} {:>10} {:>8} {:>10}",
        "experiment", "fleet", "rate", "completed", "avg wait s", "p90 s", "backlog", "util"
    );
    for (set, result) in sets.iter().zip(&results) {
        println!(
            "{:<10} {:>6} {:>8.1} {:>10} {:>12.1} {:>10.1} {:>8} {:>9.1}%",
            set.experiment_id,
            result.fleet_size,
            set.params.arrival_rate_per_minute,
            result.completed_count,
            result.avg_wait_secs(),
            result.p90_wait_ms / 1000.0,
            result.final_backlog,
            result.vehicle_utilisation * 100.0,
        );
    }

    if let Some(max_wait) = max_wait_secs {
        match smallest_fleet_meeting_target(&results, &sets, max_wait * 1000.0) {
            Some(best) => println!(
                "\nSmallest fleet with average wait <= {max_wait:.1}s: {} vehicles ({})",
                best.params.initial_fleet_size, best.experiment_id
            ),
            None => println!("\nNo fleet size met an average wait of {max_wait:.1}s"),
        }
    }
    if let Some(path) = csv {
        export_to_csv(&results, &sets, &path)?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = json {
        export_to_json(&results, &path)?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn live(
    scenario: &ScenarioArgs,
    seconds: u64,
    tick_ms: u64,
    sim_secs_per_tick: u64,
    demo: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let sim = Simulation::new(&scenario.params()?)?;
    let driver = LiveDriver::spawn(
        sim,
        LiveConfig {
            tick: Duration::from_millis(tick_ms),
            sim_per_tick_ms: sim_secs_per_tick * ONE_SEC_MS,
            duration: Some(Duration::from_secs(seconds)),
        },
    );
    if demo {
        driver.run_script(&demo_script());
    }
    let stats = driver.join();
    println!("{stats}");
    Ok(())
}

fn profile(
    scenario: &ScenarioArgs,
    shape: ProfileShape,
    daily_total: f64,
    hours: u64,
    interval_minutes: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = scenario.params()?;
    let profile = match shape {
        ProfileShape::Bimodal => DemandProfile::bimodal_gamma(daily_total),
        ProfileShape::Normal => DemandProfile::normal_mixture(daily_total),
        ProfileShape::Flat => DemandProfile::flat(params.arrival_rate_per_minute),
    };
    println!("hour  req/min");
    for (hour, rate) in profile.hourly_rates.iter().enumerate() {
        println!("{hour:>4}  {rate:>7.2}");
    }

    let mut sim = Simulation::new(&params)?;
    run_with_profile(
        &mut sim,
        &profile,
        hours * ONE_HOUR_MS,
        interval_minutes * ONE_MIN_MS,
        |stats| println!("{stats}"),
    );
    print_summary(&sim);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            minutes,
            json,
        } => run(&scenario, minutes, json),
        Commands::Sweep {
            scenario,
            fleet_sizes,
            rates,
            runs,
            hours,
            threads,
            max_wait_secs,
            csv,
            json,
        } => sweep(
            &scenario,
            fleet_sizes,
            rates,
            runs,
            hours,
            threads,
            max_wait_secs,
            csv,
            json,
        ),
        Commands::Live {
            scenario,
            seconds,
            tick_ms,
            sim_secs_per_tick,
            demo,
        } => live(&scenario, seconds, tick_ms, sim_secs_per_tick, demo),
        Commands::Profile {
            scenario,
            shape,
            daily_total,
            hours,
            interval_minutes,
        } => profile(&scenario, shape, daily_total, hours, interval_minutes),
    }
}
