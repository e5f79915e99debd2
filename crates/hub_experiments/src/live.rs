//! Wall-clock paced driver.
//!
//! A background thread advances the simulation by a fixed slice of simulated
//! time on every tick of wall time and logs the status line. Other threads
//! reach the same simulation through [LiveDriver::apply] or
//! [LiveDriver::with_simulation]; all access goes through one mutex, so
//! control calls always land between steps.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hub_core::error::ControlResult;
use hub_core::simulation::Simulation;
use hub_core::telemetry::SimStats;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// A control-surface call that can be scripted or sent from another thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ControlAction {
    AddVehicle,
    RemoveIdleVehicle,
    SetArrivalRate(f64),
    SetVehicleSpeed(f64),
}

impl ControlAction {
    pub fn apply(self, sim: &mut Simulation) -> ControlResult<()> {
        match self {
            ControlAction::AddVehicle => {
                sim.add_vehicle();
                Ok(())
            }
            ControlAction::RemoveIdleVehicle => sim.remove_idle_vehicle().map(|_| ()),
            ControlAction::SetArrivalRate(rate) => sim.set_arrival_rate(rate),
            ControlAction::SetVehicleSpeed(speed) => sim.set_vehicle_speed(speed),
        }
    }
}

/// A control action to fire once `at` wall time has passed since start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    pub at: Duration,
    pub action: ControlAction,
}

/// Add a vehicle at 10 s, double demand at 25 s, drop an idle vehicle at 35 s.
pub fn demo_script() -> Vec<ScriptedAction> {
    vec![
        ScriptedAction {
            at: Duration::from_secs(10),
            action: ControlAction::AddVehicle,
        },
        ScriptedAction {
            at: Duration::from_secs(25),
            action: ControlAction::SetArrivalRate(200.0),
        },
        ScriptedAction {
            at: Duration::from_secs(35),
            action: ControlAction::RemoveIdleVehicle,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveConfig {
    /// Wall time between slices.
    pub tick: Duration,
    /// Simulated time advanced per slice. Slices are contiguous, so after
    /// `n` ticks the simulation covers exactly `n * sim_per_tick_ms`.
    pub sim_per_tick_ms: u64,
    /// Stop after this much wall time; `None` runs until [LiveDriver::stop].
    pub duration: Option<Duration>,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            sim_per_tick_ms: 1_000,
            duration: Some(Duration::from_secs(60)),
        }
    }
}

fn lock(sim: &Mutex<Simulation>) -> MutexGuard<'_, Simulation> {
    sim.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct LiveDriver {
    sim: Arc<Mutex<Simulation>>,
    stop: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    started_at: Instant,
    handle: Option<JoinHandle<()>>,
}

impl LiveDriver {
    /// Take ownership of `sim` and start pacing it on a background thread.
    pub fn spawn(sim: Simulation, config: LiveConfig) -> Self {
        let sim = Arc::new(Mutex::new(sim));
        let stop = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));
        let started_at = Instant::now();

        let handle = {
            let sim = Arc::clone(&sim);
            let stop = Arc::clone(&stop);
            let ticks = Arc::clone(&ticks);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if config
                        .duration
                        .is_some_and(|limit| started_at.elapsed() >= limit)
                    {
                        info!("live run finished after {:?}", started_at.elapsed());
                        break;
                    }
                    let stats = {
                        let mut sim = lock(&sim);
                        sim.run_for(config.sim_per_tick_ms);
                        ticks.fetch_add(1, Ordering::Relaxed);
                        sim.stats()
                    };
                    info!("{stats}");
                    thread::sleep(config.tick);
                }
            })
        };

        Self {
            sim,
            stop,
            ticks,
            started_at,
            handle: Some(handle),
        }
    }

    pub fn apply(&self, action: ControlAction) -> ControlResult<()> {
        let result = action.apply(&mut lock(&self.sim));
        if let Err(err) = &result {
            warn!("{action:?} rejected: {err}");
        }
        result
    }

    pub fn stats(&self) -> SimStats {
        lock(&self.sim).stats()
    }

    /// Run `f` with exclusive access to the simulation.
    pub fn with_simulation<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut lock(&self.sim))
    }

    /// Slices advanced so far. Counted under the simulation lock, so inside
    /// [Self::with_simulation] it agrees with the simulated time covered.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Fire each action once its wall-clock offset has passed. Blocks until
    /// the last action ran or the driver stopped.
    pub fn run_script(&self, script: &[ScriptedAction]) {
        let mut actions = script.to_vec();
        actions.sort_by_key(|scripted| scripted.at);
        for scripted in actions {
            while self.started_at.elapsed() < scripted.at {
                if self.is_finished() {
                    return;
                }
                let remaining = scripted.at.saturating_sub(self.started_at.elapsed());
                thread::sleep(remaining.min(Duration::from_millis(50)));
            }
            info!("---> {:?} at {:?}", scripted.action, scripted.at);
            // A rejected action is logged by `apply`; the script carries on.
            if self.apply(scripted.action).is_ok() {
                debug!("{:?} applied", scripted.action);
            }
        }
    }

    /// Block until the run ends on its own (only with a duration limit).
    pub fn join(mut self) -> SimStats {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("live driver thread panicked");
            }
        }
        self.stats()
    }

    /// Stop the background thread and return the final stats.
    pub fn stop(self) -> SimStats {
        self.stop.store(true, Ordering::Relaxed);
        self.join()
    }
}

impl Drop for LiveDriver {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
