#![warn(missing_docs)]
//! Automation host: wires the ore radar and the backpack companion loop
//! onto one cooperative scheduler driven by the host tick loop.

use minerworks_core::SimTick;
use minerworks_scripting::{
    AutomationConfig, CompanionSyncLoop, InteractEvent, OreRadar, ScanJob, ScriptContext,
    SyncReport, TickScheduler, TimerId,
};
use minerworks_world::WorldHost;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, warn};

/// Automation harness for one host world.
///
/// The host calls [`Automation::handle_interaction`] for interaction events
/// and [`Automation::tick`] once per simulation tick.
pub struct Automation<W> {
    scheduler: TickScheduler<W>,
    radar: OreRadar,
    companion: Rc<RefCell<CompanionSyncLoop>>,
    companion_timer: Option<TimerId>,
    sweeps_started: usize,
}

impl<W: WorldHost + 'static> Automation<W> {
    /// Build the automation and register the recurring companion pass.
    pub fn new(config: AutomationConfig) -> Self {
        let mut scheduler = TickScheduler::new();
        let interval = config.companion.interval;
        let companion = Rc::new(RefCell::new(CompanionSyncLoop::new(config.companion)));

        let script = Rc::clone(&companion);
        let timer = scheduler.run_every(interval, move |world: &mut W, tick| {
            script.borrow_mut().on_tick(world, tick)
        });
        info!(
            companion_interval = interval,
            resources = config.ore_radar.resources.len(),
            "automation started"
        );

        Self {
            scheduler,
            radar: OreRadar::new(config.ore_radar),
            companion,
            companion_timer: Some(timer),
            sweeps_started: 0,
        }
    }

    /// Handle a player interacting with an entity.
    ///
    /// Returns the scheduled sweep when the interaction started one. Host
    /// failures while resolving the sweep are logged and yield `None`.
    pub fn handle_interaction(&mut self, world: &W, event: &InteractEvent) -> Option<Rc<ScanJob>> {
        match self.radar.on_interact(world, &mut self.scheduler, event) {
            Ok(Some(job)) => {
                self.sweeps_started += 1;
                Some(job)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(player = %event.player, target = %event.target, error = %err, "ore radar interaction failed");
                None
            }
        }
    }

    /// Process one simulation tick. Returns the number of callbacks run.
    pub fn tick(&mut self, world: &mut W) -> usize {
        self.scheduler.tick(world)
    }

    /// Stop the recurring companion pass. Pending sweep steps still fire.
    pub fn shutdown(&mut self) -> bool {
        match self.companion_timer.take() {
            Some(timer) => {
                info!("companion sync stopped");
                self.scheduler.clear(timer)
            }
            None => false,
        }
    }
}

impl<W> Automation<W> {
    /// Next tick to be processed.
    pub fn current_tick(&self) -> SimTick {
        self.scheduler.now()
    }

    /// Timers waiting to fire (sweep steps plus the companion pass).
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Sweeps started so far.
    pub fn sweeps_started(&self) -> usize {
        self.sweeps_started
    }

    /// Ore radar handler.
    pub fn radar(&self) -> &OreRadar {
        &self.radar
    }

    /// Report of the latest companion pass.
    pub fn companion_report(&self) -> SyncReport {
        self.companion.borrow().last_report()
    }
}
