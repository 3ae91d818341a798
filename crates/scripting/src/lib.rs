#![warn(missing_docs)]
//! Tick-driven automation hooks: the cooperative scheduler, the ore radar
//! sweep and the backpack companion sync loop.

pub mod companion;
pub mod config;
pub mod feedback;
pub mod ore_radar;
pub mod scheduler;

use anyhow::Result;
use minerworks_core::SimTick;

pub use companion::{CompanionSyncLoop, PlayerSlotState, Provisioned, SyncReport};
pub use config::{AutomationConfig, CompanionConfig, FeedbackConfig, OreRadarConfig, ResourceKind, TierEvent};
pub use feedback::{dispatch_feedback, feedback_commands};
pub use ore_radar::{extract, Extraction, InteractEvent, OreRadar, ScanJob};
pub use scheduler::{TickScheduler, TimerId};

/// A script context invoked on a recurring schedule.
pub trait ScriptContext<W> {
    /// Called with the host world and the scheduler tick being processed.
    fn on_tick(&mut self, world: &mut W, tick: SimTick) -> Result<()>;
}
