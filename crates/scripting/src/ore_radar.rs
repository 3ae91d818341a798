//! Ore radar sweeps.
//!
//! Interacting with a radar while holding a resource sample resolves every
//! matching ore block in a column under the radar once, then schedules one
//! extraction step per block, `step_interval` ticks apart. Each step drops
//! the block as an item above the radar, clears it, and emits feedback
//! commands for the acting player to run.

use crate::config::{OreRadarConfig, ResourceKind};
use crate::feedback::{dispatch_feedback, feedback_commands};
use crate::scheduler::TickScheduler;
use glam::DVec3;
use minerworks_core::{DimensionId, ItemStack, RegistryKey, SimTick};
use minerworks_world::{BlockPos, BlockVolume, EntityId, HostError, Location, WorldHost};
use std::rc::Rc;
use tracing::{debug, info};

/// A player acting on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractEvent {
    /// Acting player.
    pub player: EntityId,
    /// Entity acted on.
    pub target: EntityId,
    /// Item held by the player, if any.
    pub item: Option<ItemStack>,
}

/// A resolved sweep: the block positions found at start, in query order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanJob {
    /// Radar that started the sweep.
    pub trigger: EntityId,
    /// Player whose feedback commands announce each step.
    pub player: EntityId,
    /// Dimension the positions belong to.
    pub dimension: DimensionId,
    /// Resource kind matched by the held sample.
    pub kind: ResourceKind,
    /// Scan volume.
    pub volume: BlockVolume,
    /// Discovered positions; fixed for the life of the job.
    pub positions: Vec<BlockPos>,
    /// Scheduler tick the sweep started on.
    pub started: SimTick,
}

impl ScanJob {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the sweep found nothing.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Outcome of one extraction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Step index within the job.
    pub index: usize,
    /// Extracted position.
    pub pos: BlockPos,
    /// Block identity found at fire time.
    pub block: RegistryKey,
    /// Dropped item entity.
    pub drop: EntityId,
    /// Commands to broadcast for this step.
    pub feedback: Vec<String>,
}

/// Starts ore radar sweeps from interaction events.
#[derive(Debug, Clone)]
pub struct OreRadar {
    config: Rc<OreRadarConfig>,
}

impl OreRadar {
    /// Create a radar handler.
    pub fn new(config: OreRadarConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &OreRadarConfig {
        &self.config
    }

    /// Resource kind for a qualifying interaction.
    ///
    /// `None` unless the target is a radar and the player holds a known
    /// sample.
    pub fn qualify<W: WorldHost>(&self, world: &W, event: &InteractEvent) -> Option<&ResourceKind> {
        if world.entity_type(event.target).as_ref() != Some(&self.config.trigger) {
            return None;
        }
        let item = event.item.as_ref()?;
        self.config.resource(&item.item)
    }

    /// Column scanned under a radar at `location`.
    pub fn scan_volume(&self, location: Location) -> BlockVolume {
        let center = BlockPos::containing(location);
        let top_y = (location.y + self.config.top_offset).floor() as i32;
        BlockVolume::column(center, self.config.half_extent, top_y, self.config.floor_y)
    }

    /// Resolve the job for an interaction without scheduling it.
    pub fn plan<W: WorldHost>(
        &self,
        world: &W,
        event: &InteractEvent,
        started: SimTick,
    ) -> Result<Option<ScanJob>, HostError> {
        let Some(kind) = self.qualify(world, event) else {
            return Ok(None);
        };
        let dimension = world.dimension(event.target)?;
        let volume = self.scan_volume(world.location(event.target)?);
        let positions = world.find_blocks(dimension, &volume, &kind.target_blocks());

        Ok(Some(ScanJob {
            trigger: event.target,
            player: event.player,
            dimension,
            kind: kind.clone(),
            volume,
            positions,
            started,
        }))
    }

    /// Handle an interaction: resolve the job and schedule its steps.
    ///
    /// Non-qualifying interactions are ignored. Step `i` is scheduled
    /// `i * step_interval` ticks after the current scheduler tick.
    pub fn on_interact<W: WorldHost + 'static>(
        &self,
        world: &W,
        scheduler: &mut TickScheduler<W>,
        event: &InteractEvent,
    ) -> Result<Option<Rc<ScanJob>>, HostError> {
        let Some(job) = self.plan(world, event, scheduler.now())? else {
            return Ok(None);
        };
        let job = Rc::new(job);
        info!(
            trigger = %job.trigger,
            player = %job.player,
            ore = %job.kind.block,
            steps = job.len(),
            "ore radar sweep started"
        );

        for index in 0..job.len() {
            let job = Rc::clone(&job);
            let config = Rc::clone(&self.config);
            let delay = self.config.step_interval * index as u64;
            scheduler.run_after(delay, move |world: &mut W, tick| {
                let Some(extraction) = extract(world, &job, &config, index)? else {
                    return Ok(());
                };
                debug!(tick = tick.0, index, pos = %extraction.pos, block = %extraction.block, "extracted");
                dispatch_feedback(world, job.player, &extraction.feedback);
                Ok(())
            });
        }
        Ok(Some(job))
    }
}

/// Run step `index` of `job` against the world.
///
/// Returns `None` when the step is skipped: the radar is gone or the block
/// has already become air. Feedback is returned, not dispatched.
pub fn extract<W: WorldHost>(
    world: &mut W,
    job: &ScanJob,
    config: &OreRadarConfig,
    index: usize,
) -> Result<Option<Extraction>, HostError> {
    let Some(&pos) = job.positions.get(index) else {
        return Ok(None);
    };
    if !world.is_valid(job.trigger) {
        debug!(trigger = %job.trigger, index, "radar gone, step skipped");
        return Ok(None);
    }
    let block = world.block(job.dimension, pos);
    if block.is_air() {
        debug!(%pos, index, "block already cleared, step skipped");
        return Ok(None);
    }

    let at = world.location(job.trigger)? + DVec3::new(0.0, config.drop_offset, 0.0);
    let drop = world.spawn_item(job.dimension, ItemStack::new(block.clone(), 1), at)?;
    world.set_block(job.dimension, pos, &RegistryKey::air())?;

    Ok(Some(Extraction {
        index,
        pos,
        block,
        drop,
        feedback: feedback_commands(&config.feedback, &config.trigger),
    }))
}
