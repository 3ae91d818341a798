//! Seeded demo scene for headless runs.
//!
//! One player stands next to an ore radar. Ores of a single resource kind
//! are scattered through the radar's scan column, and a short script
//! equips a backpack, starts a sweep, then takes the backpack off and puts
//! it back on.

use anyhow::{Context, Result};
use minerworks_core::{scoped_rng, DimensionId, ItemStack, RegistryKey, SimTick};
use minerworks_scripting::{AutomationConfig, ResourceKind};
use minerworks_world::{BlockHost, BlockPos, EntityId, Location, SimWorld};
use rand::Rng;
use std::collections::BTreeSet;

const SCENE_DOMAIN: u64 = 0x4F52_4553;
const DIM: DimensionId = DimensionId::Overworld;
const ORE_COUNT: usize = 6;

pub const EQUIP_TICK: u64 = 5;
pub const INTERACT_TICK: u64 = 10;
pub const UNEQUIP_TICK: u64 = 200;
pub const REEQUIP_TICK: u64 = 260;

/// Something the scripted player does on a given tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    /// Put an item in the companion slot, or empty it.
    Equip(Option<RegistryKey>),
    /// Interact with the radar while holding an item.
    Interact(RegistryKey),
}

#[derive(Debug)]
pub struct DemoScene {
    pub world: SimWorld,
    pub player: EntityId,
    pub radar: EntityId,
    pub resource: ResourceKind,
    pub ores: Vec<BlockPos>,
    actions: Vec<(u64, SceneAction)>,
}

impl DemoScene {
    pub fn build(config: &AutomationConfig, world_seed: u64) -> Result<Self> {
        let mut rng = scoped_rng(world_seed, SCENE_DOMAIN, SimTick::ZERO);
        let radar_cfg = &config.ore_radar;
        let resource = radar_cfg
            .resources
            .get(rng.gen_range(0..radar_cfg.resources.len().max(1)))
            .cloned()
            .context("ore radar config lists no resources")?;

        let mut world = SimWorld::new();
        let radar_at = Location::new(0.5, 64.0, 0.5);
        let player = world.add_player(DIM, Location::new(2.5, 64.0, 0.5));
        let radar = world.add_entity(DIM, radar_cfg.trigger.clone(), radar_at);

        let extent = radar_cfg.half_extent.max(0);
        let top = (radar_at.y + radar_cfg.top_offset).floor() as i32;
        let floor = radar_cfg.floor_y.min(top);
        let mut ores = BTreeSet::new();
        while ores.len() < ORE_COUNT {
            ores.insert(BlockPos::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(floor..=top),
                rng.gen_range(-extent..=extent),
            ));
        }
        for pos in &ores {
            let block = if pos.y < 0 {
                resource.deep_block()
            } else {
                resource.block.clone()
            };
            world.place_block(DIM, *pos, block);
        }

        let skins: Vec<&String> = config.companion.skins.keys().collect();
        let skin = skins
            .get(rng.gen_range(0..skins.len().max(1)))
            .map(|s| s.as_str())
            .unwrap_or("default");
        let backpack = RegistryKey::parse(&format!("{}_{skin}", config.companion.item_prefix))
            .context("companion item prefix is not a valid identifier")?;

        let actions = vec![
            (EQUIP_TICK, SceneAction::Equip(Some(backpack.clone()))),
            (INTERACT_TICK, SceneAction::Interact(resource.sample.clone())),
            (UNEQUIP_TICK, SceneAction::Equip(None)),
            (REEQUIP_TICK, SceneAction::Equip(Some(backpack))),
        ];

        Ok(Self {
            world,
            player,
            radar,
            resource,
            ores: ores.into_iter().collect(),
            actions,
        })
    }

    /// Actions scripted for `tick`, in order.
    pub fn actions_at(&self, tick: u64) -> Vec<SceneAction> {
        self.actions
            .iter()
            .filter(|(at, _)| *at == tick)
            .map(|(_, action)| action.clone())
            .collect()
    }

    /// Seeded ore positions that still hold a block.
    pub fn ores_remaining(&self) -> usize {
        self.ores
            .iter()
            .filter(|pos| !self.world.block(DIM, **pos).is_air())
            .count()
    }

    pub fn stack(item: &RegistryKey) -> ItemStack {
        ItemStack::new(item.clone(), 1)
    }
}
