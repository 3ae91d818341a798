//! Backpack companion sync.
//!
//! Each pass compares every connected player's watched equipment slot with
//! the value seen on the previous pass:
//!
//! - backpack taken off: companion riders are hidden with a long
//!   invisibility effect (never destroyed);
//! - backpack put on with no companion-type rider at all: a companion is
//!   spawned and attached as a rider. A hidden companion still riding the
//!   player blocks this, so it stays hidden until it drops off.
//!
//! Anything else is a no-op, so repeated passes over unchanged equipment
//! do nothing.

use crate::config::CompanionConfig;
use crate::ScriptContext;
use anyhow::Result;
use minerworks_core::{ItemStack, RegistryKey, SimTick};
use minerworks_world::{
    EntityId, HostError, Location, StatusEffect, StatusEffectType, WorldHost,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Per-player cache owned by the sync loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSlotState {
    /// Item identity seen in the watched slot on the previous pass.
    pub previous: Option<RegistryKey>,
}

/// How a companion was obtained by [`CompanionSyncLoop::provision_companion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// An existing rider was revived.
    Reused(EntityId),
    /// A new companion was spawned.
    Spawned(EntityId),
}

impl Provisioned {
    /// The companion entity.
    pub fn entity(self) -> EntityId {
        match self {
            Provisioned::Reused(id) | Provisioned::Spawned(id) => id,
        }
    }
}

/// Counters for one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Players visited.
    pub players: usize,
    /// Players without an equippable component.
    pub skipped: usize,
    /// Companions hidden.
    pub hidden: usize,
    /// Companions revived.
    pub reused: usize,
    /// Companions spawned.
    pub spawned: usize,
    /// Players whose transition failed on a host call.
    pub failures: usize,
}

enum Transition {
    None,
    Skipped,
    Hidden(usize),
    Attached(Provisioned),
}

/// Keeps one companion rider per player in step with the backpack slot.
#[derive(Debug, Clone)]
pub struct CompanionSyncLoop {
    config: CompanionConfig,
    players: HashMap<EntityId, PlayerSlotState>,
    last_report: SyncReport,
}

impl CompanionSyncLoop {
    /// Create a loop with no cached player state.
    pub fn new(config: CompanionConfig) -> Self {
        Self {
            config,
            players: HashMap::new(),
            last_report: SyncReport::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    /// Cached state for a player, if the player has been seen.
    pub fn state(&self, player: EntityId) -> Option<&PlayerSlotState> {
        self.players.get(&player)
    }

    /// Report of the most recent pass.
    pub fn last_report(&self) -> SyncReport {
        self.last_report
    }

    /// Whether an item identity belongs to the backpack family.
    pub fn qualifies(&self, item: Option<&RegistryKey>) -> bool {
        item.is_some_and(|id| id.starts_with(&self.config.item_prefix))
    }

    /// Run one reconciliation pass over every connected player.
    ///
    /// Host failures are logged per player and never abort the pass.
    pub fn pass<W: WorldHost>(&mut self, world: &mut W) -> SyncReport {
        let players = world.players();
        self.players.retain(|id, _| players.contains(id));

        let mut report = SyncReport::default();
        for player in players {
            report.players += 1;
            match self.sync_player(world, player) {
                Ok(Transition::None) => {}
                Ok(Transition::Skipped) => report.skipped += 1,
                Ok(Transition::Hidden(count)) => report.hidden += count,
                Ok(Transition::Attached(Provisioned::Reused(_))) => report.reused += 1,
                Ok(Transition::Attached(Provisioned::Spawned(_))) => report.spawned += 1,
                Err(err) => {
                    report.failures += 1;
                    warn!(player = %player, error = %err, "companion sync failed");
                }
            }
        }
        self.last_report = report;
        report
    }

    fn sync_player<W: WorldHost>(&mut self, world: &mut W, player: EntityId) -> Result<Transition, HostError> {
        let current = match world.equipment(player, self.config.slot) {
            Ok(item) => item,
            Err(HostError::MissingComponent { .. }) => return Ok(Transition::Skipped),
            Err(err) => return Err(err),
        };
        let current_id = current.as_ref().map(|item| item.item.clone());
        let state = self.players.entry(player).or_default();
        let previous = std::mem::replace(&mut state.previous, current_id.clone());

        let was_equipped = self.qualifies(previous.as_ref());
        let is_equipped = self.qualifies(current_id.as_ref());

        if was_equipped && !is_equipped {
            return self.hide_companions(world, player).map(Transition::Hidden);
        }
        if is_equipped && !was_equipped && self.companion_riders(world, player)?.is_empty() {
            if let Some(item) = current {
                let at = world.head_location(player)?;
                let companion = self.provision_companion(world, player, &item, at)?;
                if let Err(err) = world.add_rider(player, companion.entity()) {
                    warn!(
                        player = %player,
                        companion = %companion.entity(),
                        error = %err,
                        "backpack companion provisioned but not attached"
                    );
                    return Err(err);
                }
                info!(player = %player, companion = %companion.entity(), item = %item.item, "backpack companion attached");
                return Ok(Transition::Attached(companion));
            }
        }
        Ok(Transition::None)
    }

    /// Companion-type riders of `player`, valid ones only.
    pub fn companion_riders<W: WorldHost>(&self, world: &W, player: EntityId) -> Result<Vec<EntityId>, HostError> {
        Ok(world
            .riders(player)?
            .into_iter()
            .filter(|rider| world.is_valid(*rider))
            .filter(|rider| world.entity_type(*rider).as_ref() == Some(&self.config.entity))
            .collect())
    }

    fn hide_companions<W: WorldHost>(&self, world: &mut W, player: EntityId) -> Result<usize, HostError> {
        let hide = StatusEffect::new(
            StatusEffectType::Invisibility,
            0,
            self.config.hide_duration_ticks,
        )
        .without_particles();

        let riders = self.companion_riders(world, player)?;
        for rider in &riders {
            world.add_effect(*rider, hide)?;
            debug!(player = %player, companion = %rider, "backpack companion hidden");
        }
        Ok(riders.len())
    }

    /// Create or revive the companion for `player` at `at`.
    ///
    /// A companion already riding the player (hidden or not) is revived:
    /// re-skinned, made visible, detached and moved to `at`. Otherwise a new
    /// companion is spawned, skinned and given the tier event for the
    /// player's backpack level. The caller attaches the result as a rider.
    pub fn provision_companion<W: WorldHost>(
        &self,
        world: &mut W,
        player: EntityId,
        item: &ItemStack,
        at: Location,
    ) -> Result<Provisioned, HostError> {
        let skin = self.config.skin_for(&item.item);

        if let Some(existing) = self.companion_riders(world, player)?.into_iter().next() {
            if let (Some(skin), Some(_)) = (skin, world.skin_id(existing)) {
                world.set_skin_id(existing, skin)?;
            }
            world.remove_effect(existing, StatusEffectType::Invisibility)?;
            world.eject_riders(player)?;
            world.teleport(existing, at)?;
            return Ok(Provisioned::Reused(existing));
        }

        let dimension = world.dimension(player)?;
        let entity = world.spawn_entity(dimension, &self.config.entity, at)?;
        if let (Some(skin), Some(_)) = (skin, world.skin_id(entity)) {
            world.set_skin_id(entity, skin)?;
        }
        let level = self.backpack_level(world, player);
        if let Some(event) = self.config.tier_event(level) {
            world.trigger_event(entity, event)?;
        }
        Ok(Provisioned::Spawned(entity))
    }

    /// Persisted backpack level, or the configured default.
    pub fn backpack_level<W: WorldHost>(&self, world: &W, player: EntityId) -> i64 {
        world
            .property_i64(player, &self.config.level_property)
            .unwrap_or(self.config.default_level)
    }

    /// Persist a backpack level for `player`.
    pub fn set_backpack_level<W: WorldHost>(&self, world: &mut W, player: EntityId, level: i64) -> Result<(), HostError> {
        world.set_property_i64(player, &self.config.level_property, level)
    }
}

impl<W: WorldHost> ScriptContext<W> for CompanionSyncLoop {
    fn on_tick(&mut self, world: &mut W, tick: SimTick) -> Result<()> {
        let report = self.pass(world);
        if report.hidden + report.reused + report.spawned + report.failures > 0 {
            debug!(tick = tick.0, ?report, "companion sync pass");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minerworks_core::DimensionId;
    use minerworks_world::{EntityHost, EquipmentSlot, HostEvent, SimWorld};

    const DIM: DimensionId = DimensionId::Overworld;

    fn key(id: &str) -> RegistryKey {
        RegistryKey::parse(id).unwrap()
    }

    fn setup() -> (SimWorld, CompanionSyncLoop, EntityId) {
        let mut world = SimWorld::new();
        let player = world.add_player(DIM, Location::new(0.0, 64.0, 0.0));
        (world, CompanionSyncLoop::new(CompanionConfig::default()), player)
    }

    fn wear(world: &mut SimWorld, player: EntityId, item: Option<&str>) {
        let item = item.map(|id| ItemStack::new(key(id), 1));
        world.set_equipment(player, EquipmentSlot::Chest, item).unwrap();
    }

    fn companions(world: &SimWorld) -> Vec<EntityId> {
        world.entities_of_type(&key("miner:backpack_inventory"))
    }

    #[test]
    fn first_equip_spawns_skinned_companion_with_tier() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_red"));

        let report = sync.pass(&mut world);
        assert_eq!(report.spawned, 1);

        let spawned = companions(&world);
        assert_eq!(spawned.len(), 1);
        let companion = world.entity(spawned[0]).unwrap();
        assert_eq!(companion.skin_id, Some(1));
        assert_eq!(companion.mount, Some(player));
        assert_eq!(companion.location, Location::new(0.0, 64.0 + 1.62, 0.0));
        assert_eq!(companion.triggered_events, vec![key("miner:tier_one")]);
        assert_eq!(world.riders(player).unwrap(), spawned);
    }

    #[test]
    fn unmatched_skin_token_keeps_default_skin() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_sparkly"));
        sync.pass(&mut world);

        let spawned = companions(&world);
        assert_eq!(spawned.len(), 1);
        assert_eq!(world.entity(spawned[0]).unwrap().skin_id, Some(0));
        assert!(!world
            .records()
            .iter()
            .any(|r| matches!(r.event, HostEvent::SkinSet { .. })));
    }

    #[test]
    fn tier_follows_persisted_level() {
        let (mut world, mut sync, player) = setup();
        sync.set_backpack_level(&mut world, player, 3).unwrap();
        assert_eq!(sync.backpack_level(&world, player), 3);
        wear(&mut world, player, Some("miner:backpack_aqua"));
        sync.pass(&mut world);

        let companion = world.entity(companions(&world)[0]).unwrap();
        assert_eq!(companion.triggered_events, vec![key("miner:tier_three")]);
    }

    #[test]
    fn unequip_hides_without_spawning() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_gray"));
        sync.pass(&mut world);
        let before = world.records().len();

        wear(&mut world, player, Some("minecraft:iron_chestplate"));
        let report = sync.pass(&mut world);
        assert_eq!(report.hidden, 1);

        let new_records = &world.records()[before..];
        assert_eq!(new_records.len(), 1);
        assert!(matches!(
            new_records[0].event,
            HostEvent::EffectAdded {
                effect: StatusEffectType::Invisibility,
                duration_ticks: 888_888,
                show_particles: false,
                ..
            }
        ));
        assert_eq!(companions(&world).len(), 1);
    }

    #[test]
    fn repeated_passes_are_idempotent() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_green"));
        sync.pass(&mut world);
        let settled = world.records().len();
        for _ in 0..5 {
            assert_eq!(sync.pass(&mut world), SyncReport { players: 1, ..SyncReport::default() });
        }
        assert_eq!(world.records().len(), settled);

        wear(&mut world, player, None);
        sync.pass(&mut world);
        let hidden = world.records().len();
        for _ in 0..5 {
            sync.pass(&mut world);
        }
        assert_eq!(world.records().len(), hidden);
    }

    #[test]
    fn re_equip_leaves_hidden_rider_hidden() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_red"));
        sync.pass(&mut world);
        let companion = companions(&world)[0];

        wear(&mut world, player, None);
        sync.pass(&mut world);
        assert!(world.has_effect(companion, StatusEffectType::Invisibility));
        let hidden = world.records().len();

        wear(&mut world, player, Some("miner:backpack_purple"));
        let report = sync.pass(&mut world);
        assert_eq!(report, SyncReport { players: 1, ..SyncReport::default() });
        assert_eq!(world.records().len(), hidden);
        assert_eq!(companions(&world), vec![companion]);
        assert!(world.has_effect(companion, StatusEffectType::Invisibility));
        assert_eq!(world.skin_id(companion), Some(1));
    }

    #[test]
    fn provisioning_revives_existing_rider() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_red"));
        sync.pass(&mut world);
        let companion = companions(&world)[0];
        wear(&mut world, player, None);
        sync.pass(&mut world);

        let at = Location::new(3.0, 70.0, -2.0);
        let item = ItemStack::new(key("miner:backpack_purple"), 1);
        let provisioned = sync.provision_companion(&mut world, player, &item, at).unwrap();
        assert_eq!(provisioned, Provisioned::Reused(companion));
        assert_eq!(companions(&world), vec![companion]);
        assert!(!world.has_effect(companion, StatusEffectType::Invisibility));
        assert_eq!(world.skin_id(companion), Some(4));
        assert!(world.riders(player).unwrap().is_empty());
        assert_eq!(world.entity(companion).unwrap().location, at);
    }

    #[test]
    fn attach_failure_is_counted_and_not_retried() {
        let (mut world, mut sync, player) = setup();
        world.set_seat_count(player, Some(1)).unwrap();
        let parrot = world.add_entity(DIM, key("minecraft:parrot"), Location::ZERO);
        world.add_rider(player, parrot).unwrap();
        wear(&mut world, player, Some("miner:backpack_red"));

        let report = sync.pass(&mut world);
        assert_eq!(report.failures, 1);
        assert_eq!(report.spawned, 0);
        let spawned = companions(&world);
        assert_eq!(spawned.len(), 1);
        assert_eq!(world.entity(spawned[0]).unwrap().mount, None);
        assert_eq!(world.riders(player).unwrap(), vec![parrot]);

        let report = sync.pass(&mut world);
        assert_eq!(report, SyncReport { players: 1, ..SyncReport::default() });
        assert_eq!(companions(&world), spawned);
    }

    #[test]
    fn swapping_backpacks_is_not_a_transition() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_red"));
        sync.pass(&mut world);
        wear(&mut world, player, Some("miner:backpack_aqua"));
        let report = sync.pass(&mut world);
        assert_eq!(report, SyncReport { players: 1, ..SyncReport::default() });
    }

    #[test]
    fn hide_leaves_other_riders_alone() {
        let (mut world, mut sync, player) = setup();
        let parrot = world.add_entity(DIM, key("minecraft:parrot"), Location::ZERO);
        world.add_rider(player, parrot).unwrap();
        wear(&mut world, player, Some("miner:backpack_red"));
        sync.pass(&mut world);
        wear(&mut world, player, None);
        sync.pass(&mut world);
        assert!(!world.has_effect(parrot, StatusEffectType::Invisibility));
    }

    #[test]
    fn state_is_pruned_for_disconnected_players() {
        let (mut world, mut sync, player) = setup();
        wear(&mut world, player, Some("miner:backpack_red"));
        sync.pass(&mut world);
        assert_eq!(
            sync.state(player).unwrap().previous,
            Some(key("miner:backpack_red"))
        );
        world.despawn(player);
        sync.pass(&mut world);
        assert!(sync.state(player).is_none());
    }

    #[test]
    fn failures_are_counted_and_do_not_stop_the_pass() {
        let (mut world, mut sync, first) = setup();
        let second = world.add_player(DIM, Location::ZERO);
        wear(&mut world, first, Some("miner:backpack_red"));
        wear(&mut world, second, Some("miner:backpack_red"));

        let mut broken = CompanionConfig::default();
        broken.entity = key("minecraft:item");
        let mut sync_broken = CompanionSyncLoop::new(broken);
        let report = sync_broken.pass(&mut world);
        assert_eq!(report.failures, 2);
        assert_eq!(report.players, 2);

        let report = sync.pass(&mut world);
        assert_eq!(report.spawned, 2);
    }
}
