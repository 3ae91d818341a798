//! In-memory host world.
//!
//! `SimWorld` implements the full host contract over plain maps so the
//! automation can be driven tick by tick in tests and in the headless
//! runner. Every mutating host call is appended to an ordered record log.

use crate::drop_item::DroppedItem;
use crate::effect::{StatusEffect, StatusEffectType, StatusEffects};
use crate::host::{BlockHost, EntityHost, EntityId, EquipmentSlot, HostError, PropertyStore};
use crate::pos::{BlockPos, BlockVolume, Location};
use glam::DVec3;
use minerworks_core::{DimensionId, ItemStack, RegistryKey, SimTick};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Eye height used for [`EntityHost::head_location`] on players.
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;

/// Entity type identifier given to players.
pub const PLAYER_ENTITY_TYPE: &str = "minecraft:player";

/// Entity type identifier given to dropped items.
pub const ITEM_ENTITY_TYPE: &str = "minecraft:item";

/// A live entity in [`SimWorld`].
#[derive(Debug, Clone)]
pub struct SimEntity {
    pub kind: RegistryKey,
    pub dimension: DimensionId,
    pub location: Location,
    pub effects: StatusEffects,
    /// Entity this one is riding.
    pub mount: Option<EntityId>,
    /// Entities riding this one, in attach order.
    pub riders: Vec<EntityId>,
    pub rideable: bool,
    /// Rider capacity; `None` is unlimited.
    pub seat_count: Option<usize>,
    /// `None` when the entity type has no skin component.
    pub skin_id: Option<i32>,
    /// `None` when the entity cannot equip items.
    pub equipment: Option<BTreeMap<EquipmentSlot, ItemStack>>,
    pub properties: BTreeMap<String, i64>,
    pub triggered_events: Vec<RegistryKey>,
    pub player: bool,
    pub dropped: Option<DroppedItem>,
}

impl SimEntity {
    fn new(kind: RegistryKey, dimension: DimensionId, location: Location) -> Self {
        Self {
            kind,
            dimension,
            location,
            effects: StatusEffects::new(),
            mount: None,
            riders: Vec::new(),
            rideable: false,
            seat_count: None,
            skin_id: None,
            equipment: None,
            properties: BTreeMap::new(),
            triggered_events: Vec::new(),
            player: false,
            dropped: None,
        }
    }
}

/// One observable host mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    BlockSet {
        dimension: DimensionId,
        pos: BlockPos,
        from: RegistryKey,
        to: RegistryKey,
    },
    EntitySpawned {
        entity: EntityId,
        entity_type: RegistryKey,
        location: Location,
    },
    ItemSpawned {
        entity: EntityId,
        item: RegistryKey,
        amount: u32,
        location: Location,
    },
    RiderAdded {
        mount: EntityId,
        rider: EntityId,
    },
    RidersEjected {
        mount: EntityId,
        riders: Vec<EntityId>,
    },
    EffectAdded {
        entity: EntityId,
        effect: StatusEffectType,
        duration_ticks: u32,
        show_particles: bool,
    },
    EffectRemoved {
        entity: EntityId,
        effect: StatusEffectType,
    },
    Teleported {
        entity: EntityId,
        location: Location,
    },
    SkinSet {
        entity: EntityId,
        skin: i32,
    },
    EventTriggered {
        entity: EntityId,
        event: RegistryKey,
    },
    Command {
        source: EntityId,
        command: String,
    },
    Despawned {
        entity: EntityId,
    },
}

/// A [`HostEvent`] stamped with the tick it happened on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRecord {
    pub tick: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// In-memory host world.
#[derive(Debug, Default)]
pub struct SimWorld {
    tick: u64,
    next_entity: u64,
    blocks: BTreeMap<DimensionId, BTreeMap<BlockPos, RegistryKey>>,
    entities: BTreeMap<EntityId, SimEntity>,
    records: Vec<HostRecord>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_tick(&self) -> SimTick {
        SimTick(self.tick)
    }

    /// Advance host time: effects count down, dropped items age.
    pub fn tick(&mut self) {
        self.tick += 1;
        let mut despawned = Vec::new();
        for (id, entity) in self.entities.iter_mut() {
            for expired in entity.effects.tick() {
                debug!(entity = %id, effect = expired.name(), "effect expired");
            }
            if let Some(dropped) = entity.dropped.as_mut() {
                if dropped.update() {
                    despawned.push(*id);
                }
            }
        }
        for id in despawned {
            self.despawn(id);
        }
    }

    /// Set a block without recording a host event (scene setup).
    pub fn place_block(&mut self, dimension: DimensionId, pos: BlockPos, block: RegistryKey) {
        let column = self.blocks.entry(dimension).or_default();
        if block.is_air() {
            column.remove(&pos);
        } else {
            column.insert(pos, block);
        }
    }

    /// Connect a player: equippable, rideable, no skin component.
    pub fn add_player(&mut self, dimension: DimensionId, location: Location) -> EntityId {
        let mut entity = SimEntity::new(player_type(), dimension, location);
        entity.player = true;
        entity.rideable = true;
        entity.equipment = Some(BTreeMap::new());
        self.insert(entity)
    }

    /// Add a non-player entity without recording a host event (scene setup).
    pub fn add_entity(
        &mut self,
        dimension: DimensionId,
        kind: RegistryKey,
        location: Location,
    ) -> EntityId {
        let mut entity = SimEntity::new(kind, dimension, location);
        entity.skin_id = Some(0);
        self.insert(entity)
    }

    pub fn set_equipment(
        &mut self,
        entity: EntityId,
        slot: EquipmentSlot,
        item: Option<ItemStack>,
    ) -> Result<(), HostError> {
        let equipment = self
            .live_mut(entity)?
            .equipment
            .as_mut()
            .ok_or(HostError::MissingComponent {
                entity,
                component: "equippable",
            })?;
        match item {
            Some(item) => equipment.insert(slot, item),
            None => equipment.remove(&slot),
        };
        Ok(())
    }

    /// Limit how many riders `entity` carries.
    pub fn set_seat_count(&mut self, entity: EntityId, seats: Option<usize>) -> Result<(), HostError> {
        self.live_mut(entity)?.seat_count = seats;
        Ok(())
    }

    /// Remove an entity, detaching it from any mount and riders.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            return false;
        };
        if let Some(mount) = entity.mount.and_then(|m| self.entities.get_mut(&m)) {
            mount.riders.retain(|r| *r != id);
        }
        for rider in entity.riders {
            if let Some(rider) = self.entities.get_mut(&rider) {
                rider.mount = None;
            }
        }
        self.record(HostEvent::Despawned { entity: id });
        true
    }

    pub fn entity(&self, id: EntityId) -> Option<&SimEntity> {
        self.entities.get(&id)
    }

    /// Live entities of a given type, in id order.
    pub fn entities_of_type(&self, kind: &RegistryKey) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| &e.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn dropped_items(&self) -> impl Iterator<Item = &DroppedItem> {
        self.entities.values().filter_map(|e| e.dropped.as_ref())
    }

    pub fn records(&self) -> &[HostRecord] {
        &self.records
    }

    pub fn take_records(&mut self) -> Vec<HostRecord> {
        std::mem::take(&mut self.records)
    }

    fn insert(&mut self, entity: SimEntity) -> EntityId {
        self.next_entity += 1;
        let id = EntityId(self.next_entity);
        self.entities.insert(id, entity);
        id
    }

    fn record(&mut self, event: HostEvent) {
        self.records.push(HostRecord {
            tick: self.tick,
            event,
        });
    }

    fn live(&self, id: EntityId) -> Result<&SimEntity, HostError> {
        self.entities.get(&id).ok_or(HostError::UnknownEntity(id))
    }

    fn live_mut(&mut self, id: EntityId) -> Result<&mut SimEntity, HostError> {
        self.entities.get_mut(&id).ok_or(HostError::UnknownEntity(id))
    }
}

fn player_type() -> RegistryKey {
    RegistryKey::parse(PLAYER_ENTITY_TYPE).unwrap_or_else(|_| RegistryKey::air())
}

fn item_type() -> RegistryKey {
    RegistryKey::parse(ITEM_ENTITY_TYPE).unwrap_or_else(|_| RegistryKey::air())
}

impl BlockHost for SimWorld {
    fn block(&self, dimension: DimensionId, pos: BlockPos) -> RegistryKey {
        self.blocks
            .get(&dimension)
            .and_then(|column| column.get(&pos))
            .cloned()
            .unwrap_or_else(RegistryKey::air)
    }

    fn set_block(
        &mut self,
        dimension: DimensionId,
        pos: BlockPos,
        block: &RegistryKey,
    ) -> Result<(), HostError> {
        let from = self.block(dimension, pos);
        self.place_block(dimension, pos, block.clone());
        self.record(HostEvent::BlockSet {
            dimension,
            pos,
            from,
            to: block.clone(),
        });
        Ok(())
    }

    fn find_blocks(
        &self,
        dimension: DimensionId,
        volume: &BlockVolume,
        include: &[RegistryKey],
    ) -> Vec<BlockPos> {
        let Some(column) = self.blocks.get(&dimension) else {
            return Vec::new();
        };
        column
            .range(volume.min()..=volume.max())
            .filter(|(pos, block)| volume.contains(**pos) && include.contains(block))
            .map(|(pos, _)| *pos)
            .collect()
    }
}

impl EntityHost for SimWorld {
    fn is_valid(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn entity_type(&self, entity: EntityId) -> Option<RegistryKey> {
        self.entities.get(&entity).map(|e| e.kind.clone())
    }

    fn location(&self, entity: EntityId) -> Result<Location, HostError> {
        Ok(self.live(entity)?.location)
    }

    fn dimension(&self, entity: EntityId) -> Result<DimensionId, HostError> {
        Ok(self.live(entity)?.dimension)
    }

    fn head_location(&self, entity: EntityId) -> Result<Location, HostError> {
        let entity = self.live(entity)?;
        let eye = if entity.player { PLAYER_EYE_HEIGHT } else { 0.0 };
        Ok(entity.location + DVec3::new(0.0, eye, 0.0))
    }

    fn players(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.player)
            .map(|(id, _)| *id)
            .collect()
    }

    fn equipment(
        &self,
        entity: EntityId,
        slot: EquipmentSlot,
    ) -> Result<Option<ItemStack>, HostError> {
        let equipment = self
            .live(entity)?
            .equipment
            .as_ref()
            .ok_or(HostError::MissingComponent {
                entity,
                component: "equippable",
            })?;
        Ok(equipment.get(&slot).cloned())
    }

    fn riders(&self, mount: EntityId) -> Result<Vec<EntityId>, HostError> {
        let entity = self.live(mount)?;
        if !entity.rideable {
            return Err(HostError::MissingComponent {
                entity: mount,
                component: "rideable",
            });
        }
        Ok(entity.riders.clone())
    }

    fn add_rider(&mut self, mount: EntityId, rider: EntityId) -> Result<(), HostError> {
        if mount == rider {
            return Err(HostError::InvalidEntity(rider));
        }
        let seated = self.live(mount)?;
        if !seated.rideable {
            return Err(HostError::MissingComponent {
                entity: mount,
                component: "rideable",
            });
        }
        let full = seated
            .seat_count
            .is_some_and(|seats| seated.riders.len() >= seats);
        let previous = self.live(rider)?.mount;
        if previous == Some(mount) {
            return Ok(());
        }
        if full {
            return Err(HostError::MountFull(mount));
        }
        if let Some(old) = previous.and_then(|m| self.entities.get_mut(&m)) {
            old.riders.retain(|r| *r != rider);
        }
        self.live_mut(rider)?.mount = Some(mount);
        self.live_mut(mount)?.riders.push(rider);
        self.record(HostEvent::RiderAdded { mount, rider });
        Ok(())
    }

    fn eject_riders(&mut self, mount: EntityId) -> Result<(), HostError> {
        let riders = std::mem::take(&mut self.live_mut(mount)?.riders);
        for rider in &riders {
            if let Some(rider) = self.entities.get_mut(rider) {
                rider.mount = None;
            }
        }
        self.record(HostEvent::RidersEjected { mount, riders });
        Ok(())
    }

    fn spawn_entity(
        &mut self,
        dimension: DimensionId,
        kind: &RegistryKey,
        at: Location,
    ) -> Result<EntityId, HostError> {
        if kind.is_air() || kind == &item_type() || kind == &player_type() {
            return Err(HostError::SpawnRejected(kind.clone()));
        }
        let id = self.add_entity(dimension, kind.clone(), at);
        self.record(HostEvent::EntitySpawned {
            entity: id,
            entity_type: kind.clone(),
            location: at,
        });
        Ok(id)
    }

    fn spawn_item(
        &mut self,
        dimension: DimensionId,
        item: ItemStack,
        at: Location,
    ) -> Result<EntityId, HostError> {
        if item.item.is_air() || item.amount == 0 {
            return Err(HostError::SpawnRejected(item.item));
        }
        let (key, amount) = (item.item.clone(), item.amount);
        let id = self.insert(SimEntity::new(item_type(), dimension, at));
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.dropped = Some(DroppedItem::new(id, dimension, at, item));
        }
        self.record(HostEvent::ItemSpawned {
            entity: id,
            item: key,
            amount,
            location: at,
        });
        Ok(id)
    }

    fn teleport(&mut self, entity: EntityId, to: Location) -> Result<(), HostError> {
        self.live_mut(entity)?.location = to;
        self.record(HostEvent::Teleported {
            entity,
            location: to,
        });
        Ok(())
    }

    fn add_effect(&mut self, entity: EntityId, effect: StatusEffect) -> Result<(), HostError> {
        self.live_mut(entity)?.effects.add(effect);
        self.record(HostEvent::EffectAdded {
            entity,
            effect: effect.effect_type,
            duration_ticks: effect.duration_ticks,
            show_particles: effect.show_particles,
        });
        Ok(())
    }

    fn remove_effect(
        &mut self,
        entity: EntityId,
        effect: StatusEffectType,
    ) -> Result<bool, HostError> {
        let removed = self.live_mut(entity)?.effects.remove(effect);
        if removed {
            self.record(HostEvent::EffectRemoved { entity, effect });
        }
        Ok(removed)
    }

    fn has_effect(&self, entity: EntityId, effect: StatusEffectType) -> bool {
        self.entities
            .get(&entity)
            .map(|e| e.effects.has(effect))
            .unwrap_or(false)
    }

    fn skin_id(&self, entity: EntityId) -> Option<i32> {
        self.entities.get(&entity).and_then(|e| e.skin_id)
    }

    fn set_skin_id(&mut self, entity: EntityId, skin: i32) -> Result<(), HostError> {
        let slot = self
            .live_mut(entity)?
            .skin_id
            .as_mut()
            .ok_or(HostError::MissingComponent {
                entity,
                component: "skin_id",
            })?;
        *slot = skin;
        self.record(HostEvent::SkinSet { entity, skin });
        Ok(())
    }

    fn trigger_event(&mut self, entity: EntityId, event: &RegistryKey) -> Result<(), HostError> {
        self.live_mut(entity)?.triggered_events.push(event.clone());
        self.record(HostEvent::EventTriggered {
            entity,
            event: event.clone(),
        });
        Ok(())
    }

    fn run_command(&mut self, source: EntityId, command: &str) -> Result<(), HostError> {
        if !self.is_valid(source) {
            return Err(HostError::InvalidEntity(source));
        }
        if command.trim().is_empty() {
            return Err(HostError::CommandRejected(command.to_string()));
        }
        self.record(HostEvent::Command {
            source,
            command: command.to_string(),
        });
        Ok(())
    }
}

impl PropertyStore for SimWorld {
    fn property_i64(&self, entity: EntityId, key: &str) -> Option<i64> {
        self.entities
            .get(&entity)
            .and_then(|e| e.properties.get(key))
            .copied()
    }

    fn set_property_i64(
        &mut self,
        entity: EntityId,
        key: &str,
        value: i64,
    ) -> Result<(), HostError> {
        self.live_mut(entity)?
            .properties
            .insert(key.to_string(), value);
        Ok(())
    }
}
