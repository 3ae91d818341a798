//! The collaborator contract the automation runs against.
//!
//! The host simulation owns the world, its entities and their attachment
//! graph. Automation code only reaches them through these traits, so the
//! same logic drives a live server adapter or [`crate::SimWorld`].

use crate::effect::{StatusEffect, StatusEffectType};
use crate::pos::{BlockPos, BlockVolume, Location};
use minerworks_core::{DimensionId, ItemStack, RegistryKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque host entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Equipment slots exposed by the host's equippable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Feet,
    Mainhand,
    Offhand,
}

/// Failures reported by host calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("entity {0} is no longer valid")]
    InvalidEntity(EntityId),
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },
    #[error("entity {0} has no free seat")]
    MountFull(EntityId),
    #[error("cannot spawn {0}")]
    SpawnRejected(RegistryKey),
    #[error("command rejected: {0}")]
    CommandRejected(String),
}

/// Block reads, writes and volume queries.
pub trait BlockHost {
    /// Block identity at `pos` (`minecraft:air` when empty).
    fn block(&self, dimension: DimensionId, pos: BlockPos) -> RegistryKey;

    /// Replace the block at `pos`.
    fn set_block(
        &mut self,
        dimension: DimensionId,
        pos: BlockPos,
        block: &RegistryKey,
    ) -> Result<(), HostError>;

    /// Positions inside `volume` whose block identity is one of `include`,
    /// in the host's iteration order.
    fn find_blocks(
        &self,
        dimension: DimensionId,
        volume: &BlockVolume,
        include: &[RegistryKey],
    ) -> Vec<BlockPos>;
}

/// Entity queries, spawning, attachment, effects and command dispatch.
pub trait EntityHost {
    /// Whether the handle still refers to a live entity.
    fn is_valid(&self, entity: EntityId) -> bool;

    fn entity_type(&self, entity: EntityId) -> Option<RegistryKey>;

    fn location(&self, entity: EntityId) -> Result<Location, HostError>;

    fn dimension(&self, entity: EntityId) -> Result<DimensionId, HostError>;

    fn head_location(&self, entity: EntityId) -> Result<Location, HostError>;

    /// Currently connected players.
    fn players(&self) -> Vec<EntityId>;

    /// Item in `slot`; `MissingComponent` when the entity cannot equip.
    fn equipment(&self, entity: EntityId, slot: EquipmentSlot)
        -> Result<Option<ItemStack>, HostError>;

    /// Entities riding `mount`; `MissingComponent` when it is not rideable.
    fn riders(&self, mount: EntityId) -> Result<Vec<EntityId>, HostError>;

    fn add_rider(&mut self, mount: EntityId, rider: EntityId) -> Result<(), HostError>;

    /// Detach every rider from `mount`.
    fn eject_riders(&mut self, mount: EntityId) -> Result<(), HostError>;

    fn spawn_entity(
        &mut self,
        dimension: DimensionId,
        kind: &RegistryKey,
        at: Location,
    ) -> Result<EntityId, HostError>;

    /// Spawn a dropped item entity.
    fn spawn_item(
        &mut self,
        dimension: DimensionId,
        item: ItemStack,
        at: Location,
    ) -> Result<EntityId, HostError>;

    fn teleport(&mut self, entity: EntityId, to: Location) -> Result<(), HostError>;

    fn add_effect(&mut self, entity: EntityId, effect: StatusEffect) -> Result<(), HostError>;

    /// Remove an effect; returns whether it was active.
    fn remove_effect(
        &mut self,
        entity: EntityId,
        effect: StatusEffectType,
    ) -> Result<bool, HostError>;

    fn has_effect(&self, entity: EntityId, effect: StatusEffectType) -> bool;

    /// Current skin variant, `None` when the entity has no skin component.
    fn skin_id(&self, entity: EntityId) -> Option<i32>;

    fn set_skin_id(&mut self, entity: EntityId, skin: i32) -> Result<(), HostError>;

    /// Fire a named entity event (component group switch).
    fn trigger_event(&mut self, entity: EntityId, event: &RegistryKey) -> Result<(), HostError>;

    /// Run a host command with `source` as the executing entity.
    fn run_command(&mut self, source: EntityId, command: &str) -> Result<(), HostError>;
}

/// Per-entity persisted key/value properties.
pub trait PropertyStore {
    fn property_i64(&self, entity: EntityId, key: &str) -> Option<i64>;

    fn set_property_i64(&mut self, entity: EntityId, key: &str, value: i64)
        -> Result<(), HostError>;
}

/// Everything the automation needs from a host.
pub trait WorldHost: BlockHost + EntityHost + PropertyStore {}

impl<T: BlockHost + EntityHost + PropertyStore> WorldHost for T {}
