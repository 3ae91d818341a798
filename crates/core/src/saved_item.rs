//! Item state capture and restore.
//!
//! [`SavedItemState`] is a detached snapshot of the attributes of an
//! [`ItemStack`] that matter for moving an item into and out of an entity:
//! identity, amount, lock mode, naming, lore, adventure-mode permission lists
//! and, only when the source item has those capabilities, durability damage
//! and enchantments.
//!
//! Opaque per-item custom properties are not captured. An item restored from
//! a snapshot carries none of them. Enchantments whose identifier no longer
//! resolves to a known type are dropped on restore; every other recorded
//! enchantment comes back exactly as captured, level and order included.

use crate::enchantment::{Enchantment, EnchantmentType};
use crate::item::{ItemCapabilities, ItemStack, LockMode};
use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while moving a snapshot in or out of its serialized form.
#[derive(Debug, Error)]
pub enum SavedItemError {
    /// The snapshot could not be encoded.
    #[error("failed to encode item snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    /// The serialized text is not a valid snapshot.
    #[error("failed to decode item snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// One recorded enchantment, by host identifier and level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SavedEnchantment {
    /// Enchantment identifier (`minecraft:efficiency`).
    #[serde(rename = "type")]
    pub id: RegistryKey,
    /// Enchantment level.
    pub level: u8,
}

/// Snapshot of an item's meaningful attributes.
///
/// `damage` and `enchantments` are `Some` exactly when the source item had
/// the durability or enchanting capability; they are left out of the
/// serialized form otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItemState {
    /// Item identity.
    pub type_id: RegistryKey,
    /// Stack amount.
    pub amount: u32,
    /// Container lock mode.
    #[serde(default)]
    pub lock_mode: LockMode,
    /// Custom display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    /// Lore lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<String>,
    /// Durability damage, present only for items that wear down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    /// Enchantments, present only for enchantable items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchantments: Option<Vec<SavedEnchantment>>,
    /// Blocks the item may break.
    #[serde(default)]
    pub can_destroy: Vec<RegistryKey>,
    /// Blocks the item may be placed on.
    #[serde(default)]
    pub can_place_on: Vec<RegistryKey>,
}

impl SavedItemState {
    /// Capture the state of `item`.
    pub fn snapshot(item: &ItemStack) -> Self {
        let enchantments = item.enchantments.as_ref().map(|enchants| {
            enchants
                .iter()
                .map(|e| SavedEnchantment {
                    id: e.enchantment_type.identifier(),
                    level: e.level,
                })
                .collect()
        });

        Self {
            type_id: item.item.clone(),
            amount: item.amount,
            lock_mode: item.lock_mode,
            name_tag: item.name_tag.clone(),
            lore: item.lore.clone(),
            damage: item.damage(),
            enchantments,
            can_destroy: item.can_destroy.clone(),
            can_place_on: item.can_place_on.clone(),
        }
    }

    /// Rebuild a live item, deriving capabilities from the recorded identity.
    pub fn restore(&self) -> ItemStack {
        self.restore_with(ItemCapabilities::for_identity)
    }

    /// Rebuild a live item using `capabilities` to resolve the item definition.
    ///
    /// Damage and enchantments are applied only when both the snapshot
    /// recorded them and the rebuilt item supports them. The enchantment list
    /// is written back as recorded, without compatibility or level checks.
    /// Identifiers that no longer resolve are skipped.
    pub fn restore_with<F>(&self, capabilities: F) -> ItemStack
    where
        F: FnOnce(&RegistryKey) -> ItemCapabilities,
    {
        let caps = capabilities(&self.type_id);
        let mut item = ItemStack::with_capabilities(self.type_id.clone(), self.amount, caps);
        item.name_tag = self.name_tag.clone();
        item.lore = self.lore.clone();
        item.can_destroy = self.can_destroy.clone();
        item.can_place_on = self.can_place_on.clone();
        item.lock_mode = self.lock_mode;

        if let Some(damage) = self.damage {
            item.set_damage(damage);
        }
        if let (Some(saved), true) = (&self.enchantments, item.is_enchantable()) {
            item.enchantments = Some(
                saved
                    .iter()
                    .filter_map(|enchant| {
                        EnchantmentType::from_identifier(&enchant.id).map(|enchantment_type| Enchantment {
                            enchantment_type,
                            level: enchant.level,
                        })
                    })
                    .collect(),
            );
        }
        item
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, SavedItemError> {
        serde_json::to_string(self).map_err(SavedItemError::Encode)
    }

    /// Decode from JSON.
    pub fn from_json(input: &str) -> Result<Self, SavedItemError> {
        serde_json::from_str(input).map_err(SavedItemError::Decode)
    }
}

/// Capture `item` into a detached snapshot.
pub fn snapshot(item: &ItemStack) -> SavedItemState {
    SavedItemState::snapshot(item)
}

/// Rebuild an item from a snapshot; an absent snapshot yields no item.
pub fn reconstruct(saved: Option<&SavedItemState>) -> Option<ItemStack> {
    saved.map(SavedItemState::restore)
}
