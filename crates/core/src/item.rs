//! Item stacks with explicit optional capabilities.
//!
//! A host item exposes durability and enchanting only when its definition
//! supports them. Here that is encoded as `Option` fields: `Some` means the
//! capability exists on this stack, `None` means it does not, so code that
//! reads or restores those attributes has to match on presence.

use crate::enchantment::{Enchantment, EnchantmentType};
use crate::RegistryKey;
use serde::{Deserialize, Serialize};

/// Tool types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    /// Pickaxe - mines stone, ores
    Pickaxe,
    /// Axe - chops wood
    Axe,
    /// Shovel - digs dirt, sand, gravel
    Shovel,
    /// Sword - combat weapon
    Sword,
    /// Hoe - tills farmland
    Hoe,
}

impl ToolType {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "pickaxe" => Some(ToolType::Pickaxe),
            "axe" => Some(ToolType::Axe),
            "shovel" => Some(ToolType::Shovel),
            "sword" => Some(ToolType::Sword),
            "hoe" => Some(ToolType::Hoe),
            _ => None,
        }
    }
}

/// Tool material tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolMaterial {
    /// Wooden tools (tier 0)
    Wood = 0,
    /// Stone tools (tier 1)
    Stone = 1,
    /// Iron tools (tier 2)
    Iron = 2,
    /// Diamond tools (tier 3)
    Diamond = 3,
    /// Gold tools (very fast but weak mining tier - same tier as wood)
    Gold = 4,
}

impl ToolMaterial {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "wooden" => Some(ToolMaterial::Wood),
            "stone" => Some(ToolMaterial::Stone),
            "iron" => Some(ToolMaterial::Iron),
            "diamond" => Some(ToolMaterial::Diamond),
            "golden" => Some(ToolMaterial::Gold),
            _ => None,
        }
    }

    /// Get the maximum durability for tools of this material
    pub fn durability(self, tool_type: ToolType) -> u32 {
        let base = match self {
            ToolMaterial::Wood => 59,
            ToolMaterial::Stone => 131,
            ToolMaterial::Iron => 250,
            ToolMaterial::Diamond => 1561,
            ToolMaterial::Gold => 32,
        };

        // Swords have different durability
        if tool_type == ToolType::Sword {
            base + 1
        } else {
            base
        }
    }
}

/// Armor durability: per-piece base times per-material factor.
fn armor_durability(material: &str, piece: &str) -> Option<u32> {
    let factor = match material {
        "leather" => 5,
        "golden" => 7,
        "chainmail" | "iron" => 15,
        "diamond" => 33,
        _ => return None,
    };
    let base = match piece {
        "helmet" => 11,
        "chestplate" => 16,
        "leggings" => 15,
        "boots" => 13,
        _ => return None,
    };
    Some(base * factor)
}

/// How an item is pinned inside a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Freely movable.
    #[default]
    None,
    /// Cannot leave the owner's inventory.
    Inventory,
    /// Cannot leave its slot.
    Slot,
}

/// Durability capability: damage taken out of a fixed maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Durability {
    /// Damage taken so far (0 = pristine).
    pub damage: u32,
    /// Damage at which the item breaks.
    pub max: u32,
}

/// Which optional capabilities an item definition carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCapabilities {
    /// Maximum durability, if the item wears down.
    pub max_durability: Option<u32>,
    /// Whether enchantments can be applied.
    pub enchantable: bool,
    /// Largest stack the host allows.
    pub max_stack: u32,
}

impl ItemCapabilities {
    /// Plain stackable item with no optional capabilities.
    pub const PLAIN: Self = Self {
        max_durability: None,
        enchantable: false,
        max_stack: 64,
    };

    /// Capabilities implied by an item identity.
    ///
    /// Vanilla tools (`<material>_<tool>`) and armor
    /// (`<material>_<piece>`) wear down and take enchantments; everything
    /// else is a plain stackable item.
    pub fn for_identity(item: &RegistryKey) -> Self {
        let Some((prefix, suffix)) = item.path().rsplit_once('_') else {
            return Self::PLAIN;
        };
        if item.namespace() != "minecraft" {
            return Self::PLAIN;
        }
        let max_durability = match (ToolMaterial::from_prefix(prefix), ToolType::from_suffix(suffix)) {
            (Some(material), Some(tool)) => Some(material.durability(tool)),
            _ => armor_durability(prefix, suffix),
        };
        match max_durability {
            Some(max) => Self {
                max_durability: Some(max),
                enchantable: true,
                max_stack: 1,
            },
            None => Self::PLAIN,
        }
    }
}

/// An item stack in inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item identity (`minecraft:diamond_pickaxe`).
    pub item: RegistryKey,
    /// Quantity in stack
    pub amount: u32,
    /// Container lock mode.
    pub lock_mode: LockMode,
    /// Custom display name, if renamed.
    pub name_tag: Option<String>,
    /// Lore lines shown under the name.
    pub lore: Vec<String>,
    /// Blocks this item is allowed to break in adventure mode.
    pub can_destroy: Vec<RegistryKey>,
    /// Blocks this item is allowed to be placed on in adventure mode.
    pub can_place_on: Vec<RegistryKey>,
    /// Durability (None when the item does not wear down)
    pub durability: Option<Durability>,
    /// Enchantments applied to this item (None for non-enchantable items)
    pub enchantments: Option<Vec<Enchantment>>,
}

impl ItemStack {
    /// Create a new item stack with capabilities derived from its identity.
    pub fn new(item: RegistryKey, amount: u32) -> Self {
        let capabilities = ItemCapabilities::for_identity(&item);
        Self::with_capabilities(item, amount, capabilities)
    }

    /// Create a new item stack with explicit capabilities (custom items).
    pub fn with_capabilities(item: RegistryKey, amount: u32, capabilities: ItemCapabilities) -> Self {
        Self {
            item,
            amount,
            lock_mode: LockMode::None,
            name_tag: None,
            lore: Vec::new(),
            can_destroy: Vec::new(),
            can_place_on: Vec::new(),
            durability: capabilities
                .max_durability
                .map(|max| Durability { damage: 0, max }),
            enchantments: capabilities.enchantable.then(Vec::new),
        }
    }

    /// Maximum stack size for this item type
    pub fn max_stack_size(&self) -> u32 {
        if self.durability.is_some() {
            1
        } else {
            ItemCapabilities::for_identity(&self.item).max_stack
        }
    }

    /// Set accumulated damage, clamped to the maximum.
    ///
    /// Returns false when the item has no durability capability.
    pub fn set_damage(&mut self, damage: u32) -> bool {
        match self.durability.as_mut() {
            Some(durability) => {
                durability.damage = damage.min(durability.max);
                true
            }
            None => false,
        }
    }

    /// Damage taken so far, if the item wears down.
    pub fn damage(&self) -> Option<u32> {
        self.durability.map(|d| d.damage)
    }

    /// Check if the item is worn out (damage reached the maximum).
    pub fn is_broken(&self) -> bool {
        self.durability.map(|d| d.damage >= d.max).unwrap_or(false)
    }

    /// Check if this item can be enchanted
    pub fn is_enchantable(&self) -> bool {
        self.enchantments.is_some()
    }

    /// Add an enchantment to this item
    /// Returns true if the enchantment was added successfully
    pub fn add_enchantment(&mut self, enchantment: Enchantment) -> bool {
        let Some(enchants) = self.enchantments.as_mut() else {
            return false;
        };

        // Same type upgrades in place.
        if let Some(existing) = enchants
            .iter_mut()
            .find(|e| e.enchantment_type == enchantment.enchantment_type)
        {
            existing.level = existing.level.max(enchantment.level);
            return true;
        }

        if enchants
            .iter()
            .any(|e| !e.enchantment_type.is_compatible_with(&enchantment.enchantment_type))
        {
            return false;
        }

        enchants.push(enchantment);
        true
    }

    /// Get all enchantments on this item
    pub fn get_enchantments(&self) -> &[Enchantment] {
        self.enchantments.as_deref().unwrap_or(&[])
    }

    /// Check if this item has a specific enchantment type
    pub fn has_enchantment(&self, enchant_type: EnchantmentType) -> bool {
        self.get_enchantments()
            .iter()
            .any(|e| e.enchantment_type == enchant_type)
    }

    /// Get the level of a specific enchantment, or 0 if not present
    pub fn enchantment_level(&self, enchant_type: EnchantmentType) -> u8 {
        self.get_enchantments()
            .iter()
            .find(|e| e.enchantment_type == enchant_type)
            .map(|e| e.level)
            .unwrap_or(0)
    }
}
