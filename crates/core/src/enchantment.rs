//! Enchantment identities and levels.
//!
//! Hosts name enchantments by identifier (`minecraft:efficiency`); the typed
//! enum keeps compatibility and level rules in one place.

use crate::RegistryKey;
use serde::{Deserialize, Serialize};

/// Types of enchantments that can be applied to items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnchantmentType {
    // Tool enchantments
    /// Increases mining speed
    Efficiency,
    /// Allows silk touch harvesting of blocks
    SilkTouch,
    /// Increases block drop amounts
    Fortune,

    // Weapon enchantments
    /// Increases attack damage
    Sharpness,
    /// Increases knockback
    Knockback,
    /// Sets targets on fire
    FireAspect,
    /// Increases bow/arrow damage
    Power,
    /// Increases bow/arrow knockback
    Punch,
    /// Bow/arrow sets targets on fire
    Flame,
    /// Allows firing without consuming arrows (requires at least one arrow in inventory).
    Infinity,

    // Armor enchantments
    /// Reduces damage from all sources
    Protection,
    /// Reduces fire damage
    FireProtection,
    /// Reduces explosion damage
    BlastProtection,
    /// Reduces projectile damage
    ProjectileProtection,
    /// Reduces fall damage (boots)
    FeatherFalling,
    /// Extends underwater breathing (helmet)
    Respiration,
    /// Removes underwater mining speed penalty (helmet).
    AquaAffinity,
    /// Increases underwater movement speed (boots).
    DepthStrider,

    // Universal enchantments
    /// Reduces durability loss
    Unbreaking,
    /// Repairs item using XP
    Mending,
}

impl EnchantmentType {
    /// Get the maximum level for this enchantment
    pub fn max_level(&self) -> u8 {
        match self {
            EnchantmentType::Efficiency => 5,
            EnchantmentType::SilkTouch => 1,
            EnchantmentType::Fortune => 3,
            EnchantmentType::Sharpness => 5,
            EnchantmentType::Knockback => 2,
            EnchantmentType::FireAspect => 2,
            EnchantmentType::Power => 5,
            EnchantmentType::Punch => 2,
            EnchantmentType::Flame => 1,
            EnchantmentType::Infinity => 1,
            EnchantmentType::Protection => 4,
            EnchantmentType::FireProtection => 4,
            EnchantmentType::BlastProtection => 4,
            EnchantmentType::ProjectileProtection => 4,
            EnchantmentType::FeatherFalling => 4,
            EnchantmentType::Respiration => 3,
            EnchantmentType::AquaAffinity => 1,
            EnchantmentType::DepthStrider => 3,
            EnchantmentType::Unbreaking => 3,
            EnchantmentType::Mending => 1,
        }
    }

    /// Host identifier path for this enchantment (namespace `minecraft`).
    pub fn identifier_path(&self) -> &'static str {
        match self {
            EnchantmentType::Efficiency => "efficiency",
            EnchantmentType::SilkTouch => "silk_touch",
            EnchantmentType::Fortune => "fortune",
            EnchantmentType::Sharpness => "sharpness",
            EnchantmentType::Knockback => "knockback",
            EnchantmentType::FireAspect => "fire_aspect",
            EnchantmentType::Power => "power",
            EnchantmentType::Punch => "punch",
            EnchantmentType::Flame => "flame",
            EnchantmentType::Infinity => "infinity",
            EnchantmentType::Protection => "protection",
            EnchantmentType::FireProtection => "fire_protection",
            EnchantmentType::BlastProtection => "blast_protection",
            EnchantmentType::ProjectileProtection => "projectile_protection",
            EnchantmentType::FeatherFalling => "feather_falling",
            EnchantmentType::Respiration => "respiration",
            EnchantmentType::AquaAffinity => "aqua_affinity",
            EnchantmentType::DepthStrider => "depth_strider",
            EnchantmentType::Unbreaking => "unbreaking",
            EnchantmentType::Mending => "mending",
        }
    }

    /// Full host identifier (`minecraft:efficiency`).
    pub fn identifier(&self) -> RegistryKey {
        RegistryKey::from_static("minecraft", self.identifier_path())
    }

    /// Resolve a host identifier back to the typed enchantment.
    pub fn from_identifier(key: &RegistryKey) -> Option<Self> {
        if key.namespace() != "minecraft" {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.identifier_path() == key.path())
    }

    /// Every known enchantment, in declaration order.
    pub const ALL: [EnchantmentType; 20] = [
        EnchantmentType::Efficiency,
        EnchantmentType::SilkTouch,
        EnchantmentType::Fortune,
        EnchantmentType::Sharpness,
        EnchantmentType::Knockback,
        EnchantmentType::FireAspect,
        EnchantmentType::Power,
        EnchantmentType::Punch,
        EnchantmentType::Flame,
        EnchantmentType::Infinity,
        EnchantmentType::Protection,
        EnchantmentType::FireProtection,
        EnchantmentType::BlastProtection,
        EnchantmentType::ProjectileProtection,
        EnchantmentType::FeatherFalling,
        EnchantmentType::Respiration,
        EnchantmentType::AquaAffinity,
        EnchantmentType::DepthStrider,
        EnchantmentType::Unbreaking,
        EnchantmentType::Mending,
    ];

    /// Check if this enchantment is compatible with another
    /// (some enchantments are mutually exclusive)
    pub fn is_compatible_with(&self, other: &EnchantmentType) -> bool {
        // Silk Touch and Fortune are incompatible
        if matches!(self, EnchantmentType::SilkTouch) && matches!(other, EnchantmentType::Fortune) {
            return false;
        }
        if matches!(self, EnchantmentType::Fortune) && matches!(other, EnchantmentType::SilkTouch) {
            return false;
        }

        // Protection enchantments are incompatible with each other
        let protection_types = [
            EnchantmentType::Protection,
            EnchantmentType::FireProtection,
            EnchantmentType::BlastProtection,
            EnchantmentType::ProjectileProtection,
        ];

        if protection_types.contains(self) && protection_types.contains(other) && self != other {
            return false;
        }

        // Infinity and Mending are incompatible (vanilla).
        if matches!(self, EnchantmentType::Infinity) && matches!(other, EnchantmentType::Mending) {
            return false;
        }
        if matches!(self, EnchantmentType::Mending) && matches!(other, EnchantmentType::Infinity) {
            return false;
        }

        // All other combinations are compatible
        true
    }
}

/// An enchantment with a specific level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Enchantment {
    /// The type of enchantment
    pub enchantment_type: EnchantmentType,
    /// The level of the enchantment (1 to max_level)
    pub level: u8,
}

impl Enchantment {
    /// Create a new enchantment, clamping `level` into `1..=max_level`.
    pub fn new(enchantment_type: EnchantmentType, level: u8) -> Self {
        let level = level.clamp(1, enchantment_type.max_level());
        Self {
            enchantment_type,
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_levels() {
        assert_eq!(EnchantmentType::Efficiency.max_level(), 5);
        assert_eq!(EnchantmentType::SilkTouch.max_level(), 1);
        assert_eq!(EnchantmentType::Unbreaking.max_level(), 3);
    }

    #[test]
    fn incompatible_pairs() {
        assert!(!EnchantmentType::SilkTouch.is_compatible_with(&EnchantmentType::Fortune));
        assert!(!EnchantmentType::Fortune.is_compatible_with(&EnchantmentType::SilkTouch));
        assert!(!EnchantmentType::Protection.is_compatible_with(&EnchantmentType::FireProtection));
        assert!(!EnchantmentType::Infinity.is_compatible_with(&EnchantmentType::Mending));
        assert!(EnchantmentType::Efficiency.is_compatible_with(&EnchantmentType::Unbreaking));
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(Enchantment::new(EnchantmentType::SilkTouch, 10).level, 1);
        assert_eq!(Enchantment::new(EnchantmentType::Efficiency, 0).level, 1);
        assert_eq!(Enchantment::new(EnchantmentType::Efficiency, 3).level, 3);
    }

    #[test]
    fn identifiers_resolve_for_every_type() {
        for ty in EnchantmentType::ALL {
            let key = ty.identifier();
            assert_eq!(key.namespace(), "minecraft");
            assert_eq!(EnchantmentType::from_identifier(&key), Some(ty));
        }
        let unknown = RegistryKey::parse("minecraft:soul_speed").unwrap();
        assert_eq!(EnchantmentType::from_identifier(&unknown), None);
        let modded = RegistryKey::parse("miner:efficiency").unwrap();
        assert_eq!(EnchantmentType::from_identifier(&modded), None);
    }
}
