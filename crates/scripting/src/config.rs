//! Automation configuration.
//!
//! Every struct is `#[serde(default)]`, so a TOML file only needs to name
//! the values it overrides.

use minerworks_core::RegistryKey;
use minerworks_world::EquipmentSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn key(id: &str) -> RegistryKey {
    RegistryKey::parse(id).unwrap_or_else(|_| RegistryKey::air())
}

/// Top-level automation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Ore radar sweep settings.
    pub ore_radar: OreRadarConfig,
    /// Backpack companion settings.
    pub companion: CompanionConfig,
}

impl AutomationConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

/// A sample item the radar accepts and the ore block it sweeps for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKind {
    /// Item held when interacting with the radar.
    pub sample: RegistryKey,
    /// Display label.
    pub label: String,
    /// Surface ore block.
    pub block: RegistryKey,
}

impl ResourceKind {
    fn new(sample: &str, label: &str, block: &str) -> Self {
        Self {
            sample: key(sample),
            label: label.to_string(),
            block: key(block),
        }
    }

    /// Deep variant of the ore block (`minecraft:deepslate_coal_ore`).
    pub fn deep_block(&self) -> RegistryKey {
        self.block.with_path_prefix("deepslate_")
    }

    /// Both block identities a sweep collects.
    pub fn target_blocks(&self) -> [RegistryKey; 2] {
        [self.block.clone(), self.deep_block()]
    }
}

/// Ore radar sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreRadarConfig {
    /// Entity type that starts a sweep when interacted with.
    pub trigger: RegistryKey,
    /// Horizontal half-extent of the scan column.
    pub half_extent: i32,
    /// Lowest scanned layer.
    pub floor_y: i32,
    /// Offset from the trigger's y to the first scanned layer.
    pub top_offset: f64,
    /// Ticks between consecutive extraction steps.
    pub step_interval: u64,
    /// Height above the trigger at which extracted items drop.
    pub drop_offset: f64,
    /// Commands broadcast after each extraction.
    pub feedback: FeedbackConfig,
    /// Accepted samples.
    pub resources: Vec<ResourceKind>,
}

impl Default for OreRadarConfig {
    fn default() -> Self {
        Self {
            trigger: key("miner:oreradar"),
            half_extent: 10,
            floor_y: -60,
            top_offset: -1.0,
            step_interval: 70,
            drop_offset: 1.3,
            feedback: FeedbackConfig::default(),
            resources: vec![
                ResourceKind::new("minecraft:coal", "§8Coal Ore", "minecraft:coal_ore"),
                ResourceKind::new("minecraft:iron_ingot", "§7Iron Ore", "minecraft:iron_ore"),
                ResourceKind::new("minecraft:gold_ingot", "§eGold Ore", "minecraft:gold_ore"),
                ResourceKind::new("minecraft:redstone", "§cRedstone Ore", "minecraft:redstone_ore"),
                ResourceKind::new("minecraft:lapis_lazuli", "§9Lapis Ore", "minecraft:lapis_ore"),
                ResourceKind::new("minecraft:diamond", "§lDiamond Ore", "minecraft:diamond_ore"),
                ResourceKind::new("minecraft:emerald", "§aEmerald Ore", "minecraft:emerald_ore"),
                ResourceKind::new("minecraft:copper_ingot", "§6Copper Ore", "minecraft:copper_ore"),
            ],
        }
    }
}

impl OreRadarConfig {
    /// Resource kind for a held sample, if it is one.
    pub fn resource(&self, sample: &RegistryKey) -> Option<&ResourceKind> {
        self.resources.iter().find(|kind| &kind.sample == sample)
    }
}

/// Particles, sounds and chat line emitted around radars after an extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Radius around the acting player in which radars emit feedback.
    pub radius: u32,
    /// Radius around each radar for the chat line.
    pub chat_radius: u32,
    /// Particle effects spawned at each radar.
    pub particles: Vec<String>,
    /// Sounds played to the nearest player.
    pub sounds: Vec<String>,
    /// Chat line; empty disables it.
    pub message: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            radius: 9,
            chat_radius: 5,
            particles: vec!["miner:radar".into(), "miner:radardot".into()],
            sounds: vec!["random.fizz".into(), "beacon.activate".into()],
            message: "- §6Ores Have Been Found".into(),
        }
    }
}

/// Entity event fired on a freshly spawned companion for a backpack level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierEvent {
    /// Backpack level.
    pub level: i64,
    /// Event to trigger.
    pub event: RegistryKey,
}

/// Backpack companion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Identifier prefix of qualifying backpack items.
    pub item_prefix: String,
    /// Companion entity type.
    pub entity: RegistryKey,
    /// Equipment slot watched for backpacks.
    pub slot: EquipmentSlot,
    /// Skin variant per item identifier suffix.
    pub skins: BTreeMap<String, i32>,
    /// Player property holding the backpack level.
    pub level_property: String,
    /// Level assumed when the property is unset or has no tier.
    pub default_level: i64,
    /// Tier events by level.
    pub tiers: Vec<TierEvent>,
    /// Duration of the invisibility applied to hidden companions.
    pub hide_duration_ticks: u32,
    /// Ticks between sync passes.
    pub interval: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        let skins = [
            ("default", 0),
            ("red", 1),
            ("aqua", 2),
            ("gray", 3),
            ("purple", 4),
            ("green", 5),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();

        Self {
            item_prefix: "miner:backpack".into(),
            entity: key("miner:backpack_inventory"),
            slot: EquipmentSlot::Chest,
            skins,
            level_property: "bdcraft:backpack_level".into(),
            default_level: 1,
            tiers: vec![
                TierEvent {
                    level: 1,
                    event: key("miner:tier_one"),
                },
                TierEvent {
                    level: 2,
                    event: key("miner:tier_two"),
                },
                TierEvent {
                    level: 3,
                    event: key("miner:tier_three"),
                },
            ],
            hide_duration_ticks: 888_888,
            interval: 1,
        }
    }
}

impl CompanionConfig {
    /// Tier event for `level`, falling back to the default level's tier.
    pub fn tier_event(&self, level: i64) -> Option<&RegistryKey> {
        let find = |level| self.tiers.iter().find(|t| t.level == level);
        find(level)
            .or_else(|| find(self.default_level))
            .map(|tier| &tier.event)
    }

    /// Skin variant for an item identifier, by its last `_` token.
    pub fn skin_for(&self, item: &RegistryKey) -> Option<i32> {
        self.skins.get(item.last_token()).copied()
    }
}
