#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod dimension;
pub mod enchantment;
pub mod item;
pub mod registry;
pub mod saved_item;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use dimension::DimensionId;
pub use enchantment::{Enchantment, EnchantmentType};
pub use item::{Durability, ItemCapabilities, ItemStack, LockMode, ToolMaterial, ToolType};
pub use registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};
pub use saved_item::{reconstruct, snapshot, SavedEnchantment, SavedItemError, SavedItemState};

/// Host tick counter (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Ticks elapsed since `earlier` (saturating at zero).
    pub fn since(self, earlier: SimTick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Helper to derive a reproducible RNG for scene seeding.
pub fn scoped_rng(world_seed: u64, domain: u64, tick: SimTick) -> StdRng {
    let seed = world_seed ^ domain.rotate_left(17) ^ tick.0;
    StdRng::seed_from_u64(seed)
}
