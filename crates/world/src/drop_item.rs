//! Dropped item entities.
//!
//! Extraction steps hand their output to the world as a dropped item next to
//! the trigger. Dropped items age and despawn after 5 minutes.

use crate::host::EntityId;
use crate::pos::Location;
use minerworks_core::{DimensionId, ItemStack};
use serde::{Deserialize, Serialize};

/// Maximum lifetime for dropped items (5 minutes = 6000 ticks at 20 TPS).
pub const ITEM_DESPAWN_TICKS: u32 = 6000;

/// A dropped item entity in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedItem {
    /// Entity handle of this dropped item.
    pub id: EntityId,
    /// Dimension this item is in.
    pub dimension: DimensionId,
    /// World position.
    pub location: Location,
    /// The carried stack.
    pub stack: ItemStack,
    /// Ticks remaining before despawn.
    pub lifetime_ticks: u32,
}

impl DroppedItem {
    /// Create a new dropped item at the given position.
    pub fn new(id: EntityId, dimension: DimensionId, location: Location, stack: ItemStack) -> Self {
        Self {
            id,
            dimension,
            location,
            stack,
            lifetime_ticks: ITEM_DESPAWN_TICKS,
        }
    }

    /// Age the item by one tick.
    ///
    /// Returns `true` if the item should be removed (despawned).
    pub fn update(&mut self) -> bool {
        if self.lifetime_ticks == 0 {
            return true;
        }
        self.lifetime_ticks -= 1;
        false
    }
}
