use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Continuous world position of an entity.
pub type Location = DVec3;

/// Integer block coordinate.
///
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then y, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a continuous location.
    pub fn containing(location: Location) -> Self {
        Self {
            x: location.x.floor() as i32,
            y: location.y.floor() as i32,
            z: location.z.floor() as i32,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned block volume, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVolume {
    min: BlockPos,
    max: BlockPos,
}

impl BlockVolume {
    /// Build a volume from any two opposite corners.
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Column volume centred on `center`: `half_extent` blocks either side
    /// horizontally, from `top_y` down to `floor_y`.
    pub fn column(center: BlockPos, half_extent: i32, top_y: i32, floor_y: i32) -> Self {
        Self::new(
            BlockPos::new(center.x - half_extent, top_y, center.z - half_extent),
            BlockPos::new(center.x + half_extent, floor_y, center.z + half_extent),
        )
    }

    pub fn min(&self) -> BlockPos {
        self.min
    }

    pub fn max(&self) -> BlockPos {
        self.max
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        (self.min.x..=self.max.x).contains(&pos.x)
            && (self.min.y..=self.max.y).contains(&pos.y)
            && (self.min.z..=self.max.z).contains(&pos.z)
    }

    /// Number of block positions covered.
    pub fn block_count(&self) -> u64 {
        let span = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u64;
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y) * span(self.min.z, self.max.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = BlockPos::containing(Location::new(-0.5, 12.9, 3.0));
        assert_eq!(pos, BlockPos::new(-1, 12, 3));
    }

    #[test]
    fn volume_normalises_corners() {
        let volume = BlockVolume::new(BlockPos::new(10, 5, -3), BlockPos::new(-10, -60, 3));
        assert_eq!(volume.min(), BlockPos::new(-10, -60, -3));
        assert_eq!(volume.max(), BlockPos::new(10, 5, 3));
        assert!(volume.contains(BlockPos::new(0, -60, 0)));
        assert!(volume.contains(BlockPos::new(10, 5, 3)));
        assert!(!volume.contains(BlockPos::new(11, 0, 0)));
        assert!(!volume.contains(BlockPos::new(0, -61, 0)));
    }

    #[test]
    fn column_spans_down_to_floor() {
        let volume = BlockVolume::column(BlockPos::new(0, 63, 0), 10, 62, -60);
        assert_eq!(volume.min(), BlockPos::new(-10, -60, -10));
        assert_eq!(volume.max(), BlockPos::new(10, 62, 10));
        assert_eq!(volume.block_count(), 21 * 123 * 21);
    }

    #[test]
    fn column_below_floor_still_covers_both_rows() {
        let volume = BlockVolume::column(BlockPos::new(0, -62, 0), 1, -63, -60);
        assert!(volume.contains(BlockPos::new(0, -63, 0)));
        assert!(volume.contains(BlockPos::new(0, -60, 0)));
    }
}
