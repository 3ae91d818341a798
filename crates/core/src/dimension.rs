//! Dimension identifiers.
//!
//! Every block query and entity spawn the automation performs is scoped to
//! the dimension its trigger or player lives in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a world dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionId {
    /// The Overworld dimension.
    Overworld,
    /// The Nether dimension.
    Nether,
    /// The End dimension.
    End,
}

impl DimensionId {
    /// Default (Overworld) dimension.
    pub const DEFAULT: Self = Self::Overworld;

    /// Host identifier (`minecraft:overworld`, ...).
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Overworld => "minecraft:overworld",
            Self::Nether => "minecraft:nether",
            Self::End => "minecraft:the_end",
        }
    }

    /// Parse a host dimension identifier.
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id {
            "minecraft:overworld" | "overworld" => Some(Self::Overworld),
            "minecraft:nether" | "nether" => Some(Self::Nether),
            "minecraft:the_end" | "the_end" | "end" => Some(Self::End),
            _ => None,
        }
    }
}

impl Default for DimensionId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
