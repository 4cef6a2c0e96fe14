//! Value objects carried by commands and replies.

use crate::argument::Argument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position or direction in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the tile containing this position.
    pub fn tile(&self) -> TilePos {
        TilePos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<Vec3> for Argument {
    fn from(v: Vec3) -> Self {
        Argument::from([v.x, v.y, v.z])
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<TilePos> for Argument {
    fn from(p: TilePos) -> Self {
        Argument::from([p.x, p.y, p.z])
    }
}

/// A block type with its data value and optional NBT payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub id: i32,
    pub data: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<String>,
}

impl Block {
    pub const AIR: Self = Self::new(0);
    pub const STONE: Self = Self::new(1);
    pub const GRASS: Self = Self::new(2);
    pub const DIRT: Self = Self::new(3);
    pub const COBBLESTONE: Self = Self::new(4);
    pub const WOOD_PLANKS: Self = Self::new(5);
    pub const BEDROCK: Self = Self::new(7);
    pub const WATER: Self = Self::new(8);
    pub const LAVA: Self = Self::new(10);
    pub const SAND: Self = Self::new(12);
    pub const GOLD_BLOCK: Self = Self::new(41);
    pub const GLASS: Self = Self::new(20);
    pub const WOOL: Self = Self::new(35);
    pub const TNT: Self = Self::new(46);
    pub const CHEST: Self = Self::new(54);
    pub const DIAMOND_BLOCK: Self = Self::new(57);

    pub const fn new(id: i32) -> Self {
        Self {
            id,
            data: 0,
            nbt: None,
        }
    }

    pub const fn with_data(id: i32, data: i32) -> Self {
        Self {
            id,
            data,
            nbt: None,
        }
    }

    pub fn with_nbt(mut self, nbt: impl Into<String>) -> Self {
        self.nbt = Some(nbt.into());
        self
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.data)?;
        if let Some(ref nbt) = self.nbt {
            write!(f, " {}", nbt)?;
        }
        Ok(())
    }
}

/// Flattens to `id,data` followed by the NBT payload when present.
impl From<Block> for Argument {
    fn from(b: Block) -> Self {
        let mut items = vec![Argument::from(b.id), Argument::from(b.data)];
        if let Some(nbt) = b.nbt {
            items.push(Argument::from(nbt));
        }
        Argument::Seq(items)
    }
}

impl From<&Block> for Argument {
    fn from(b: &Block) -> Self {
        Argument::from(b.clone())
    }
}

/// A block struck by a player's sword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub pos: TilePos,
    pub face: i32,
    pub entity_id: i32,
}

impl fmt::Display for BlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hit {} face {} by entity {}",
            self.pos, self.face, self.entity_id
        )
    }
}

/// A message posted to the game chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub entity_id: i32,
    pub message: String,
}

impl fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {}", self.entity_id, self.message)
    }
}
