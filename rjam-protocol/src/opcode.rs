//! Opcode catalogue and the static reply-shape table.

use std::fmt;

/// A dotted command name, fixed per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(&'static str);

impl Opcode {
    // World
    pub const WORLD_GET_BLOCK: Self = Self("world.getBlock");
    pub const WORLD_GET_BLOCK_WITH_DATA: Self = Self("world.getBlockWithData");
    pub const WORLD_GET_BLOCKS: Self = Self("world.getBlocks");
    pub const WORLD_SET_BLOCK: Self = Self("world.setBlock");
    pub const WORLD_SET_BLOCKS: Self = Self("world.setBlocks");
    pub const WORLD_GET_HEIGHT: Self = Self("world.getHeight");
    pub const WORLD_GET_PLAYER_ID: Self = Self("world.getPlayerId");
    pub const WORLD_GET_PLAYER_IDS: Self = Self("world.getPlayerIds");
    pub const WORLD_SPAWN_ENTITY: Self = Self("world.spawnEntity");
    pub const WORLD_REMOVE_ENTITY: Self = Self("world.removeEntity");
    pub const WORLD_CHECKPOINT_SAVE: Self = Self("world.checkpoint.save");
    pub const WORLD_CHECKPOINT_RESTORE: Self = Self("world.checkpoint.restore");
    pub const WORLD_SETTING: Self = Self("world.setting");

    // Chat
    pub const CHAT_POST: Self = Self("chat.post");

    // Events
    pub const EVENTS_CLEAR: Self = Self("events.clear");
    pub const EVENTS_BLOCK_HITS: Self = Self("events.block.hits");
    pub const EVENTS_CHAT_POSTS: Self = Self("events.chat.posts");

    // Camera
    pub const CAMERA_MODE_SET_NORMAL: Self = Self("camera.mode.setNormal");
    pub const CAMERA_MODE_SET_FIXED: Self = Self("camera.mode.setFixed");
    pub const CAMERA_MODE_SET_FOLLOW: Self = Self("camera.mode.setFollow");
    pub const CAMERA_SET_POS: Self = Self("camera.setPos");

    // Player
    pub const PLAYER_GET_POS: Self = Self("player.getPos");
    pub const PLAYER_SET_POS: Self = Self("player.setPos");
    pub const PLAYER_GET_TILE: Self = Self("player.getTile");
    pub const PLAYER_SET_TILE: Self = Self("player.setTile");
    pub const PLAYER_GET_DIRECTION: Self = Self("player.getDirection");
    pub const PLAYER_SET_DIRECTION: Self = Self("player.setDirection");
    pub const PLAYER_GET_ROTATION: Self = Self("player.getRotation");
    pub const PLAYER_SET_ROTATION: Self = Self("player.setRotation");
    pub const PLAYER_GET_PITCH: Self = Self("player.getPitch");
    pub const PLAYER_SET_PITCH: Self = Self("player.setPitch");
    pub const PLAYER_SETTING: Self = Self("player.setting");

    // Entity
    pub const ENTITY_GET_POS: Self = Self("entity.getPos");
    pub const ENTITY_SET_POS: Self = Self("entity.setPos");
    pub const ENTITY_GET_TILE: Self = Self("entity.getTile");
    pub const ENTITY_SET_TILE: Self = Self("entity.setTile");
    pub const ENTITY_GET_DIRECTION: Self = Self("entity.getDirection");
    pub const ENTITY_SET_DIRECTION: Self = Self("entity.setDirection");
    pub const ENTITY_GET_ROTATION: Self = Self("entity.getRotation");
    pub const ENTITY_SET_ROTATION: Self = Self("entity.setRotation");
    pub const ENTITY_GET_PITCH: Self = Self("entity.getPitch");
    pub const ENTITY_SET_PITCH: Self = Self("entity.setPitch");
    pub const ENTITY_SETTING: Self = Self("entity.setting");

    /// Every opcode in the catalogue.
    pub const ALL: &'static [Opcode] = &[
        Self::WORLD_GET_BLOCK,
        Self::WORLD_GET_BLOCK_WITH_DATA,
        Self::WORLD_GET_BLOCKS,
        Self::WORLD_SET_BLOCK,
        Self::WORLD_SET_BLOCKS,
        Self::WORLD_GET_HEIGHT,
        Self::WORLD_GET_PLAYER_ID,
        Self::WORLD_GET_PLAYER_IDS,
        Self::WORLD_SPAWN_ENTITY,
        Self::WORLD_REMOVE_ENTITY,
        Self::WORLD_CHECKPOINT_SAVE,
        Self::WORLD_CHECKPOINT_RESTORE,
        Self::WORLD_SETTING,
        Self::CHAT_POST,
        Self::EVENTS_CLEAR,
        Self::EVENTS_BLOCK_HITS,
        Self::EVENTS_CHAT_POSTS,
        Self::CAMERA_MODE_SET_NORMAL,
        Self::CAMERA_MODE_SET_FIXED,
        Self::CAMERA_MODE_SET_FOLLOW,
        Self::CAMERA_SET_POS,
        Self::PLAYER_GET_POS,
        Self::PLAYER_SET_POS,
        Self::PLAYER_GET_TILE,
        Self::PLAYER_SET_TILE,
        Self::PLAYER_GET_DIRECTION,
        Self::PLAYER_SET_DIRECTION,
        Self::PLAYER_GET_ROTATION,
        Self::PLAYER_SET_ROTATION,
        Self::PLAYER_GET_PITCH,
        Self::PLAYER_SET_PITCH,
        Self::PLAYER_SETTING,
        Self::ENTITY_GET_POS,
        Self::ENTITY_SET_POS,
        Self::ENTITY_GET_TILE,
        Self::ENTITY_SET_TILE,
        Self::ENTITY_GET_DIRECTION,
        Self::ENTITY_SET_DIRECTION,
        Self::ENTITY_GET_ROTATION,
        Self::ENTITY_SET_ROTATION,
        Self::ENTITY_GET_PITCH,
        Self::ENTITY_SET_PITCH,
        Self::ENTITY_SETTING,
    ];

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Looks up a catalogue opcode by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.0 == name)
    }

    /// Returns the shape of this opcode's reply.
    pub fn reply_shape(&self) -> ReplyShape {
        match *self {
            Self::WORLD_GET_BLOCK
            | Self::WORLD_GET_HEIGHT
            | Self::WORLD_GET_PLAYER_ID
            | Self::WORLD_SPAWN_ENTITY => ReplyShape::Int,
            Self::WORLD_GET_BLOCK_WITH_DATA => ReplyShape::BlockWithPayload,
            Self::WORLD_GET_BLOCKS => ReplyShape::IntList,
            Self::WORLD_GET_PLAYER_IDS => ReplyShape::IdList,
            Self::EVENTS_BLOCK_HITS => ReplyShape::BlockHits,
            Self::EVENTS_CHAT_POSTS => ReplyShape::ChatPosts,
            Self::PLAYER_GET_POS
            | Self::PLAYER_GET_DIRECTION
            | Self::ENTITY_GET_POS
            | Self::ENTITY_GET_DIRECTION => ReplyShape::Vec3,
            Self::PLAYER_GET_TILE | Self::ENTITY_GET_TILE => ReplyShape::TilePos,
            Self::PLAYER_GET_ROTATION
            | Self::PLAYER_GET_PITCH
            | Self::ENTITY_GET_ROTATION
            | Self::ENTITY_GET_PITCH => ReplyShape::Float,
            _ => ReplyShape::None,
        }
    }

    /// Returns whether the server answers this opcode with a reply line.
    pub fn has_reply(&self) -> bool {
        self.reply_shape() != ReplyShape::None
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How a reply line must be parsed.
///
/// The shape is a property of the opcode, never inferred from the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyShape {
    /// Fire-and-forget; the server sends nothing back on success.
    None,
    /// A single integer.
    Int,
    /// A single float.
    Float,
    /// Three floats.
    Vec3,
    /// Three integers.
    TilePos,
    /// Block id and data; any trailing fields are ignored.
    ///
    /// No opcode has this shape in the table. It is for callers that read
    /// `world.getBlockWithData` without its payload.
    Block,
    /// Comma-separated integers of any length.
    IntList,
    /// Pipe-separated integers.
    IdList,
    /// Pipe-separated block hit records.
    BlockHits,
    /// Pipe-separated chat post records.
    ChatPosts,
    /// Block id and data, optionally followed by a braced payload.
    BlockWithPayload,
}

impl ReplyShape {
    /// Number of leading fields a fixed-arity reply must carry.
    pub fn arity(&self) -> Option<usize> {
        match self {
            ReplyShape::Int | ReplyShape::Float => Some(1),
            ReplyShape::Vec3 | ReplyShape::TilePos => Some(3),
            ReplyShape::Block | ReplyShape::BlockWithPayload => Some(2),
            _ => None,
        }
    }

    /// Returns whether the reply is a `|`-separated record list.
    pub fn is_pipe_list(&self) -> bool {
        matches!(
            self,
            ReplyShape::IdList | ReplyShape::BlockHits | ReplyShape::ChatPosts
        )
    }
}
