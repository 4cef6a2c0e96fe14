//! Position, direction and orientation commands for players and entities.

use crate::connection::Connection;
use crate::error::ClientError;
use rjam_protocol::reply::{parse_float, parse_tile_pos, parse_vec3};
use rjam_protocol::{args, floor_flatten, Argument, Opcode, TilePos, Vec3};

/// The opcodes of one positionable family (`player.*` or `entity.*`).
#[derive(Debug)]
struct Family {
    get_pos: Opcode,
    set_pos: Opcode,
    get_tile: Opcode,
    set_tile: Opcode,
    get_direction: Opcode,
    set_direction: Opcode,
    get_rotation: Opcode,
    set_rotation: Opcode,
    get_pitch: Opcode,
    set_pitch: Opcode,
    setting: Opcode,
}

static PLAYER: Family = Family {
    get_pos: Opcode::PLAYER_GET_POS,
    set_pos: Opcode::PLAYER_SET_POS,
    get_tile: Opcode::PLAYER_GET_TILE,
    set_tile: Opcode::PLAYER_SET_TILE,
    get_direction: Opcode::PLAYER_GET_DIRECTION,
    set_direction: Opcode::PLAYER_SET_DIRECTION,
    get_rotation: Opcode::PLAYER_GET_ROTATION,
    set_rotation: Opcode::PLAYER_SET_ROTATION,
    get_pitch: Opcode::PLAYER_GET_PITCH,
    set_pitch: Opcode::PLAYER_SET_PITCH,
    setting: Opcode::PLAYER_SETTING,
};

static ENTITY: Family = Family {
    get_pos: Opcode::ENTITY_GET_POS,
    set_pos: Opcode::ENTITY_SET_POS,
    get_tile: Opcode::ENTITY_GET_TILE,
    set_tile: Opcode::ENTITY_SET_TILE,
    get_direction: Opcode::ENTITY_GET_DIRECTION,
    set_direction: Opcode::ENTITY_SET_DIRECTION,
    get_rotation: Opcode::ENTITY_GET_ROTATION,
    set_rotation: Opcode::ENTITY_SET_ROTATION,
    get_pitch: Opcode::ENTITY_GET_PITCH,
    set_pitch: Opcode::ENTITY_SET_PITCH,
    setting: Opcode::ENTITY_SETTING,
};

/// Moves and inspects one player or entity.
///
/// The host player is addressed through `player.*` with no id on the wire.
/// Any other target goes through `entity.*` with its id as the first argument.
#[derive(Clone, Copy)]
pub struct Positioner<'a> {
    conn: &'a Connection,
    family: &'static Family,
    id: Option<i32>,
}

impl<'a> Positioner<'a> {
    /// The host player, or the player entity `id` when one is given.
    pub(crate) fn player(conn: &'a Connection, id: Option<i32>) -> Self {
        let family = if id.is_some() { &ENTITY } else { &PLAYER };
        Self { conn, family, id }
    }

    /// Any entity by id.
    pub(crate) fn entity(conn: &'a Connection, id: i32) -> Self {
        Self {
            conn,
            family: &ENTITY,
            id: Some(id),
        }
    }

    /// Entity id sent with each command, if any.
    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub async fn get_pos(&self) -> Result<Vec3, ClientError> {
        let reply = self
            .conn
            .send_receive(self.family.get_pos, &args![self.id])
            .await?;
        Ok(parse_vec3(&reply)?)
    }

    pub async fn set_pos(&self, pos: Vec3) -> Result<(), ClientError> {
        self.conn
            .send(self.family.set_pos, &args![self.id, pos])
            .await
    }

    pub async fn get_tile_pos(&self) -> Result<TilePos, ClientError> {
        let reply = self
            .conn
            .send_receive(self.family.get_tile, &args![self.id])
            .await?;
        Ok(parse_tile_pos(&reply)?)
    }

    /// Moves to the tile containing `pos`; fractional coordinates are floored.
    pub async fn set_tile_pos(&self, pos: impl Into<Argument>) -> Result<(), ClientError> {
        let flat = floor_flatten(&args![self.id, pos])?;
        self.conn.send_flat(self.family.set_tile, &flat).await
    }

    /// Unit vector the target is facing.
    pub async fn get_direction(&self) -> Result<Vec3, ClientError> {
        let reply = self
            .conn
            .send_receive(self.family.get_direction, &args![self.id])
            .await?;
        Ok(parse_vec3(&reply)?)
    }

    pub async fn set_direction(&self, direction: Vec3) -> Result<(), ClientError> {
        self.conn
            .send(self.family.set_direction, &args![self.id, direction])
            .await
    }

    /// Yaw in degrees.
    pub async fn get_rotation(&self) -> Result<f64, ClientError> {
        let reply = self
            .conn
            .send_receive(self.family.get_rotation, &args![self.id])
            .await?;
        Ok(parse_float(&reply)?)
    }

    pub async fn set_rotation(&self, degrees: f64) -> Result<(), ClientError> {
        self.conn
            .send(self.family.set_rotation, &args![self.id, degrees])
            .await
    }

    pub async fn get_pitch(&self) -> Result<f64, ClientError> {
        let reply = self
            .conn
            .send_receive(self.family.get_pitch, &args![self.id])
            .await?;
        Ok(parse_float(&reply)?)
    }

    pub async fn set_pitch(&self, degrees: f64) -> Result<(), ClientError> {
        self.conn
            .send(self.family.set_pitch, &args![self.id, degrees])
            .await
    }

    /// Changes a family-wide setting such as `autojump`. No id is sent.
    pub async fn setting(&self, key: &str, enabled: bool) -> Result<(), ClientError> {
        self.conn
            .send(self.family.setting, &args![key, enabled])
            .await
    }
}
