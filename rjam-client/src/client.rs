//! High-level client API.

use crate::camera::Camera;
use crate::config::Config;
use crate::connection::{Connection, ConnectionConfig, LineStream};
use crate::error::ClientError;
use crate::events::Events;
use crate::positioner::Positioner;
use crate::toggle::ExtendedDataToggle;
use rjam_protocol::flatten::floor_scalars;
use rjam_protocol::reply::{
    parse_block, parse_block_with_payload, parse_id_list, parse_int, parse_int_list,
};
use rjam_protocol::{args, decode, flatten, floor_flatten, Argument, Block, Opcode, Reply, Vec3};
use std::sync::Arc;

/// Leading fields of `world.setBlock` that are coordinates, id and data.
const SET_BLOCK_NUMERIC_FIELDS: usize = 5;

/// Leading fields of `world.setBlocks` that are coordinates, id and data.
const SET_BLOCKS_NUMERIC_FIELDS: usize = 8;

/// High-level client for a Raspberry Jam / Minecraft Pi server.
pub struct Client {
    conn: Arc<Connection>,
    extended: ExtendedDataToggle,
    player_id: Option<i32>,
}

impl Client {
    /// Creates a new client with the given configuration.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            conn: Arc::new(Connection::new(config)),
            extended: ExtendedDataToggle::new(),
            player_id: None,
        }
    }

    /// Creates a client from loaded configuration, including the player id.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.connection_config()).with_player_id(config.player.id)
    }

    /// Drives the given player entity instead of the host player.
    pub fn with_player_id(mut self, id: Option<i32>) -> Self {
        self.player_id = id;
        self
    }

    /// Connects to the server.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.conn.connect().await
    }

    /// Runs the client over an already established stream.
    pub async fn attach<S: LineStream + 'static>(&self, stream: S) {
        self.conn.attach(stream).await
    }

    /// Returns whether the client is connected.
    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Closes the connection.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.conn.close().await
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> Arc<Connection> {
        self.conn.clone()
    }

    /// Extended block data switch for this session.
    pub fn extended_data(&self) -> &ExtendedDataToggle {
        &self.extended
    }

    // =========================================================================
    // Facades
    // =========================================================================

    /// The player this client drives.
    pub fn player(&self) -> Positioner<'_> {
        Positioner::player(&self.conn, self.player_id)
    }

    /// Any entity by id.
    pub fn entity(&self, id: i32) -> Positioner<'_> {
        Positioner::entity(&self.conn, id)
    }

    pub fn camera(&self) -> Camera<'_> {
        Camera::new(&self.conn)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(&self.conn)
    }

    // =========================================================================
    // Block operations
    // =========================================================================

    /// Gets the block id at a position. Fractional coordinates are floored.
    pub async fn get_block(&self, pos: impl Into<Argument>) -> Result<i32, ClientError> {
        let flat = floor_flatten(&[pos.into()])?;
        let reply = self.conn.send_receive_flat(Opcode::WORLD_GET_BLOCK, &flat).await?;
        Ok(parse_int(&reply)?)
    }

    /// Gets the block id and data value at a position.
    pub async fn get_block_with_data(&self, pos: impl Into<Argument>) -> Result<Block, ClientError> {
        let flat = floor_flatten(&[pos.into()])?;
        let reply = self
            .conn
            .send_receive_flat(Opcode::WORLD_GET_BLOCK_WITH_DATA, &flat)
            .await?;
        Ok(parse_block(&reply)?)
    }

    /// Gets the block at a position including its NBT payload.
    ///
    /// The first call switches the session to extended block data.
    pub async fn get_block_with_nbt(&self, pos: impl Into<Argument>) -> Result<Block, ClientError> {
        let flat = floor_flatten(&[pos.into()])?;
        let reply = self
            .extended
            .query(&self.conn, Opcode::WORLD_GET_BLOCK_WITH_DATA, &flat)
            .await?;
        Ok(parse_block_with_payload(&reply)?)
    }

    /// Gets the block ids in a cuboid.
    pub async fn get_blocks(
        &self,
        from: impl Into<Argument>,
        to: impl Into<Argument>,
    ) -> Result<Vec<i32>, ClientError> {
        let flat = floor_flatten(&[from.into(), to.into()])?;
        let reply = self.conn.send_receive_flat(Opcode::WORLD_GET_BLOCKS, &flat).await?;
        Ok(parse_int_list(&reply)?)
    }

    /// Sets one block. Every numeric argument is floored.
    pub async fn set_block(
        &self,
        pos: impl Into<Argument>,
        block: impl Into<Argument>,
    ) -> Result<(), ClientError> {
        let flat = floor_flatten(&[pos.into(), block.into()])?;
        self.conn.send_flat(Opcode::WORLD_SET_BLOCK, &flat).await
    }

    /// Fills a cuboid with one block. Every numeric argument is floored.
    pub async fn set_blocks(
        &self,
        from: impl Into<Argument>,
        to: impl Into<Argument>,
        block: impl Into<Argument>,
    ) -> Result<(), ClientError> {
        let flat = floor_flatten(&[from.into(), to.into(), block.into()])?;
        self.conn.send_flat(Opcode::WORLD_SET_BLOCKS, &flat).await
    }

    /// Sets one block with an NBT payload. Only coordinates, id and data are floored.
    pub async fn set_block_with_nbt(
        &self,
        pos: impl Into<Argument>,
        block: &Block,
    ) -> Result<(), ClientError> {
        let mut flat = flatten(&[pos.into(), block.into()])?;
        let n = SET_BLOCK_NUMERIC_FIELDS.min(flat.len());
        floor_scalars(&mut flat[..n])?;
        self.conn.send_flat(Opcode::WORLD_SET_BLOCK, &flat).await
    }

    /// Fills a cuboid with a block carrying an NBT payload.
    pub async fn set_blocks_with_nbt(
        &self,
        from: impl Into<Argument>,
        to: impl Into<Argument>,
        block: &Block,
    ) -> Result<(), ClientError> {
        let mut flat = flatten(&[from.into(), to.into(), block.into()])?;
        let n = SET_BLOCKS_NUMERIC_FIELDS.min(flat.len());
        floor_scalars(&mut flat[..n])?;
        self.conn.send_flat(Opcode::WORLD_SET_BLOCKS, &flat).await
    }

    // =========================================================================
    // World operations
    // =========================================================================

    /// Gets the y of the highest non-air block at a column.
    pub async fn get_height(&self, x: f64, z: f64) -> Result<i32, ClientError> {
        let flat = floor_flatten(&args![x, z])?;
        let reply = self.conn.send_receive_flat(Opcode::WORLD_GET_HEIGHT, &flat).await?;
        Ok(parse_int(&reply)?)
    }

    /// Gets the entity id of a named player.
    pub async fn get_player_id(&self, name: &str) -> Result<i32, ClientError> {
        let reply = self
            .conn
            .send_receive(Opcode::WORLD_GET_PLAYER_ID, &args![name])
            .await?;
        Ok(parse_int(&reply)?)
    }

    /// Gets the entity ids of all connected players.
    pub async fn get_player_entity_ids(&self) -> Result<Vec<i32>, ClientError> {
        let reply = self.conn.send_receive(Opcode::WORLD_GET_PLAYER_IDS, &[]).await?;
        Ok(parse_id_list(&reply)?)
    }

    /// Spawns an entity and returns its id.
    pub async fn spawn_entity(
        &self,
        entity_type: &str,
        pos: Vec3,
        nbt: Option<&str>,
    ) -> Result<i32, ClientError> {
        let reply = self
            .conn
            .send_receive(Opcode::WORLD_SPAWN_ENTITY, &args![entity_type, pos, nbt])
            .await?;
        Ok(parse_int(&reply)?)
    }

    pub async fn remove_entity(&self, id: i32) -> Result<(), ClientError> {
        self.conn.send(Opcode::WORLD_REMOVE_ENTITY, &args![id]).await
    }

    pub async fn save_checkpoint(&self) -> Result<(), ClientError> {
        self.conn.send(Opcode::WORLD_CHECKPOINT_SAVE, &[]).await
    }

    pub async fn restore_checkpoint(&self) -> Result<(), ClientError> {
        self.conn.send(Opcode::WORLD_CHECKPOINT_RESTORE, &[]).await
    }

    /// Posts a message to the game chat.
    pub async fn post_to_chat(&self, message: &str) -> Result<(), ClientError> {
        self.conn.send(Opcode::CHAT_POST, &args![message]).await
    }

    /// Changes a world setting such as `world_immutable`.
    pub async fn setting(&self, key: &str, enabled: bool) -> Result<(), ClientError> {
        self.conn.send(Opcode::WORLD_SETTING, &args![key, enabled]).await
    }

    /// Sends any opcode and decodes the reply by the opcode's reply shape.
    ///
    /// Commands without a reply return [`Reply::None`] as soon as they are written.
    pub async fn raw(&self, opcode: Opcode, args: &[Argument]) -> Result<Reply, ClientError> {
        if !opcode.has_reply() {
            self.conn.send(opcode, args).await?;
            return Ok(Reply::None);
        }
        let reply = self.conn.send_receive(opcode, args).await?;
        Ok(decode(opcode, &reply)?)
    }
}
