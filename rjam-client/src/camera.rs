//! Camera mode and position commands.

use crate::connection::Connection;
use crate::error::ClientError;
use rjam_protocol::{args, Argument, Opcode};

/// Controls the host player's camera.
#[derive(Clone, Copy)]
pub struct Camera<'a> {
    conn: &'a Connection,
}

impl<'a> Camera<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// First-person view, optionally from another entity's eyes.
    pub async fn set_normal(&self, entity_id: Option<i32>) -> Result<(), ClientError> {
        self.conn
            .send(Opcode::CAMERA_MODE_SET_NORMAL, &args![entity_id])
            .await
    }

    /// Fixed camera; place it with [`Camera::set_pos`].
    pub async fn set_fixed(&self) -> Result<(), ClientError> {
        self.conn.send(Opcode::CAMERA_MODE_SET_FIXED, &[]).await
    }

    /// Third-person view following the host player or the given entity.
    pub async fn set_follow(&self, entity_id: Option<i32>) -> Result<(), ClientError> {
        self.conn
            .send(Opcode::CAMERA_MODE_SET_FOLLOW, &args![entity_id])
            .await
    }

    pub async fn set_pos(&self, pos: impl Into<Argument>) -> Result<(), ClientError> {
        self.conn.send(Opcode::CAMERA_SET_POS, &args![pos]).await
    }
}
