//! Event polling.
//!
//! The server queues block hits and chat posts between polls; each poll
//! returns and drains whatever is queued at that moment.

use crate::connection::Connection;
use crate::error::ClientError;
use rjam_protocol::reply::{parse_block_hits, parse_chat_posts};
use rjam_protocol::{BlockEvent, ChatEvent, Opcode};

#[derive(Clone, Copy)]
pub struct Events<'a> {
    conn: &'a Connection,
}

impl<'a> Events<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Discards all queued events.
    pub async fn clear_all(&self) -> Result<(), ClientError> {
        self.conn.send(Opcode::EVENTS_CLEAR, &[]).await
    }

    /// Blocks struck with a sword since the last poll.
    pub async fn poll_block_hits(&self) -> Result<Vec<BlockEvent>, ClientError> {
        let reply = self.conn.send_receive(Opcode::EVENTS_BLOCK_HITS, &[]).await?;
        let hits = parse_block_hits(&reply)?;
        tracing::debug!("Polled {} block hits", hits.len());
        Ok(hits)
    }

    /// Chat messages posted since the last poll.
    pub async fn poll_chat_posts(&self) -> Result<Vec<ChatEvent>, ClientError> {
        let reply = self.conn.send_receive(Opcode::EVENTS_CHAT_POSTS, &[]).await?;
        let posts = parse_chat_posts(&reply)?;
        tracing::debug!("Polled {} chat posts", posts.len());
        Ok(posts)
    }
}
