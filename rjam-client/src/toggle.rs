//! Session-scoped switch for extended block replies.
//!
//! Block queries only carry an NBT payload after the server has been told
//! `world.setting include_nbt_with_data,1`. That setting has no reply of its
//! own on success, but a server that rejects it answers `Fail`, and that line
//! arrives where the first extended query expects its answer. The first query
//! after enabling therefore gets exactly one chance to skip a failure line.

use crate::connection::Connection;
use crate::error::ClientError;
use rjam_protocol::{Opcode, Scalar};
use serde::Serialize;
use tokio::sync::Mutex;

/// World setting that makes block queries carry their NBT payload.
pub const NBT_SETTING: &str = "include_nbt_with_data";

/// Whether the server has been switched to extended replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    #[default]
    Disabled,
    Enabled,
}

/// Switches extended replies on once per session and absorbs the race that
/// the switch causes.
#[derive(Debug, Default)]
pub struct ExtendedDataToggle {
    state: Mutex<ToggleState>,
}

impl ExtendedDataToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> ToggleState {
        *self.state.lock().await
    }

    pub async fn is_enabled(&self) -> bool {
        self.state().await == ToggleState::Enabled
    }

    /// Sends an extended query and returns its reply line.
    ///
    /// The toggle lock is held across the whole transition (setting, query
    /// and the recovery read), so concurrent callers never both flip the
    /// state or both consume a recovery line.
    pub async fn query(
        &self,
        conn: &Connection,
        opcode: Opcode,
        args: &[Scalar],
    ) -> Result<String, ClientError> {
        let mut state = self.state.lock().await;

        if *state == ToggleState::Enabled {
            drop(state);
            return conn.send_receive_flat(opcode, args).await;
        }

        let mut exchange = conn.lock().await?;
        exchange
            .send_flat(
                Opcode::WORLD_SETTING,
                &[Scalar::Str(NBT_SETTING.to_string()), Scalar::Bool(true)],
            )
            .await?;
        *state = ToggleState::Enabled;
        tracing::debug!("Enabled extended block data");

        match exchange.send_receive_flat(opcode, args).await {
            Err(ClientError::RemoteFailure { command }) => {
                tracing::warn!(
                    "Ignoring failure reply to {:?} while enabling extended block data",
                    command
                );
                exchange.receive().await
            }
            other => other,
        }
    }
}
