//! Client error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] rjam_protocol::ProtocolError),

    #[error("not connected")]
    NotConnected,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("request timeout")]
    Timeout,

    #[error("server reported failure for {command:?}")]
    RemoteFailure { command: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Returns whether the server rejected the command.
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, ClientError::RemoteFailure { .. })
    }

    /// Returns whether the reply did not have the shape its opcode promises.
    pub fn is_malformed_reply(&self) -> bool {
        matches!(self, ClientError::Protocol(e) if e.is_malformed_reply())
    }

    /// Returns whether the arguments were rejected before anything was sent.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ClientError::Protocol(e) if e.is_invalid_argument())
    }

    /// Returns whether the connection itself is at fault.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_)
                | ClientError::NotConnected
                | ClientError::ConnectionClosed
                | ClientError::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rjam_protocol::ProtocolError;

    #[test]
    fn test_classification() {
        let err = ClientError::RemoteFailure {
            command: "world.getBlock 1,2,3".into(),
        };
        assert!(err.is_remote_failure());
        assert!(!err.is_transport_failure());
        assert!(err.to_string().contains("world.getBlock 1,2,3"));

        let err = ClientError::from(ProtocolError::MalformedReply {
            expected: "integer",
            reply: "x".into(),
        });
        assert!(err.is_malformed_reply());
        assert!(!err.is_remote_failure());

        let err = ClientError::from(ProtocolError::NestingTooDeep { max: 64 });
        assert!(err.is_invalid_argument());

        assert!(ClientError::Timeout.is_transport_failure());
        assert!(ClientError::ConnectionClosed.is_transport_failure());
    }
}
