//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors raised while encoding commands or decoding replies.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("argument nesting too deep (max {max})")]
    NestingTooDeep { max: usize },

    #[error("malformed reply: expected {expected}, got {reply:?}")]
    MalformedReply {
        expected: &'static str,
        reply: String,
    },

    #[error("reply line too long (max {max} bytes)")]
    LineTooLong { max: usize },

    #[error("invalid UTF-8 in reply")]
    InvalidUtf8,
}

impl ProtocolError {
    pub(crate) fn malformed(expected: &'static str, reply: &str) -> Self {
        ProtocolError::MalformedReply {
            expected,
            reply: reply.to_string(),
        }
    }

    /// Returns whether the error was caused by caller input rather than by the server.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidArgument(_) | ProtocolError::NestingTooDeep { .. }
        )
    }

    /// Returns whether the server's reply did not match the expected shape.
    pub fn is_malformed_reply(&self) -> bool {
        matches!(self, ProtocolError::MalformedReply { .. })
    }
}
