//! # rjam-protocol
//!
//! Wire protocol implementation for rjam, a client for the Raspberry Jam /
//! Minecraft Pi line-oriented command protocol.
//!
//! This crate provides:
//! - Argument trees and their depth-first flattening into scalars
//! - Command line encoding (`opcode arg,arg,...`)
//! - Reply decoding for every reply shape the server produces
//! - The opcode catalogue with its static reply-shape table
//! - Line framing for the transport
//!
//! Nothing in here performs I/O.

pub mod argument;
pub mod codec;
pub mod error;
pub mod flatten;
pub mod opcode;
pub mod reply;
pub mod types;

pub use argument::{Argument, Scalar};
pub use codec::{Encoder, LineDecoder};
pub use error::ProtocolError;
pub use flatten::{flatten, floor_flatten};
pub use opcode::{Opcode, ReplyShape};
pub use reply::{decode, Reply};
pub use types::{Block, BlockEvent, ChatEvent, TilePos, Vec3};

/// Default host of the game's API listener.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port of the game's API listener.
pub const DEFAULT_PORT: u16 = 4711;

/// Reply line the server sends when a command fails.
pub const FAIL_REPLY: &str = "Fail";

/// Maximum nesting depth accepted by the flattener.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Maximum length of a single reply line (1 MiB).
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;
