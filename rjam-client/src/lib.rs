//! # rjam-client
//!
//! Client library for the Raspberry Jam / Minecraft Pi command protocol.
//!
//! This crate provides:
//! - Async TCP connection with line framing and request/response exchanges
//! - High-level API for world, player, entity, camera and event commands
//! - Session-scoped switching of block queries to include NBT payloads
//! - Configuration from YAML files and environment variables

pub mod camera;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod positioner;
pub mod toggle;

#[cfg(test)]
mod testing;

pub use camera::Camera;
pub use client::Client;
pub use config::{Config, ConfigError};
pub use connection::{Connection, ConnectionConfig, Exchange, LineStream};
pub use error::ClientError;
pub use events::Events;
pub use positioner::Positioner;
pub use toggle::{ExtendedDataToggle, ToggleState};
