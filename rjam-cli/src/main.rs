//! rjam-cli - Command-line interface for Raspberry Jam / Minecraft Pi servers
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rjam_client::{Client, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rjam-cli")]
#[command(about = "Command-line interface for Raspberry Jam / Minecraft Pi servers")]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(short = 'H', long, env = "RJAM_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "RJAM_PORT")]
    port: Option<u16>,

    /// Drive this player entity instead of the host player
    #[arg(long, env = "MINECRAFT_PLAYER_ID")]
    player_id: Option<i32>,

    /// YAML config file
    #[arg(short, long, env = "RJAM_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// A block position.
#[derive(Args, Debug, Clone, Copy)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Two corners of a cuboid.
#[derive(Args, Debug, Clone, Copy)]
pub struct Cuboid {
    pub x1: f64,
    pub y1: f64,
    pub z1: f64,
    pub x2: f64,
    pub y2: f64,
    pub z2: f64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start interactive REPL
    Repl,

    /// Post a message to the game chat
    Chat {
        /// Message words
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Get the block at a position
    #[command(allow_negative_numbers = true)]
    GetBlock {
        #[command(flatten)]
        pos: Coords,

        /// Include the data value
        #[arg(long)]
        data: bool,

        /// Include the data value and NBT payload
        #[arg(long, conflicts_with = "data")]
        nbt: bool,
    },

    /// Get the block ids in a cuboid
    #[command(allow_negative_numbers = true)]
    GetBlocks {
        #[command(flatten)]
        cuboid: Cuboid,
    },

    /// Set the block at a position
    #[command(allow_negative_numbers = true)]
    SetBlock {
        #[command(flatten)]
        pos: Coords,

        /// Block id
        id: i32,

        /// Block data value
        #[arg(default_value = "0")]
        data: i32,

        /// NBT payload, e.g. '{Lock:"key"}'
        #[arg(long)]
        nbt: Option<String>,
    },

    /// Fill a cuboid with one block
    #[command(allow_negative_numbers = true)]
    SetBlocks {
        #[command(flatten)]
        cuboid: Cuboid,

        /// Block id
        id: i32,

        /// Block data value
        #[arg(default_value = "0")]
        data: i32,

        /// NBT payload
        #[arg(long)]
        nbt: Option<String>,
    },

    /// Get the height of the highest block in a column
    #[command(allow_negative_numbers = true)]
    Height { x: f64, z: f64 },

    /// Show the player's position
    PlayerPos,

    /// Move the player
    #[command(allow_negative_numbers = true)]
    Teleport {
        #[command(flatten)]
        pos: Coords,
    },

    /// List connected players' entity ids
    PlayerIds,

    /// Save or restore the world checkpoint
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },

    /// Change a world setting
    Setting {
        /// Setting name, e.g. world_immutable
        key: String,

        /// on/off, true/false, 1/0
        #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
        value: bool,
    },

    /// Poll block hit events
    Hits,

    /// Poll chat events
    Chats,

    /// Discard queued events
    ClearEvents,

    /// Change the camera mode
    Camera {
        #[command(subcommand)]
        mode: CameraMode,
    },

    /// Place the fixed camera
    #[command(allow_negative_numbers = true)]
    CameraPos {
        #[command(flatten)]
        pos: Coords,
    },

    /// Send any command and decode the reply
    Raw {
        /// Opcode, e.g. world.getHeight
        opcode: String,

        /// Arguments; integers, floats and strings are recognised
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CheckpointAction {
    /// Save the world checkpoint
    Save,
    /// Restore the world checkpoint
    Restore,
}

#[derive(Subcommand, Debug)]
pub enum CameraMode {
    /// First-person view
    Normal {
        /// View from this entity
        entity: Option<i32>,
    },
    /// Fixed camera
    Fixed,
    /// Third-person view
    Follow {
        /// Follow this entity
        entity: Option<i32>,
    },
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::load()?,
    };

    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.player_id.is_some() {
        config.player.id = cli.player_id;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli).map_err(|e| {
        eprintln!("{}: {}", "Configuration error".red(), e);
        e
    })?;
    tracing::debug!(
        "Using server {}:{} (player {:?})",
        config.server.host,
        config.server.port,
        config.player.id
    );
    let client = Client::from_config(&config);

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(client, &config, cli.json).await?;
        }
        Some(cmd) => {
            client.connect().await.map_err(|e| {
                eprintln!("{}: {}", "Connection failed".red(), e);
                e
            })?;

            let result = commands::execute(&client, cmd, cli.json).await;

            match result {
                Ok(output) => {
                    println!("{}", output);
                }
                Err(e) => {
                    eprintln!("{}: {}", "Error".red(), e);
                    std::process::exit(1);
                }
            }

            client.close().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates() {
        let cli = Cli::try_parse_from(["rjam-cli", "get-block", "-3", "64", "-7.5", "--nbt"]).unwrap();
        match cli.command {
            Some(Commands::GetBlock { pos, data, nbt }) => {
                assert_eq!(pos.x, -3.0);
                assert_eq!(pos.z, -7.5);
                assert!(!data);
                assert!(nbt);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_set_block_defaults() {
        let cli = Cli::try_parse_from(["rjam-cli", "set-block", "1", "2", "3", "35"]).unwrap();
        match cli.command {
            Some(Commands::SetBlock { id, data, nbt, .. }) => {
                assert_eq!(id, 35);
                assert_eq!(data, 0);
                assert!(nbt.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_setting_accepts_boolish_values() {
        let cli = Cli::try_parse_from(["rjam-cli", "setting", "world_immutable", "on"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Setting { value: true, .. })
        ));
    }
}
