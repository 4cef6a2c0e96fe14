//! Command execution.

use crate::{CameraMode, CheckpointAction, Commands, Coords, Cuboid};
use colored::Colorize;
use rjam_client::Client;
use rjam_protocol::{Argument, Block, BlockEvent, ChatEvent, Opcode, Reply, Vec3};
use serde::Serialize;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Executes a command and returns the formatted output.
pub async fn execute(client: &Client, cmd: Commands, json: bool) -> CommandResult {
    match cmd {
        Commands::Repl => Ok("Already in the REPL".yellow().to_string()),

        Commands::Chat { message } => {
            client.post_to_chat(&message.join(" ")).await?;
            Ok(done("Posted"))
        }

        Commands::GetBlock { pos, data, nbt } => {
            let pos = vec3(pos);
            if nbt {
                let block = client.get_block_with_nbt(pos).await?;
                render(json, &block, format_block)
            } else if data {
                let block = client.get_block_with_data(pos).await?;
                render(json, &block, format_block)
            } else {
                let id = client.get_block(pos).await?;
                render(json, &id, |id| id.to_string().cyan().to_string())
            }
        }

        Commands::GetBlocks { cuboid } => {
            let (from, to) = corners(cuboid);
            let ids = client.get_blocks(from, to).await?;
            render(json, &ids, |ids| {
                format!("{} blocks: {}", ids.len().to_string().cyan(), join(ids))
            })
        }

        Commands::SetBlock {
            pos,
            id,
            data,
            nbt,
        } => {
            let block = Block::with_data(id, data);
            match nbt {
                Some(nbt) => client.set_block_with_nbt(vec3(pos), &block.with_nbt(nbt)).await?,
                None => client.set_block(vec3(pos), block).await?,
            }
            Ok(done("Set"))
        }

        Commands::SetBlocks {
            cuboid,
            id,
            data,
            nbt,
        } => {
            let (from, to) = corners(cuboid);
            let block = Block::with_data(id, data);
            match nbt {
                Some(nbt) => {
                    client
                        .set_blocks_with_nbt(from, to, &block.with_nbt(nbt))
                        .await?
                }
                None => client.set_blocks(from, to, block).await?,
            }
            Ok(done("Filled"))
        }

        Commands::Height { x, z } => {
            let height = client.get_height(x, z).await?;
            render(json, &height, |h| h.to_string().cyan().to_string())
        }

        Commands::PlayerPos => {
            let pos = client.player().get_pos().await?;
            render(json, &pos, |pos| {
                format!("{} (tile {})", pos.to_string().cyan(), pos.tile())
            })
        }

        Commands::Teleport { pos } => {
            client.player().set_pos(vec3(pos)).await?;
            Ok(done("Moved"))
        }

        Commands::PlayerIds => {
            let ids = client.get_player_entity_ids().await?;
            render(json, &ids, |ids| {
                if ids.is_empty() {
                    "No players".yellow().to_string()
                } else {
                    join(ids)
                }
            })
        }

        Commands::Checkpoint { action } => {
            match action {
                CheckpointAction::Save => client.save_checkpoint().await?,
                CheckpointAction::Restore => client.restore_checkpoint().await?,
            }
            Ok(done("Done"))
        }

        Commands::Setting { key, value } => {
            client.setting(&key, value).await?;
            Ok(format!(
                "{} {} = {}",
                "Set".green(),
                key.cyan(),
                if value { "on" } else { "off" }
            ))
        }

        Commands::Hits => {
            let hits = client.events().poll_block_hits().await?;
            render(json, &hits, |hits| format_list(hits, format_hit, "No block hits"))
        }

        Commands::Chats => {
            let posts = client.events().poll_chat_posts().await?;
            render(json, &posts, |posts| {
                format_list(posts, format_chat, "No chat posts")
            })
        }

        Commands::ClearEvents => {
            client.events().clear_all().await?;
            Ok(done("Cleared"))
        }

        Commands::Camera { mode } => {
            let camera = client.camera();
            match mode {
                CameraMode::Normal { entity } => camera.set_normal(entity).await?,
                CameraMode::Fixed => camera.set_fixed().await?,
                CameraMode::Follow { entity } => camera.set_follow(entity).await?,
            }
            Ok(done("Camera updated"))
        }

        Commands::CameraPos { pos } => {
            client.camera().set_pos(vec3(pos)).await?;
            Ok(done("Camera moved"))
        }

        Commands::Raw { opcode, args } => {
            let opcode = Opcode::from_name(&opcode)
                .ok_or_else(|| format!("unknown opcode: {}", opcode))?;
            let args: Vec<Argument> = args.iter().map(|a| parse_raw_arg(a)).collect();
            let reply = client.raw(opcode, &args).await?;
            render(json, &reply, format_reply)
        }
    }
}

fn vec3(c: Coords) -> Vec3 {
    Vec3::new(c.x, c.y, c.z)
}

fn corners(c: Cuboid) -> (Vec3, Vec3) {
    (Vec3::new(c.x1, c.y1, c.z1), Vec3::new(c.x2, c.y2, c.z2))
}

fn done(verb: &str) -> String {
    verb.green().to_string()
}

/// Renders a value as pretty JSON or with the given formatter.
fn render<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> CommandResult {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

/// Interprets a raw argument as an integer, then a float, then a string.
pub fn parse_raw_arg(arg: &str) -> Argument {
    if let Ok(v) = arg.parse::<i64>() {
        Argument::from(v)
    } else if let Ok(v) = arg.parse::<f64>() {
        if v.is_finite() {
            Argument::from(v)
        } else {
            Argument::from(arg)
        }
    } else {
        Argument::from(arg)
    }
}

fn join(ids: &[i32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_block(block: &Block) -> String {
    let mut out = format!(
        "id {} data {}",
        block.id.to_string().cyan(),
        block.data.to_string().cyan()
    );
    if let Some(ref nbt) = block.nbt {
        out.push_str(&format!("\n  {}: {}", "NBT".dimmed(), nbt));
    }
    out
}

fn format_hit(hit: &BlockEvent) -> String {
    format!(
        "  {} face {} by entity {}",
        hit.pos.to_string().cyan(),
        hit.face,
        hit.entity_id.to_string().yellow()
    )
}

fn format_chat(post: &ChatEvent) -> String {
    format!("  <{}> {}", post.entity_id.to_string().yellow(), post.message)
}

fn format_list<T>(items: &[T], line: fn(&T) -> String, empty: &str) -> String {
    if items.is_empty() {
        return empty.yellow().to_string();
    }
    items.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn format_reply(reply: &Reply) -> String {
    match reply {
        Reply::None => done("OK"),
        Reply::Int(v) => v.to_string().cyan().to_string(),
        Reply::Float(v) => v.to_string().cyan().to_string(),
        Reply::Vec3(v) => v.to_string().cyan().to_string(),
        Reply::TilePos(p) => p.to_string().cyan().to_string(),
        Reply::Block(b) => format_block(b),
        Reply::Ints(ids) => join(ids),
        Reply::BlockHits(hits) => format_list(hits, format_hit, "No block hits"),
        Reply::ChatPosts(posts) => format_list(posts, format_chat, "No chat posts"),
    }
}
