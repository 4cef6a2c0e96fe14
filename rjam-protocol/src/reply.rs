//! Reply decoding.
//!
//! Every opcode has a static [`ReplyShape`]; [`decode`] dispatches on it.
//! The individual parsers are public so callers that know the shape they
//! want can skip the [`Reply`] wrapper.

use crate::error::ProtocolError;
use crate::opcode::{Opcode, ReplyShape};
use crate::types::{Block, BlockEvent, ChatEvent, TilePos, Vec3};
use serde::Serialize;
use std::str::FromStr;

/// A decoded reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    None,
    Int(i32),
    Float(f64),
    Vec3(Vec3),
    TilePos(TilePos),
    Block(Block),
    Ints(Vec<i32>),
    BlockHits(Vec<BlockEvent>),
    ChatPosts(Vec<ChatEvent>),
}

/// Decodes a reply according to the opcode's reply shape.
pub fn decode(opcode: Opcode, reply: &str) -> Result<Reply, ProtocolError> {
    decode_shape(opcode.reply_shape(), reply)
}

/// Decodes a reply of a known shape.
pub fn decode_shape(shape: ReplyShape, reply: &str) -> Result<Reply, ProtocolError> {
    Ok(match shape {
        ReplyShape::None if reply.is_empty() => Reply::None,
        ReplyShape::None => return Err(ProtocolError::malformed("no reply", reply)),
        ReplyShape::Int => Reply::Int(parse_int(reply)?),
        ReplyShape::Float => Reply::Float(parse_float(reply)?),
        ReplyShape::Vec3 => Reply::Vec3(parse_vec3(reply)?),
        ReplyShape::TilePos => Reply::TilePos(parse_tile_pos(reply)?),
        ReplyShape::Block => Reply::Block(parse_block(reply)?),
        ReplyShape::IntList => Reply::Ints(parse_int_list(reply)?),
        ReplyShape::IdList => Reply::Ints(parse_id_list(reply)?),
        ReplyShape::BlockHits => Reply::BlockHits(parse_block_hits(reply)?),
        ReplyShape::ChatPosts => Reply::ChatPosts(parse_chat_posts(reply)?),
        ReplyShape::BlockWithPayload => Reply::Block(parse_block_with_payload(reply)?),
    })
}

fn parse_field<T: FromStr>(field: &str, expected: &'static str, reply: &str) -> Result<T, ProtocolError> {
    field
        .trim()
        .parse()
        .map_err(|_| ProtocolError::malformed(expected, reply))
}

/// Splits off the first `n` comma-separated fields, returning them with the
/// unparsed remainder after the n-th comma.
fn split_fields<'a>(
    reply: &'a str,
    n: usize,
    expected: &'static str,
) -> Result<(Vec<&'a str>, Option<&'a str>), ProtocolError> {
    let mut parts = reply.splitn(n + 1, ',');
    let fields: Vec<&str> = parts.by_ref().take(n).collect();
    if fields.len() < n {
        return Err(ProtocolError::malformed(expected, reply));
    }
    Ok((fields, parts.next()))
}

/// Parses a single integer.
pub fn parse_int(reply: &str) -> Result<i32, ProtocolError> {
    parse_field(reply, "integer", reply)
}

/// Parses a single float.
pub fn parse_float(reply: &str) -> Result<f64, ProtocolError> {
    parse_field(reply, "float", reply)
}

/// Parses `x,y,z` as floats.
pub fn parse_vec3(reply: &str) -> Result<Vec3, ProtocolError> {
    const EXPECTED: &str = "three floats";
    let (f, _) = split_fields(reply, 3, EXPECTED)?;
    Ok(Vec3::new(
        parse_field(f[0], EXPECTED, reply)?,
        parse_field(f[1], EXPECTED, reply)?,
        parse_field(f[2], EXPECTED, reply)?,
    ))
}

/// Parses `x,y,z` as integers.
pub fn parse_tile_pos(reply: &str) -> Result<TilePos, ProtocolError> {
    const EXPECTED: &str = "three integers";
    let (f, _) = split_fields(reply, 3, EXPECTED)?;
    Ok(TilePos::new(
        parse_field(f[0], EXPECTED, reply)?,
        parse_field(f[1], EXPECTED, reply)?,
        parse_field(f[2], EXPECTED, reply)?,
    ))
}

/// Parses `id,data`, ignoring anything after the second field.
pub fn parse_block(reply: &str) -> Result<Block, ProtocolError> {
    const EXPECTED: &str = "block id and data";
    let (f, _) = split_fields(reply, 2, EXPECTED)?;
    Ok(Block::with_data(
        parse_field(f[0], EXPECTED, reply)?,
        parse_field(f[1], EXPECTED, reply)?,
    ))
}

/// Parses `id,data[,payload]`.
///
/// Only the first two commas are field separators. Whatever follows the
/// second comma is a payload if it contains an opening brace; the payload
/// itself may contain commas. A payload must be one balanced braced value
/// spanning the rest of the line, otherwise the reply is malformed.
pub fn parse_block_with_payload(reply: &str) -> Result<Block, ProtocolError> {
    const EXPECTED: &str = "block id, data and optional payload";
    let (f, rest) = split_fields(reply, 2, EXPECTED)?;
    let mut block = Block::with_data(
        parse_field(f[0], EXPECTED, reply)?,
        parse_field(f[1], EXPECTED, reply)?,
    );

    if let Some(rest) = rest {
        if rest.contains('{') {
            if !is_single_braced_value(rest) {
                return Err(ProtocolError::malformed(EXPECTED, reply));
            }
            block.nbt = Some(rest.to_string());
        }
    }

    Ok(block)
}

/// Checks that `s` starts with `{` and that its matching `}` is the last byte.
///
/// Brackets inside quoted strings do not count.
fn is_single_braced_value(s: &str) -> bool {
    if !s.starts_with('{') {
        return false;
    }

    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '[' => stack.push(c),
            '}' | ']' => {
                let open = if c == '}' { '{' } else { '[' };
                if stack.pop() != Some(open) {
                    return false;
                }
                if stack.is_empty() {
                    return i + c.len_utf8() == s.len();
                }
            }
            _ => {}
        }
    }

    false
}

/// Parses a comma-separated list of integers. An empty reply is an empty list.
pub fn parse_int_list(reply: &str) -> Result<Vec<i32>, ProtocolError> {
    if reply.is_empty() {
        return Ok(Vec::new());
    }
    reply
        .split(',')
        .map(|field| parse_field(field, "comma-separated integers", reply))
        .collect()
}

/// Splits a `|`-separated reply, drops empty segments and parses each record.
pub fn parse_pipe_list<T>(
    reply: &str,
    parse_record: impl Fn(&str) -> Result<T, ProtocolError>,
) -> Result<Vec<T>, ProtocolError> {
    reply
        .split('|')
        .filter(|segment| !segment.is_empty())
        .map(parse_record)
        .collect()
}

/// Parses `id|id|...`.
pub fn parse_id_list(reply: &str) -> Result<Vec<i32>, ProtocolError> {
    parse_pipe_list(reply, |segment| {
        parse_field(segment, "pipe-separated integers", reply)
    })
}

/// Parses one block hit record: `x,y,z,face,entityId`.
pub fn parse_block_hit(record: &str) -> Result<BlockEvent, ProtocolError> {
    const EXPECTED: &str = "block hit x,y,z,face,entity";
    let fields: Vec<&str> = record.split(',').collect();
    if fields.len() != 5 {
        return Err(ProtocolError::malformed(EXPECTED, record));
    }
    let mut values = [0i32; 5];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = parse_field(field, EXPECTED, record)?;
    }
    Ok(BlockEvent {
        pos: TilePos::new(values[0], values[1], values[2]),
        face: values[3],
        entity_id: values[4],
    })
}

/// Parses one chat record: `entityId,message`.
///
/// Only the first comma separates; the message keeps any further commas.
pub fn parse_chat_post(record: &str) -> Result<ChatEvent, ProtocolError> {
    const EXPECTED: &str = "chat post entity,message";
    let (id, message) = record
        .split_once(',')
        .ok_or_else(|| ProtocolError::malformed(EXPECTED, record))?;
    Ok(ChatEvent {
        entity_id: parse_field(id, EXPECTED, record)?,
        message: message.to_string(),
    })
}

/// Parses a `|`-separated list of block hit records.
pub fn parse_block_hits(reply: &str) -> Result<Vec<BlockEvent>, ProtocolError> {
    parse_pipe_list(reply, parse_block_hit)
}

/// Parses a `|`-separated list of chat records.
pub fn parse_chat_posts(reply: &str) -> Result<Vec<ChatEvent>, ProtocolError> {
    parse_pipe_list(reply, parse_chat_post)
}
