//! Command encoding and reply line framing.

use crate::argument::Scalar;
use crate::error::ProtocolError;
use crate::opcode::Opcode;
use crate::MAX_LINE_LENGTH;
use bytes::{Buf, BytesMut};

/// Encodes commands into wire lines.
pub struct Encoder;

impl Encoder {
    /// Encodes an opcode and its flattened arguments as `opcode a,b,c`.
    ///
    /// Zero arguments produce the bare opcode. The returned line carries no
    /// terminator; the transport appends it.
    ///
    /// The protocol has no escaping: commas and pipes inside strings are sent
    /// as-is and will be misread by the server. Line breaks would split the
    /// command in two and are rejected.
    pub fn encode(opcode: Opcode, args: &[Scalar]) -> Result<String, ProtocolError> {
        let mut line = String::from(opcode.as_str());
        for (i, arg) in args.iter().enumerate() {
            Self::validate(arg)?;
            line.push(if i == 0 { ' ' } else { ',' });
            line.push_str(&arg.to_string());
        }
        Ok(line)
    }

    fn validate(arg: &Scalar) -> Result<(), ProtocolError> {
        match arg {
            Scalar::Str(s) if s.contains(['\n', '\r']) => Err(ProtocolError::InvalidArgument(
                format!("string argument contains a line break: {:?}", s),
            )),
            Scalar::Float(v) if !v.is_finite() => Err(ProtocolError::InvalidArgument(format!(
                "non-finite float argument: {}",
                v
            ))),
            _ => Ok(()),
        }
    }
}

/// Splits a byte stream into newline-terminated reply lines.
pub struct LineDecoder {
    buffer: BytesMut,
    max_line_length: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next line, without its terminator.
    ///
    /// Returns `Ok(None)` if no complete line is buffered yet.
    pub fn decode_line(&mut self) -> Result<Option<String>, ProtocolError> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                if pos > self.max_line_length {
                    return Err(ProtocolError::LineTooLong {
                        max: self.max_line_length,
                    });
                }
                let mut line = self.buffer.split_to(pos);
                self.buffer.advance(1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                let text = String::from_utf8(line.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)?;
                Ok(Some(text))
            }
            None if self.buffer.len() > self.max_line_length => Err(ProtocolError::LineTooLong {
                max: self.max_line_length,
            }),
            None => Ok(None),
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::flatten::{flatten, floor_flatten};

    #[test]
    fn test_encode_set_block() {
        let flat = flatten(&args![1, 2, 3, 4, 0]).unwrap();
        let line = Encoder::encode(Opcode::WORLD_SET_BLOCK, &flat).unwrap();
        assert_eq!(line, "world.setBlock 1,2,3,4,0");
    }

    #[test]
    fn test_encode_without_arguments() {
        let line = Encoder::encode(Opcode::WORLD_CHECKPOINT_SAVE, &[]).unwrap();
        assert_eq!(line, "world.checkpoint.save");
    }

    #[test]
    fn test_encode_mixed_scalars() {
        let flat = flatten(&args!["include_nbt_with_data", true, 1.25, -3]).unwrap();
        let line = Encoder::encode(Opcode::WORLD_SETTING, &flat).unwrap();
        assert_eq!(line, "world.setting include_nbt_with_data,1,1.25,-3");
    }

    #[test]
    fn test_encode_string_passes_through_verbatim() {
        let flat = flatten(&args!["hello, world|!"]).unwrap();
        let line = Encoder::encode(Opcode::CHAT_POST, &flat).unwrap();
        assert_eq!(line, "chat.post hello, world|!");
    }

    #[test]
    fn test_encode_rejects_line_breaks() {
        let flat = flatten(&args!["two\nlines"]).unwrap();
        let err = Encoder::encode(Opcode::CHAT_POST, &flat).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_encode_rejects_nan() {
        let flat = flatten(&args![1.0, f64::NAN, 3.0]).unwrap();
        let err = Encoder::encode(Opcode::PLAYER_SET_POS, &flat).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_encode_floored_position() {
        let flat = floor_flatten(&args![(10.7, 64.0, -3.2)]).unwrap();
        let line = Encoder::encode(Opcode::WORLD_GET_BLOCK, &flat).unwrap();
        assert_eq!(line, "world.getBlock 10,64,-4");
    }

    #[test]
    fn test_line_decoder_multiple_lines() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"1,2,3\nFail\n");

        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("1,2,3"));
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("Fail"));
        assert_eq!(decoder.decode_line().unwrap(), None);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_line_decoder_partial_line() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"1,hel");
        assert!(decoder.decode_line().unwrap().is_none());

        decoder.extend(b"lo|\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("1,hello|"));
    }

    #[test]
    fn test_line_decoder_strips_carriage_return() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"64\r\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some("64"));
    }

    #[test]
    fn test_line_decoder_empty_line() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"\n");
        assert_eq!(decoder.decode_line().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_line_decoder_too_long() {
        let mut decoder = LineDecoder::new().with_max_line_length(8);
        decoder.extend(b"0123456789");
        assert!(matches!(
            decoder.decode_line(),
            Err(ProtocolError::LineTooLong { max: 8 })
        ));
    }

    #[test]
    fn test_line_decoder_invalid_utf8() {
        let mut decoder = LineDecoder::new();
        decoder.extend(b"\xff\xfe\n");
        assert!(matches!(
            decoder.decode_line(),
            Err(ProtocolError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_line_decoder_clear() {
        let mut decoder = LineDecoder::default();
        decoder.extend(b"partial");
        assert_eq!(decoder.buffered(), 7);
        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
