//! Tokio codec for line-based IRC transport.
//!
//! Decodes newline-terminated bytes off the wire into [`Message`] values and
//! encodes [`Message`] values back into bytes. Sits directly on top of a
//! `BytesMut` read/write buffer via [`tokio_util::codec`], with no
//! intermediate transport abstraction.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::message::Message;

/// Default maximum length, in bytes, of a single IRC line (RFC 1459 §2.3).
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Returns true for control characters that must never appear in an IRC line.
///
/// BEL is always illegal. Other control characters are illegal unless they
/// are CR, LF, or NUL (NUL is tolerated so binary-ish tag payloads round-trip).
#[inline]
fn is_illegal_control_char(ch: char) -> bool {
    if ch == '\x07' {
        return true;
    }
    ch.is_control() && ch != '\r' && ch != '\n' && ch != '\0'
}

/// Line-oriented codec that parses each line as an IRC [`Message`].
///
/// Frames are delimited by `\n` (a preceding `\r` is stripped by the message
/// parser). Lines longer than `max_len` bytes produce
/// [`ProtocolError::MessageTooLong`] instead of being silently truncated.
pub struct IrcLineCodec {
    next_index: usize,
    max_len: usize,
}

impl IrcLineCodec {
    /// Create a codec with the standard 512-byte line limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Truncate an outgoing message at its first line ending and reject any
    /// illegal control characters remaining in it.
    fn sanitize(mut data: String) -> error::Result<String> {
        if let Some((pos, len)) = ["\r\n", "\r", "\n"]
            .iter()
            .flat_map(|needle| data.find(needle).map(|pos| (pos, needle.len())))
            .min_by_key(|&(pos, _)| pos)
        {
            data.truncate(pos + len);
        }

        for ch in data.chars() {
            if is_illegal_control_char(ch) {
                return Err(ProtocolError::IllegalControlChar(ch));
            }
        }

        Ok(data)
    }
}

impl Default for IrcLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcLineCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(ProtocolError::MessageTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(ProtocolError::MessageTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        let line_vec = line.to_vec();
        let text = String::from_utf8(line_vec.clone()).map_err(|e| ProtocolError::InvalidUtf8 {
            raw_line: line_vec,
            byte_pos: e.utf8_error().valid_up_to(),
            details: e.utf8_error().to_string(),
            command_hint: error::extract_command_hint(&line),
        })?;

        let trimmed = text.trim_end_matches(['\r', '\n']);
        for ch in trimmed.chars() {
            if is_illegal_control_char(ch) {
                return Err(ProtocolError::IllegalControlChar(ch));
            }
        }
        if trimmed.is_empty() {
            return Ok(None);
        }

        trimmed.parse::<Message>().map(Some)
    }
}

impl Encoder<Message> for IrcLineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let sanitized = Self::sanitize(msg.to_string())?;
        dst.extend_from_slice(sanitized.as_bytes());
        if !sanitized.ends_with('\n') {
            dst.extend_from_slice(b"\r\n");
        }
        Ok(())
    }
}
