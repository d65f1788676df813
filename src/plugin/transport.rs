//! Message framing over a byte stream
//!
//! Two framings are supported:
//!
//! ```text
//! length-prefixed:  <u64 little-endian byte count><JSON bytes>
//! json-lines:       <JSON>\n
//! ```
//!
//! The compiler speaks `length-prefixed`. `json-lines` is convenient when
//! driving the plugin by hand.

use std::io::{self, BufRead, Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Frames larger than this are rejected unless configured otherwise
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

const HEADER_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Stream ended mid-frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: u64, limit: usize },
}

/// How messages are delimited on the stream
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    #[default]
    LengthPrefixed,
    JsonLines,
}

/// Reads framed messages
pub struct MessageReader<R> {
    reader: R,
    framing: Framing,
    max_frame_bytes: usize,
}

impl<R: BufRead> MessageReader<R> {
    pub fn new(reader: R, framing: Framing) -> Self {
        Self {
            reader,
            framing,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Reads the next message.
    ///
    /// Returns `Ok(None)` on a clean EOF between frames.
    pub fn read<T: DeserializeOwned>(&mut self) -> Result<Option<T>, TransportError> {
        let frame = match self.framing {
            Framing::LengthPrefixed => self.read_length_prefixed()?,
            Framing::JsonLines => self.read_line()?,
        };

        frame
            .map(|bytes| serde_json::from_slice(&bytes).map_err(TransportError::Decode))
            .transpose()
    }

    fn read_length_prefixed(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut header = [0u8; HEADER_LEN];
        let read = read_up_to(&mut self.reader, &mut header)?;
        if read == 0 {
            return Ok(None);
        }
        if read < HEADER_LEN {
            return Err(TransportError::Truncated {
                expected: HEADER_LEN,
                actual: read,
            });
        }

        let size = u64::from_le_bytes(header);
        let len = usize::try_from(size)
            .ok()
            .filter(|&len| len <= self.max_frame_bytes)
            .ok_or(TransportError::FrameTooLarge {
                size,
                limit: self.max_frame_bytes,
            })?;

        let mut body = vec![0u8; len];
        let read = read_up_to(&mut self.reader, &mut body)?;
        if read < len {
            return Err(TransportError::Truncated {
                expected: len,
                actual: read,
            });
        }

        Ok(Some(body))
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        // One byte past the limit is enough to tell an oversized line apart
        let limit = (self.max_frame_bytes as u64).saturating_add(1);
        let mut line = Vec::new();
        loop {
            line.clear();
            if (&mut self.reader).take(limit).read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            if line.len() > self.max_frame_bytes {
                return Err(TransportError::FrameTooLarge {
                    size: line.len() as u64,
                    limit: self.max_frame_bytes,
                });
            }
            // Blank lines between messages carry nothing
            if !line.iter().all(u8::is_ascii_whitespace) {
                return Ok(Some(line));
            }
        }
    }
}

/// Writes framed messages, flushing after each one
pub struct MessageWriter<W> {
    writer: W,
    framing: Framing,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(writer: W, framing: Framing) -> Self {
        Self { writer, framing }
    }

    pub fn write<T: Serialize>(&mut self, message: &T) -> Result<(), TransportError> {
        let body = serde_json::to_vec(message).map_err(TransportError::Encode)?;

        match self.framing {
            Framing::LengthPrefixed => {
                self.writer.write_all(&(body.len() as u64).to_le_bytes())?;
                self.writer.write_all(&body)?;
            }
            Framing::JsonLines => {
                self.writer.write_all(&body)?;
                self.writer.write_all(b"\n")?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Fills `buf` as far as the stream allows; returns the number of bytes read
fn read_up_to<R: io::Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;

    fn encode(framing: Framing, values: &[Value]) -> Vec<u8> {
        let mut writer = MessageWriter::new(Vec::new(), framing);
        for value in values {
            writer.write(value).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn length_prefixed_header_is_little_endian() {
        let bytes = encode(Framing::LengthPrefixed, &[json!({"a": 1})]);

        assert_eq!(&bytes[..8], &7u64.to_le_bytes());
        assert_eq!(&bytes[8..], br#"{"a":1}"#);
    }

    #[test]
    fn reads_frames_in_order_then_eof() {
        for framing in [Framing::LengthPrefixed, Framing::JsonLines] {
            let bytes = encode(framing, &[json!({"n": 1}), json!({"n": 2})]);
            let mut reader = MessageReader::new(Cursor::new(bytes), framing);

            assert_eq!(reader.read::<Value>().unwrap(), Some(json!({"n": 1})));
            assert_eq!(reader.read::<Value>().unwrap(), Some(json!({"n": 2})));
            assert_eq!(reader.read::<Value>().unwrap(), None);
        }
    }

    #[test]
    fn truncated_header_is_an_error() {
        let mut reader = MessageReader::new(Cursor::new(vec![1u8, 0, 0]), Framing::LengthPrefixed);
        let err = reader.read::<Value>().unwrap_err();

        assert!(matches!(
            err,
            TransportError::Truncated {
                expected: 8,
                actual: 3
            }
        ));
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut bytes = 100u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let mut reader = MessageReader::new(Cursor::new(bytes), Framing::LengthPrefixed);

        assert!(matches!(
            reader.read::<Value>().unwrap_err(),
            TransportError::Truncated { expected: 100, actual: 2 }
        ));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let bytes = encode(Framing::LengthPrefixed, &[json!({"payload": "x".repeat(64)})]);
        let mut reader =
            MessageReader::new(Cursor::new(bytes), Framing::LengthPrefixed).with_max_frame_bytes(16);

        assert!(matches!(
            reader.read::<Value>().unwrap_err(),
            TransportError::FrameTooLarge { limit: 16, .. }
        ));
    }

    #[test]
    fn unterminated_line_stops_at_the_limit() {
        let endless = io::BufReader::new(io::repeat(b'x'));
        let mut reader = MessageReader::new(endless, Framing::JsonLines).with_max_frame_bytes(16);

        assert!(matches!(
            reader.read::<Value>().unwrap_err(),
            TransportError::FrameTooLarge { size: 17, limit: 16 }
        ));
    }

    #[test]
    fn line_at_the_limit_is_accepted() {
        let line = b"{\"n\":12345}\n".to_vec();
        let limit = line.len();
        let mut reader =
            MessageReader::new(Cursor::new(line), Framing::JsonLines).with_max_frame_bytes(limit);

        assert_eq!(reader.read::<Value>().unwrap(), Some(json!({"n": 12345})));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let mut reader = MessageReader::new(Cursor::new(b"{not json\n".to_vec()), Framing::JsonLines);
        assert!(matches!(
            reader.read::<Value>().unwrap_err(),
            TransportError::Decode(_)
        ));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut reader =
            MessageReader::new(Cursor::new(b"\n\n{\"n\":1}\n".to_vec()), Framing::JsonLines);
        assert_eq!(reader.read::<Value>().unwrap(), Some(json!({"n": 1})));
    }

    #[test]
    fn framing_names() {
        assert_eq!(
            serde_json::to_value(Framing::LengthPrefixed).unwrap(),
            "length-prefixed"
        );
        assert_eq!(serde_json::to_value(Framing::JsonLines).unwrap(), "json-lines");
    }
}
