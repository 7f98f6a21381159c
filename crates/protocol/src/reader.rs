//! # EO Reader
//!
//! Cursor over an immutable packet body.
//!
//! ## Chunked Reading
//!
//! Structures whose trailing fields are not length-prefixed are split into
//! chunks separated by 0xFF. While chunked mode is on:
//! - [`EoReader::remaining`] counts only the bytes left in the current chunk
//! - every read is bounded by the end of the current chunk
//! - [`EoReader::next_chunk`] moves the cursor just past the next 0xFF
//!
//! Because reads never cross a delimiter, forgetting a `next_chunk()` call
//! fails with `BufferUnderrun` instead of silently misreading the next field.
//!
//! Padded string fields are padded with 0xFF, so their padding ends a chunk.
//! Read them with chunked mode off (see [`EoReader::with_chunked`]).
//!
//! ## Usage
//!
//! ```rust
//! use eoproto_protocol::EoReader;
//!
//! let mut reader = EoReader::new(vec![0x03, b'h', b'i', 0xFF, 0x0B]);
//! reader.with_chunked(true, |reader| {
//!     assert_eq!(reader.get_char()?, 2);
//!     assert_eq!(reader.get_string()?, "hi");
//!     reader.next_chunk()?;
//!     assert_eq!(reader.get_char()?, 10);
//!     Ok(())
//! })?;
//! # Ok::<(), eoproto_core::ProtocolError>(())
//! ```

use bytes::Bytes;
use eoproto_core::{ProtocolError, Result};

use crate::codecs::{decode_number, Width, BREAK_BYTE};
use crate::strings::{bytes_to_string, decode_string};

#[derive(Debug, Clone)]
pub struct EoReader {
    data: Bytes,
    position: usize,
    chunked: bool,
    /// Index of the delimiter (or end of data) closing the current chunk.
    /// Only meaningful while `chunked` is set.
    chunk_end: usize,
}

impl EoReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let chunk_end = data.len();
        Self {
            data,
            position: 0,
            chunked: false,
            chunk_end,
        }
    }

    /// Current cursor position, counted from the start of the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Turn chunked reading on or off
    ///
    /// Entering chunked mode starts a chunk at the current position. Prefer
    /// [`EoReader::with_chunked`], which restores the previous mode on return.
    pub fn set_chunked(&mut self, chunked: bool) {
        if chunked && !self.chunked {
            self.chunk_end = self.find_break(self.position);
        }
        self.chunked = chunked;
    }

    /// Run `f` with chunked mode set to `chunked`, restoring the caller's mode
    /// afterwards whether `f` succeeds or fails
    pub fn with_chunked<T>(
        &mut self,
        chunked: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.chunked;
        self.set_chunked(chunked);
        let result = f(self);
        self.set_chunked(saved);
        result
    }

    /// Bytes left in the current chunk (chunked mode) or in the whole buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit().saturating_sub(self.position)
    }

    /// Move past the next 0xFF delimiter
    ///
    /// # Errors
    /// `MalformedDelimiter` if no delimiter is left in the buffer.
    pub fn next_chunk(&mut self) -> Result<()> {
        let delimiter = if self.chunked {
            self.chunk_end
        } else {
            self.find_break(self.position)
        };

        if delimiter >= self.data.len() {
            tracing::debug!(position = self.position, "no chunk delimiter left");
            return Err(ProtocolError::MalformedDelimiter(format!(
                "no chunk delimiter after position {}",
                self.position
            )));
        }

        self.position = delimiter + 1;
        if self.chunked {
            self.chunk_end = self.find_break(self.position);
        }
        tracing::trace!(position = self.position, "advanced to next chunk");
        Ok(())
    }

    /// Read a break byte at a fixed position and verify it is 0xFF
    pub fn get_break(&mut self) -> Result<()> {
        let position = self.position;
        let value = self.get_byte()?;
        if value != BREAK_BYTE {
            return Err(ProtocolError::MalformedDelimiter(format!(
                "expected break byte at position {}, found 0x{:02X}",
                position, value
            )));
        }
        Ok(())
    }

    /// Read a raw, unencoded byte
    #[inline]
    pub fn get_byte(&mut self) -> Result<u8> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Read `len` raw bytes
    pub fn get_bytes(&mut self, len: usize) -> Result<Bytes> {
        let start = self.position;
        self.take(len)?;
        Ok(self.data.slice(start..start + len))
    }

    /// Read every byte left in the current chunk (or buffer)
    pub fn get_remaining_bytes(&mut self) -> Result<Bytes> {
        self.get_bytes(self.remaining())
    }

    /// Read an encoded number of the given width
    pub fn get_number(&mut self, width: Width) -> Result<u32> {
        let bytes = self.take(width.len())?;
        Ok(decode_number(bytes))
    }

    /// Read a 1-byte encoded number (0..=252)
    #[inline]
    pub fn get_char(&mut self) -> Result<u32> {
        self.get_number(Width::Char)
    }

    /// Read a 2-byte encoded number (0..=64008)
    #[inline]
    pub fn get_short(&mut self) -> Result<u32> {
        self.get_number(Width::Short)
    }

    /// Read a 3-byte encoded number (0..=16194276)
    #[inline]
    pub fn get_three(&mut self) -> Result<u32> {
        self.get_number(Width::Three)
    }

    /// Read a 4-byte encoded number (0..=4097152080)
    #[inline]
    pub fn get_int(&mut self) -> Result<u32> {
        self.get_number(Width::Int)
    }

    /// Read a Char and interpret any non-zero value as true
    #[inline]
    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get_char()? != 0)
    }

    /// Read a delimited string
    ///
    /// Stops at the next 0xFF or at the end of the current chunk/buffer. The
    /// delimiter itself is left for `next_chunk()` or `get_break()`.
    pub fn get_string(&mut self) -> Result<String> {
        let bytes = self.take_until_break();
        Ok(bytes_to_string(&bytes))
    }

    /// Read exactly `len` bytes as a string
    pub fn get_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        Ok(bytes_to_string(bytes))
    }

    /// Read a `len`-byte field and strip its trailing 0xFF padding
    ///
    /// In chunked mode the first pad byte closes the chunk, so a padded value
    /// shorter than `len` fails with `BufferUnderrun`.
    pub fn get_padded_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        Ok(bytes_to_string(strip_padding(bytes)))
    }

    /// Read a delimited obfuscated string
    pub fn get_encoded_string(&mut self) -> Result<String> {
        let mut bytes = self.take_until_break();
        decode_string(&mut bytes);
        Ok(bytes_to_string(&bytes))
    }

    /// Read exactly `len` obfuscated bytes as a string
    pub fn get_fixed_encoded_string(&mut self, len: usize) -> Result<String> {
        let mut bytes = self.take(len)?.to_vec();
        decode_string(&mut bytes);
        Ok(bytes_to_string(&bytes))
    }

    /// Read a `len`-byte obfuscated field, stripping padding after decoding
    ///
    /// Subject to the same chunked-mode limit as [`EoReader::get_padded_string`].
    pub fn get_padded_encoded_string(&mut self, len: usize) -> Result<String> {
        let mut bytes = self.take(len)?.to_vec();
        decode_string(&mut bytes);
        Ok(bytes_to_string(strip_padding(&bytes)))
    }

    #[inline]
    fn limit(&self) -> usize {
        if self.chunked {
            self.chunk_end
        } else {
            self.data.len()
        }
    }

    /// Index of the first 0xFF at or after `from`, or the buffer length
    fn find_break(&self, from: usize) -> usize {
        self.data
            .get(from..)
            .and_then(|rest| rest.iter().position(|&b| b == BREAK_BYTE))
            .map_or(self.data.len(), |offset| from + offset)
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if len > available {
            return Err(ProtocolError::underrun(len, available));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..start + len])
    }

    fn take_until_break(&mut self) -> Vec<u8> {
        // The cursor never passes the chunk end, so `end >= start`
        let end = self.find_break(self.position).min(self.limit());
        let start = self.position;
        self.position = end;
        self.data[start..end].to_vec()
    }
}

fn strip_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .position(|&b| b == BREAK_BYTE)
        .unwrap_or(bytes.len());
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_numbers() {
        let mut reader = EoReader::new(vec![
            0x01, // char 0
            0x01, 0x02, // short 253
            0x01, 0x01, 0x02, // three 64009
            0x01, 0x01, 0x01, 0x02, // int 16194277
        ]);
        assert_eq!(reader.get_char().unwrap(), 0);
        assert_eq!(reader.get_short().unwrap(), 253);
        assert_eq!(reader.get_three().unwrap(), 64_009);
        assert_eq!(reader.get_int().unwrap(), 16_194_277);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_underrun() {
        let mut reader = EoReader::new(vec![0x05]);
        assert_eq!(
            reader.get_short(),
            Err(ProtocolError::BufferUnderrun {
                needed: 2,
                available: 1
            })
        );
        // A failed read does not move the cursor
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.get_byte().unwrap(), 0x05);
        assert!(reader.get_byte().is_err());
    }

    #[test]
    fn test_remaining_is_chunk_aware() {
        let mut reader = EoReader::new(vec![1, 2, 3, 0xFF, 4, 5]);
        assert_eq!(reader.remaining(), 6);
        reader.set_chunked(true);
        assert_eq!(reader.remaining(), 3);
        reader.next_chunk().unwrap();
        assert_eq!(reader.remaining(), 2);
        reader.set_chunked(false);
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_reads_stop_at_chunk_end() {
        let mut reader = EoReader::new(vec![0x02, 0xFF, 0x03, 0x04]);
        reader.set_chunked(true);
        assert_eq!(reader.get_char().unwrap(), 1);
        assert!(matches!(
            reader.get_char(),
            Err(ProtocolError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_next_chunk_without_delimiter() {
        let mut reader = EoReader::new(vec![1, 2, 3]);
        reader.set_chunked(true);
        assert!(matches!(
            reader.next_chunk(),
            Err(ProtocolError::MalformedDelimiter(_))
        ));
    }

    #[test]
    fn test_with_chunked_restores_on_error() {
        let mut reader = EoReader::new(vec![0x01]);
        let result: Result<()> = reader.with_chunked(true, |reader| {
            assert!(reader.is_chunked());
            reader.get_short()?;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!reader.is_chunked());
    }

    #[test]
    fn test_nested_modes() {
        let mut reader = EoReader::new(vec![0x02, 0xFF, 0x03, 0xFF, 0x04]);
        reader
            .with_chunked(true, |reader| {
                assert_eq!(reader.get_char()?, 1);
                reader.next_chunk()?;
                reader.with_chunked(false, |reader| {
                    assert_eq!(reader.remaining(), 3);
                    assert_eq!(reader.get_char()?, 2);
                    reader.get_break()
                })?;
                assert!(reader.is_chunked());
                assert_eq!(reader.remaining(), 1);
                assert_eq!(reader.get_char()?, 3);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_get_break() {
        let mut reader = EoReader::new(vec![0xFF, 0x01]);
        assert!(reader.get_break().is_ok());
        assert!(matches!(
            reader.get_break(),
            Err(ProtocolError::MalformedDelimiter(_))
        ));
    }

    #[test]
    fn test_get_string_stops_at_delimiter() {
        let mut reader = EoReader::new(b"abc\xFFdef".to_vec());
        assert_eq!(reader.get_string().unwrap(), "abc");
        reader.get_break().unwrap();
        assert_eq!(reader.get_string().unwrap(), "def");
        assert_eq!(reader.get_string().unwrap(), "");
    }

    #[test]
    fn test_padded_strings() {
        let mut reader = EoReader::new(b"ab\xFF\xFFxyz".to_vec());
        assert_eq!(reader.get_padded_string(4).unwrap(), "ab");
        assert_eq!(reader.get_fixed_string(3).unwrap(), "xyz");
    }

    #[test]
    fn test_padded_strings_need_unchunked_reads() {
        let mut reader = EoReader::new(b"ab\xFF\xFF\x05".to_vec());
        reader.set_chunked(true);
        assert_eq!(
            reader.get_padded_string(4),
            Err(ProtocolError::BufferUnderrun {
                needed: 4,
                available: 2
            })
        );

        let name = reader
            .with_chunked(false, |reader| reader.get_padded_string(4))
            .unwrap();
        assert_eq!(name, "ab");
        assert!(reader.is_chunked());
        assert_eq!(reader.get_char().unwrap(), 4);

        // A value that fills the field has no padding and reads in any mode
        let mut reader = EoReader::new(b"abcd".to_vec());
        reader.set_chunked(true);
        assert_eq!(reader.get_padded_string(4).unwrap(), "abcd");
    }

    #[test]
    fn test_encoded_strings() {
        let mut reader = EoReader::new(b"!;a-^H s^3a:)\xFF\xFF\xFFl".to_vec());
        assert_eq!(reader.get_encoded_string().unwrap(), "Hello, World!");
        reader.get_break().unwrap();
        assert_eq!(reader.get_padded_encoded_string(3).unwrap(), "a");
    }

    #[test]
    fn test_remaining_bytes() {
        let mut reader = EoReader::new(vec![0x02, 9, 8, 7]);
        reader.get_char().unwrap();
        assert_eq!(&reader.get_remaining_bytes().unwrap()[..], &[9, 8, 7]);
        assert_eq!(reader.remaining(), 0);
    }
}
