//! # EO Writer
//!
//! Append-only builder for a packet body.
//!
//! The writer never inserts delimiters by itself: a structure that is read in
//! chunked mode must call [`EoWriter::add_break`] wherever its reader will call
//! `next_chunk()` or `get_break()`.
//!
//! ## Usage
//!
//! ```rust
//! use eoproto_protocol::{EoWriter, EoReader};
//!
//! let mut writer = EoWriter::new();
//! writer.add_short(1234)?;
//! writer.add_break();
//! writer.add_string("name");
//!
//! let mut reader = EoReader::new(writer.into_bytes());
//! assert_eq!(reader.get_short()?, 1234);
//! reader.get_break()?;
//! assert_eq!(reader.get_string()?, "name");
//! # Ok::<(), eoproto_core::ProtocolError>(())
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use eoproto_core::{ProtocolError, Result};

use crate::codecs::{encode_number_width, Width, BREAK_BYTE};
use crate::strings::{encode_string, sanitize, string_to_bytes};

#[derive(Debug, Clone, Default)]
pub struct EoWriter {
    data: BytesMut,
    sanitize_strings: bool,
}

impl EoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            sanitize_strings: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes written so far
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    #[inline]
    pub fn sanitizes_strings(&self) -> bool {
        self.sanitize_strings
    }

    /// Turn string sanitization on or off
    ///
    /// While on, every 0xFF inside raw string content is written as `y` so
    /// user text can never terminate a chunk early. Encoded strings are not
    /// affected. The reader does not undo the substitution. Prefer
    /// [`EoWriter::with_sanitized_strings`].
    pub fn set_sanitize_strings(&mut self, sanitize: bool) {
        self.sanitize_strings = sanitize;
    }

    /// Run `f` with sanitization set to `sanitize`, restoring the caller's
    /// mode afterwards whether `f` succeeds or fails
    pub fn with_sanitized_strings<T>(
        &mut self,
        sanitize: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.sanitize_strings;
        self.sanitize_strings = sanitize;
        let result = f(self);
        self.sanitize_strings = saved;
        result
    }

    /// Write a 0xFF break byte
    #[inline]
    pub fn add_break(&mut self) {
        self.data.put_u8(BREAK_BYTE);
    }

    /// Write a raw, unencoded byte
    #[inline]
    pub fn add_byte(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    /// Write raw bytes
    #[inline]
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    /// Write an encoded number of the given width
    ///
    /// # Errors
    /// `Overflow` if `value` exceeds the width's maximum. Nothing is written.
    pub fn add_number(&mut self, value: u32, width: Width) -> Result<()> {
        let digits = encode_number_width(value, width)?;
        self.data.put_slice(&digits[..width.len()]);
        Ok(())
    }

    /// Write a 1-byte encoded number (0..=252)
    #[inline]
    pub fn add_char(&mut self, value: u32) -> Result<()> {
        self.add_number(value, Width::Char)
    }

    /// Write a 2-byte encoded number (0..=64008)
    #[inline]
    pub fn add_short(&mut self, value: u32) -> Result<()> {
        self.add_number(value, Width::Short)
    }

    /// Write a 3-byte encoded number (0..=16194276)
    #[inline]
    pub fn add_three(&mut self, value: u32) -> Result<()> {
        self.add_number(value, Width::Three)
    }

    /// Write a 4-byte encoded number (0..=4097152080)
    #[inline]
    pub fn add_int(&mut self, value: u32) -> Result<()> {
        self.add_number(value, Width::Int)
    }

    #[inline]
    pub fn add_bool(&mut self, value: bool) -> Result<()> {
        self.add_char(u32::from(value))
    }

    /// Write a string with no terminator
    ///
    /// The caller writes whatever break byte the format calls for.
    pub fn add_string(&mut self, text: &str) {
        let bytes = self.raw_string_bytes(text);
        self.data.put_slice(&bytes);
    }

    /// Write a string that must be exactly `len` bytes long
    pub fn add_fixed_string(&mut self, text: &str, len: usize) -> Result<()> {
        let bytes = self.raw_string_bytes(text);
        check_fixed_length(bytes.len(), len)?;
        self.data.put_slice(&bytes);
        Ok(())
    }

    /// Write a string into a `len`-byte field padded with 0xFF
    pub fn add_padded_string(&mut self, text: &str, len: usize) -> Result<()> {
        let bytes = self.raw_string_bytes(text);
        let bytes = pad(bytes, len)?;
        self.data.put_slice(&bytes);
        Ok(())
    }

    /// Write an obfuscated string with no terminator
    pub fn add_encoded_string(&mut self, text: &str) {
        let mut bytes = string_to_bytes(text);
        encode_string(&mut bytes);
        self.data.put_slice(&bytes);
    }

    /// Write an obfuscated string that must be exactly `len` bytes long
    pub fn add_fixed_encoded_string(&mut self, text: &str, len: usize) -> Result<()> {
        let mut bytes = string_to_bytes(text);
        check_fixed_length(bytes.len(), len)?;
        encode_string(&mut bytes);
        self.data.put_slice(&bytes);
        Ok(())
    }

    /// Write an obfuscated `len`-byte field; padding is applied before encoding
    pub fn add_padded_encoded_string(&mut self, text: &str, len: usize) -> Result<()> {
        let mut bytes = pad(string_to_bytes(text), len)?;
        encode_string(&mut bytes);
        self.data.put_slice(&bytes);
        Ok(())
    }

    fn raw_string_bytes(&self, text: &str) -> Vec<u8> {
        let mut bytes = string_to_bytes(text);
        if self.sanitize_strings {
            sanitize(&mut bytes);
        }
        bytes
    }
}

fn check_fixed_length(actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(ProtocolError::InvalidLength { expected, actual });
    }
    Ok(())
}

fn pad(mut bytes: Vec<u8>, len: usize) -> Result<Vec<u8>> {
    if bytes.len() > len {
        return Err(ProtocolError::InvalidLength {
            expected: len,
            actual: bytes.len(),
        });
    }
    bytes.resize(len, BREAK_BYTE);
    Ok(bytes)
}
