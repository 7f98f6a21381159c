//! String helpers shared by the reader and writer
//!
//! Protocol text is single-byte: byte `b` is the character `U+00b`.
//! "Encoded" strings additionally go through a position-dependent character
//! inversion followed by a reversal. It is obfuscation, not encryption.

use crate::codecs::BREAK_BYTE;

/// Replacement for 0xFF ('ÿ') when string sanitization is enabled
pub const SANITIZED_BYTE: u8 = b'y';

/// Convert protocol bytes to text
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Convert text to protocol bytes
///
/// Characters outside the single-byte range become `?`.
pub fn string_to_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Replace every 0xFF so the string cannot be mistaken for a delimiter
pub fn sanitize(bytes: &mut [u8]) {
    for b in bytes.iter_mut().filter(|b| **b == BREAK_BYTE) {
        *b = SANITIZED_BYTE;
    }
}

/// Obfuscate a string in place
///
/// # Example
/// ```rust
/// use eoproto_protocol::strings::{encode_string, decode_string};
///
/// let mut buf = b"Hello, World!".to_vec();
/// encode_string(&mut buf);
/// assert_eq!(buf, b"!;a-^H s^3a:)");
/// decode_string(&mut buf);
/// assert_eq!(buf, b"Hello, World!");
/// ```
pub fn encode_string(buf: &mut [u8]) {
    invert_characters(buf);
    buf.reverse();
}

/// Reverse [`encode_string`] in place
pub fn decode_string(buf: &mut [u8]) {
    buf.reverse();
    invert_characters(buf);
}

/// Self-inverse character mapping over the printable range 0x22..=0x7D
///
/// Which mapping applies depends on the byte's position and on the parity of
/// the buffer length, so reversal changes which bytes get which mapping.
fn invert_characters(buf: &mut [u8]) {
    let mut flippy = buf.len() % 2 == 1;

    for c in buf.iter_mut() {
        let value = *c;
        if (0x22..=0x7D).contains(&value) {
            *c = match (flippy, value < 0x50) {
                (true, true) => 0x71 - value,
                (true, false) => 0xCD - value,
                (false, _) => 0x9F - value,
            };
        }
        flippy = !flippy;
    }
}
