//! # EO Protocol Library
//!
//! This library implements the primitives every EO packet is built from, with
//! exact byte-level compatibility with existing clients and servers.
//!
//! ## Architecture
//!
//! ### 1. Number Codec ([`codecs`])
//! Base-253 encoding for non-negative numbers. Encoded numbers never contain
//! 0x00 or 0xFF:
//! - Char: 1 byte (max 252)
//! - Short: 2 bytes (max 64008)
//! - Three: 3 bytes (max 16194276)
//! - Int: 4 bytes (max 4097152080)
//!
//! ### 2. Reader and Writer ([`reader`], [`writer`])
//! Cursor-based access to a packet body: raw bytes, encoded numbers, strings,
//! break bytes, and the chunked reading mode that splits a body on 0xFF.
//!
//! ### 3. Strings ([`strings`])
//! Delimited, fixed and padded strings, each with an obfuscated ("encoded")
//! counterpart, plus 0xFF sanitization for user-supplied text.
//!
//! ### 4. Switch Structs ([`variant`])
//! The [`EoSerialize`] contract and helpers for discriminant-selected payloads.
//!
//! ### 5. Sequencing ([`sequence`])
//! The rolling per-connection sequence counter and its negotiated starts.
//!
//! ## Usage Example
//!
//! ```rust
//! use eoproto_protocol::{EoReader, EoWriter};
//!
//! let mut writer = EoWriter::new();
//! writer.add_short(1234)?;
//! writer.with_sanitized_strings(true, |writer| {
//!     writer.add_string("first");
//!     writer.add_break();
//!     writer.add_string("second");
//!     Ok(())
//! })?;
//!
//! let mut reader = EoReader::new(writer.into_bytes());
//! assert_eq!(reader.get_short()?, 1234);
//! reader.with_chunked(true, |reader| {
//!     assert_eq!(reader.get_string()?, "first");
//!     reader.next_chunk()?;
//!     assert_eq!(reader.get_string()?, "second");
//!     Ok(())
//! })?;
//! # Ok::<(), eoproto_core::ProtocolError>(())
//! ```
//!
//! ## Out of Scope
//!
//! Packet framing (the length prefix before each packet), transport
//! encryption and the generated packet definitions live outside this crate.

pub mod codecs;
pub mod reader;
pub mod sequence;
pub mod strings;
pub mod variant;
pub mod writer;

// Re-export commonly used items
pub use codecs::*;
pub use reader::EoReader;
pub use sequence::*;
pub use variant::*;
pub use writer::EoWriter;
