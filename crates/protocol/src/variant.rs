//! # Switch Structs
//!
//! A discriminant field (an enum written as a Char or Short) followed by a
//! payload whose shape depends on the discriminant's value.
//!
//! ## Preferred Form
//!
//! Model the discriminant and payload together as one enum. The tag is then
//! derived from the variant, so writing a payload under the wrong discriminant
//! cannot be expressed:
//!
//! ```rust
//! use eoproto_core::Result;
//! use eoproto_protocol::{EoReader, EoSerialize, EoWriter};
//!
//! #[derive(Debug, PartialEq)]
//! enum Reply {
//!     Accepted { session: u32 },
//!     Rejected,
//!     Other(u32),
//! }
//!
//! impl EoSerialize for Reply {
//!     fn serialize(&self, writer: &mut EoWriter) -> Result<()> {
//!         match self {
//!             Reply::Accepted { session } => {
//!                 writer.add_short(1)?;
//!                 writer.add_short(*session)
//!             }
//!             Reply::Rejected => writer.add_short(2),
//!             Reply::Other(code) => writer.add_short(*code),
//!         }
//!     }
//!
//!     fn deserialize(reader: &mut EoReader) -> Result<Self> {
//!         Ok(match reader.get_short()? {
//!             1 => Reply::Accepted { session: reader.get_short()? },
//!             2 => Reply::Rejected,
//!             code => Reply::Other(code),
//!         })
//!     }
//! }
//!
//! let mut writer = EoWriter::new();
//! Reply::Accepted { session: 7 }.serialize(&mut writer)?;
//! let mut reader = EoReader::new(writer.into_bytes());
//! assert_eq!(Reply::deserialize(&mut reader)?, Reply::Accepted { session: 7 });
//! # Ok::<(), eoproto_core::ProtocolError>(())
//! ```
//!
//! ## Split Form
//!
//! Structures that keep the discriminant and an optional payload as separate
//! fields must call [`ensure_variant`] before writing, and can decode through a
//! [`VariantTable`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use eoproto_core::{ProtocolError, Result};

use crate::{EoReader, EoWriter};

/// Types that can be written to and read from a packet body
pub trait EoSerialize: Sized {
    fn serialize(&self, writer: &mut EoWriter) -> Result<()>;
    fn deserialize(reader: &mut EoReader) -> Result<Self>;
}

/// A switch-struct payload that knows which discriminant it belongs to
pub trait Tagged {
    type Tag: Copy + PartialEq + Debug;

    fn tag(&self) -> Self::Tag;
}

/// Check that `payload` belongs under `discriminant`
///
/// # Errors
/// `TypeMismatch` naming both tags.
pub fn ensure_variant<P: Tagged>(discriminant: P::Tag, payload: &P) -> Result<()> {
    let actual = payload.tag();
    if actual != discriminant {
        tracing::debug!(?discriminant, ?actual, "switch payload does not match discriminant");
        return Err(ProtocolError::type_mismatch(discriminant, actual));
    }
    Ok(())
}

/// Decoder for one discriminant value
pub type VariantDecoder<T> = fn(&mut EoReader) -> Result<T>;

/// Decoder for discriminant values without a dedicated entry
pub type FallbackDecoder<K, T> = fn(K, &mut EoReader) -> Result<T>;

/// Table mapping discriminant values to payload decoders
pub struct VariantTable<K, T> {
    entries: HashMap<K, VariantDecoder<T>>,
    fallback: Option<FallbackDecoder<K, T>>,
}

impl<K: Copy + Eq + Hash + Debug, T> VariantTable<K, T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: None,
        }
    }

    /// Register the decoder for `key`
    pub fn with(mut self, key: K, decoder: VariantDecoder<T>) -> Self {
        self.entries.insert(key, decoder);
        self
    }

    /// Register a decoder used for every key without its own entry
    pub fn with_fallback(mut self, fallback: FallbackDecoder<K, T>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Decode the payload for `key`
    ///
    /// Returns `Ok(None)` when the key has no entry and there is no fallback:
    /// such discriminants carry no payload.
    pub fn decode(&self, key: K, reader: &mut EoReader) -> Result<Option<T>> {
        if let Some(decoder) = self.entries.get(&key) {
            return decoder(reader).map(Some);
        }
        match self.fallback {
            Some(fallback) => fallback(key, reader).map(Some),
            None => {
                tracing::trace!(?key, "no payload for discriminant");
                Ok(None)
            }
        }
    }
}

impl<K: Copy + Eq + Hash + Debug, T> Default for VariantTable<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Number,
        Text,
    }

    enum Payload {
        Number(u32),
        Text(String),
    }

    impl Tagged for Payload {
        type Tag = Kind;

        fn tag(&self) -> Kind {
            match self {
                Payload::Number(_) => Kind::Number,
                Payload::Text(_) => Kind::Text,
            }
        }
    }

    #[test]
    fn test_ensure_variant() {
        assert!(ensure_variant(Kind::Number, &Payload::Number(1)).is_ok());
        assert_eq!(
            ensure_variant(Kind::Number, &Payload::Text("x".into())),
            Err(ProtocolError::TypeMismatch {
                expected: "Number".into(),
                actual: "Text".into(),
            })
        );
    }

    #[test]
    fn test_table_dispatch() {
        let table: VariantTable<u32, Payload> = VariantTable::new()
            .with(1, |reader| Ok(Payload::Number(reader.get_char()?)))
            .with(2, |reader| Ok(Payload::Text(reader.get_string()?)));

        let mut reader = EoReader::new(vec![0x05, b'h', b'i']);
        match table.decode(1, &mut reader).unwrap() {
            Some(Payload::Number(n)) => assert_eq!(n, 4),
            _ => panic!("expected a number payload"),
        }
        match table.decode(2, &mut reader).unwrap() {
            Some(Payload::Text(s)) => assert_eq!(s, "hi"),
            _ => panic!("expected a text payload"),
        }
        assert!(table.decode(3, &mut reader).unwrap().is_none());
        assert!(table.contains(1));
        assert!(!table.contains(3));
    }

    #[test]
    fn test_table_fallback() {
        let table: VariantTable<u32, Payload> = VariantTable::new()
            .with(1, |reader| Ok(Payload::Number(reader.get_char()?)))
            .with_fallback(|key, reader| Ok(Payload::Number(key * 1000 + reader.get_char()?)));

        let mut reader = EoReader::new(vec![0x02]);
        match table.decode(9, &mut reader).unwrap() {
            Some(Payload::Number(n)) => assert_eq!(n, 9001),
            _ => panic!("expected fallback payload"),
        }
    }
}
