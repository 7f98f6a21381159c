//! Core type definitions
//!
//! Every packet is keyed by a (family, action) pair. Both are single bytes on
//! the wire; values outside the known set are kept as `Unrecognized` so that a
//! peer speaking a newer protocol revision does not break decoding.

use serde::{Deserialize, Serialize};

macro_rules! byte_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        ///
        /// Equality and hashing go by wire value, so `Unrecognized(n)` equals
        /// the known variant whose value is `n`.
        #[derive(Debug, Clone, Copy, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// A value this library does not know about
            Unrecognized(u8),
        }

        impl $name {
            pub fn from_u8(value: u8) -> Self {
                match value {
                    $( $value => Self::$variant, )*
                    other => Self::Unrecognized(other),
                }
            }

            /// Like `from_u8`, but rejects values outside the known set
            pub fn from_known_u8(value: u8) -> crate::Result<Self> {
                match Self::from_u8(value) {
                    Self::Unrecognized(other) => Err(crate::ProtocolError::InvalidData(format!(
                        "unknown {} {}",
                        stringify!($name),
                        other
                    ))),
                    known => Ok(known),
                }
            }

            pub fn as_u8(&self) -> u8 {
                match self {
                    $( Self::$variant => $value, )*
                    Self::Unrecognized(value) => *value,
                }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.as_u8() == other.as_u8()
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.as_u8(), state);
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                Self::from_u8(value)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.as_u8()
            }
        }
    };
}

byte_enum! {
    /// Packet family (the "noun" half of a packet id)
    pub enum PacketFamily {
        Connection = 1,
        Account = 2,
        Character = 3,
        Login = 4,
        Welcome = 5,
        Walk = 6,
        Face = 7,
        Chair = 8,
        Emote = 9,
        Attack = 11,
        Spell = 12,
        Shop = 13,
        Item = 14,
        StatSkill = 16,
        Global = 17,
        Talk = 18,
        Warp = 19,
        Jukebox = 21,
        Players = 22,
        Avatar = 23,
        Party = 24,
        Refresh = 25,
        Npc = 26,
        PlayerRange = 27,
        NpcRange = 28,
        Range = 29,
        Paperdoll = 30,
        Effect = 31,
        Trade = 32,
        Chest = 33,
        Door = 34,
        Message = 35,
        Bank = 36,
        Locker = 37,
        Barber = 38,
        Guild = 39,
        Music = 40,
        Sit = 41,
        Recover = 42,
        Board = 43,
        Cast = 44,
        Arena = 45,
        Priest = 46,
        Marriage = 47,
        AdminInteract = 48,
        Citizen = 49,
        Quest = 50,
        Book = 51,
        /// Reserved across all families
        Error = 250,
        /// Reserved for the connection handshake
        Init = 255,
    }
}

byte_enum! {
    /// Packet action (the "verb" half of a packet id)
    pub enum PacketAction {
        Request = 1,
        Accept = 2,
        Reply = 3,
        Remove = 4,
        Agree = 5,
        Create = 6,
        Add = 7,
        Player = 8,
        Take = 9,
        Use = 10,
        Buy = 11,
        Sell = 12,
        Open = 13,
        Close = 14,
        Message = 15,
        Spec = 16,
        Admin = 17,
        List = 18,
        Tell = 20,
        Report = 21,
        Announce = 22,
        Server = 23,
        Drop = 24,
        Junk = 25,
        Obtain = 26,
        Get = 27,
        Kick = 28,
        Rank = 29,
        TargetSelf = 30,
        TargetOther = 31,
        TargetGroup = 33,
        Dialog = 34,
        Ping = 240,
        Pong = 241,
        Net242 = 242,
        Net243 = 243,
        Net244 = 244,
        /// Reserved across all families
        Error = 250,
        /// Reserved for the connection handshake
        Init = 255,
    }
}

/// Packet type key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PacketId {
    pub family: PacketFamily,
    pub action: PacketAction,
}

impl PacketId {
    pub const fn new(family: PacketFamily, action: PacketAction) -> Self {
        Self { family, action }
    }

    /// Wire order is action first, then family
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.action.as_u8(), self.family.as_u8()]
    }

    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            action: PacketAction::from_u8(bytes[0]),
            family: PacketFamily::from_u8(bytes[1]),
        }
    }

    /// Like `from_bytes`, but fails with `InvalidData` on an unknown family or action
    pub fn from_known_bytes(bytes: [u8; 2]) -> crate::Result<Self> {
        Ok(Self {
            action: PacketAction::from_known_u8(bytes[0])?,
            family: PacketFamily::from_known_u8(bytes[1])?,
        })
    }

    /// The handshake packet that opens every connection
    pub fn is_init(&self) -> bool {
        self.family == PacketFamily::Init && self.action == PacketAction::Init
    }
}
