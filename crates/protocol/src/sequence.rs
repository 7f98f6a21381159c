//! Packet sequence numbers
//!
//! Each connection keeps a rolling counter: a base value (`start`) plus an
//! offset that cycles through `0..10`. The base is replaced during the
//! handshake and on every ping, while the offset keeps cycling, so peers can
//! cheaply check that packets are fresh and in order.
//!
//! The base itself is negotiated through one of the [`SequenceStart`] forms,
//! each of which splits the value into fields that fit the packet carrying it.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;

use crate::codecs::CHAR_MAX;

/// Number of distinct offsets before the sequence repeats
pub const SEQUENCE_CYCLE: i32 = 10;

/// Upper bound (exclusive) for generated init and ping starts
const MAX_GENERATED_START: i32 = 1757;

/// Upper bound (exclusive) for generated account reply starts
const MAX_ACCOUNT_REPLY_START: i32 = 240;

/// A negotiated sequence base
pub trait SequenceStart {
    fn value(&self) -> i32;
}

/// Rolling sequence counter for one connection
///
/// Not synchronized; see [`SharedSequencer`] when several tasks write packets
/// for the same connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketSequencer {
    start: i32,
    offset: i32,
}

impl PacketSequencer {
    pub fn new(start: i32) -> Self {
        Self { start, offset: 0 }
    }

    pub fn from_start(start: &impl SequenceStart) -> Self {
        Self::new(start.value())
    }

    /// Return `start + offset` and advance the offset (mod 10)
    ///
    /// The sum wraps on `i32` overflow, so a start near `i32::MAX` yields
    /// negative values instead of panicking.
    pub fn next_sequence(&mut self) -> i32 {
        let value = self.start.wrapping_add(self.offset);
        self.offset = (self.offset + 1) % SEQUENCE_CYCLE;
        value
    }

    /// Replace the base; the offset carries on from where it was
    pub fn set_sequence_start(&mut self, start: i32) {
        tracing::trace!(old = self.start, new = start, offset = self.offset, "rebasing sequence");
        self.start = start;
    }

    pub fn sequence_start(&self) -> i32 {
        self.start
    }
}

impl Default for PacketSequencer {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Sequencer shared between the tasks writing to one connection
#[derive(Debug, Clone, Default)]
pub struct SharedSequencer {
    inner: Arc<Mutex<PacketSequencer>>,
}

impl SharedSequencer {
    pub fn new(sequencer: PacketSequencer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sequencer)),
        }
    }

    pub fn next_sequence(&self) -> i32 {
        self.inner.lock().next_sequence()
    }

    pub fn set_sequence_start(&self, start: i32) {
        self.inner.lock().set_sequence_start(start);
    }
}

/// Sequence start sent as a single Char in the account reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountReplySequenceStart {
    value: i32,
}

impl AccountReplySequenceStart {
    pub fn from_value(value: i32) -> Self {
        Self { value }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            value: rng.gen_range(0..MAX_ACCOUNT_REPLY_START),
        }
    }
}

impl SequenceStart for AccountReplySequenceStart {
    fn value(&self) -> i32 {
        self.value
    }
}

/// Sequence start sent as two Chars in the init reply
///
/// `start = seq1 * 7 + seq2 - 13`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSequenceStart {
    value: i32,
    seq1: i32,
    seq2: i32,
}

impl InitSequenceStart {
    /// Rebuild the start from the bytes received in the init reply
    pub fn from_init_bytes(seq1: i32, seq2: i32) -> Self {
        Self {
            value: seq1 * 7 + seq2 - 13,
            seq1,
            seq2,
        }
    }

    /// Pick a random start and split it so both halves fit in a Char
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = rng.gen_range(0..MAX_GENERATED_START);
        let char_max = CHAR_MAX as i32;

        let seq1_max = (value + 13) / 7;
        let seq1_min = ((value - (char_max - 1) + 13 + 6) / 7).max(0);
        let seq1 = rng.gen_range(seq1_min..=seq1_max);
        let seq2 = value - seq1 * 7 + 13;

        Self { value, seq1, seq2 }
    }

    pub fn seq1(&self) -> i32 {
        self.seq1
    }

    pub fn seq2(&self) -> i32 {
        self.seq2
    }
}

impl SequenceStart for InitSequenceStart {
    fn value(&self) -> i32 {
        self.value
    }
}

/// Sequence start sent as a Short and a Char in ping packets
///
/// `start = seq1 - seq2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSequenceStart {
    value: i32,
    seq1: i32,
    seq2: i32,
}

impl PingSequenceStart {
    pub fn from_ping_values(seq1: i32, seq2: i32) -> Self {
        Self {
            value: seq1 - seq2,
            seq1,
            seq2,
        }
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = rng.gen_range(0..MAX_GENERATED_START);
        let seq1 = value + rng.gen_range(0..CHAR_MAX as i32 - 1);
        let seq2 = seq1 - value;

        Self { value, seq1, seq2 }
    }

    pub fn seq1(&self) -> i32 {
        self.seq1
    }

    pub fn seq2(&self) -> i32 {
        self.seq2
    }
}

impl SequenceStart for PingSequenceStart {
    fn value(&self) -> i32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_wraparound() {
        let mut sequencer = PacketSequencer::new(123);
        let values: Vec<i32> = (0..11).map(|_| sequencer.next_sequence()).collect();
        assert_eq!(
            values,
            vec![123, 124, 125, 126, 127, 128, 129, 130, 131, 132, 123]
        );
    }

    #[test]
    fn test_rebase_keeps_offset() {
        let mut sequencer = PacketSequencer::new(100);
        assert_eq!(sequencer.next_sequence(), 100);
        sequencer.set_sequence_start(200);
        assert_eq!(sequencer.next_sequence(), 201);
        assert_eq!(sequencer.sequence_start(), 200);
    }

    #[test]
    fn test_start_near_max_wraps() {
        let mut sequencer = PacketSequencer::new(i32::MAX);
        assert_eq!(sequencer.next_sequence(), i32::MAX);
        assert_eq!(sequencer.next_sequence(), i32::MIN);

        sequencer.set_sequence_start(i32::MAX - 1);
        let values: Vec<i32> = (0..8).map(|_| sequencer.next_sequence()).collect();
        assert_eq!(values[0], i32::MIN);
        assert_eq!(values[7], i32::MIN + 7);
    }

    #[test]
    fn test_shared_sequencer() {
        let shared = SharedSequencer::new(PacketSequencer::new(10));
        let clone = shared.clone();
        assert_eq!(shared.next_sequence(), 10);
        assert_eq!(clone.next_sequence(), 11);
        clone.set_sequence_start(50);
        assert_eq!(shared.next_sequence(), 52);
    }

    #[test]
    fn test_init_start_from_bytes() {
        let start = InitSequenceStart::from_init_bytes(110, 122);
        assert_eq!(start.value(), 110 * 7 + 122 - 13);
        assert_eq!(PacketSequencer::from_start(&start).next_sequence(), 879);
    }

    #[test]
    fn test_init_start_generation_fits_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let start = InitSequenceStart::generate(&mut rng);
            assert!((0..MAX_GENERATED_START).contains(&start.value()));
            assert!((0..CHAR_MAX as i32).contains(&start.seq1()), "{:?}", start);
            assert!((0..CHAR_MAX as i32).contains(&start.seq2()), "{:?}", start);
            let rebuilt = InitSequenceStart::from_init_bytes(start.seq1(), start.seq2());
            assert_eq!(rebuilt, start);
        }
    }

    #[test]
    fn test_ping_start_generation() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let start = PingSequenceStart::generate(&mut rng);
            assert!((0..CHAR_MAX as i32).contains(&start.seq2()));
            assert!(start.seq1() < 64_009);
            assert_eq!(
                PingSequenceStart::from_ping_values(start.seq1(), start.seq2()),
                start
            );
        }
    }

    #[test]
    fn test_account_reply_start() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let start = AccountReplySequenceStart::generate(&mut rng);
            assert!((0..240).contains(&start.value()));
        }
        assert_eq!(AccountReplySequenceStart::from_value(42).value(), 42);
    }
}
