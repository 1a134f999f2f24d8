//! Hamming(32,26) SECDED codec
//!
//! Codeword layout (1-indexed bit positions):
//! - Positions 1, 2, 4, 8, 16: group parity bits
//! - Position 32: overall parity over the whole word
//! - Remaining 26 positions: data, packed in increasing order
//!
//! Parity is even: every group (parity bit included) and the full word carry
//! an even number of set bits, so `encode(0) == 0`.
//!
//! A single flipped parity bit (group or overall) never touches the data, so
//! decode reports it as a repaired success rather than a failure. Two flipped
//! bits always decode to `None`.

/// Payloads must be strictly below this value (26 data bits).
pub const DATA_LIMIT: u32 = 1 << 26;

const PARITY_GROUPS: usize = 5;

const OVERALL_PARITY_BIT: u32 = 1 << 31;

/// Parity masks for the groups with weights 1, 2, 4, 8 and 16. Each selects
/// every position whose binary index has the matching bit set.
const PARITY_MASKS: [u32; PARITY_GROUPS] = [
    0b0101_0101_0101_0101_0101_0101_0101_0101,
    0b0110_0110_0110_0110_0110_0110_0110_0110,
    0b0111_1000_0111_1000_0111_1000_0111_1000,
    0b0111_1111_1000_0000_0111_1111_1000_0000,
    0b0111_1111_1111_1111_1000_0000_0000_0000,
];

/// (payload mask, shift) pairs moving contiguous payload bits into the free
/// slots between parity positions.
const DATA_FIELDS: [(u32, u32); 4] = [
    (0b1, 2),
    (0b1110, 3),
    (0b111_1111_0000, 4),
    (0b11_1111_1111_1111_1000_0000_0000, 5),
];

/// Result of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The 26-bit payload.
    pub value: u32,
    /// 1-indexed position of the bit that was repaired, if any.
    pub corrected: Option<u8>,
}

impl Decoded {
    pub fn is_clean(&self) -> bool {
        self.corrected.is_none()
    }
}

/// Encode a 26-bit payload into a 32-bit codeword.
///
/// # Panics
///
/// Panics if `n >= 2^26`.
pub const fn encode(n: u32) -> u32 {
    assert!(n < DATA_LIMIT, "hamming payload exceeds 26 bits");

    let mut word = spread(n);

    let mut group = 0;
    while group < PARITY_GROUPS {
        if (word & PARITY_MASKS[group]).count_ones() % 2 == 1 {
            word |= 1 << ((1u32 << group) - 1);
        }
        group += 1;
    }

    if word.count_ones() % 2 == 1 {
        word |= OVERALL_PARITY_BIT;
    }

    word
}

/// Decode a codeword, returning the payload or `None` if it is uncorrectable.
pub fn decode(word: u32) -> Option<u32> {
    check(word).map(|decoded| decoded.value)
}

/// Decode a codeword and report which bit (if any) had to be repaired.
pub fn check(word: u32) -> Option<Decoded> {
    let syndrome = syndrome(word);
    let parity_even = word.count_ones() % 2 == 0;

    let (repaired, corrected) = match (syndrome, parity_even) {
        (0, true) => (word, None),
        // Only the overall parity bit is off.
        (0, false) => (word ^ OVERALL_PARITY_BIT, Some(32)),
        // Single error at `s`; a parity position leaves the data untouched.
        (s, false) => (word ^ (1 << (s - 1)), Some(s as u8)),
        // Group checks fail but overall parity holds: at least two errors.
        (_, true) => return None,
    };

    Some(Decoded {
        value: gather(repaired),
        corrected,
    })
}

/// True for the six positions (1-indexed) that carry parity rather than data.
pub fn is_parity_position(position: u32) -> bool {
    position == 32 || (position <= 16 && position.is_power_of_two())
}

/// Sum of the weights of every group with odd parity. For a single error
/// inside positions 1..=31 this is the position of the flipped bit.
fn syndrome(word: u32) -> u32 {
    PARITY_MASKS
        .iter()
        .enumerate()
        .filter(|&(_, &mask)| (word & mask).count_ones() % 2 == 1)
        .map(|(group, _)| 1u32 << group)
        .sum()
}

const fn spread(n: u32) -> u32 {
    let mut word = 0;
    let mut i = 0;
    while i < DATA_FIELDS.len() {
        let (mask, shift) = DATA_FIELDS[i];
        word |= (n & mask) << shift;
        i += 1;
    }
    word
}

fn gather(word: u32) -> u32 {
    DATA_FIELDS
        .iter()
        .fold(0, |n, &(mask, shift)| n | ((word >> shift) & mask))
}
