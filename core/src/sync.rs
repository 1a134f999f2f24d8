use crate::hamming;
use crate::{MAGIC_PAYLOAD, SYNC_LOCK_THRESHOLD};

const WORD_BITS: usize = 32;

/// A run of consecutive magic codewords found in a bit buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreambleMatch {
    /// Bit offset (LSB-first within each byte) of the first codeword
    pub bit_offset: usize,
    /// Number of consecutive non-overlapping copies
    pub match_count: u32,
}

impl PreambleMatch {
    /// Bit offset just past the last matched codeword
    pub fn payload_offset(&self) -> usize {
        self.bit_offset + self.match_count as usize * WORD_BITS
    }
}

/// Bit-granular search for a repeated magic codeword
///
/// The channel does not preserve byte framing, so every bit offset is tried
/// until the first hit. From there the scan steps a whole codeword at a time
/// and counts copies until one fails to decode to the magic payload.
#[derive(Debug, Clone, Copy)]
pub struct PreambleScanner {
    magic: u32,
    lock_threshold: u32,
}

impl PreambleScanner {
    pub fn new(magic: u32, lock_threshold: u32) -> Self {
        Self {
            magic,
            lock_threshold,
        }
    }

    pub fn lock_threshold(&self) -> u32 {
        self.lock_threshold
    }

    /// True if the run is long enough to trust the alignment
    pub fn is_locked(&self, found: &PreambleMatch) -> bool {
        found.match_count >= self.lock_threshold
    }

    /// Find the first run of magic codewords in `buffer`
    ///
    /// Returns `None` if no window decodes to the magic payload. A run shorter
    /// than the lock threshold is still reported; check [`Self::is_locked`].
    pub fn scan(&self, buffer: &[u8]) -> Option<PreambleMatch> {
        self.scan_from(buffer, 0)
    }

    /// Same as [`Self::scan`], ignoring windows that start before `start_bit`
    ///
    /// Resume from [`PreambleMatch::payload_offset`] to look past a run that
    /// did not lock.
    pub fn scan_from(&self, buffer: &[u8], start_bit: usize) -> Option<PreambleMatch> {
        let total_bits = buffer.len() * 8;
        let mut run: Option<PreambleMatch> = None;
        let mut bit = start_bit;

        while bit + WORD_BITS <= total_bits {
            if hamming::decode(read_word(buffer, bit)) == Some(self.magic) {
                let found = run.get_or_insert(PreambleMatch {
                    bit_offset: bit,
                    match_count: 0,
                });
                found.match_count += 1;
                bit += WORD_BITS;
            } else if run.is_some() {
                break;
            } else {
                bit += 1;
            }
        }

        match &run {
            Some(found) => log::debug!(
                "preamble run at bit {} with {} copies (locked: {})",
                found.bit_offset,
                found.match_count,
                self.is_locked(found)
            ),
            None => log::debug!(
                "no preamble in bits {}..{}",
                start_bit.min(total_bits),
                total_bits
            ),
        }

        run
    }
}

impl Default for PreambleScanner {
    fn default() -> Self {
        Self::new(MAGIC_PAYLOAD, SYNC_LOCK_THRESHOLD)
    }
}

/// Assemble the 32 bits starting at `bit_offset`; bytes past the end read as zero.
fn read_word(buffer: &[u8], bit_offset: usize) -> u32 {
    let raw = buffer
        .iter()
        .skip(bit_offset / 8)
        .take(5)
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (b as u64) << (8 * i));
    (raw >> (bit_offset % 8)) as u32
}

/// Extract the whole bytes that start at an arbitrary bit offset
pub fn realign(buffer: &[u8], bit_offset: usize) -> Vec<u8> {
    let shift = bit_offset % 8;
    let Some(tail) = buffer.get(bit_offset / 8..) else {
        return Vec::new();
    };

    if shift == 0 {
        return tail.to_vec();
    }

    tail.windows(2)
        .map(|pair| (pair[0] >> shift) | (pair[1] << (8 - shift)))
        .collect()
}

/// Shift a byte buffer towards higher bit positions by `nbits`
///
/// The bits pushed out of the last byte land in a new trailing byte.
///
/// # Panics
///
/// Panics if `nbits >= 8`.
pub fn shift_forward(buffer: &mut Vec<u8>, nbits: u32) {
    assert!(nbits < 8, "shift must be below one byte");
    if nbits == 0 || buffer.is_empty() {
        return;
    }

    let mut carry = 0u8;
    for byte in buffer.iter_mut() {
        let wide = (*byte as u16) << nbits;
        *byte = wide as u8 | carry;
        carry = (wide >> 8) as u8;
    }
    buffer.push(carry);
}
