use crate::error::{LinkError, Result};
use crate::framing::FrameDecoder;
use crate::symbol::bits_to_bytes;
use crate::sync::{realign, PreambleMatch, PreambleScanner};

/// A payload recovered from a received bitstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    /// Where the preamble was found
    pub lock: PreambleMatch,
    /// Decoded bytes, three per codeword after the preamble
    pub payload: Vec<u8>,
    /// True if decoding stopped on an uncorrectable codeword
    pub truncated: bool,
}

/// Recovers messages from demodulated bits
///
/// The stream has no length field: everything after the preamble is decoded
/// until the buffer runs out or a codeword cannot be corrected.
pub struct Decoder {
    scanner: PreambleScanner,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_scanner(PreambleScanner::default())
    }

    pub fn with_scanner(scanner: PreambleScanner) -> Self {
        Self { scanner }
    }

    /// Decode a received byte buffer (bits LSB-first, arbitrary alignment)
    ///
    /// Runs of magic codewords too short to lock, such as the tail of an
    /// earlier broadcast, are skipped and the scan resumes after them.
    pub fn decode(&self, received: &[u8]) -> Result<ReceivedFrame> {
        let lock = self.lock(received)?;

        let aligned = realign(received, lock.payload_offset());
        let mut payload = Vec::new();
        let truncated = match FrameDecoder::decode_into(&aligned, &mut payload) {
            Ok(_) => false,
            Err(LinkError::UncorrectableCodeword { index, decoded }) => {
                log::debug!(
                    "payload ends at codeword {} after {} bytes",
                    index,
                    decoded
                );
                true
            }
            Err(e) => return Err(e),
        };

        Ok(ReceivedFrame {
            lock,
            payload,
            truncated,
        })
    }

    fn lock(&self, received: &[u8]) -> Result<PreambleMatch> {
        let mut start = 0;
        loop {
            let found = self
                .scanner
                .scan_from(received, start)
                .ok_or(LinkError::PreambleNotFound)?;
            if self.scanner.is_locked(&found) {
                return Ok(found);
            }
            log::debug!(
                "skipping {} magic codewords at bit {}",
                found.match_count,
                found.bit_offset
            );
            start = found.payload_offset();
        }
    }

    /// Same as [`Self::decode`] for an unpacked bitstream
    pub fn decode_bits(&self, bits: &[bool]) -> Result<ReceivedFrame> {
        self.decode(&bits_to_bytes(bits))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
