use crate::error::{LinkError, Result};
use crate::hamming;
use crate::{CODEWORD_BYTES, GROUP_BYTES, MAGIC_CODEWORD, PREAMBLE_CODEWORDS};

/// Byte length of the preamble
pub fn preamble_len() -> usize {
    PREAMBLE_CODEWORDS * CODEWORD_BYTES
}

/// Byte length of `input_len` message bytes once Hamming-coded (no preamble)
pub fn encoded_len(input_len: usize) -> usize {
    input_len.div_ceil(GROUP_BYTES) * CODEWORD_BYTES
}

pub fn encoded_len_with_preamble(input_len: usize) -> usize {
    preamble_len() + encoded_len(input_len)
}

/// Upper bound on the message bytes recoverable from `encoded_len` coded bytes
pub fn max_decoded_len(encoded_len: usize) -> usize {
    encoded_len * GROUP_BYTES / CODEWORD_BYTES
}

pub struct FrameEncoder;
pub struct FrameDecoder;

impl FrameEncoder {
    /// Hamming-code a message, three bytes per codeword
    ///
    /// Each group is packed little-endian (byte0 | byte1 << 8 | byte2 << 16);
    /// a short final group is zero-padded.
    pub fn codewords(bytes: &[u8], include_preamble: bool) -> Vec<u32> {
        let preamble = if include_preamble { PREAMBLE_CODEWORDS } else { 0 };
        let mut words = Vec::with_capacity(preamble + bytes.len().div_ceil(GROUP_BYTES));

        words.extend(std::iter::repeat(MAGIC_CODEWORD).take(preamble));
        for group in bytes.chunks(GROUP_BYTES) {
            let value = group
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, &b)| acc | (b as u32) << (8 * i));
            words.push(hamming::encode(value));
        }

        words
    }

    /// Hamming-code a message and serialize the codewords little-endian
    pub fn encode(bytes: &[u8], include_preamble: bool) -> Vec<u8> {
        Self::codewords(bytes, include_preamble)
            .into_iter()
            .flat_map(u32::to_le_bytes)
            .collect()
    }
}

impl FrameDecoder {
    /// Decode a codeword byte stream
    ///
    /// See [`FrameDecoder::decode_into`] for the failure semantics; on error
    /// the partially decoded bytes are dropped.
    pub fn decode(codeword_bytes: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(max_decoded_len(codeword_bytes.len()));
        Self::decode_into(codeword_bytes, &mut out)?;
        Ok(out)
    }

    /// Decode complete 4-byte codewords, appending three bytes each to `out`
    ///
    /// Stops at the first uncorrectable codeword and returns
    /// `UncorrectableCodeword` with the number of bytes produced before it;
    /// those bytes stay in `out` so the caller can resynchronize. A trailing
    /// fragment shorter than a codeword is ignored.
    pub fn decode_into(codeword_bytes: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        let mut decoded = 0;

        for (index, chunk) in codeword_bytes.chunks_exact(CODEWORD_BYTES).enumerate() {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

            let Some(result) = hamming::check(word) else {
                log::debug!("codeword {} ({:#010x}) is uncorrectable", index, word);
                return Err(LinkError::UncorrectableCodeword { index, decoded });
            };

            if let Some(position) = result.corrected {
                log::trace!("codeword {}: repaired bit {}", index, position);
            }

            out.extend_from_slice(&result.value.to_le_bytes()[..GROUP_BYTES]);
            decoded += GROUP_BYTES;
        }

        Ok(decoded)
    }
}
