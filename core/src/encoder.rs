use crate::error::Result;
use crate::framing::FrameEncoder;
use crate::signal::{SignalConfig, SignalEncoder};
use crate::symbol::bytes_to_bits;

/// Encoder using run-pair PWM sub-carriers on a single-sideband carrier
///
/// Message bytes are Hamming-coded behind the magic preamble, unpacked
/// LSB-first and rendered as one band-limited PWM cycle per pair of bit runs.
pub struct Encoder {
    signal: SignalEncoder,
    include_preamble: bool,
}

impl Encoder {
    pub fn new(config: SignalConfig) -> Result<Self> {
        Ok(Self {
            signal: SignalEncoder::new(config)?,
            include_preamble: true,
        })
    }

    pub fn config(&self) -> &SignalConfig {
        self.signal.config()
    }

    pub fn include_preamble(&self) -> bool {
        self.include_preamble
    }

    pub fn set_include_preamble(&mut self, include: bool) {
        self.include_preamble = include;
    }

    /// Codeword bytes that will be modulated for `data`
    pub fn frame(&self, data: &[u8]) -> Vec<u8> {
        FrameEncoder::encode(data, self.include_preamble)
    }

    /// Modulate an already framed bitstream
    pub fn encode_bits(&self, bits: &[bool]) -> Vec<f32> {
        self.signal.encode(bits)
    }

    /// Run pairs of the framed `data` that will render at a clamped duty
    pub fn clamped_pairs(&self, data: &[u8]) -> usize {
        self.signal.clamped_pairs(&bytes_to_bits(&self.frame(data)))
    }

    /// Encode binary data into audio samples
    pub fn encode(&self, data: &[u8]) -> Vec<f32> {
        let bits = bytes_to_bits(&self.frame(data));
        log::debug!(
            "encoding {} bytes as {} bits ({} samples)",
            data.len(),
            bits.len(),
            self.signal.required_samples(bits.len())
        );
        self.encode_bits(&bits)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(SignalConfig::default()).expect("default signal config is valid")
    }
}
