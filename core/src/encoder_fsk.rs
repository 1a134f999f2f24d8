use crate::error::Result;
use crate::framing::FrameEncoder;
use crate::fsk::{FskConfig, FskModulator};
use crate::symbol::bytes_to_bits;

/// Encoder using continuous-phase binary FSK
///
/// Same framing as [`crate::Encoder`]; each coded bit becomes one symbol
/// on the mark or space tone.
pub struct EncoderFsk {
    fsk: FskModulator,
    include_preamble: bool,
}

impl EncoderFsk {
    pub fn new(config: FskConfig) -> Result<Self> {
        Ok(Self {
            fsk: FskModulator::new(config)?,
            include_preamble: true,
        })
    }

    pub fn config(&self) -> &FskConfig {
        self.fsk.config()
    }

    pub fn include_preamble(&self) -> bool {
        self.include_preamble
    }

    pub fn set_include_preamble(&mut self, include: bool) {
        self.include_preamble = include;
    }

    /// Encode binary data into audio samples
    pub fn encode(&self, data: &[u8]) -> Vec<f32> {
        let framed = FrameEncoder::encode(data, self.include_preamble);
        let bits = bytes_to_bits(&framed);
        log::debug!(
            "FSK encoding {} bytes as {} symbols at {} baud",
            data.len(),
            bits.len(),
            self.fsk.config().symbol_rate
        );
        self.fsk.modulate(&bits)
    }
}

impl Default for EncoderFsk {
    fn default() -> Self {
        Self::new(FskConfig::default()).expect("default FSK config is valid")
    }
}
