//! Run-length view of a bitstream
//!
//! The PWM modulator spends one sub-carrier cycle on each pair of adjacent
//! runs rather than one per bit, so it walks the stream as run pairs.

/// Maximal span of equal bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRun {
    pub value: bool,
    /// Index of the first bit of the run
    pub start: usize,
    pub len: usize,
}

impl SymbolRun {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Iterator over the runs of a bit slice
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    bits: &'a [bool],
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = SymbolRun;

    fn next(&mut self) -> Option<SymbolRun> {
        let value = *self.bits.get(self.pos)?;
        let start = self.pos;
        let len = self.bits[start..]
            .iter()
            .take_while(|&&bit| bit == value)
            .count();
        self.pos += len;
        Some(SymbolRun { value, start, len })
    }
}

pub fn runs(bits: &[bool]) -> Runs<'_> {
    Runs { bits, pos: 0 }
}

/// Two adjacent runs rendered as one sub-carrier cycle
///
/// A trailing run without a partner is paired with a virtual run of the
/// same length, so it renders as half of a 50% duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPair {
    pub first: SymbolRun,
    pub second: Option<SymbolRun>,
}

impl RunPair {
    pub fn start(&self) -> usize {
        self.first.start
    }

    /// One past the last real bit covered
    pub fn end(&self) -> usize {
        self.second.map_or(self.first.end(), |second| second.end())
    }

    pub fn starts_high(&self) -> bool {
        self.first.value
    }

    /// Length of the full cycle in bits, virtual partner included
    pub fn cycle_bits(&self) -> usize {
        self.first.len + self.second.map_or(self.first.len, |second| second.len)
    }

    fn high_bits(&self) -> usize {
        match self.second {
            Some(second) if !self.first.value => second.len,
            // High-first, or a lone run against its equal-length partner.
            _ => self.first.len,
        }
    }

    /// Fraction of the cycle spent on the high run
    pub fn duty_cycle(&self) -> f64 {
        self.high_bits() as f64 / self.cycle_bits() as f64
    }

    /// Phase shift in periods that puts the high part where the high run is
    ///
    /// Zero when the pair opens high. When it opens low the pulse is delayed
    /// to the end of the cycle, `duty - 1` periods.
    pub fn phase_shift(&self) -> f64 {
        if self.starts_high() {
            0.0
        } else {
            self.duty_cycle() - 1.0
        }
    }

    /// Sub-carrier frequency for this pair, given the one-bit-per-half-period
    /// `signal_freq`
    pub fn frequency(&self, signal_freq: f64) -> f64 {
        signal_freq / (self.cycle_bits() as f64 / 2.0)
    }
}

/// Iterator over consecutive run pairs
#[derive(Debug, Clone)]
pub struct RunPairs<'a> {
    runs: Runs<'a>,
}

impl Iterator for RunPairs<'_> {
    type Item = RunPair;

    fn next(&mut self) -> Option<RunPair> {
        let first = self.runs.next()?;
        let second = self.runs.next();
        Some(RunPair { first, second })
    }
}

pub fn run_pairs(bits: &[bool]) -> RunPairs<'_> {
    RunPairs { runs: runs(bits) }
}

/// Unpack bytes into bits, least significant bit first
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// Pack bits into bytes, least significant bit first; a short last byte is
/// zero-filled
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit as u8) << i))
        })
        .collect()
}
