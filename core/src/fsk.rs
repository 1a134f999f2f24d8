use crate::error::{LinkError, Result};
use crate::{DEFAULT_MAGNITUDE, DEFAULT_SAMPLE_RATE, FSK_CARRIER_FREQ, FSK_DEVIATION, FSK_SYMBOL_RATE};
use std::f64::consts::PI;

// Continuous-phase binary FSK
//
// Frequency plan (defaults):
// - Carrier 18750 Hz, just above most listeners' hearing
// - Mark (1) at carrier + deviation/2 = 19000 Hz
// - Space (0) at carrier - deviation/2 = 18500 Hz
// - 1000 baud, modulation index h = deviation / symbol_rate = 0.5 (MSK)
//
// The phase at each symbol boundary carries over from the previous symbol,
// so the waveform never jumps.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FskConfig {
    pub sample_rate: f64,
    pub carrier_freq: f64,
    /// Symbols (bits) per second
    pub symbol_rate: f64,
    /// Mark/space separation in Hz
    pub deviation: f64,
    pub magnitude: f64,
}

impl Default for FskConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            carrier_freq: FSK_CARRIER_FREQ,
            symbol_rate: FSK_SYMBOL_RATE,
            deviation: FSK_DEVIATION,
            magnitude: DEFAULT_MAGNITUDE,
        }
    }
}

impl FskConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.sample_rate) || !positive(self.symbol_rate) || !positive(self.deviation) {
            return Err(LinkError::InvalidConfig(
                "sample rate, symbol rate and deviation must be positive".to_string(),
            ));
        }
        if self.symbol_rate > self.sample_rate {
            return Err(LinkError::InvalidConfig(format!(
                "symbol rate {} exceeds sample rate {}",
                self.symbol_rate, self.sample_rate
            )));
        }
        if self.space_freq() <= 0.0 || self.mark_freq() >= self.sample_rate / 2.0 {
            return Err(LinkError::InvalidConfig(format!(
                "tones {} Hz / {} Hz must lie between 0 and Nyquist ({} Hz)",
                self.space_freq(),
                self.mark_freq(),
                self.sample_rate / 2.0
            )));
        }
        if !self.magnitude.is_finite() {
            return Err(LinkError::InvalidConfig("magnitude must be finite".to_string()));
        }
        Ok(())
    }

    pub fn modulation_index(&self) -> f64 {
        self.deviation / self.symbol_rate
    }

    /// Tone for a 1 bit
    pub fn mark_freq(&self) -> f64 {
        self.carrier_freq + self.deviation / 2.0
    }

    /// Tone for a 0 bit
    pub fn space_freq(&self) -> f64 {
        self.carrier_freq - self.deviation / 2.0
    }

    pub fn samples_per_symbol(&self) -> f64 {
        self.sample_rate / self.symbol_rate
    }
}

fn bit_sign(bit: bool) -> f64 {
    if bit {
        1.0
    } else {
        -1.0
    }
}

/// Running phase offset at symbol boundaries
///
/// `theta(k) = π·h·Σ_{j<k} s(j)` with `s(j) = ±1`. The last computed index
/// is memoized, so walking `k` upwards costs O(1) per symbol. Asking for an
/// earlier index restarts the sum from zero.
#[derive(Debug, Clone)]
pub struct PhaseAccumulator {
    step: f64,
    index: usize,
    theta: f64,
}

impl PhaseAccumulator {
    pub fn new(modulation_index: f64) -> Self {
        Self {
            step: PI * modulation_index,
            index: 0,
            theta: 0.0,
        }
    }

    /// Phase at the start of symbol `k`, wrapped to `[0, 2π)`
    ///
    /// # Panics
    ///
    /// Panics if `k > bits.len()`.
    pub fn theta(&mut self, bits: &[bool], k: usize) -> f64 {
        assert!(k <= bits.len(), "symbol {} beyond {} bits", k, bits.len());
        if k < self.index {
            self.reset();
        }
        for &bit in &bits[self.index..k] {
            self.theta = (self.theta + self.step * bit_sign(bit)).rem_euclid(2.0 * PI);
        }
        self.index = k;
        self.theta
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.theta = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct FskModulator {
    config: FskConfig,
}

impl FskModulator {
    pub fn new(config: FskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FskConfig {
        &self.config
    }

    pub fn required_samples(&self, num_bits: usize) -> usize {
        (num_bits as f64 * self.config.samples_per_symbol()).ceil() as usize
    }

    pub fn modulate(&self, bits: &[bool]) -> Vec<f32> {
        let mut out = vec![0.0; self.required_samples(bits.len())];
        self.modulate_into(bits, &mut out);
        out
    }

    /// Add the FSK signal for `bits` onto `out`
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`Self::required_samples`].
    pub fn modulate_into(&self, bits: &[bool], out: &mut [f32]) {
        let required = self.required_samples(bits.len());
        assert!(
            out.len() >= required,
            "output buffer too short: {} samples, {} required",
            out.len(),
            required
        );
        if bits.is_empty() {
            return;
        }

        let cfg = &self.config;
        let h = cfg.modulation_index();
        let mut phase = PhaseAccumulator::new(h);

        for (n, sample) in out.iter_mut().enumerate().take(required) {
            let t = n as f64 / cfg.sample_rate;
            let position = t * cfg.symbol_rate;
            let k = (position.floor() as usize).min(bits.len() - 1);
            let frac = position - k as f64;

            let theta = phase.theta(bits, k);
            let angle = 2.0 * PI * cfg.carrier_freq * t + theta + PI * h * bit_sign(bits[k]) * frac;
            *sample += (cfg.magnitude * angle.cos()) as f32;
        }
    }
}
