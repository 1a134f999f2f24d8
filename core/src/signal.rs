use crate::error::{LinkError, Result};
use crate::mixer::{CarrierMixer, Sideband};
use crate::symbol::run_pairs;
use crate::waveform::{stable_duty_range, WaveShape, WaveformParams};
use crate::{
    DEFAULT_CARRIER_FREQ, DEFAULT_MAGNITUDE, DEFAULT_SAMPLE_RATE, DEFAULT_SERIES_LENGTH,
    DEFAULT_SIGNAL_FREQ,
};

/// Parameters of the PWM sub-carrier signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub sample_rate: f64,
    /// Half the bit rate: one bit lasts `1 / (2 * signal_freq)` seconds
    pub signal_freq: f64,
    /// 0 Hz leaves the sub-carrier at baseband
    pub carrier_freq: f64,
    pub magnitude: f64,
    pub series_length: usize,
    pub shape: WaveShape,
    pub sideband: Sideband,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            signal_freq: DEFAULT_SIGNAL_FREQ,
            carrier_freq: DEFAULT_CARRIER_FREQ,
            magnitude: DEFAULT_MAGNITUDE,
            series_length: DEFAULT_SERIES_LENGTH,
            shape: WaveShape::default(),
            sideband: Sideband::default(),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !(self.signal_freq.is_finite() && self.signal_freq > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "signal frequency must be positive, got {}",
                self.signal_freq
            )));
        }
        if self.samples_per_bit() < 1.0 {
            return Err(LinkError::InvalidConfig(format!(
                "signal frequency {} Hz leaves less than one sample per bit at {} Hz",
                self.signal_freq, self.sample_rate
            )));
        }
        if self.carrier_freq + self.signal_freq >= self.sample_rate / 2.0 {
            return Err(LinkError::InvalidConfig(format!(
                "carrier {} Hz plus signal {} Hz exceeds Nyquist ({} Hz)",
                self.carrier_freq,
                self.signal_freq,
                self.sample_rate / 2.0
            )));
        }
        if !self.magnitude.is_finite() {
            return Err(LinkError::InvalidConfig("magnitude must be finite".to_string()));
        }
        if self.series_length == 0 {
            return Err(LinkError::InvalidConfig(
                "series length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn samples_per_bit(&self) -> f64 {
        self.sample_rate / (2.0 * self.signal_freq)
    }
}

/// Renders a bitstream as one band-limited PWM cycle per run pair, mixed
/// onto the carrier
#[derive(Debug, Clone)]
pub struct SignalEncoder {
    config: SignalConfig,
    mixer: CarrierMixer,
    duty_range: (f64, f64),
}

impl SignalEncoder {
    pub fn new(config: SignalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mixer: CarrierMixer::new(config.carrier_freq, config.sideband)?,
            duty_range: stable_duty_range(config.series_length),
            config,
        })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Output samples needed for `num_bits` bits
    pub fn required_samples(&self, num_bits: usize) -> usize {
        (num_bits as f64 * self.config.samples_per_bit()).ceil() as usize
    }

    /// Run pairs whose duty cycle lies outside the stable range
    ///
    /// These are rendered at the nearest stable duty, which moves the edge
    /// between their two runs.
    pub fn clamped_pairs(&self, bits: &[bool]) -> usize {
        let (min_duty, max_duty) = self.duty_range;
        run_pairs(bits)
            .filter(|pair| !(min_duty..=max_duty).contains(&pair.duty_cycle()))
            .count()
    }

    pub fn encode(&self, bits: &[bool]) -> Vec<f32> {
        let mut out = vec![0.0; self.required_samples(bits.len())];
        self.encode_into(bits, &mut out);
        out
    }

    /// Add the modulated signal onto `out`
    ///
    /// Existing samples are kept, so several channels on different carriers
    /// can share one buffer.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`Self::required_samples`].
    pub fn encode_into(&self, bits: &[bool], out: &mut [f32]) {
        let required = self.required_samples(bits.len());
        assert!(
            out.len() >= required,
            "output buffer too short: {} samples, {} required",
            out.len(),
            required
        );

        let cfg = &self.config;
        let spb = cfg.samples_per_bit();
        let bit_duration = 1.0 / (2.0 * cfg.signal_freq);
        let (min_duty, max_duty) = self.duty_range;
        let mut pairs = 0;
        let mut clamped = 0;

        for pair in run_pairs(bits) {
            pairs += 1;
            let raw_duty = pair.duty_cycle();
            let duty = raw_duty.clamp(min_duty, max_duty);
            if duty != raw_duty {
                clamped += 1;
                log::debug!(
                    "run pair at bit {}: duty {:.3} clamped to {:.3}",
                    pair.start(),
                    raw_duty,
                    duty
                );
            }

            let freq = pair.frequency(cfg.signal_freq);
            // Recomputed from the clamped duty so a low-first pulse still
            // ends with the cycle.
            let shift = if pair.starts_high() { 0.0 } else { duty - 1.0 };
            // Fold the pair's start time into the phase and sample on the
            // global clock, keeping the carrier continuous across pairs.
            let t0 = pair.start() as f64 * bit_duration;
            let phase = (shift - freq * t0).rem_euclid(1.0);

            let params =
                WaveformParams::from_parts(freq, cfg.magnitude, duty, phase, cfg.series_length);
            let (in_phase, quadrature) = cfg.shape.pair(params);

            let first = (pair.start() as f64 * spb).round() as usize;
            let last = ((pair.end() as f64 * spb).round() as usize).min(required);
            for (n, sample) in out.iter_mut().enumerate().take(last).skip(first) {
                let t = n as f64 / cfg.sample_rate;
                *sample += self.mixer.mix(&in_phase, &quadrature, t) as f32;
            }
        }

        if clamped > 0 {
            log::warn!(
                "{} of {} run pairs clamped to duty range [{:.3}, {:.3}]",
                clamped,
                pairs,
                min_duty,
                max_duty
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::bytes_to_bits;

    fn baseband_square() -> SignalEncoder {
        SignalEncoder::new(SignalConfig {
            carrier_freq: 0.0,
            magnitude: 1.0,
            series_length: 40,
            shape: WaveShape::Square,
            ..SignalConfig::default()
        })
        .unwrap()
    }

    fn assert_bits_readable(bytes: &[u8]) {
        let encoder = baseband_square();
        let bits = bytes_to_bits(bytes);
        let samples = encoder.encode(&bits);
        let spb = encoder.config().samples_per_bit();

        for (i, &bit) in bits.iter().enumerate() {
            let mid = samples[((i as f64 + 0.5) * spb).round() as usize];
            if bit {
                assert!(mid > 0.9, "bit {} of {:02x?}: {}", i, bytes, mid);
            } else {
                assert!(mid < 0.1, "bit {} of {:02x?}: {}", i, bytes, mid);
            }
        }
    }

    #[test]
    fn test_baseband_pwm_follows_bits() {
        assert_bits_readable(&[0xA5, 0x3C, 0x0F, 0x81]);
    }

    #[test]
    fn test_baseband_pwm_low_first_runs() {
        assert_bits_readable(&[0x5A, 0xC3, 0xF0, 0x7E]);
    }

    #[test]
    fn test_required_samples() {
        let encoder = SignalEncoder::new(SignalConfig::default()).unwrap();
        assert_eq!(encoder.config().samples_per_bit(), 21.0);
        assert_eq!(encoder.required_samples(8), 168);
        assert_eq!(encoder.encode(&bytes_to_bits(&[1, 2, 3])).len(), 504);
        assert!(encoder.encode(&[]).is_empty());
    }

    #[test]
    fn test_encode_into_accumulates() {
        let encoder = SignalEncoder::new(SignalConfig::default()).unwrap();
        let bits = bytes_to_bits(b"sum");
        let single = encoder.encode(&bits);

        let mut doubled = vec![0.0; single.len()];
        encoder.encode_into(&bits, &mut doubled);
        encoder.encode_into(&bits, &mut doubled);

        for (a, b) in single.iter().zip(&doubled) {
            assert!((2.0 * a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_channels_superimpose() {
        let data = SignalEncoder::new(SignalConfig::default()).unwrap();
        let clock = SignalEncoder::new(SignalConfig {
            carrier_freq: 8000.0,
            ..SignalConfig::default()
        })
        .unwrap();

        let data_bits = bytes_to_bits(&[0x12, 0x34]);
        let clock_bits = vec![true, false].repeat(8);

        let mut mixed = data.encode(&data_bits);
        clock.encode_into(&clock_bits, &mut mixed);

        let expected: Vec<f32> = data
            .encode(&data_bits)
            .iter()
            .zip(clock.encode(&clock_bits))
            .map(|(a, b)| a + b)
            .collect();
        for (a, b) in mixed.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clamped_pairs() {
        let encoder = SignalEncoder::new(SignalConfig::default()).unwrap();
        // A lone one before a zero codeword: duty 1/33, below the 0.2 floor.
        let mut bits = vec![true];
        bits.extend(vec![false; 32]);
        assert_eq!(encoder.clamped_pairs(&bits), 1);

        let mut inverted: Vec<bool> = bits.iter().map(|&bit| !bit).collect();
        assert_eq!(encoder.clamped_pairs(&inverted), 1);
        inverted.truncate(4);
        assert_eq!(encoder.clamped_pairs(&inverted), 0);

        assert_eq!(encoder.clamped_pairs(&[true, false, true, false]), 0);
        // Exactly on the boundary.
        assert_eq!(encoder.clamped_pairs(&[false, false, false, false, true]), 0);
        // A lone trailing run pairs with an equal virtual run.
        assert_eq!(encoder.clamped_pairs(&[false; 32]), 0);

        let wide = SignalEncoder::new(SignalConfig {
            series_length: 40,
            ..SignalConfig::default()
        })
        .unwrap();
        assert_eq!(wide.clamped_pairs(&bits), 0);
    }

    #[test]
    #[should_panic(expected = "output buffer too short")]
    fn test_short_buffer_panics() {
        let encoder = SignalEncoder::new(SignalConfig::default()).unwrap();
        let mut out = vec![0.0; 10];
        encoder.encode_into(&[true, false, true], &mut out);
    }

    #[test]
    fn test_amplitude_is_bounded() {
        let config = SignalConfig::default();
        for shape in [WaveShape::Square, WaveShape::Triangle] {
            let encoder = SignalEncoder::new(SignalConfig { shape, ..config }).unwrap();
            let samples = encoder.encode(&bytes_to_bits(b"\x00\xFF\x0F\xF0The quick brown fox"));
            let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            assert!(peak > 0.0);
            assert!(peak < 4.0 * config.magnitude as f32, "{:?}: {}", shape, peak);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(SignalConfig::default().validate().is_ok());
        let invalid = [
            SignalConfig { sample_rate: 0.0, ..SignalConfig::default() },
            SignalConfig { signal_freq: -1.0, ..SignalConfig::default() },
            SignalConfig { signal_freq: 30000.0, ..SignalConfig::default() },
            SignalConfig { carrier_freq: 21500.0, ..SignalConfig::default() },
            SignalConfig { series_length: 0, ..SignalConfig::default() },
            SignalConfig { magnitude: f64::NAN, ..SignalConfig::default() },
        ];
        for config in invalid {
            assert!(SignalEncoder::new(config).is_err(), "{:?}", config);
        }
    }
}
