//! Receive-side filters: Goertzel tone detection and circular FIR

use crate::error::{LinkError, Result};
use std::f32::consts::PI;

/// Two-stage Goertzel recurrence evaluated at every sample
///
/// Stage one resonates at `freq`; stage two combines its last two states so
/// the output envelope grows while the tone is present. Both stages start
/// from zero.
pub fn goertzel(input: &[f32], freq: f32, sample_rate: f32) -> Vec<f32> {
    let omega = 2.0 * PI * freq / sample_rate;
    let cosine = omega.cos();
    let coeff = 2.0 * cosine;

    let mut q1 = 0.0;
    let mut q2 = 0.0;
    input
        .iter()
        .map(|&x| {
            let q0 = x + coeff * q1 - q2;
            q2 = q1;
            q1 = q0;
            q0 - cosine * q2
        })
        .collect()
}

/// Squared magnitude of the DFT of `input` at `freq`
pub fn goertzel_power(input: &[f32], freq: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * PI * freq / sample_rate;
    let coeff = 2.0 * omega.cos();

    let mut q1 = 0.0;
    let mut q2 = 0.0;
    for &sample in input {
        let q0 = coeff * q1 - q2 + sample;
        q2 = q1;
        q1 = q0;
    }

    let real = q1 - q2 * omega.cos();
    let imag = q2 * omega.sin();
    real * real + imag * imag
}

/// Ten-tap symmetric kernel that favours the 19 kHz FSK mark tone at 44.1 kHz
///
/// Gain is about 0.046 at 19 kHz against 0.045 at the 18.5 kHz space tone
/// and 0.003 at 10 kHz, so it mostly strips the lower audible band.
pub const BAND_19K_TAPS: [f32; 10] = [
    0.002_557_915,
    -0.020_906_426,
    -0.000_960_939_4,
    -0.001_247_005,
    0.000_309_790_9,
    0.000_309_790_9,
    -0.001_247_005,
    -0.000_960_939_4,
    -0.020_906_426,
    0.002_557_915,
];

/// Direct-form FIR filter that treats its input as one period of a loop
#[derive(Debug, Clone)]
pub struct FirFilter {
    taps: Vec<f32>,
}

impl FirFilter {
    pub fn new(taps: Vec<f32>) -> Result<Self> {
        if taps.is_empty() {
            return Err(LinkError::InvalidConfig(
                "FIR filter needs at least one tap".to_string(),
            ));
        }
        Ok(Self { taps })
    }

    /// Boxcar low-pass of `len` equal taps summing to one
    pub fn moving_average(len: usize) -> Result<Self> {
        Self::new(vec![1.0 / len.max(1) as f32; len])
    }

    /// Filter built from [`BAND_19K_TAPS`]
    pub fn band_19k() -> Self {
        Self {
            taps: BAND_19K_TAPS.to_vec(),
        }
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    /// Convolve with the taps; indices before the start wrap to the end.
    pub fn apply(&self, input: &[f32]) -> Vec<f32> {
        let len = input.len();
        (0..len)
            .map(|i| {
                self.taps
                    .iter()
                    .enumerate()
                    .map(|(k, &tap)| tap * input[(i + len - k % len) % len])
                    .sum()
            })
            .collect()
    }
}

/// One-shot circular convolution of `input` with `taps`
pub fn fir(taps: &[f32], input: &[f32]) -> Result<Vec<f32>> {
    Ok(FirFilter::new(taps.to_vec())?.apply(input))
}
