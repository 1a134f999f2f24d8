//! Two-tone wake-up pips played ahead of a transmission
//!
//! Two tones trade places under rectified sine/cosine envelopes, so the
//! listener hears an alternating pip train well below the data band.

use crate::error::{LinkError, Result};
use std::f64::consts::PI;

pub const PIP_LOW_FREQ: f64 = 5000.0; // Hz
pub const PIP_HIGH_FREQ: f64 = 5500.0; // Hz
pub const PIP_SWITCH_RATE: f64 = 1000.0; // envelope lobes per second
pub const DEFAULT_PIP_SWITCHES: usize = 640;

/// Generate `switches` envelope lobes of init pips at `sample_rate`
///
/// The low tone rides `|sin(pi * R * t)|` and the high tone
/// `|cos(pi * R * t)|`, both halved and scaled by `0.2 * magnitude`, so the
/// output stays below `0.1 * sqrt(2) * magnitude`.
pub fn generate_init_pips(sample_rate: f64, switches: usize, magnitude: f64) -> Result<Vec<f32>> {
    if !(sample_rate.is_finite() && sample_rate > 2.0 * PIP_HIGH_FREQ) {
        return Err(LinkError::InvalidConfig(format!(
            "sample rate {} Hz cannot carry the {} Hz pip tone",
            sample_rate, PIP_HIGH_FREQ
        )));
    }

    let num_samples = (switches as f64 * sample_rate / PIP_SWITCH_RATE) as usize;
    let envelope = PI * PIP_SWITCH_RATE;
    let low = 2.0 * PI * PIP_LOW_FREQ;
    let high = 2.0 * PI * PIP_HIGH_FREQ;
    let gain = 0.2 * magnitude * 0.5;

    Ok((0..num_samples)
        .map(|n| {
            let t = n as f64 / sample_rate;
            let value = (envelope * t).sin().abs() * (low * t).sin()
                + (envelope * t).cos().abs() * (high * t).sin();
            (gain * value) as f32
        })
        .collect())
}
