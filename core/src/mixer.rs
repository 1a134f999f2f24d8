use crate::error::{LinkError, Result};
use crate::waveform::Waveform;
use std::f64::consts::PI;

/// Which mixing images survive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sideband {
    /// Quadrature mix keeping only the image above the carrier
    #[default]
    Upper,
    /// Plain product; both images at equal strength
    Double,
}

/// Shifts a sub-carrier waveform up to an acoustic carrier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierMixer {
    carrier_freq: f64,
    sideband: Sideband,
}

impl CarrierMixer {
    /// A carrier of 0 Hz passes the in-phase waveform through unchanged.
    pub fn new(carrier_freq: f64, sideband: Sideband) -> Result<Self> {
        if !(carrier_freq.is_finite() && carrier_freq >= 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "carrier frequency must be non-negative, got {}",
                carrier_freq
            )));
        }
        Ok(Self {
            carrier_freq,
            sideband,
        })
    }

    pub fn carrier_freq(&self) -> f64 {
        self.carrier_freq
    }

    pub fn sideband(&self) -> Sideband {
        self.sideband
    }

    /// Mixed sample at time `t`; `quadrature` is only read for `Upper`.
    pub fn mix<I, Q>(&self, in_phase: &I, quadrature: &Q, t: f64) -> f64
    where
        I: Waveform + ?Sized,
        Q: Waveform + ?Sized,
    {
        let angle = 2.0 * PI * self.carrier_freq * t;
        match self.sideband {
            Sideband::Upper => in_phase.sample(t) * angle.cos() - quadrature.sample(t) * angle.sin(),
            Sideband::Double => in_phase.sample(t) * angle.cos(),
        }
    }
}
