//! Band-limited sub-carrier waveforms
//!
//! Square and triangle pulse trains approximated by truncated Fourier
//! series, each with a quadrature companion (the Hilbert transform of the
//! harmonic terms) for image-rejecting mixing. Every waveform is a plain
//! value: sampling never mutates it, so any time range can be evaluated in
//! any order.

use crate::error::{LinkError, Result};
use std::f64::consts::PI;

/// A stateless mapping from time (seconds) to amplitude
pub trait Waveform {
    fn sample(&self, t: f64) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    InPhase,
    /// 90° shifted companion used to cancel one mixing image
    Quadrature,
}

/// Shape parameters shared by every waveform family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformParams {
    freq: f64,
    magnitude: f64,
    duty_cycle: f64,
    phase_shift: f64,
    series_length: usize,
}

impl WaveformParams {
    /// `phase_shift` is expressed in periods; `series_length` is the number
    /// of harmonics summed.
    pub fn new(
        freq: f64,
        magnitude: f64,
        duty_cycle: f64,
        phase_shift: f64,
        series_length: usize,
    ) -> Result<Self> {
        if !(freq.is_finite() && freq > 0.0) {
            return Err(LinkError::InvalidConfig(format!(
                "waveform frequency must be positive, got {}",
                freq
            )));
        }
        if !magnitude.is_finite() || !phase_shift.is_finite() {
            return Err(LinkError::InvalidConfig(
                "waveform magnitude and phase must be finite".to_string(),
            ));
        }
        if !(duty_cycle > 0.0 && duty_cycle < 1.0) {
            return Err(LinkError::InvalidConfig(format!(
                "duty cycle must lie in (0, 1), got {}",
                duty_cycle
            )));
        }
        if series_length == 0 {
            return Err(LinkError::InvalidConfig(
                "series length must be at least 1".to_string(),
            ));
        }

        Ok(Self::from_parts(freq, magnitude, duty_cycle, phase_shift, series_length))
    }

    /// Build without validation; callers guarantee the ranges checked by `new`.
    pub(crate) fn from_parts(
        freq: f64,
        magnitude: f64,
        duty_cycle: f64,
        phase_shift: f64,
        series_length: usize,
    ) -> Self {
        Self {
            freq,
            magnitude,
            duty_cycle,
            phase_shift,
            series_length,
        }
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    pub fn phase_shift(&self) -> f64 {
        self.phase_shift
    }

    pub fn series_length(&self) -> usize {
        self.series_length
    }
}

/// Duty cycles the truncated series still renders as a recognisable pulse.
///
/// Roughly `1/L ..= 1 - 1/L`; below two harmonics only 50% is usable.
pub fn stable_duty_range(series_length: usize) -> (f64, f64) {
    let edge = (1.0 / series_length.max(1) as f64).min(0.5);
    (edge, 1.0 - edge)
}

/// Rectangular pulse train, high for the first `duty_cycle` of each period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareWave {
    params: WaveformParams,
    component: Component,
}

impl SquareWave {
    pub fn new(params: WaveformParams) -> Self {
        Self {
            params,
            component: Component::InPhase,
        }
    }

    pub fn quadrature(params: WaveformParams) -> Self {
        Self {
            params,
            component: Component::Quadrature,
        }
    }

    fn coefficient(&self, i: f64) -> f64 {
        let p = &self.params;
        2.0 * (p.magnitude / (i * PI)) * (i * PI * p.duty_cycle).sin()
    }
}

impl Waveform for SquareWave {
    fn sample(&self, t: f64) -> f64 {
        let p = &self.params;
        // Shifted so each period starts on the rising edge.
        let x = (p.freq * t - p.duty_cycle / 2.0 + p.phase_shift).rem_euclid(1.0);

        let harmonics: f64 = (1..=p.series_length)
            .map(|i| {
                let i = i as f64;
                let angle = 2.0 * PI * i * x;
                match self.component {
                    Component::InPhase => self.coefficient(i) * angle.cos(),
                    Component::Quadrature => self.coefficient(i) * angle.sin(),
                }
            })
            .sum();

        match self.component {
            Component::InPhase => p.magnitude * p.duty_cycle + harmonics,
            Component::Quadrature => harmonics,
        }
    }
}

/// Asymmetric triangle wave spanning `0 ..= 2 * magnitude`, rising for the
/// first `duty_cycle` of each period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleWave {
    params: WaveformParams,
    component: Component,
}

impl TriangleWave {
    pub fn new(params: WaveformParams) -> Self {
        Self {
            params,
            component: Component::InPhase,
        }
    }

    pub fn quadrature(params: WaveformParams) -> Self {
        Self {
            params,
            component: Component::Quadrature,
        }
    }

    fn coefficient(&self, n: f64) -> f64 {
        // Rise/fall slope ratio.
        let m = 1.0 / self.params.duty_cycle;
        let k = (2.0 * m * m) / (n * n * (m - 1.0) * PI * PI);
        k * ((n * (m - 1.0) * PI) / m).sin()
    }
}

impl Waveform for TriangleWave {
    fn sample(&self, t: f64) -> f64 {
        let p = &self.params;
        // Half-period units; the series below has period 2.
        let x = (2.0 * p.freq * t - p.duty_cycle + 2.0 * p.phase_shift).rem_euclid(2.0);

        let mut sign = 1.0;
        let mut v = 0.0;
        for n in 1..=p.series_length {
            let n = n as f64;
            let angle = n * PI * x;
            v += match self.component {
                Component::InPhase => sign * self.coefficient(n) * angle.sin(),
                Component::Quadrature => -sign * self.coefficient(n) * angle.cos(),
            };
            sign = -sign;
        }

        match self.component {
            Component::InPhase => p.magnitude * v + p.magnitude,
            Component::Quadrature => p.magnitude * v,
        }
    }
}

/// Waveform family selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveShape {
    Square,
    /// Smoother spectral rolloff
    #[default]
    Triangle,
}

impl WaveShape {
    pub fn build(self, params: WaveformParams, component: Component) -> ShapedWave {
        match (self, component) {
            (WaveShape::Square, Component::InPhase) => ShapedWave::Square(SquareWave::new(params)),
            (WaveShape::Square, Component::Quadrature) => {
                ShapedWave::Square(SquareWave::quadrature(params))
            }
            (WaveShape::Triangle, Component::InPhase) => {
                ShapedWave::Triangle(TriangleWave::new(params))
            }
            (WaveShape::Triangle, Component::Quadrature) => {
                ShapedWave::Triangle(TriangleWave::quadrature(params))
            }
        }
    }

    /// In-phase waveform and its quadrature companion
    pub fn pair(self, params: WaveformParams) -> (ShapedWave, ShapedWave) {
        (
            self.build(params, Component::InPhase),
            self.build(params, Component::Quadrature),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapedWave {
    Square(SquareWave),
    Triangle(TriangleWave),
}

impl Waveform for ShapedWave {
    fn sample(&self, t: f64) -> f64 {
        match self {
            ShapedWave::Square(wave) => wave.sample(t),
            ShapedWave::Triangle(wave) => wave.sample(t),
        }
    }
}
