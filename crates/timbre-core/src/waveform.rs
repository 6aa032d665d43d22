//! Waveform shapes shared by LFOs and operators.
//!
//! A `Waveform` maps a normalized phase in `[0, 1)` to a value in
//! `[-1, 1]`. The deterministic shapes are pure functions; `Random` is
//! sample-and-hold and needs per-oscillator state, so it is realized
//! inside [`crate::Lfo`] and `sample()` returns 0 for it.

use core::f32::consts::PI;
use libm::sinf;

/// Generator waveform type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Waveform {
    /// Smooth sinusoid, `sin(2*pi*phase)`.
    #[default]
    Sine,
    /// +1 for the first half cycle, -1 for the second.
    Square,
    /// Rising ramp from -1 to +1 with an abrupt reset.
    Saw,
    /// Linear ramp up then down.
    Triangle,
    /// Sample-and-hold: a new random value once per cycle.
    Random,
}

impl Waveform {
    /// Evaluate the waveform at a normalized phase.
    ///
    /// `phase` outside `[0, 1)` is wrapped. `Random` has no pure value
    /// and evaluates to 0; the stateful hold lives in the LFO.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        let phase = wrap_phase(phase);
        match self {
            Waveform::Sine => sinf(phase * 2.0 * PI),

            Waveform::Square => {
                if phase < 0.5 { 1.0 } else { -1.0 }
            }

            Waveform::Saw => 2.0 * phase - 1.0,

            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }

            Waveform::Random => 0.0,
        }
    }

    /// Parse a waveform from its lowercase config name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Waveform::Sine),
            "square" => Some(Waveform::Square),
            "saw" | "sawtooth" => Some(Waveform::Saw),
            "triangle" => Some(Waveform::Triangle),
            "random" => Some(Waveform::Random),
            _ => None,
        }
    }
}

/// Wrap an arbitrary phase into `[0, 1)`.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - libm::floorf(phase);
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}
