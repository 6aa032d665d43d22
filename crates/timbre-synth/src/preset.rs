//! Preset value objects.
//!
//! A [`Preset`] captures everything needed to reproduce a patch: operator
//! parameters, topology, LFO setups with their destinations, effect base
//! values, and master volume. With the `serde` feature these types derive
//! `Serialize`/`Deserialize`; persistence itself lives in `timbre-config`.

use alloc::string::String;
use alloc::vec::Vec;

use timbre_core::{LfoRate, Waveform};

use crate::algorithm::{Algorithm, NUM_OPERATORS};
use crate::operator::OperatorParams;
use crate::router::ModTarget;

/// One LFO's configuration inside a preset.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LfoParams {
    /// Waveform shape.
    pub waveform: Waveform,
    /// Free-running Hz or tempo-synced division.
    pub rate: LfoRate,
    /// Depth, 0.0 to 2.0 (0 to 200%).
    pub depth: f32,
    /// Phase offset in degrees.
    pub phase_degrees: f32,
    /// Destination this LFO drives when the preset loads.
    pub destination: ModTarget,
    /// Connection amount, -1.0 to 1.0.
    pub amount: f32,
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            rate: LfoRate::Hertz(1.0),
            depth: 0.0,
            phase_degrees: 0.0,
            destination: ModTarget::Unassigned,
            amount: 1.0,
        }
    }
}

/// Base values for the effect parameters a preset pins.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectParams {
    /// Filter cutoff in Hz.
    pub filter_cutoff: f32,
    /// Filter resonance (Q).
    pub filter_resonance: f32,
    /// Reverb wet mix, 0.0 to 1.0.
    pub reverb_mix: f32,
    /// Chorus depth, 0.0 to 1.0.
    pub chorus_depth: f32,
    /// Delay feedback, 0.0 to 0.95.
    pub delay_feedback: f32,
    /// Stereo spread, 0.0 to 1.0.
    pub stereo_spread: f32,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            filter_cutoff: 1000.0,
            filter_resonance: 1.0,
            reverb_mix: 0.0,
            chorus_depth: 0.0,
            delay_feedback: 0.0,
            stereo_spread: 0.0,
        }
    }
}

/// A complete patch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preset {
    /// Display name.
    pub name: String,
    /// Per-operator parameters, index 0 through 3.
    pub operators: [OperatorParams; NUM_OPERATORS],
    /// Operator wiring topology.
    pub algorithm: Algorithm,
    /// LFO configurations; any number up to the engine's LFO slot count is
    /// honored, extras are ignored.
    pub lfos: Vec<LfoParams>,
    /// Effect base values.
    pub effects: EffectParams,
    /// Master output volume, 0.0 to 1.0.
    pub master_volume: f32,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: String::from("Init"),
            operators: [OperatorParams::default(); NUM_OPERATORS],
            algorithm: Algorithm::Serial,
            lfos: Vec::new(),
            effects: EffectParams::default(),
            master_volume: 0.8,
        }
    }
}

impl Preset {
    /// Returns a copy with every numeric field clamped to its valid range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut preset = self.clone();
        for op in &mut preset.operators {
            *op = op.clamped();
        }
        for lfo in &mut preset.lfos {
            lfo.depth = lfo.depth.clamp(0.0, 2.0);
            lfo.amount = lfo.amount.clamp(-1.0, 1.0);
        }
        preset.master_volume = preset.master_volume.clamp(0.0, 1.0);
        preset
    }
}
