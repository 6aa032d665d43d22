//! FM operator: a sine oscillator with its own amplitude envelope.
//!
//! Each voice owns four operators. An operator renders one sample per
//! [`Operator::advance`] call; the caller passes the instantaneous frequency
//! offset in Hz contributed by any modulators routed into it.

use libm::sinf;
use timbre_core::AdsrEnvelope;

use crate::algorithm::NUM_OPERATORS;

/// Tuning ratio bounds relative to the note's base frequency.
pub const RATIO_RANGE: (f32, f32) = (0.5, 16.0);
/// Output level bounds, in percent.
pub const LEVEL_RANGE: (f32, f32) = (0.0, 100.0);
/// Self-feedback amount bounds.
pub const FEEDBACK_RANGE: (f32, f32) = (0.0, 1.0);

const TWO_PI: f32 = core::f32::consts::TAU;

/// Parameter set for one operator.
///
/// All synthesis parameters for a single operator travel together so that a
/// composite update (ratio plus envelope plus level) lands atomically between
/// rendered samples.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OperatorParams {
    /// Frequency ratio relative to the note's base frequency.
    pub ratio: f32,
    /// Output level in percent. For carriers this scales the audible
    /// amplitude; for modulators it scales modulation depth.
    pub level: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, 0.0 to 1.0.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Self-feedback amount, 0.0 to 1.0.
    pub feedback: f32,
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            level: 75.0,
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.3,
            feedback: 0.0,
        }
    }
}

impl OperatorParams {
    /// Returns a copy with every field clamped to its valid range.
    ///
    /// Out-of-range values are silently clamped, never rejected.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            ratio: self.ratio.clamp(RATIO_RANGE.0, RATIO_RANGE.1),
            level: self.level.clamp(LEVEL_RANGE.0, LEVEL_RANGE.1),
            attack: self.attack.max(0.0),
            decay: self.decay.max(0.0),
            sustain: self.sustain.clamp(0.0, 1.0),
            release: self.release.max(0.0),
            feedback: self.feedback.clamp(FEEDBACK_RANGE.0, FEEDBACK_RANGE.1),
        }
    }
}

/// A single FM operator.
///
/// Phase-accumulator sine oscillator gated by an [`AdsrEnvelope`]. Output is
/// the raw enveloped sine in [-1, 1]; level scaling is applied by the caller
/// (as carrier mix gain or as modulation depth).
#[derive(Debug, Clone)]
pub struct Operator {
    params: OperatorParams,
    envelope: AdsrEnvelope,
    sample_rate: f32,
    /// Base frequency for the current note, already multiplied by `ratio`.
    frequency: f32,
    phase: f32,
    velocity_gain: f32,
    prev_output: f32,
}

impl Operator {
    /// Creates an operator with default parameters at the given sample rate.
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        let mut op = Self {
            params: OperatorParams::default(),
            envelope: AdsrEnvelope::new(sample_rate),
            sample_rate,
            frequency: 0.0,
            phase: 0.0,
            velocity_gain: 0.0,
            prev_output: 0.0,
        };
        op.apply_envelope_params();
        op
    }

    /// Replaces the full parameter set in one call.
    ///
    /// Values are clamped. Envelope times take effect immediately; the ratio
    /// retunes the oscillator without resetting phase, so a sounding voice
    /// glides rather than clicks.
    pub fn set_params(&mut self, params: OperatorParams) {
        let base = self.base_frequency();
        self.params = params.clamped();
        self.frequency = base * self.params.ratio;
        self.apply_envelope_params();
    }

    /// Current parameter set.
    #[must_use]
    pub fn params(&self) -> OperatorParams {
        self.params
    }

    fn apply_envelope_params(&mut self) {
        self.envelope.set_attack(self.params.attack);
        self.envelope.set_decay(self.params.decay);
        self.envelope.set_sustain(self.params.sustain);
        self.envelope.set_release(self.params.release);
    }

    fn base_frequency(&self) -> f32 {
        if self.params.ratio > 0.0 {
            self.frequency / self.params.ratio
        } else {
            0.0
        }
    }

    /// Starts the operator for a note.
    ///
    /// `base_freq` is the note's fundamental in Hz; the operator runs at
    /// `base_freq * ratio`. Velocity maps linearly to gain.
    pub fn trigger(&mut self, base_freq: f32, velocity: u8) {
        self.frequency = base_freq * self.params.ratio;
        self.velocity_gain = f32::from(velocity) / 127.0;
        self.phase = 0.0;
        self.prev_output = 0.0;
        self.envelope.gate_on();
    }

    /// Enters the release stage.
    pub fn release(&mut self) {
        self.envelope.gate_off();
    }

    /// Immediately silences the operator and resets state.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.phase = 0.0;
        self.prev_output = 0.0;
    }

    /// True while the envelope is producing output.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Renders one sample.
    ///
    /// `freq_offset_hz` is the summed instantaneous frequency deviation from
    /// modulators feeding this operator. Self-feedback adds a further
    /// deviation proportional to the previous output sample.
    #[inline]
    pub fn advance(&mut self, freq_offset_hz: f32) -> f32 {
        let feedback_hz = self.prev_output * self.params.feedback * self.frequency;
        let inst_freq = (self.frequency + freq_offset_hz + feedback_hz).max(0.0);

        let out = sinf(self.phase * TWO_PI) * self.envelope.advance() * self.velocity_gain;

        self.phase += inst_freq / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        self.prev_output = out;
        out
    }
}

/// Builds a bank of four operators sharing one sample rate.
#[must_use]
pub fn operator_bank(sample_rate: f32) -> [Operator; NUM_OPERATORS] {
    core::array::from_fn(|_| Operator::new(sample_rate))
}
