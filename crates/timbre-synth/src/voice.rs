//! A single polyphonic voice: four operators plus their compiled wiring.

use crate::algorithm::{Algorithm, NUM_OPERATORS, OperatorGraph};
use crate::operator::{Operator, OperatorParams, operator_bank};

/// Lifecycle of a voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceState {
    /// Note is held; the voice counts against the polyphony cap.
    Triggered,
    /// Note released; the voice is sounding its release tail and no longer
    /// counts against the cap.
    Releasing,
    /// Voice is silent and awaiting disposal.
    Freed,
}

/// Disposal due times are `release * RELEASE_TAIL_FACTOR` past the note
/// off; an exponential tail is below the envelope idle threshold well
/// before that.
const RELEASE_TAIL_FACTOR: f64 = 10.0;

/// Converts a MIDI note number to frequency in Hz (A4 = 440 Hz).
#[must_use]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// One sounding note.
///
/// Voice ids are monotonic and never reused; a stale id from a stolen voice
/// can never address a newer voice by accident.
#[derive(Debug, Clone)]
pub struct Voice {
    id: u64,
    note: u8,
    velocity: u8,
    /// Engine time at allocation; the steal policy evicts the smallest.
    start_time: f64,
    base_freq: f32,
    operators: [Operator; NUM_OPERATORS],
    graph: OperatorGraph,
    state: VoiceState,
    /// Live multiplier on every edge depth, driven by FM-index modulation.
    depth_scale: f32,
}

impl Voice {
    /// Builds and triggers a voice.
    ///
    /// The graph is compiled before any operator runs, so the first rendered
    /// sample already sees the full wiring.
    pub(crate) fn start(
        id: u64,
        note: u8,
        velocity: u8,
        start_time: f64,
        algorithm: Algorithm,
        params: &[OperatorParams; NUM_OPERATORS],
        sample_rate: f32,
    ) -> Self {
        let base_freq = midi_to_freq(note);
        let graph = OperatorGraph::build(algorithm, params, base_freq);

        let mut operators = operator_bank(sample_rate);
        for (op, p) in operators.iter_mut().zip(params.iter()) {
            op.set_params(*p);
            op.trigger(base_freq, velocity);
        }

        Self {
            id,
            note,
            velocity,
            start_time,
            base_freq,
            operators,
            graph,
            state: VoiceState::Triggered,
            depth_scale: 1.0,
        }
    }

    /// Scales every modulation edge's depth without touching the graph.
    ///
    /// Driven at control rate by FM-index modulation; 1.0 is the compiled
    /// depth.
    pub fn set_depth_scale(&mut self, scale: f32) {
        self.depth_scale = scale.max(0.0);
    }

    /// Unique, never-reused voice id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// MIDI note this voice is playing.
    #[must_use]
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Trigger velocity.
    #[must_use]
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Engine time at which the voice was allocated.
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Recompiles the wiring for a new topology.
    ///
    /// The old graph is replaced in one assignment; no sample is ever
    /// rendered against a half-rewired voice.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        let params: [OperatorParams; NUM_OPERATORS] =
            core::array::from_fn(|i| self.operators[i].params());
        self.graph = OperatorGraph::build(algorithm, &params, self.base_freq);
    }

    /// Applies a full parameter set to one operator and recompiles the graph,
    /// since modulation depth depends on operator level.
    pub fn set_operator_params(&mut self, index: usize, params: OperatorParams) {
        if index >= NUM_OPERATORS {
            return;
        }
        self.operators[index].set_params(params);
        self.set_algorithm(self.graph.algorithm());
    }

    /// Moves the voice into its release tail.
    ///
    /// Returns the time at which the tail is guaranteed silent, for disposal
    /// scheduling. The exponential release reaches the envelope idle
    /// threshold (1e-4) after ln(1e4) ≈ 9.2 time constants, so the due time
    /// is a backstop at ten; in practice the tail self-frees earlier.
    pub fn release(&mut self, now: f64) -> f64 {
        self.state = VoiceState::Releasing;
        let mut longest = 0.0f32;
        for op in &mut self.operators {
            longest = longest.max(op.params().release);
            op.release();
        }
        now + f64::from(longest) * RELEASE_TAIL_FACTOR
    }

    /// Silences the voice immediately, skipping the release tail.
    pub fn kill(&mut self) {
        self.state = VoiceState::Freed;
        for op in &mut self.operators {
            op.kill();
        }
    }

    /// Renders one mono sample.
    ///
    /// Operators are evaluated from index 3 down to 0; every topology wires
    /// higher indices into lower ones, so each modulator's output for this
    /// sample exists before its carrier reads it. Carrier outputs are scaled
    /// by their level and normalized by carrier count.
    #[inline]
    pub fn process(&mut self) -> f32 {
        if self.state == VoiceState::Freed {
            return 0.0;
        }

        let mut outputs = [0.0f32; NUM_OPERATORS];
        for op_idx in (0..NUM_OPERATORS).rev() {
            let mut offset_hz = 0.0;
            for edge in self.graph.modulators_of(op_idx) {
                offset_hz += outputs[edge.source] * edge.depth_hz * self.depth_scale;
            }
            outputs[op_idx] = self.operators[op_idx].advance(offset_hz);
        }

        let carrier_count = self.graph.carrier_count();
        if carrier_count == 0 {
            return 0.0;
        }

        let mut mix = 0.0;
        for (op_idx, out) in outputs.iter().enumerate() {
            if self.graph.is_carrier(op_idx) {
                mix += out * (self.operators[op_idx].params().level / 100.0);
            }
        }
        mix /= carrier_count as f32;

        // A release tail whose envelopes have all gone idle frees itself
        // even before the scheduled disposal fires.
        if self.state == VoiceState::Releasing
            && self.operators.iter().all(|op| !op.is_active())
        {
            self.state = VoiceState::Freed;
        }

        mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn default_params() -> [OperatorParams; NUM_OPERATORS] {
        core::array::from_fn(|_| OperatorParams::default())
    }

    #[test]
    fn midi_note_frequencies() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_freq(57) - 220.0).abs() < 1e-3);
        assert!((midi_to_freq(60) - 261.6256).abs() < 1e-2);
    }

    #[test]
    fn triggered_voice_produces_audio() {
        let mut v = Voice::start(1, 60, 100, 0.0, Algorithm::Serial, &default_params(), SR);
        let mut peak = 0.0f32;
        for _ in 0..4800 {
            peak = peak.max(v.process().abs());
        }
        assert!(peak > 0.01);
        assert_eq!(v.state(), VoiceState::Triggered);
    }

    #[test]
    fn output_stays_bounded_in_every_topology() {
        for alg in [
            Algorithm::Serial,
            Algorithm::Parallel,
            Algorithm::DualSerial,
            Algorithm::FanOut,
            Algorithm::Split,
        ] {
            let mut v = Voice::start(1, 72, 127, 0.0, alg, &default_params(), SR);
            for _ in 0..9600 {
                let s = v.process();
                assert!(s.abs() <= 1.5, "{alg:?} produced {s}");
            }
        }
    }

    #[test]
    fn release_tail_frees_itself() {
        let mut params = default_params();
        for p in &mut params {
            p.release = 0.01;
        }
        let mut v = Voice::start(1, 60, 100, 0.0, Algorithm::Parallel, &params, SR);
        for _ in 0..4800 {
            v.process();
        }
        let due = v.release(0.1);
        assert!(due > 0.1);
        assert_eq!(v.state(), VoiceState::Releasing);
        for _ in 0..(SR as usize) {
            v.process();
        }
        assert_eq!(v.state(), VoiceState::Freed);
        assert_eq!(v.process(), 0.0);
    }

    #[test]
    fn due_time_outlasts_the_audible_tail() {
        let mut params = default_params();
        for p in &mut params {
            p.release = 0.1;
        }
        let mut v = Voice::start(1, 60, 100, 0.0, Algorithm::Parallel, &params, SR);
        for _ in 0..4800 {
            v.process();
        }
        let due = v.release(0.0);
        // By the scheduled disposal time the tail has decayed to silence;
        // measure the peak over the final stretch before it.
        let total = (due * f64::from(SR)) as usize;
        let window = (SR * 0.05) as usize;
        let mut peak = 0.0f32;
        for i in 0..total {
            let s = v.process().abs();
            if i >= total - window {
                peak = peak.max(s);
            }
        }
        assert!(peak < 1e-3, "tail still audible at disposal time: {peak}");
    }

    #[test]
    fn algorithm_change_rewires_live_voice() {
        let mut v = Voice::start(1, 60, 100, 0.0, Algorithm::Serial, &default_params(), SR);
        for _ in 0..480 {
            v.process();
        }
        v.set_algorithm(Algorithm::Parallel);
        // Still sounding, now as four plain carriers.
        let mut peak = 0.0f32;
        for _ in 0..4800 {
            peak = peak.max(v.process().abs());
        }
        assert!(peak > 0.01);
    }

    #[test]
    fn kill_is_immediate() {
        let mut v = Voice::start(1, 60, 100, 0.0, Algorithm::Serial, &default_params(), SR);
        for _ in 0..480 {
            v.process();
        }
        v.kill();
        assert_eq!(v.state(), VoiceState::Freed);
        assert_eq!(v.process(), 0.0);
    }
}
