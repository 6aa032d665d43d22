//! Property-based tests for timbre-core modulation primitives.
//!
//! Uses proptest to check waveform ranges, LFO phase behavior, and
//! envelope bounds over randomized parameters.

use proptest::prelude::*;
use timbre_core::{AdsrEnvelope, Lfo, LfoRate, NoteDivision, Waveform};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// All deterministic waveforms stay in [-1, 1] for any phase.
    #[test]
    fn waveform_output_in_range(phase in -10.0f32..10.0f32, variant in 0usize..4) {
        let waveform = match variant {
            0 => Waveform::Sine,
            1 => Waveform::Square,
            2 => Waveform::Saw,
            _ => Waveform::Triangle,
        };
        let value = waveform.sample(phase);
        prop_assert!(
            (-1.0..=1.0).contains(&value),
            "{:?} at phase {} out of range: {}",
            waveform, phase, value
        );
    }

    /// LFO output magnitude never exceeds its depth, and phase stays
    /// in [0, 1) across arbitrary tick cadences.
    #[test]
    fn lfo_bounded_by_depth(
        rate in 0.05f32..30.0f32,
        depth in 0.0f32..2.0f32,
        offset_deg in 0.0f32..360.0f32,
        variant in 0usize..4,
        steps in prop::collection::vec(0.0f64..0.3f64, 1..64),
    ) {
        let waveform = match variant {
            0 => Waveform::Sine,
            1 => Waveform::Square,
            2 => Waveform::Saw,
            _ => Waveform::Triangle,
        };
        let mut lfo = Lfo::new(LfoRate::Hertz(rate));
        lfo.set_waveform(waveform);
        lfo.set_depth(depth);
        lfo.set_phase_degrees(offset_deg);

        let mut now = 0.0f64;
        for dt in steps {
            now += dt;
            lfo.tick(now, 120.0);
            prop_assert!(lfo.value().abs() <= depth + 1e-5);
            prop_assert!((0.0..1.0).contains(&lfo.phase()));
        }
    }

    /// Synced LFO rate matches (bpm / 60) / beats for any tempo.
    #[test]
    fn synced_rate_formula(bpm in 20.0f32..300.0f32, variant in 0usize..6) {
        let division = match variant {
            0 => NoteDivision::Sixteenth,
            1 => NoteDivision::Eighth,
            2 => NoteDivision::Quarter,
            3 => NoteDivision::Half,
            4 => NoteDivision::Whole,
            _ => NoteDivision::EightBars,
        };
        let expected = (bpm / 60.0) / division.beats();
        let actual = LfoRate::Synced(division).to_hz(bpm);
        prop_assert!((actual - expected).abs() < 1e-4 * expected.max(1.0));
    }

    /// ADSR output stays within [0, 1] through a full gate cycle for any
    /// valid parameter set.
    #[test]
    fn adsr_bounded(
        attack in 0.001f32..0.2f32,
        decay in 0.001f32..0.2f32,
        sustain in 0.0f32..1.0f32,
        release in 0.001f32..0.2f32,
    ) {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_attack(attack);
        env.set_decay(decay);
        env.set_sustain(sustain);
        env.set_release(release);

        env.gate_on();
        for _ in 0..4800 {
            let level = env.advance();
            prop_assert!((0.0..=1.01).contains(&level));
        }
        env.gate_off();
        for _ in 0..24000 {
            let level = env.advance();
            prop_assert!((0.0..=1.0).contains(&level));
        }
    }
}
