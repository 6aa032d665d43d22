//! Property-based tests for the FM wiring and voice allocation.
//!
//! Uses proptest to check the depth formula and the modulator ordering
//! invariant across all topologies, and the steal policy over randomized
//! allocation times.

use proptest::prelude::*;
use timbre_synth::{
    Algorithm, FM_INDEX_SCALE, NUM_OPERATORS, OperatorGraph, OperatorParams, VoicePool,
    midi_to_freq,
};

fn algorithm_from(variant: usize) -> Algorithm {
    match variant {
        0 => Algorithm::Serial,
        1 => Algorithm::Parallel,
        2 => Algorithm::DualSerial,
        3 => Algorithm::FanOut,
        _ => Algorithm::Split,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every compiled edge's depth is `base_freq * (level / 100) *
    /// FM_INDEX_SCALE`, for any note, any levels, any topology; and every
    /// edge runs from a higher-indexed operator into a lower one.
    #[test]
    fn edge_depth_tracks_note_and_level(
        note in 21u8..109,
        levels in prop::collection::vec(0.0f32..=100.0, NUM_OPERATORS),
        variant in 0usize..5,
    ) {
        let mut params: [OperatorParams; NUM_OPERATORS] =
            core::array::from_fn(|_| OperatorParams::default());
        for (p, level) in params.iter_mut().zip(&levels) {
            p.level = *level;
        }
        let base_freq = midi_to_freq(note);
        let graph = OperatorGraph::build(algorithm_from(variant), &params, base_freq);

        for op in 0..NUM_OPERATORS {
            for edge in graph.modulators_of(op) {
                prop_assert!(edge.source > op, "edge {} -> {} runs downward", edge.source, op);
                let expected = base_freq * (params[edge.source].level / 100.0) * FM_INDEX_SCALE;
                prop_assert_eq!(edge.depth_hz, expected);
            }
        }
    }

    /// At the cap, stealing always evicts the voice with the earliest
    /// start time, regardless of allocation order, and never exceeds the
    /// cap.
    #[test]
    fn steal_evicts_earliest_start_time(
        times in prop::collection::vec(0.0f64..100.0, 4),
        notes in prop::collection::vec(40u8..90, 5),
    ) {
        let params: [OperatorParams; NUM_OPERATORS] =
            core::array::from_fn(|_| OperatorParams::default());
        let mut pool = VoicePool::new(4, 48000.0);

        let mut allocated: Vec<(u64, f64)> = Vec::new();
        for (note, now) in notes.iter().zip(&times) {
            let (id, stolen) = pool.allocate(*note, 100, *now, Algorithm::Serial, &params);
            prop_assert_eq!(stolen, None);
            allocated.push((id, *now));
        }

        // Earliest start time wins; on ties, earliest allocation.
        let mut expected = allocated[0];
        for &(id, t) in &allocated[1..] {
            if t < expected.1 {
                expected = (id, t);
            }
        }

        let (_, stolen) = pool.allocate(notes[4], 100, 101.0, Algorithm::Serial, &params);
        prop_assert_eq!(stolen, Some(expected.0));
        prop_assert_eq!(pool.active_count(), 4);
    }
}
