//! Factory presets.
//!
//! A small set of patches covering each topology family, used as starting
//! points and as known-good fixtures.

use timbre_synth::{
    Algorithm, LfoParams, LfoRate, ModTarget, NoteDivision, OperatorParams, Preset, Waveform,
};

/// Names of every factory preset, in menu order.
pub const FACTORY_PRESET_NAMES: &[&str] = &["Init", "Glass Keys", "Growl Bass", "Slow Pad"];

/// Returns a factory preset by name, or `None` for unknown names.
#[must_use]
pub fn factory_preset(name: &str) -> Option<Preset> {
    match name {
        "Init" => Some(Preset::default()),
        "Glass Keys" => Some(glass_keys()),
        "Growl Bass" => Some(growl_bass()),
        "Slow Pad" => Some(slow_pad()),
        _ => None,
    }
}

/// All factory presets, in menu order.
#[must_use]
pub fn all_factory_presets() -> Vec<Preset> {
    FACTORY_PRESET_NAMES
        .iter()
        .filter_map(|name| factory_preset(name))
        .collect()
}

fn op(ratio: f32, level: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> OperatorParams {
    OperatorParams {
        ratio,
        level,
        attack,
        decay,
        sustain,
        release,
        feedback: 0.0,
    }
}

/// Bell-like keys: two carrier/modulator pairs with fast decays and a
/// tremolo LFO on the output level.
fn glass_keys() -> Preset {
    Preset {
        name: "Glass Keys".into(),
        operators: [
            op(1.0, 85.0, 0.003, 1.2, 0.2, 0.8),
            op(3.5, 35.0, 0.003, 0.6, 0.0, 0.4),
            op(1.0, 70.0, 0.003, 1.5, 0.3, 0.9),
            op(7.0, 20.0, 0.003, 0.3, 0.0, 0.3),
        ],
        algorithm: Algorithm::DualSerial,
        lfos: vec![LfoParams {
            waveform: Waveform::Sine,
            rate: LfoRate::Hertz(4.5),
            depth: 0.3,
            phase_degrees: 0.0,
            destination: ModTarget::MasterVolume,
            amount: 0.15,
        }],
        master_volume: 0.8,
        ..Preset::default()
    }
}

/// Aggressive bass: a deep serial stack with feedback on the top modulator
/// and a tempo-synced filter wobble.
fn growl_bass() -> Preset {
    let mut operators = [
        op(0.5, 95.0, 0.005, 0.2, 0.9, 0.15),
        op(1.0, 60.0, 0.005, 0.15, 0.6, 0.1),
        op(2.0, 45.0, 0.005, 0.1, 0.4, 0.1),
        op(3.0, 40.0, 0.005, 0.1, 0.3, 0.1),
    ];
    operators[3].feedback = 0.4;
    Preset {
        name: "Growl Bass".into(),
        operators,
        algorithm: Algorithm::Serial,
        lfos: vec![LfoParams {
            waveform: Waveform::Saw,
            rate: LfoRate::Synced(NoteDivision::Eighth),
            depth: 1.0,
            phase_degrees: 0.0,
            destination: ModTarget::FilterCutoff,
            amount: -0.4,
        }],
        master_volume: 0.75,
        ..Preset::default()
    }
}

/// Slow evolving pad: fan-out with long envelopes and two slow LFOs.
fn slow_pad() -> Preset {
    Preset {
        name: "Slow Pad".into(),
        operators: [
            op(1.0, 70.0, 1.5, 2.0, 0.8, 2.5),
            op(2.0, 55.0, 1.8, 2.0, 0.7, 2.5),
            op(2.005, 55.0, 2.0, 2.0, 0.7, 2.5),
            op(0.5, 30.0, 1.0, 1.5, 0.5, 2.0),
        ],
        algorithm: Algorithm::FanOut,
        lfos: vec![
            LfoParams {
                waveform: Waveform::Triangle,
                rate: LfoRate::Hertz(0.12),
                depth: 0.8,
                phase_degrees: 0.0,
                destination: ModTarget::FilterCutoff,
                amount: 0.3,
            },
            LfoParams {
                waveform: Waveform::Sine,
                rate: LfoRate::Hertz(0.09),
                depth: 0.6,
                phase_degrees: 90.0,
                destination: ModTarget::StereoSpread,
                amount: 0.5,
            },
        ],
        master_volume: 0.7,
        ..Preset::default()
    }
}
