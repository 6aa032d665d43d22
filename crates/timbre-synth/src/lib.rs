//! Timbre Synth - A polyphonic four-operator FM synthesis engine.
//!
//! This crate is the heart of timbre: voices built from four FM operators
//! wired by a small set of fixed topologies, a bounded voice pool with
//! least-recently-acquired stealing, and a modulation router that patches
//! LFOs and an envelope follower into synth and effect parameters.
//!
//! # Quick Start
//!
//! ```rust
//! use timbre_synth::{Engine, Preset};
//!
//! let mut engine = Engine::new(48000.0);
//! engine.load_preset(&Preset::default());
//!
//! engine.tick(0.0);
//! engine.note_on(60, 100);
//!
//! let mut block = [0.0f32; 256];
//! engine.process_block(&mut block);
//!
//! engine.note_off(60);
//! ```
//!
//! # Components
//!
//! - [`Operator`] / [`OperatorParams`] - one sine oscillator with its own
//!   ADSR envelope, level, tuning ratio, and feedback
//! - [`Algorithm`] / [`OperatorGraph`] - the five operator wiring
//!   topologies, compiled per voice with depths in Hz
//! - [`Voice`] / [`VoicePool`] - sounding notes and their allocation
//! - [`ModulationRouter`] / [`ModTarget`] / [`ModSource`] - connection
//!   table from LFOs and the envelope follower into parameters
//! - [`DisposalQueue`] - cancellable reclamation of release tails
//! - [`Engine`] - the composition root tying all of the above to a
//!   [`timbre_core::Transport`]
//!
//! # Features
//!
//! - `std` (default) - standard library support
//! - `serde` - `Serialize`/`Deserialize` on [`Preset`] and the parameter
//!   types, for persistence in `timbre-config`
//! - `tracing` - structured log events on preset loads and fallbacks
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default
//! `std` feature:
//!
//! ```toml
//! timbre-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod algorithm;
pub mod engine;
pub mod operator;
pub mod pool;
pub mod preset;
pub mod router;
pub mod scheduler;
pub mod voice;

pub use algorithm::{Algorithm, FM_INDEX_SCALE, ModEdge, NUM_OPERATORS, OperatorGraph};
pub use engine::{Engine, EngineState};
pub use operator::{Operator, OperatorParams};
pub use pool::{DEFAULT_MAX_VOICES, ReleaseHook, VoicePool};
pub use preset::{EffectParams, LfoParams, Preset};
pub use router::{
    MAX_CONNECTIONS, ModConnection, ModSource, ModTarget, ModulationRouter, NUM_LFOS,
    SourceValues,
};
pub use scheduler::DisposalQueue;
pub use voice::{Voice, VoiceState, midi_to_freq};

// Re-export the control-rate primitives so engine users need only one crate.
pub use timbre_core::{Lfo, LfoBank, LfoRate, NoteDivision, Transport, TransportState, Waveform};
