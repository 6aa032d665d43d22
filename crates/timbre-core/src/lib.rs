//! Timbre Core - modulation primitives for the timbre FM synthesizer
//!
//! This crate provides the control-rate building blocks the synthesis
//! engine is assembled from: waveform generation, low-frequency
//! oscillators with tempo sync, ADSR envelopes, an envelope follower,
//! and musical-time utilities.
//!
//! # Core Components
//!
//! ## Waveforms
//!
//! - [`Waveform`] - Closed set of generator shapes (Sine, Square, Saw,
//!   Triangle, Random)
//!
//! ```rust
//! use timbre_core::Waveform;
//!
//! // Pure phase -> value mapping for the deterministic shapes
//! let v = Waveform::Saw.sample(0.75);
//! assert!((v - 0.5).abs() < 1e-6);
//! ```
//!
//! ## LFOs
//!
//! - [`Lfo`] - Time-driven low-frequency oscillator with depth, phase
//!   offset, and Hz or tempo-synced rate
//! - [`LfoBank`] - Fixed set of independent LFOs
//! - [`LfoRate`] - Free-running Hertz or musical [`NoteDivision`]
//!
//! ```rust
//! use timbre_core::{Lfo, LfoRate, Waveform};
//!
//! let mut lfo = Lfo::new(LfoRate::Hertz(2.0));
//! lfo.set_waveform(Waveform::Triangle);
//! lfo.tick(0.0, 120.0);
//! lfo.tick(0.125, 120.0); // quarter cycle at 2 Hz
//! assert!((lfo.phase() - 0.25).abs() < 1e-5);
//! ```
//!
//! ## Envelopes
//!
//! - [`AdsrEnvelope`] - Attack-Decay-Sustain-Release generator
//! - [`EnvelopeFollower`] - Amplitude tracker usable as a modulation source
//!
//! ## Musical Time
//!
//! - [`NoteDivision`] - Musical fractions from 1/32 through 8 bars
//! - [`Transport`] - Wall-clock plus tempo service for synced LFOs
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! timbre-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod follower;
pub mod lfo;
pub mod tempo;
pub mod waveform;

// Re-export main types at crate root
pub use envelope::{AdsrEnvelope, EnvelopeStage};
pub use follower::EnvelopeFollower;
pub use lfo::{Lfo, LfoBank, LfoRate, MAX_TABLE_LEN};
pub use tempo::{NoteDivision, Transport, TransportState};
pub use waveform::Waveform;
