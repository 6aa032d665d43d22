//! Low-frequency oscillators for modulation routing.
//!
//! LFOs here run at control rate: the engine ticks them from wall-clock
//! time rather than per audio sample. Each LFO has a waveform, a rate in
//! Hz or a tempo-synced musical division, a depth, and a phase offset.

use libm::{floorf, sinf};

use crate::tempo::NoteDivision;
use crate::waveform::{Waveform, wrap_phase};

/// Maximum length of a user-supplied custom waveform table.
pub const MAX_TABLE_LEN: usize = 64;

/// LFO rate: free-running Hertz or a musical division of the tempo.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LfoRate {
    /// Cycles per second, independent of tempo.
    Hertz(f32),
    /// One cycle per musical division at the current tempo.
    Synced(NoteDivision),
}

impl Default for LfoRate {
    fn default() -> Self {
        LfoRate::Hertz(1.0)
    }
}

impl LfoRate {
    /// Effective rate in Hz at the given tempo.
    ///
    /// For a synced rate this is `(bpm / 60) / beats-per-division`, so a
    /// quarter-note LFO at 120 BPM runs at 2 Hz.
    pub fn to_hz(self, bpm: f32) -> f32 {
        match self {
            LfoRate::Hertz(hz) => hz.max(0.0),
            LfoRate::Synced(division) => division.to_hz(bpm),
        }
    }

    fn is_synced(self) -> bool {
        matches!(self, LfoRate::Synced(_))
    }
}

/// Time-driven low-frequency oscillator.
///
/// Phase accumulates `elapsed * rate` and wraps continuously modulo one
/// cycle, so rate changes never cause a phase jump. The output is
/// `waveform(phase + offset) * depth` with depth in `[0, 2]` (0-200%).
///
/// Two documented policies:
/// - Changing the waveform does not reset phase.
/// - Toggling between free-running and tempo-synced rate restarts phase
///   at 0, so a synced LFO re-anchors to the grid.
///
/// # Example
///
/// ```rust
/// use timbre_core::{Lfo, LfoRate, Waveform};
///
/// let mut lfo = Lfo::new(LfoRate::Hertz(2.0));
/// lfo.set_waveform(Waveform::Sine);
/// lfo.set_depth(1.0);
///
/// lfo.tick(0.0, 120.0);
/// assert_eq!(lfo.value(), 0.0); // sine at phase 0
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    rate: LfoRate,
    waveform: Waveform,
    /// Output scale, 0.0 to 2.0 (0-200%)
    depth: f32,
    /// Phase offset as a cycle fraction [0, 1)
    phase_offset: f32,
    /// Accumulated phase [0, 1)
    phase: f32,
    /// Previous accumulated phase (for wrap detection)
    prev_phase: f32,
    /// Timestamp of the last tick, None before the first
    last_time: Option<f64>,
    /// Held value for the Random waveform
    sh_value: f32,
    /// Custom table (overrides the waveform when non-empty)
    table: [f32; MAX_TABLE_LEN],
    table_len: usize,
    /// Current output value
    value: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(LfoRate::default())
    }
}

impl Lfo {
    /// Create a new LFO with the given rate, sine waveform, full depth.
    pub fn new(rate: LfoRate) -> Self {
        Self {
            rate,
            waveform: Waveform::Sine,
            depth: 1.0,
            phase_offset: 0.0,
            phase: 0.0,
            prev_phase: 0.0,
            last_time: None,
            sh_value: 0.0,
            table: [0.0; MAX_TABLE_LEN],
            table_len: 0,
            value: 0.0,
        }
    }

    /// Set the rate. Toggling between Hertz and Synced restarts phase at 0.
    pub fn set_rate(&mut self, rate: LfoRate) {
        if rate.is_synced() != self.rate.is_synced() {
            self.phase = 0.0;
            self.prev_phase = 0.0;
        }
        self.rate = rate;
    }

    /// Get the current rate.
    pub fn rate(&self) -> LfoRate {
        self.rate
    }

    /// Set the waveform. Phase is preserved.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Get the current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set depth, clamped to `[0, 2]` (0-200%).
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 2.0);
    }

    /// Get the depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Set the phase offset in degrees `[0, 360)`.
    pub fn set_phase_degrees(&mut self, degrees: f32) {
        let wrapped = degrees - 360.0 * floorf(degrees / 360.0);
        self.phase_offset = wrapped / 360.0;
    }

    /// Get the phase offset in degrees.
    pub fn phase_degrees(&self) -> f32 {
        self.phase_offset * 360.0
    }

    /// Install a custom waveform table, read with linear interpolation.
    ///
    /// The table overrides the waveform shape. Longer slices are
    /// truncated to [`MAX_TABLE_LEN`]; an empty slice removes the table.
    pub fn set_table(&mut self, samples: &[f32]) {
        let len = samples.len().min(MAX_TABLE_LEN);
        for (slot, &s) in self.table.iter_mut().zip(samples.iter().take(len)) {
            *slot = s.clamp(-1.0, 1.0);
        }
        self.table_len = len;
    }

    /// Remove the custom table and return to the waveform shape.
    pub fn clear_table(&mut self) {
        self.table_len = 0;
    }

    /// Reset phase and timing state.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.prev_phase = 0.0;
        self.last_time = None;
        self.value = self.raw_value() * self.depth;
    }

    /// Current accumulated phase `[0, 1)`, before the offset.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Current output value, as of the last tick.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance the LFO to wall-clock time `now` (seconds) at `bpm`.
    ///
    /// Elapsed time is measured from the previous tick, so irregular tick
    /// cadences and rate changes keep the phase continuous.
    pub fn tick(&mut self, now: f64, bpm: f32) {
        let elapsed = match self.last_time {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);

        self.prev_phase = self.phase;
        self.phase = wrap_phase(self.phase + elapsed * self.rate.to_hz(bpm));

        // New held value each time the accumulated phase wraps
        if self.waveform == Waveform::Random && self.phase < self.prev_phase {
            let x = sinf(self.phase * 12345.6789 + self.sh_value) * 43758.5453;
            self.sh_value = (x - floorf(x)) * 2.0 - 1.0;
        }

        self.value = self.raw_value() * self.depth;
    }

    fn raw_value(&self) -> f32 {
        let read_phase = wrap_phase(self.phase + self.phase_offset);
        if self.table_len > 0 {
            self.table_value(read_phase)
        } else if self.waveform == Waveform::Random {
            self.sh_value
        } else {
            self.waveform.sample(read_phase)
        }
    }

    fn table_value(&self, phase: f32) -> f32 {
        let len = self.table_len;
        let pos = phase * len as f32;
        let idx = (pos as usize).min(len - 1);
        let next = (idx + 1) % len;
        let frac = pos - idx as f32;
        self.table[idx] * (1.0 - frac) + self.table[next] * frac
    }
}

/// A fixed bank of independent LFOs.
///
/// Created once at engine init and mutated through parameter updates for
/// the engine's lifetime.
#[derive(Debug, Clone)]
pub struct LfoBank<const N: usize> {
    lfos: [Lfo; N],
}

impl<const N: usize> Default for LfoBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LfoBank<N> {
    /// Create a bank of default LFOs.
    pub fn new() -> Self {
        Self {
            lfos: core::array::from_fn(|_| Lfo::default()),
        }
    }

    /// Number of LFOs in the bank.
    pub fn len(&self) -> usize {
        N
    }

    /// Whether the bank is empty (only for a zero-sized bank).
    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Get an LFO by index.
    pub fn get(&self, index: usize) -> Option<&Lfo> {
        self.lfos.get(index)
    }

    /// Get a mutable LFO by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Lfo> {
        self.lfos.get_mut(index)
    }

    /// Current value of an LFO, `0.0` for an out-of-range index.
    pub fn value(&self, index: usize) -> f32 {
        self.lfos.get(index).map_or(0.0, Lfo::value)
    }

    /// Advance every LFO in the bank.
    pub fn tick_all(&mut self, now: f64, bpm: f32) {
        for lfo in &mut self.lfos {
            lfo.tick(now, bpm);
        }
    }

    /// Iterate over the LFOs.
    pub fn iter(&self) -> impl Iterator<Item = &Lfo> {
        self.lfos.iter()
    }
}
