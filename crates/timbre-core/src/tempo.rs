//! Musical time: note divisions and the transport clock.
//!
//! The transport is the clock service consumed by the engine: it exposes
//! the current time in seconds and the current tempo, which tempo-synced
//! LFOs derive their rate from.

/// Musical note divisions for tempo sync, 1/32 through 8 bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoteDivision {
    /// Thirty-second note (1/8 beat)
    ThirtySecond,
    /// Sixteenth note (1/4 beat)
    Sixteenth,
    /// Eighth note (1/2 beat)
    Eighth,
    /// Quarter note (1 beat)
    #[default]
    Quarter,
    /// Half note (2 beats)
    Half,
    /// Whole note / one bar in 4/4 (4 beats)
    Whole,
    /// Two bars (8 beats)
    TwoBars,
    /// Four bars (16 beats)
    FourBars,
    /// Eight bars (32 beats)
    EightBars,
    /// Dotted quarter note (1.5 beats)
    DottedQuarter,
    /// Dotted eighth note (3/4 beat)
    DottedEighth,
    /// Triplet quarter note (2/3 beat)
    TripletQuarter,
    /// Triplet eighth note (1/3 beat)
    TripletEighth,
}

impl NoteDivision {
    /// Number of beats this division spans.
    pub fn beats(self) -> f32 {
        match self {
            NoteDivision::ThirtySecond => 0.125,
            NoteDivision::Sixteenth => 0.25,
            NoteDivision::Eighth => 0.5,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Half => 2.0,
            NoteDivision::Whole => 4.0,
            NoteDivision::TwoBars => 8.0,
            NoteDivision::FourBars => 16.0,
            NoteDivision::EightBars => 32.0,
            NoteDivision::DottedQuarter => 1.5,
            NoteDivision::DottedEighth => 0.75,
            NoteDivision::TripletQuarter => 2.0 / 3.0,
            NoteDivision::TripletEighth => 1.0 / 3.0,
        }
    }

    /// One cycle per division, as a frequency in Hz at the given tempo.
    ///
    /// # Example
    ///
    /// ```rust
    /// use timbre_core::NoteDivision;
    ///
    /// // At 120 BPM a quarter note cycles at 2 Hz
    /// assert!((NoteDivision::Quarter.to_hz(120.0) - 2.0).abs() < 0.001);
    /// ```
    pub fn to_hz(self, bpm: f32) -> f32 {
        let beats_per_second = bpm.max(1.0) / 60.0;
        beats_per_second / self.beats()
    }

    /// Duration of the division in seconds at the given tempo.
    pub fn to_seconds(self, bpm: f32) -> f32 {
        self.beats() * 60.0 / bpm.max(1.0)
    }

    /// Parse a division from its config name (e.g. `"1/16"`, `"4bars"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "1/32" => Some(NoteDivision::ThirtySecond),
            "1/16" => Some(NoteDivision::Sixteenth),
            "1/8" => Some(NoteDivision::Eighth),
            "1/4" => Some(NoteDivision::Quarter),
            "1/2" => Some(NoteDivision::Half),
            "1bar" | "1/1" => Some(NoteDivision::Whole),
            "2bars" => Some(NoteDivision::TwoBars),
            "4bars" => Some(NoteDivision::FourBars),
            "8bars" => Some(NoteDivision::EightBars),
            "1/4." => Some(NoteDivision::DottedQuarter),
            "1/8." => Some(NoteDivision::DottedEighth),
            "1/4t" => Some(NoteDivision::TripletQuarter),
            "1/8t" => Some(NoteDivision::TripletEighth),
            _ => None,
        }
    }

    /// Config name of this division.
    pub fn name(self) -> &'static str {
        match self {
            NoteDivision::ThirtySecond => "1/32",
            NoteDivision::Sixteenth => "1/16",
            NoteDivision::Eighth => "1/8",
            NoteDivision::Quarter => "1/4",
            NoteDivision::Half => "1/2",
            NoteDivision::Whole => "1bar",
            NoteDivision::TwoBars => "2bars",
            NoteDivision::FourBars => "4bars",
            NoteDivision::EightBars => "8bars",
            NoteDivision::DottedQuarter => "1/4.",
            NoteDivision::DottedEighth => "1/8.",
            NoteDivision::TripletQuarter => "1/4t",
            NoteDivision::TripletEighth => "1/8t",
        }
    }
}

/// Transport run state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    /// Time does not advance.
    #[default]
    Stopped,
    /// Time advances on each `advance` call.
    Playing,
}

/// Clock and tempo service.
///
/// The host advances the transport (from its render cadence or audio
/// callback); the engine reads `now()` to tick LFOs and schedule voice
/// disposal, and `bpm()` for tempo-synced rates.
///
/// # Example
///
/// ```rust
/// use timbre_core::{Transport, NoteDivision};
///
/// let mut transport = Transport::new(120.0);
/// transport.play();
/// transport.advance(0.5);
/// assert!((transport.now() - 0.5).abs() < 1e-9);
/// assert!((transport.division_to_hz(NoteDivision::Eighth) - 4.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone)]
pub struct Transport {
    bpm: f32,
    /// Current time in seconds
    time: f64,
    state: TransportState,
}

impl Transport {
    /// Create a stopped transport at the given tempo.
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm: bpm.max(1.0),
            time: 0.0,
            state: TransportState::Stopped,
        }
    }

    /// Set the tempo in BPM (clamped to at least 1).
    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = bpm.max(1.0);
    }

    /// Current tempo in BPM.
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Start the transport.
    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    /// Stop the transport.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }

    /// Current run state.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Whether the transport is playing.
    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    /// Reset time to zero.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /// Advance by `dt` seconds. Only advances while playing.
    pub fn advance(&mut self, dt: f64) {
        if self.state == TransportState::Playing {
            self.time += dt.max(0.0);
        }
    }

    /// Current time in seconds.
    pub fn now(&self) -> f64 {
        self.time
    }

    /// Current position in beats.
    pub fn beat_position(&self) -> f64 {
        self.time * f64::from(self.bpm) / 60.0
    }

    /// LFO frequency for a note division at the current tempo.
    pub fn division_to_hz(&self, division: NoteDivision) -> f32 {
        division.to_hz(self.bpm)
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(120.0)
    }
}
