//! ADSR envelope generator.
//!
//! Exponential attack-decay-sustain-release segments for shaping operator
//! amplitude. Times are in seconds, matching preset parameters.

use libm::expf;

/// ADSR envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Envelope is inactive, output is zero.
    #[default]
    Idle,
    /// Output ramps up toward peak level.
    Attack,
    /// Output falls from peak toward the sustain level.
    Decay,
    /// Output holds at the sustain level while the gate is held.
    Sustain,
    /// Output decays to zero after gate release.
    Release,
}

/// ADSR envelope generator with exponential curves.
///
/// # Example
///
/// ```rust
/// use timbre_core::AdsrEnvelope;
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_attack(0.01);
/// env.set_decay(0.1);
/// env.set_sustain(0.7);
/// env.set_release(0.2);
///
/// env.gate_on();
/// let level = env.advance();
/// env.gate_off();
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    stage: EnvelopeStage,
    level: f32,
    sample_rate: f32,

    // Times in seconds
    attack_s: f32,
    decay_s: f32,
    release_s: f32,
    sustain: f32,

    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,

    /// Attack aims past 1.0 for a snappier curve
    attack_target: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create an envelope with 10ms attack, 100ms decay, 0.7 sustain,
    /// 200ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            sample_rate,
            attack_s: 0.01,
            decay_s: 0.1,
            release_s: 0.2,
            sustain: 0.7,
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
            attack_target: 1.2,
        };
        env.recalculate_coefficients();
        env
    }

    /// Set attack time in seconds (> 0).
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_s = seconds.max(1e-4);
        self.attack_coeff = Self::coeff(self.attack_s, self.sample_rate);
    }

    /// Get attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack_s
    }

    /// Set decay time in seconds (> 0).
    pub fn set_decay(&mut self, seconds: f32) {
        self.decay_s = seconds.max(1e-4);
        self.decay_coeff = Self::coeff(self.decay_s, self.sample_rate);
    }

    /// Get decay time in seconds.
    pub fn decay(&self) -> f32 {
        self.decay_s
    }

    /// Set sustain level (0.0 to 1.0).
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Get sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in seconds (> 0).
    pub fn set_release(&mut self, seconds: f32) {
        self.release_s = seconds.max(1e-4);
        self.release_coeff = Self::coeff(self.release_s, self.sample_rate);
    }

    /// Get release time in seconds.
    pub fn release(&self) -> f32 {
        self.release_s
    }

    /// Set sample rate and recalculate segment coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Start the attack segment. Level is preserved for smooth retrigger.
    pub fn gate_on(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Enter the release segment.
    pub fn gate_off(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Force the envelope to idle.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    /// Current stage.
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Whether the envelope is producing output.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Advance the envelope by one sample and return the level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level =
                    self.attack_target + (self.level - self.attack_target) * self.attack_coeff;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                self.level = self.sustain + (self.level - self.sustain) * self.decay_coeff;
                if (self.level - self.sustain).abs() < 1e-4 {
                    self.level = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeStage::Release => {
                self.level *= self.release_coeff;
                if self.level < 1e-4 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level
    }

    fn coeff(seconds: f32, sample_rate: f32) -> f32 {
        let samples = seconds * sample_rate;
        expf(-1.0 / samples.max(1.0))
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = Self::coeff(self.attack_s, self.sample_rate);
        self.decay_coeff = Self::coeff(self.decay_s, self.sample_rate);
        self.release_coeff = Self::coeff(self.release_s, self.sample_rate);
    }
}
