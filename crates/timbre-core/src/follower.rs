//! Envelope follower for tracking output amplitude.
//!
//! Fed from the engine's mix bus and registered as a modulation source,
//! so loud passages can drive parameters (auto-wah style routing).

use libm::expf;

/// Peak-detecting envelope follower with separate attack and release.
///
/// # Example
///
/// ```rust
/// use timbre_core::EnvelopeFollower;
///
/// let mut follower = EnvelopeFollower::new(48000.0);
/// let level = follower.process(0.5);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_s: f32,
    release_s: f32,
}

impl EnvelopeFollower {
    /// Create a follower with 10ms attack and 100ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_s: 0.01,
            release_s: 0.1,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.attack_s = seconds.max(1e-4);
        self.recalculate_coefficients();
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.release_s = seconds.max(1e-3);
        self.recalculate_coefficients();
    }

    /// Update sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Track one input sample and return the envelope level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_abs;
        self.envelope
    }

    /// Current envelope level without processing new input.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = expf(-1.0 / (self.attack_s * self.sample_rate));
        self.release_coeff = expf(-1.0 / (self.release_s * self.sample_rate));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_on_signal() {
        let mut follower = EnvelopeFollower::new(48000.0);
        follower.set_attack(0.001);

        let mut level = 0.0;
        for _ in 0..500 {
            level = follower.process(1.0);
        }
        assert!(level > 0.9, "level {}", level);
    }

    #[test]
    fn falls_on_silence() {
        let mut follower = EnvelopeFollower::new(48000.0);
        follower.set_attack(0.001);
        follower.set_release(0.01);

        for _ in 0..500 {
            follower.process(1.0);
        }
        let mut level = 0.0;
        for _ in 0..2000 {
            level = follower.process(0.0);
        }
        assert!(level < 0.1, "level {}", level);
    }

    #[test]
    fn rectifies_negative_input() {
        let mut follower = EnvelopeFollower::new(48000.0);
        assert!(follower.process(-0.5) > 0.0);
    }

    #[test]
    fn reset_clears_level() {
        let mut follower = EnvelopeFollower::new(48000.0);
        for _ in 0..100 {
            follower.process(1.0);
        }
        follower.reset();
        assert_eq!(follower.level(), 0.0);
    }
}
