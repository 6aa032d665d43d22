//! Bounded voice pool with least-recently-acquired stealing.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::algorithm::{Algorithm, NUM_OPERATORS};
use crate::operator::OperatorParams;
use crate::voice::{Voice, VoiceState};

/// Default polyphony cap.
pub const DEFAULT_MAX_VOICES: usize = 8;

/// Callback invoked when a voice leaves the active set, with its id and
/// note.
pub type ReleaseHook = Box<dyn FnMut(u64, u8) + Send>;

/// Owns every live voice, including release tails awaiting disposal.
///
/// Only [`VoiceState::Triggered`] voices count against the cap; release
/// tails keep sounding until the disposal queue reclaims them. Voice ids
/// come from a monotonic counter and are never reused.
pub struct VoicePool {
    voices: Vec<Voice>,
    max_voices: usize,
    next_id: u64,
    sample_rate: f32,
    on_release: Option<ReleaseHook>,
}

impl fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoicePool")
            .field("voices", &self.voices)
            .field("max_voices", &self.max_voices)
            .field("next_id", &self.next_id)
            .field("sample_rate", &self.sample_rate)
            .field("on_release", &self.on_release.as_ref().map(|_| ".."))
            .finish()
    }
}

impl VoicePool {
    /// Creates a pool with the given polyphony cap.
    #[must_use]
    pub fn new(max_voices: usize, sample_rate: f32) -> Self {
        Self {
            voices: Vec::with_capacity(max_voices * 2),
            max_voices: max_voices.max(1),
            next_id: 1,
            sample_rate,
            on_release: None,
        }
    }

    /// Installs a hook fired whenever a voice enters its release tail.
    pub fn set_release_hook(&mut self, hook: impl FnMut(u64, u8) + Send + 'static) {
        self.on_release = Some(Box::new(hook));
    }

    /// Removes the release hook, if any.
    pub fn clear_release_hook(&mut self) {
        self.on_release = None;
    }

    /// Polyphony cap.
    #[must_use]
    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// Number of voices currently counting against the cap.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Triggered)
            .count()
    }

    /// Allocates and triggers a voice.
    ///
    /// When the pool is at its cap the active voice with the earliest
    /// `start_time` is hard-cut and dropped first; its id is returned so the
    /// caller can cancel any disposal scheduled for it. Re-triggering a note
    /// that is already held stacks a second voice rather than restarting
    /// the first.
    pub fn allocate(
        &mut self,
        note: u8,
        velocity: u8,
        now: f64,
        algorithm: Algorithm,
        params: &[OperatorParams; NUM_OPERATORS],
    ) -> (u64, Option<u64>) {
        let mut stolen = None;
        if self.active_count() >= self.max_voices {
            let oldest = self
                .voices
                .iter()
                .filter(|v| v.state() == VoiceState::Triggered)
                .min_by(|a, b| a.start_time().total_cmp(&b.start_time()))
                .map(Voice::id);
            if let Some(victim_id) = oldest {
                self.voices.retain(|v| v.id() != victim_id);
                stolen = Some(victim_id);
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.voices.push(Voice::start(
            id,
            note,
            velocity,
            now,
            algorithm,
            params,
            self.sample_rate,
        ));
        (id, stolen)
    }

    /// Moves one voice into its release tail.
    ///
    /// Returns the time the tail is guaranteed silent, or `None` if the id
    /// is unknown or the voice is not active.
    pub fn release(&mut self, voice_id: u64, now: f64) -> Option<f64> {
        let voice = self
            .voices
            .iter_mut()
            .find(|v| v.id() == voice_id && v.state() == VoiceState::Triggered)?;
        let note = voice.note();
        let due = voice.release(now);
        if let Some(hook) = self.on_release.as_mut() {
            hook(voice_id, note);
        }
        Some(due)
    }

    /// Releases every active voice playing `note`, stacked re-triggers
    /// included. Returns `(voice_id, silent_at)` pairs for disposal
    /// scheduling.
    pub fn release_note(&mut self, note: u8, now: f64) -> Vec<(u64, f64)> {
        let mut released = Vec::new();
        for voice in &mut self.voices {
            if voice.note() == note && voice.state() == VoiceState::Triggered {
                let due = voice.release(now);
                released.push((voice.id(), due));
            }
        }
        if let Some(hook) = self.on_release.as_mut() {
            for &(id, _) in &released {
                hook(id, note);
            }
        }
        released
    }

    /// Active voices currently playing `note`.
    pub fn find_by_note(&self, note: u8) -> impl Iterator<Item = &Voice> {
        self.voices
            .iter()
            .filter(move |v| v.note() == note && v.state() == VoiceState::Triggered)
    }

    /// Drops a voice entirely. Used by disposal and by hard stops.
    pub fn remove(&mut self, voice_id: u64) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id() != voice_id);
        self.voices.len() != before
    }

    /// Hard-cuts and drops every voice.
    pub fn clear(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        self.voices.clear();
    }

    /// All live voices, release tails included.
    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    /// Mutable access to all live voices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.iter_mut()
    }

    /// Drops voices that have finished their release tails on their own.
    pub fn reap_freed(&mut self) -> Vec<u64> {
        let freed: Vec<u64> = self
            .voices
            .iter()
            .filter(|v| v.state() == VoiceState::Freed)
            .map(Voice::id)
            .collect();
        self.voices.retain(|v| v.state() != VoiceState::Freed);
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn params() -> [OperatorParams; NUM_OPERATORS] {
        core::array::from_fn(|_| OperatorParams::default())
    }

    fn pool(cap: usize) -> VoicePool {
        VoicePool::new(cap, SR)
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut p = pool(2);
        let (a, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        let (b, _) = p.allocate(64, 100, 1.0, Algorithm::Serial, &params());
        let (c, stolen) = p.allocate(67, 100, 2.0, Algorithm::Serial, &params());
        assert!(a < b && b < c);
        assert_eq!(stolen, Some(a));
        // The freed slot never resurrects the old id.
        let (d, _) = p.allocate(69, 100, 3.0, Algorithm::Serial, &params());
        assert!(d > c);
    }

    #[test]
    fn steals_least_recently_acquired() {
        let mut p = pool(2);
        let (first, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        p.allocate(64, 100, 1.0, Algorithm::Serial, &params());
        let (_, stolen) = p.allocate(67, 100, 2.0, Algorithm::Serial, &params());
        assert_eq!(stolen, Some(first));
        assert_eq!(p.active_count(), 2);
        let notes: Vec<u8> = p.iter().map(Voice::note).collect();
        assert!(notes.contains(&64) && notes.contains(&67));
        assert!(!notes.contains(&60));
    }

    #[test]
    fn release_tails_do_not_count_against_cap() {
        let mut p = pool(2);
        let (a, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        p.allocate(64, 100, 1.0, Algorithm::Serial, &params());
        assert!(p.release(a, 2.0).is_some());
        assert_eq!(p.active_count(), 1);
        // A new allocation fits without stealing; the tail keeps sounding.
        let (_, stolen) = p.allocate(67, 100, 3.0, Algorithm::Serial, &params());
        assert_eq!(stolen, None);
        assert_eq!(p.iter().count(), 3);
    }

    #[test]
    fn release_note_covers_stacked_voices() {
        let mut p = pool(8);
        p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        p.allocate(60, 80, 1.0, Algorithm::Serial, &params());
        p.allocate(64, 100, 2.0, Algorithm::Serial, &params());
        let released = p.release_note(60, 3.0);
        assert_eq!(released.len(), 2);
        assert_eq!(p.active_count(), 1);
        assert_eq!(p.find_by_note(60).count(), 0);
        assert_eq!(p.find_by_note(64).count(), 1);
    }

    #[test]
    fn release_hook_fires_for_every_released_voice() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut p = pool(8);
        let sink = Arc::clone(&seen);
        p.set_release_hook(move |id, note| sink.lock().unwrap().push((id, note)));

        let (a, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        p.allocate(60, 90, 1.0, Algorithm::Serial, &params());
        p.release(a, 2.0);
        p.release_note(60, 3.0);

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (a, 60));
        assert_eq!(events[1].1, 60);
        assert_ne!(events[1].0, a);
    }

    #[test]
    fn release_unknown_id_is_none() {
        let mut p = pool(2);
        assert!(p.release(999, 0.0).is_none());
    }

    #[test]
    fn double_release_is_none() {
        let mut p = pool(2);
        let (a, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        assert!(p.release(a, 1.0).is_some());
        assert!(p.release(a, 2.0).is_none());
    }

    #[test]
    fn remove_and_clear() {
        let mut p = pool(4);
        let (a, _) = p.allocate(60, 100, 0.0, Algorithm::Serial, &params());
        p.allocate(64, 100, 1.0, Algorithm::Serial, &params());
        assert!(p.remove(a));
        assert!(!p.remove(a));
        p.clear();
        assert_eq!(p.iter().count(), 0);
        assert_eq!(p.active_count(), 0);
    }
}
