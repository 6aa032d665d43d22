//! The synthesizer engine: voices, LFOs, modulation routing, and timing.
//!
//! Control-rate state (LFOs, router, disposal) moves in [`Engine::tick`];
//! audio moves in [`Engine::process`] / [`Engine::process_block`]. Nothing
//! on either path returns an error or panics for recoverable conditions;
//! bad input degrades to silence or a no-op.

use alloc::string::String;
use alloc::vec::Vec;

use timbre_core::{EnvelopeFollower, LfoBank, Transport};

use crate::algorithm::{Algorithm, NUM_OPERATORS};
use crate::operator::OperatorParams;
use crate::pool::{DEFAULT_MAX_VOICES, VoicePool};
use crate::preset::Preset;
use crate::router::{
    ModConnection, ModSource, ModTarget, ModulationRouter, NUM_LFOS, SourceValues,
};
use crate::scheduler::DisposalQueue;
use crate::voice::Voice;

/// Snapshot of engine state for UIs and hosts.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineState {
    /// Voices currently counting against the polyphony cap.
    pub active_voice_count: usize,
    /// Polyphony cap.
    pub max_voices: usize,
    /// Name of the loaded preset, if any.
    pub preset_name: Option<String>,
    /// Whether output is muted.
    pub muted: bool,
}

/// Composition root for the synthesizer.
///
/// Single-threaded by design: the host calls `tick` at control rate (30 Hz
/// or faster) and `process`/`process_block` from its audio callback, with
/// note and parameter changes interleaved between them.
#[derive(Debug)]
pub struct Engine {
    sample_rate: f32,
    pool: VoicePool,
    lfos: LfoBank<NUM_LFOS>,
    router: ModulationRouter,
    transport: Transport,
    follower: EnvelopeFollower,
    disposal: DisposalQueue,
    preset: Option<Preset>,
    algorithm: Algorithm,
    operator_params: [OperatorParams; NUM_OPERATORS],
    sources: SourceValues,
    clock: f64,
    master_gain: f32,
    muted: bool,
}

impl Engine {
    /// Creates an engine with the default polyphony cap.
    #[must_use]
    pub fn new(sample_rate: f32) -> Self {
        Self::with_max_voices(sample_rate, DEFAULT_MAX_VOICES)
    }

    /// Creates an engine with an explicit polyphony cap.
    #[must_use]
    pub fn with_max_voices(sample_rate: f32, max_voices: usize) -> Self {
        let router = ModulationRouter::new();
        let master_gain = router.base(ModTarget::MasterVolume);
        Self {
            sample_rate,
            pool: VoicePool::new(max_voices, sample_rate),
            lfos: LfoBank::new(),
            router,
            transport: Transport::new(120.0),
            follower: EnvelopeFollower::new(sample_rate),
            disposal: DisposalQueue::new(),
            preset: None,
            algorithm: Algorithm::default(),
            operator_params: [OperatorParams::default(); NUM_OPERATORS],
            sources: SourceValues::default(),
            clock: 0.0,
            master_gain,
            muted: false,
        }
    }

    /// Sample rate the engine renders at.
    #[must_use]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The transport driving tempo sync.
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Mutable transport access for tempo and play state changes.
    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Loads a preset, replacing operator parameters, topology, LFO
    /// configuration, and base values in one call.
    ///
    /// Voices already sounding keep their old settings until they end;
    /// every voice triggered afterwards uses the new ones.
    pub fn load_preset(&mut self, preset: &Preset) {
        let preset = preset.clamped();

        self.operator_params = preset.operators;
        self.algorithm = preset.algorithm;
        self.sync_operator_bases();

        self.router.set_base(ModTarget::MasterVolume, preset.master_volume);
        self.router
            .set_base(ModTarget::FilterCutoff, preset.effects.filter_cutoff);
        self.router
            .set_base(ModTarget::FilterResonance, preset.effects.filter_resonance);
        self.router.set_base(ModTarget::ReverbMix, preset.effects.reverb_mix);
        self.router
            .set_base(ModTarget::ChorusDepth, preset.effects.chorus_depth);
        self.router
            .set_base(ModTarget::DelayFeedback, preset.effects.delay_feedback);
        self.router
            .set_base(ModTarget::StereoSpread, preset.effects.stereo_spread);

        self.router.clear_connections();
        for index in 0..NUM_LFOS {
            if let Some(lfo) = self.lfos.get_mut(index) {
                if let Some(params) = preset.lfos.get(index) {
                    lfo.set_waveform(params.waveform);
                    lfo.set_rate(params.rate);
                    lfo.set_depth(params.depth);
                    lfo.set_phase_degrees(params.phase_degrees);
                } else {
                    lfo.set_depth(0.0);
                }
                lfo.reset();
            }
            if let Some(params) = preset.lfos.get(index)
                && params.destination != ModTarget::Unassigned
            {
                self.router.add(ModConnection::new(
                    ModSource::Lfo(index),
                    params.destination,
                    params.amount,
                ));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(preset = %preset.name, "preset loaded");

        self.preset = Some(preset);
    }

    /// The currently loaded preset, if any.
    #[must_use]
    pub fn preset(&self) -> Option<&Preset> {
        self.preset.as_ref()
    }

    fn sync_operator_bases(&mut self) {
        for (index, params) in self.operator_params.iter().enumerate() {
            self.router.set_base(ModTarget::OperatorLevel(index), params.level);
            self.router.set_base(ModTarget::OperatorRatio(index), params.ratio);
        }
    }

    /// Operator parameters as they will apply to the next triggered voice,
    /// with level and ratio modulation folded in.
    fn effective_operator_params(&self) -> [OperatorParams; NUM_OPERATORS] {
        core::array::from_fn(|index| {
            let mut params = self.operator_params[index];
            params.level = self.router.value(ModTarget::OperatorLevel(index), &self.sources);
            params.ratio = self.router.value(ModTarget::OperatorRatio(index), &self.sources);
            params
        })
    }

    /// Triggers a note.
    ///
    /// Silently ignored until a preset has been loaded. At the polyphony
    /// cap the least-recently-acquired voice is hard-cut first and any
    /// disposal pending for it is cancelled.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if self.preset.is_none() {
            return;
        }
        let params = self.effective_operator_params();
        let (_, stolen) = self
            .pool
            .allocate(note, velocity, self.clock, self.algorithm, &params);
        if let Some(victim) = stolen {
            self.disposal.cancel(victim);
        }
    }

    /// Releases every voice holding `note`, stacked re-triggers included.
    ///
    /// Each released voice keeps sounding its release tail; disposal is
    /// scheduled for when the tail is guaranteed silent. Silently ignored
    /// until a preset has been loaded.
    pub fn note_off(&mut self, note: u8) {
        if self.preset.is_none() {
            return;
        }
        for (voice_id, due) in self.pool.release_note(note, self.clock) {
            self.disposal.schedule(voice_id, due);
        }
    }

    /// Installs a hook fired whenever a voice enters its release tail.
    ///
    /// Hosts use this to mirror voice lifetime in their own bookkeeping.
    pub fn set_release_hook(&mut self, hook: impl FnMut(u64, u8) + Send + 'static) {
        self.pool.set_release_hook(hook);
    }

    /// Hard-cuts every voice and drops all pending disposals.
    pub fn stop_all(&mut self) {
        self.pool.clear();
        self.disposal.clear();
    }

    /// Switches the operator topology.
    ///
    /// Every sounding voice's graph is recompiled within this call; the old
    /// edge set is fully replaced, never merged.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
        if let Some(preset) = &mut self.preset {
            preset.algorithm = algorithm;
        }
        for voice in self.pool.iter_mut() {
            voice.set_algorithm(algorithm);
        }
    }

    /// Switches topology by preset name, falling back to serial for
    /// unrecognized names.
    pub fn set_algorithm_named(&mut self, name: &str) {
        let algorithm = match Algorithm::from_name(name) {
            Some(algorithm) => algorithm,
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(name, "unknown algorithm, falling back to serial");
                Algorithm::Serial
            }
        };
        self.set_algorithm(algorithm);
    }

    /// Current topology.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Applies a full parameter set to one operator.
    ///
    /// The composite lands atomically: stored parameters, router base
    /// values, and every sounding voice update within this call, so no
    /// sample is rendered against a half-applied ratio/level pair.
    pub fn set_operator_params(&mut self, index: usize, params: OperatorParams) {
        if index >= NUM_OPERATORS {
            return;
        }
        let params = params.clamped();
        self.operator_params[index] = params;
        if let Some(preset) = &mut self.preset {
            preset.operators[index] = params;
        }
        self.router.set_base(ModTarget::OperatorLevel(index), params.level);
        self.router.set_base(ModTarget::OperatorRatio(index), params.ratio);
        for voice in self.pool.iter_mut() {
            voice.set_operator_params(index, params);
        }
    }

    /// Stored parameters for one operator.
    #[must_use]
    pub fn operator_params(&self, index: usize) -> Option<OperatorParams> {
        self.operator_params.get(index).copied()
    }

    /// Adds a modulation connection. Returns `false` when the table is full.
    pub fn add_connection(&mut self, connection: ModConnection) -> bool {
        self.router.add(connection)
    }

    /// Removes the connection matching source and target.
    pub fn remove_connection(&mut self, source: ModSource, target: ModTarget) -> bool {
        self.router.remove(source, target)
    }

    /// Updates amount and enabled state on an existing connection.
    pub fn update_connection(
        &mut self,
        source: ModSource,
        target: ModTarget,
        amount: f32,
        enabled: bool,
    ) -> bool {
        self.router.update(source, target, amount, enabled)
    }

    /// Sets a destination's unmodulated base value.
    pub fn set_base_value(&mut self, target: ModTarget, value: f32) {
        self.router.set_base(target, value);
    }

    /// Fully applied (base plus modulation) value for a destination, as of
    /// the last tick.
    #[must_use]
    pub fn parameter(&self, target: ModTarget) -> f32 {
        self.router.value(target, &self.sources)
    }

    /// Direct access to one LFO for rate/waveform/table edits.
    pub fn lfo_mut(&mut self, index: usize) -> Option<&mut timbre_core::Lfo> {
        self.lfos.get_mut(index)
    }

    /// Current output of one LFO, for visualization polling. Out-of-range
    /// indices read 0.
    #[must_use]
    pub fn lfo_value(&self, index: usize) -> f32 {
        self.lfos.value(index)
    }

    /// Mutes or unmutes the output.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Engine state snapshot.
    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState {
            active_voice_count: self.pool.active_count(),
            max_voices: self.pool.max_voices(),
            preset_name: self.preset.as_ref().map(|p| p.name.clone()),
            muted: self.muted,
        }
    }

    /// Advances control-rate state to time `now` (seconds).
    ///
    /// Ticks the LFOs, refreshes the modulation source snapshot, pushes
    /// FM-index modulation into sounding voices, and reclaims voices whose
    /// release tails have ended. Call at 30 Hz or faster.
    pub fn tick(&mut self, now: f64) {
        let dt = (now - self.clock).max(0.0);
        self.clock = now;
        if self.transport.is_playing() {
            self.transport.advance(dt);
        }

        self.lfos.tick_all(now, self.transport.bpm());
        for index in 0..NUM_LFOS {
            self.sources.lfo[index] = self.lfos.value(index);
        }
        self.sources.env_follower = self.follower.level();

        self.master_gain = self.router.value(ModTarget::MasterVolume, &self.sources);
        let fm_scale = self.router.value(ModTarget::FmIndex, &self.sources);
        for voice in self.pool.iter_mut() {
            voice.set_depth_scale(fm_scale);
        }

        while let Some(voice_id) = self.disposal.pop_due(now) {
            self.pool.remove(voice_id);
        }
        for voice_id in self.pool.reap_freed() {
            self.disposal.cancel(voice_id);
        }
    }

    /// Renders one mono sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let mut mix = 0.0;
        for voice in self.pool.iter_mut() {
            mix += voice.process();
        }
        mix *= self.master_gain;
        self.follower.process(mix);
        if self.muted { 0.0 } else { mix }
    }

    /// Renders a block of mono samples.
    pub fn process_block(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.process();
        }
    }

    /// Ids of all live voices, release tails included. Test and debug aid.
    #[must_use]
    pub fn live_voice_ids(&self) -> Vec<u64> {
        self.pool.iter().map(Voice::id).collect()
    }

    /// Notes held by active voices.
    #[must_use]
    pub fn active_notes(&self) -> Vec<u8> {
        self.pool
            .iter()
            .filter(|v| v.state() == crate::voice::VoiceState::Triggered)
            .map(Voice::note)
            .collect()
    }
}
