//! Modulation routing: sources, destinations, and the connection table.
//!
//! Destinations are a closed enum; every variant carries its own transform
//! and valid range, checked exhaustively at the match. A connection naming a
//! destination nothing consumes ([`ModTarget::Unassigned`]) is accepted and
//! simply does nothing.

use libm::{logf, powf};

/// Number of LFO slots the router can read.
pub const NUM_LFOS: usize = 4;

/// Maximum simultaneous connections.
pub const MAX_CONNECTIONS: usize = 32;

/// A modulation source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModSource {
    /// One of the global LFOs.
    Lfo(usize),
    /// The output envelope follower.
    EnvFollower,
}

/// A modulation destination.
///
/// Each variant fixes its transform shape: linear destinations add the
/// scaled modulation sum to the base, the filter cutoff adds in normalized
/// log space so a sweep sounds uniform at any base frequency, and the
/// multiplicative pair scales the base by a fraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModTarget {
    /// Filter cutoff in Hz. Logarithmic.
    FilterCutoff,
    /// Filter resonance (Q). Linear.
    FilterResonance,
    /// Output level of one operator, in percent. Linear.
    OperatorLevel(usize),
    /// Tuning ratio of one operator. Multiplicative.
    OperatorRatio(usize),
    /// Global FM depth multiplier. Multiplicative.
    FmIndex,
    /// Stereo spread amount. Linear.
    StereoSpread,
    /// Reverb wet mix. Linear.
    ReverbMix,
    /// Chorus depth. Linear.
    ChorusDepth,
    /// Delay feedback. Linear.
    DelayFeedback,
    /// Master output volume. Linear.
    MasterVolume,
    /// Placeholder destination; accepted, never applied.
    #[default]
    Unassigned,
}

/// Table size for per-destination base values. Indexed destinations get one
/// slot per operator.
const TARGET_SLOTS: usize = 17;

impl ModTarget {
    /// Parses a destination name as written in presets.
    ///
    /// Indexed destinations use `op_level_0` .. `op_level_3` and
    /// `op_ratio_0` .. `op_ratio_3`. Unknown names map to `Unassigned` so a
    /// preset referencing a destination this build lacks still loads.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "filter_cutoff" => Self::FilterCutoff,
            "filter_resonance" => Self::FilterResonance,
            "op_level_0" => Self::OperatorLevel(0),
            "op_level_1" => Self::OperatorLevel(1),
            "op_level_2" => Self::OperatorLevel(2),
            "op_level_3" => Self::OperatorLevel(3),
            "op_ratio_0" => Self::OperatorRatio(0),
            "op_ratio_1" => Self::OperatorRatio(1),
            "op_ratio_2" => Self::OperatorRatio(2),
            "op_ratio_3" => Self::OperatorRatio(3),
            "fm_index" => Self::FmIndex,
            "stereo_spread" => Self::StereoSpread,
            "reverb_mix" => Self::ReverbMix,
            "chorus_depth" => Self::ChorusDepth,
            "delay_feedback" => Self::DelayFeedback,
            "master_volume" => Self::MasterVolume,
            _ => Self::Unassigned,
        }
    }

    /// Valid range for the applied value.
    #[must_use]
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::FilterCutoff => (20.0, 20000.0),
            Self::FilterResonance => (0.5, 20.0),
            Self::OperatorLevel(_) => (0.0, 100.0),
            Self::OperatorRatio(_) => (0.5, 16.0),
            Self::FmIndex => (0.0, 2.0),
            Self::StereoSpread | Self::ReverbMix | Self::ChorusDepth => (0.0, 1.0),
            Self::DelayFeedback => (0.0, 0.95),
            Self::MasterVolume => (0.0, 1.0),
            Self::Unassigned => (0.0, 0.0),
        }
    }

    /// Default base value before any preset sets one.
    #[must_use]
    pub fn default_base(self) -> f32 {
        match self {
            Self::FilterCutoff => 1000.0,
            Self::FilterResonance => 1.0,
            Self::OperatorLevel(_) => 75.0,
            Self::OperatorRatio(_) | Self::FmIndex => 1.0,
            Self::StereoSpread | Self::ChorusDepth | Self::DelayFeedback => 0.0,
            Self::ReverbMix => 0.0,
            Self::MasterVolume => 0.8,
            Self::Unassigned => 0.0,
        }
    }

    fn slot(self) -> Option<usize> {
        match self {
            Self::FilterCutoff => Some(0),
            Self::FilterResonance => Some(1),
            Self::OperatorLevel(op) if op < 4 => Some(2 + op),
            Self::OperatorRatio(op) if op < 4 => Some(6 + op),
            Self::FmIndex => Some(10),
            Self::StereoSpread => Some(11),
            Self::ReverbMix => Some(12),
            Self::ChorusDepth => Some(13),
            Self::DelayFeedback => Some(14),
            Self::MasterVolume => Some(15),
            Self::Unassigned => Some(16),
            _ => None,
        }
    }

    /// Applies the summed modulation to a base value through this
    /// destination's transform, clamped to [`ModTarget::range`].
    #[must_use]
    pub fn apply(self, base: f32, modulation: f32) -> f32 {
        let (min, max) = self.range();
        match self {
            Self::FilterCutoff => {
                // Normalized log position in [0, 1] across the range.
                let span = logf(max / min);
                let norm = logf((base.clamp(min, max)) / min) / span;
                let swept = (norm + modulation).clamp(0.0, 1.0);
                min * powf(max / min, swept)
            }
            Self::OperatorRatio(_) => (base * (1.0 + modulation * 0.5)).clamp(min, max),
            Self::FmIndex => (base * (1.0 + modulation)).clamp(min, max),
            Self::FilterResonance => (base + modulation * 10.0).clamp(min, max),
            Self::OperatorLevel(_) => (base + modulation * 50.0).clamp(min, max),
            Self::StereoSpread
            | Self::ReverbMix
            | Self::ChorusDepth
            | Self::DelayFeedback
            | Self::MasterVolume => (base + modulation).clamp(min, max),
            Self::Unassigned => base,
        }
    }
}

/// One source-to-destination patch.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModConnection {
    /// Where the modulation comes from.
    pub source: ModSource,
    /// Where it goes.
    pub target: ModTarget,
    /// Bipolar amount, clamped to [-1, 1].
    pub amount: f32,
    /// Disabled connections stay in the table but contribute nothing.
    pub enabled: bool,
}

impl ModConnection {
    /// Creates an enabled connection with a clamped amount.
    #[must_use]
    pub fn new(source: ModSource, target: ModTarget, amount: f32) -> Self {
        Self {
            source,
            target,
            amount: amount.clamp(-1.0, 1.0),
            enabled: true,
        }
    }
}

/// Current values of every modulation source, sampled once per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceValues {
    /// One value per LFO slot, each in [-depth, depth].
    pub lfo: [f32; NUM_LFOS],
    /// Envelope follower level, 0.0 to 1.0.
    pub env_follower: f32,
}

impl SourceValues {
    fn get(&self, source: ModSource) -> f32 {
        match source {
            ModSource::Lfo(index) => self.lfo.get(index).copied().unwrap_or(0.0),
            ModSource::EnvFollower => self.env_follower,
        }
    }
}

/// Fixed-capacity connection table plus per-destination base values.
///
/// Evaluation is a scan over the connection slots; nothing allocates per
/// tick.
#[derive(Debug)]
pub struct ModulationRouter {
    connections: [Option<ModConnection>; MAX_CONNECTIONS],
    base: [f32; TARGET_SLOTS],
}

impl Default for ModulationRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModulationRouter {
    /// Creates a router with default base values and no connections.
    #[must_use]
    pub fn new() -> Self {
        let mut router = Self {
            connections: [None; MAX_CONNECTIONS],
            base: [0.0; TARGET_SLOTS],
        };
        for target in Self::all_targets() {
            router.set_base(target, target.default_base());
        }
        router
    }

    fn all_targets() -> impl Iterator<Item = ModTarget> {
        [
            ModTarget::FilterCutoff,
            ModTarget::FilterResonance,
            ModTarget::OperatorLevel(0),
            ModTarget::OperatorLevel(1),
            ModTarget::OperatorLevel(2),
            ModTarget::OperatorLevel(3),
            ModTarget::OperatorRatio(0),
            ModTarget::OperatorRatio(1),
            ModTarget::OperatorRatio(2),
            ModTarget::OperatorRatio(3),
            ModTarget::FmIndex,
            ModTarget::StereoSpread,
            ModTarget::ReverbMix,
            ModTarget::ChorusDepth,
            ModTarget::DelayFeedback,
            ModTarget::MasterVolume,
        ]
        .into_iter()
    }

    /// Adds a connection. Returns `false` when the table is full.
    pub fn add(&mut self, connection: ModConnection) -> bool {
        let mut conn = connection;
        conn.amount = conn.amount.clamp(-1.0, 1.0);
        for slot in &mut self.connections {
            if slot.is_none() {
                *slot = Some(conn);
                return true;
            }
        }
        false
    }

    /// Removes the first connection matching source and target. Returns
    /// whether one existed.
    pub fn remove(&mut self, source: ModSource, target: ModTarget) -> bool {
        for slot in &mut self.connections {
            if let Some(conn) = slot
                && conn.source == source
                && conn.target == target
            {
                *slot = None;
                return true;
            }
        }
        false
    }

    /// Updates amount and enabled state on an existing connection. Returns
    /// whether one matched.
    pub fn update(
        &mut self,
        source: ModSource,
        target: ModTarget,
        amount: f32,
        enabled: bool,
    ) -> bool {
        for slot in self.connections.iter_mut().flatten() {
            if slot.source == source && slot.target == target {
                slot.amount = amount.clamp(-1.0, 1.0);
                slot.enabled = enabled;
                return true;
            }
        }
        false
    }

    /// Drops every connection, keeping base values.
    pub fn clear_connections(&mut self) {
        self.connections = [None; MAX_CONNECTIONS];
    }

    /// Number of occupied connection slots.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.iter().flatten().count()
    }

    /// Occupied connections.
    pub fn connections(&self) -> impl Iterator<Item = &ModConnection> {
        self.connections.iter().flatten()
    }

    /// Sets the unmodulated base value for a destination, clamped to its
    /// range. Setting `Unassigned` is a no-op.
    pub fn set_base(&mut self, target: ModTarget, value: f32) {
        if target == ModTarget::Unassigned {
            return;
        }
        if let Some(slot) = target.slot() {
            let (min, max) = target.range();
            self.base[slot] = value.clamp(min, max);
        }
    }

    /// Unmodulated base value for a destination.
    #[must_use]
    pub fn base(&self, target: ModTarget) -> f32 {
        target.slot().map_or(0.0, |slot| self.base[slot])
    }

    /// Summed `source × amount` over enabled connections to `target`.
    #[must_use]
    pub fn modulation_for(&self, target: ModTarget, sources: &SourceValues) -> f32 {
        let mut sum = 0.0;
        for conn in self.connections.iter().flatten() {
            if conn.enabled && conn.target == target {
                sum += sources.get(conn.source) * conn.amount;
            }
        }
        sum
    }

    /// Fully applied value for a destination: base, plus modulation, through
    /// the destination transform, clamped.
    #[must_use]
    pub fn value(&self, target: ModTarget, sources: &SourceValues) -> f32 {
        target.apply(self.base(target), self.modulation_for(target, sources))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_sum_is_linear_in_contributions() {
        let mut router = ModulationRouter::new();
        router.set_base(ModTarget::ReverbMix, 0.4);
        router.add(ModConnection::new(ModSource::Lfo(0), ModTarget::ReverbMix, 0.5));
        router.add(ModConnection::new(ModSource::Lfo(1), ModTarget::ReverbMix, -0.3));

        let sources = SourceValues {
            lfo: [1.0, 1.0, 0.0, 0.0],
            env_follower: 0.0,
        };
        let expected = (0.4f32 + (0.5 * 1.0 - 0.3 * 1.0)).clamp(0.0, 1.0);
        assert!((router.value(ModTarget::ReverbMix, &sources) - expected).abs() < 1e-6);

        // Disabling the second connection removes only its contribution.
        assert!(router.update(ModSource::Lfo(1), ModTarget::ReverbMix, -0.3, false));
        let expected = (0.4f32 + 0.5).clamp(0.0, 1.0);
        assert!((router.value(ModTarget::ReverbMix, &sources) - expected).abs() < 1e-6);
    }

    #[test]
    fn applied_value_clamps_to_range() {
        let mut router = ModulationRouter::new();
        router.set_base(ModTarget::MasterVolume, 0.9);
        router.add(ModConnection::new(
            ModSource::Lfo(0),
            ModTarget::MasterVolume,
            1.0,
        ));
        let sources = SourceValues {
            lfo: [1.0, 0.0, 0.0, 0.0],
            env_follower: 0.0,
        };
        assert_eq!(router.value(ModTarget::MasterVolume, &sources), 1.0);
    }

    #[test]
    fn cutoff_sweep_is_log_uniform() {
        let target = ModTarget::FilterCutoff;
        // A third of the normalized range multiplies frequency by 10 over a
        // 20..20000 span, regardless of the base.
        let low = target.apply(100.0, 1.0 / 3.0);
        let high = target.apply(1000.0, 1.0 / 3.0);
        assert!((low / 100.0 - 10.0).abs() < 0.05, "low = {low}");
        assert!((high / 1000.0 - 10.0).abs() < 0.05, "high = {high}");
    }

    #[test]
    fn ratio_transform_is_multiplicative() {
        let target = ModTarget::OperatorRatio(2);
        assert!((target.apply(2.0, 1.0) - 3.0).abs() < 1e-6);
        assert!((target.apply(2.0, -1.0) - 1.0).abs() < 1e-6);
        // Clamped at the range edge.
        assert_eq!(target.apply(14.0, 1.0), 16.0);
    }

    #[test]
    fn unassigned_is_a_no_op() {
        let mut router = ModulationRouter::new();
        assert!(router.add(ModConnection::new(
            ModSource::EnvFollower,
            ModTarget::Unassigned,
            1.0,
        )));
        router.set_base(ModTarget::Unassigned, 99.0);
        let sources = SourceValues {
            lfo: [0.0; NUM_LFOS],
            env_follower: 1.0,
        };
        assert_eq!(router.value(ModTarget::Unassigned, &sources), 0.0);
    }

    #[test]
    fn unknown_name_maps_to_unassigned() {
        assert_eq!(ModTarget::from_name("wavefolder_bias"), ModTarget::Unassigned);
        assert_eq!(ModTarget::from_name("filter_cutoff"), ModTarget::FilterCutoff);
        assert_eq!(ModTarget::from_name("op_level_2"), ModTarget::OperatorLevel(2));
    }

    #[test]
    fn out_of_range_lfo_source_reads_zero() {
        let mut router = ModulationRouter::new();
        router.set_base(ModTarget::ReverbMix, 0.5);
        router.add(ModConnection::new(ModSource::Lfo(99), ModTarget::ReverbMix, 1.0));
        let sources = SourceValues {
            lfo: [1.0; NUM_LFOS],
            env_follower: 0.0,
        };
        assert_eq!(router.value(ModTarget::ReverbMix, &sources), 0.5);
    }

    #[test]
    fn remove_targets_one_connection() {
        let mut router = ModulationRouter::new();
        router.add(ModConnection::new(ModSource::Lfo(0), ModTarget::ReverbMix, 0.5));
        router.add(ModConnection::new(ModSource::Lfo(0), ModTarget::ChorusDepth, 0.5));
        assert!(router.remove(ModSource::Lfo(0), ModTarget::ReverbMix));
        assert!(!router.remove(ModSource::Lfo(0), ModTarget::ReverbMix));
        assert_eq!(router.connection_count(), 1);
    }

    #[test]
    fn table_capacity_is_enforced() {
        let mut router = ModulationRouter::new();
        for i in 0..MAX_CONNECTIONS {
            assert!(router.add(ModConnection::new(
                ModSource::Lfo(i % NUM_LFOS),
                ModTarget::ReverbMix,
                0.1,
            )));
        }
        assert!(!router.add(ModConnection::new(
            ModSource::EnvFollower,
            ModTarget::ReverbMix,
            0.1,
        )));
    }
}
