//! Operator routing topologies.
//!
//! An [`Algorithm`] names one of five fixed ways to wire four operators
//! together; [`OperatorGraph`] is the compiled form a voice evaluates each
//! sample. Graphs are rebuilt wholesale on trigger, algorithm change, or
//! operator parameter change, never patched incrementally.

use crate::operator::OperatorParams;

/// Number of operators per voice.
pub const NUM_OPERATORS: usize = 4;

/// Global FM depth scale.
///
/// The frequency deviation a modulator at full level applies to a carrier is
/// `base_freq * (level / 100) * FM_INDEX_SCALE` Hz.
pub const FM_INDEX_SCALE: f32 = 50.0;

/// Maximum modulator inputs into a single operator across all topologies.
pub const MAX_MOD_INPUTS: usize = 2;

/// The five operator wiring topologies.
///
/// Operator indices are 0..4. Index 0 is always a carrier; higher indices
/// only ever modulate lower ones, so evaluating operators from index 3 down
/// to 0 visits every modulator before the operator it feeds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    /// 3 -> 2 -> 1 -> 0. One carrier, a three-deep modulator chain.
    #[default]
    Serial,
    /// All four operators are carriers. No modulation, additive only.
    Parallel,
    /// 3 -> 2 and 1 -> 0. Two carriers (2 and 0), each with one modulator.
    DualSerial,
    /// 3 -> 2, 3 -> 1, 3 -> 0. Three carriers sharing one modulator.
    FanOut,
    /// 3 -> 1, 2 -> 1, 1 -> 0. One carrier fed by a two-modulator merge.
    Split,
}

impl Algorithm {
    /// Parses a topology name as written in presets.
    ///
    /// Returns `None` for unrecognized names so the caller can log and fall
    /// back to [`Algorithm::Serial`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "serial" => Some(Self::Serial),
            "parallel" => Some(Self::Parallel),
            "dual_serial" => Some(Self::DualSerial),
            "fan_out" => Some(Self::FanOut),
            "split" => Some(Self::Split),
            _ => None,
        }
    }

    /// Canonical preset name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
            Self::DualSerial => "dual_serial",
            Self::FanOut => "fan_out",
            Self::Split => "split",
        }
    }
}

/// One modulator-to-operator edge with its depth baked in Hz.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModEdge {
    /// Index of the modulating operator.
    pub source: usize,
    /// Peak frequency deviation the modulator applies, in Hz.
    pub depth_hz: f32,
}

/// Compiled wiring for one voice.
///
/// Fixed-capacity edge lists keep evaluation allocation-free. `build` is a
/// pure function of its inputs, so rebuilding with unchanged inputs yields
/// an identical graph.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorGraph {
    algorithm: Algorithm,
    inputs: [[Option<ModEdge>; MAX_MOD_INPUTS]; NUM_OPERATORS],
    carriers: [bool; NUM_OPERATORS],
}

impl OperatorGraph {
    /// Compiles the wiring for `algorithm` at a note's base frequency.
    ///
    /// Each edge's depth is `base_freq * (modulator level / 100) *`
    /// [`FM_INDEX_SCALE`], so deviation tracks pitch and a level-0 modulator
    /// contributes nothing.
    #[must_use]
    pub fn build(
        algorithm: Algorithm,
        params: &[OperatorParams; NUM_OPERATORS],
        base_freq: f32,
    ) -> Self {
        let depth = |source: usize| base_freq * (params[source].level / 100.0) * FM_INDEX_SCALE;

        let mut graph = Self {
            algorithm,
            inputs: [[None; MAX_MOD_INPUTS]; NUM_OPERATORS],
            carriers: [false; NUM_OPERATORS],
        };

        match algorithm {
            Algorithm::Serial => {
                graph.add_edge(3, 2, depth(3));
                graph.add_edge(2, 1, depth(2));
                graph.add_edge(1, 0, depth(1));
                graph.carriers[0] = true;
            }
            Algorithm::Parallel => {
                graph.carriers = [true; NUM_OPERATORS];
            }
            Algorithm::DualSerial => {
                graph.add_edge(3, 2, depth(3));
                graph.add_edge(1, 0, depth(1));
                graph.carriers[2] = true;
                graph.carriers[0] = true;
            }
            Algorithm::FanOut => {
                graph.add_edge(3, 2, depth(3));
                graph.add_edge(3, 1, depth(3));
                graph.add_edge(3, 0, depth(3));
                graph.carriers[2] = true;
                graph.carriers[1] = true;
                graph.carriers[0] = true;
            }
            Algorithm::Split => {
                graph.add_edge(3, 1, depth(3));
                graph.add_edge(2, 1, depth(2));
                graph.add_edge(1, 0, depth(1));
                graph.carriers[0] = true;
            }
        }

        graph
    }

    fn add_edge(&mut self, source: usize, dest: usize, depth_hz: f32) {
        for slot in &mut self.inputs[dest] {
            if slot.is_none() {
                *slot = Some(ModEdge { source, depth_hz });
                return;
            }
        }
    }

    /// The topology this graph was compiled from.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Modulator edges feeding operator `op`.
    pub fn modulators_of(&self, op: usize) -> impl Iterator<Item = &ModEdge> {
        self.inputs[op].iter().flatten()
    }

    /// True if operator `op` contributes to the audible mix.
    #[must_use]
    pub fn is_carrier(&self, op: usize) -> bool {
        self.carriers[op]
    }

    /// Number of carriers, used to normalize the mix.
    #[must_use]
    pub fn carrier_count(&self) -> usize {
        self.carriers.iter().filter(|c| **c).count()
    }
}
