use std::fmt::Debug;

use crate::aspr_history::History;
use crate::aspr_node::Node;

// colors are small dense indices into the configured color set
pub type Color = usize;
pub type NodeId = usize;
pub type Tick = u64;

/// Lifetime a node gets when it is created (in ticks of assignment).
pub const DEFAULT_NODE_TTL: u32 = 10;

/// Column value used for an unassigned node in exported time series.
pub const UNASSIGNED_COLOR: i64 = -1;

/// The configured color set for a run: `0..n_colors`.
pub fn color_range(n_colors: usize) -> Vec<Color> {
    (0..n_colors).collect()
}

// ============================================================================
// Interference
// ============================================================================

/// Pairwise interference cost between two nodes.
///
/// Implementations must be symmetric: `cost(u, v) == cost(v, u)`.
pub trait InterferenceModel: Debug {
    fn name(&self) -> &'static str;

    fn cost(&self, u: &Node, v: &Node) -> f64;

    /// Independent copy, used whenever a `State` is copied.
    fn box_clone(&self) -> Box<dyn InterferenceModel>;
}

impl Clone for Box<dyn InterferenceModel> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Policy choosing the color for the next arriving node.
///
/// Strategies only see the past through `History`, which hands out private
/// copies, so a strategy can never disturb the live simulation.
pub trait DecisionStrategy {
    fn name(&self) -> &str;

    fn decide(&mut self, history: &History) -> Color;

    /// Drop any per-run state (cursors etc.). No-op for stateless strategies.
    fn reset(&mut self) {}

    /// Reseed any internal random source for a new run.
    fn reseed(&mut self, _seed: u64) {}
}

/// A trained cost model mapping a feature vector to an expected interference cost.
pub trait Predictor: Debug {
    fn predict(&self, features: &[f64]) -> f64;
}
