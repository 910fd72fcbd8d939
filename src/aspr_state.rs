use indexmap::IndexMap;
use log::debug;

use crate::aspr_interface::{Color, InterferenceModel, Tick, DEFAULT_NODE_TTL};
use crate::aspr_node::Node;

/// Full snapshot of a scenario at tick `t`.
///
/// `State` is a plain value: cloning it yields a fully independent copy of the
/// nodes, the cursor and the interference model, so lookahead strategies can
/// play out hypothetical futures on a copy without touching the live run.
#[derive(Debug, Clone)]
pub struct State {
    t: Tick,
    nodes: Vec<Node>,
    activation_cursor: usize,
    colors: Vec<Color>,
    model: Box<dyn InterferenceModel>,
}

impl State {
    pub fn new(size: usize, model: Box<dyn InterferenceModel>, colors: Vec<Color>) -> Self {
        Self::with_ttl(size, model, colors, DEFAULT_NODE_TTL)
    }

    pub fn with_ttl(
        size: usize,
        model: Box<dyn InterferenceModel>,
        colors: Vec<Color>,
        ttl: u32,
    ) -> Self {
        Self {
            t: 0,
            nodes: (0..size).map(|id| Node::new(id, ttl)).collect(),
            activation_cursor: 0,
            colors,
            model,
        }
    }

    pub fn t(&self) -> Tick {
        self.t
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn activation_cursor(&self) -> usize {
        self.activation_cursor
    }

    pub fn model(&self) -> &dyn InterferenceModel {
        self.model.as_ref()
    }

    /// Independent copy; same as `clone()`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn tick(&mut self) -> &mut Self {
        self.t += 1;
        for node in &mut self.nodes {
            node.tick();
        }
        self
    }

    pub fn tick_n(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.tick();
        }
        self
    }

    /// Assign `color` to the next unactivated node, in index order.
    ///
    /// Requests beyond the node count are absorbed.
    pub fn activate(&mut self, color: Color) -> &mut Self {
        if self.activation_cursor >= self.nodes.len() {
            debug!("t={}: all nodes already activated, ignoring c{}", self.t, color);
            return self;
        }
        debug!(
            "t={}: activating n{} <- c{}",
            self.t, self.activation_cursor, color
        );
        self.nodes[self.activation_cursor].assign(color);
        self.activation_cursor += 1;
        self
    }

    /// Sum of pairwise cost over all unordered pairs of distinct nodes.
    pub fn score(&self) -> f64 {
        let mut sum = 0.0;
        for u in &self.nodes {
            for v in &self.nodes {
                if u.id() != v.id() {
                    sum += self.model.cost(u, v);
                }
            }
        }
        sum / 2.0
    }

    pub fn count_active(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_assigned()).count()
    }

    pub fn all_expired(&self) -> bool {
        self.nodes.iter().all(|n| n.is_expired())
    }

    pub fn statistics(&self) -> StateStatistics {
        StateStatistics::from_state(self)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-color aggregates over the configured color set, in color-set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStatistics {
    pub colors: Vec<Color>,
    pub active: Vec<usize>,
    pub total_ttl: Vec<u64>,
}

impl StateStatistics {
    pub fn from_state(state: &State) -> Self {
        let mut active = vec![0usize; state.colors.len()];
        let mut total_ttl = vec![0u64; state.colors.len()];

        for node in &state.nodes {
            let Some(color) = node.color() else { continue };
            if let Some(idx) = state.colors.iter().position(|&c| c == color) {
                active[idx] += 1;
                total_ttl[idx] += node.ttl() as u64;
            }
        }

        Self {
            colors: state.colors.clone(),
            active,
            total_ttl,
        }
    }

    /// `c{k}-n-active` → count of nodes currently holding color k.
    pub fn active_per_color(&self) -> IndexMap<String, u64> {
        self.colors
            .iter()
            .zip(&self.active)
            .map(|(c, n)| (format!("c{}-n-active", c), *n as u64))
            .collect()
    }

    /// `c{k}-total-ttl` → summed remaining life of nodes holding color k.
    pub fn ttl_per_color(&self) -> IndexMap<String, u64> {
        self.colors
            .iter()
            .zip(&self.total_ttl)
            .map(|(c, ttl)| (format!("c{}-total-ttl", c), *ttl))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspr_interface::color_range;
    use crate::aspr_interference::BinaryInterference;

    fn state(size: usize) -> State {
        State::new(size, Box::new(BinaryInterference), color_range(5))
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = state(5);
        original.tick().activate(0);

        let mut copy = original.copy();
        assert_eq!(copy.count_active(), original.count_active());
        assert_eq!(copy.t(), original.t());
        assert_eq!(copy.activation_cursor(), original.activation_cursor());

        copy.tick().activate(1);
        assert_ne!(copy.count_active(), original.count_active());
        assert_ne!(copy.t(), original.t());
        assert_ne!(copy.activation_cursor(), original.activation_cursor());
        assert_eq!(original.nodes()[0].ttl(), DEFAULT_NODE_TTL);
        assert_eq!(original.nodes()[1].color(), None);

        // and the other way around
        original.tick_n(3);
        assert_eq!(copy.t(), 2);
        assert_eq!(copy.nodes()[0].ttl(), DEFAULT_NODE_TTL - 1);
    }

    #[test]
    fn test_activate_in_index_order() {
        let mut s = state(3);
        s.activate(4).activate(0).activate(2);
        let colors: Vec<_> = s.nodes().iter().map(|n| n.color()).collect();
        assert_eq!(colors, vec![Some(4), Some(0), Some(2)]);
    }

    #[test]
    fn test_activate_overflow_is_noop() {
        let mut s = state(2);
        s.activate(0).activate(1).activate(3);
        assert_eq!(s.activation_cursor(), 2);
        assert_eq!(s.nodes()[0].color(), Some(0));
        assert_eq!(s.nodes()[1].color(), Some(1));
    }

    #[test]
    fn test_score() {
        let mut s = state(5);
        assert_eq!(s.score(), 0.0);

        s.activate(0).activate(0).activate(1);
        assert_eq!(s.score(), 1.0);

        s.activate(0);
        // three nodes on color 0 -> three pairs
        assert_eq!(s.score(), 3.0);

        s.activate(1);
        assert_eq!(s.score(), 4.0);
    }

    #[test]
    fn test_count_active_nodes() {
        let mut s = state(5);
        s.tick().activate(0);
        assert_eq!(s.count_active(), 1);

        let mut s = state(5);
        s.tick().activate(0).tick_n(8).activate(1).tick_n(8);
        assert_eq!(s.count_active(), 1);

        let mut s = state(5);
        s.tick().activate(0).tick().activate(1);
        assert_eq!(s.count_active(), 2);

        let mut s = state(5);
        s.tick().activate(0).tick_n(12);
        assert_eq!(s.count_active(), 0);
    }

    #[test]
    fn test_all_expired() {
        let mut s = state(2);
        s.tick().activate(0).tick().activate(1).tick_n(12);
        assert!(s.all_expired());

        let mut s = state(2);
        s.tick().activate(0).tick().activate(1).tick_n(5);
        assert!(!s.all_expired());
    }

    #[test]
    fn test_all_expired_ignores_color() {
        let mut s = State::with_ttl(2, Box::new(BinaryInterference), color_range(2), 1);
        s.activate(0).activate(1).tick();
        // lifetime exhausted but colors not cleared yet
        assert_eq!(s.count_active(), 2);
        assert!(s.all_expired());
    }

    #[test]
    fn test_active_per_color() {
        let mut s = state(5);
        s.tick().activate(0).tick().activate(1).tick().activate(0).tick();
        let stats = s.statistics();
        let expected: Vec<(String, u64)> = vec![
            ("c0-n-active".into(), 2),
            ("c1-n-active".into(), 1),
            ("c2-n-active".into(), 0),
            ("c3-n-active".into(), 0),
            ("c4-n-active".into(), 0),
        ];
        assert_eq!(stats.active_per_color().into_iter().collect::<Vec<_>>(), expected);

        let mut s = state(5);
        s.tick().activate(0).tick_n(5).activate(3).tick().activate(0).tick_n(5);
        assert_eq!(s.statistics().active, vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_ttl_per_color() {
        let mut s = state(5);
        s.tick().activate(0).tick().activate(1).tick().activate(0).tick();
        let stats = s.statistics();
        assert_eq!(stats.total_ttl, vec![16, 8, 0, 0, 0]);
        assert_eq!(stats.ttl_per_color().get("c0-total-ttl"), Some(&16));

        let mut s = state(5);
        s.tick().activate(0).tick_n(5).activate(3).tick().activate(0).tick_n(5);
        assert_eq!(s.statistics().total_ttl, vec![5, 0, 0, 4, 0]);
    }
}
