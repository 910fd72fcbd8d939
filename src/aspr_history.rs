use crate::aspr_state::State;

/// Append-only record of `State` snapshots, ordered by recording time.
///
/// Every entry is an independent copy taken at `record` time, and every read
/// hands back another copy. Strategies can inspect or play forward anything
/// they read without any effect on the live run.
#[derive(Debug, Clone)]
pub struct History {
    // never empty: seeded with the starting state
    records: Vec<State>,
}

impl History {
    pub fn new(initial: &State) -> Self {
        Self {
            records: vec![initial.copy()],
        }
    }

    pub fn record(&mut self, state: &State) {
        self.records.push(state.copy());
    }

    /// Copy of the entry at `index`; negative indices count from the end
    /// (`-1` is the most recent entry).
    pub fn read(&self, index: isize) -> Option<State> {
        let len = self.records.len() as isize;
        let idx = if index < 0 { len + index } else { index };
        if idx < 0 || idx >= len {
            return None;
        }
        Some(self.records[idx as usize].copy())
    }

    /// Copies of every entry.
    pub fn read_all(&self) -> Vec<State> {
        self.records.iter().map(State::copy).collect()
    }

    /// Copy of the most recent entry.
    pub fn latest(&self) -> State {
        self.records[self.records.len() - 1].copy()
    }

    /// Shared view for read-only consumers such as exporters.
    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_score(&self) -> f64 {
        self.records.iter().map(State::score).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspr_interface::color_range;
    use crate::aspr_interference::BinaryInterference;

    fn state() -> State {
        State::new(4, Box::new(BinaryInterference), color_range(2))
    }

    #[test]
    fn test_record_is_isolated_from_live_state() {
        let mut live = state();
        let mut history = History::new(&live);

        live.tick().activate(0);
        history.record(&live);
        live.tick().activate(0);

        let recorded = history.read(-1).unwrap();
        assert_eq!(recorded.t(), 1);
        assert_eq!(recorded.count_active(), 1);
        assert_eq!(live.count_active(), 2);
    }

    #[test]
    fn test_read_is_isolated_from_history() {
        let mut live = state();
        let mut history = History::new(&live);
        live.tick();
        history.record(&live);

        let mut copy = history.read(-1).unwrap();
        copy.tick().activate(1).activate(1);

        let again = history.latest();
        assert_eq!(again.t(), 1);
        assert_eq!(again.count_active(), 0);

        let mut all = history.read_all();
        all[0].tick_n(5);
        assert_eq!(history.read(0).unwrap().t(), 0);
    }

    #[test]
    fn test_read_indices() {
        let mut live = state();
        let mut history = History::new(&live);
        for _ in 0..3 {
            live.tick();
            history.record(&live);
        }

        assert_eq!(history.len(), 4);
        assert_eq!(history.read(0).unwrap().t(), 0);
        assert_eq!(history.read(2).unwrap().t(), 2);
        assert_eq!(history.read(-1).unwrap().t(), 3);
        assert_eq!(history.read(-4).unwrap().t(), 0);
        assert!(history.read(4).is_none());
        assert!(history.read(-5).is_none());
    }

    #[test]
    fn test_total_score_matches_recomputed() {
        let mut live = state();
        let mut history = History::new(&live);
        for color in [0, 0, 1, 0] {
            live.tick().activate(color);
            history.record(&live);
        }
        for _ in 0..4 {
            live.tick();
            history.record(&live);
        }

        let recomputed: f64 = history.read_all().iter().map(State::score).sum();
        assert_eq!(history.total_score(), recomputed);
        // 0 + 0 + 1 + 1 + 3 + 3 + 3 + 3 + 3
        assert_eq!(history.total_score(), 17.0);
    }
}
