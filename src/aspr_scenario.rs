// Scenario: one full run, from the first tick to termination

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info};

use crate::aspr_export::StateRecord;
use crate::aspr_history::History;
use crate::aspr_interface::{Color, DecisionStrategy, InterferenceModel, Tick, DEFAULT_NODE_TTL};
use crate::aspr_state::State;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every node's lifetime reached zero.
    AllExpired,
    /// No spawn instants left and no node active.
    SpawnsComplete,
    /// The optional tick budget ran out first.
    TickBudgetExhausted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllExpired => write!(f, "All nodes TTL expired."),
            Self::SpawnsComplete => write!(f, "All spawns complete."),
            Self::TickBudgetExhausted => write!(f, "Tick budget exhausted."),
        }
    }
}

/// Drives one run: ticks the state, asks the strategy for a color at every
/// spawn instant, and records each tick into `History`.
///
/// Each iteration:
/// 1. tick the live state
/// 2. at a spawn instant, decide from the history recorded so far (the state
///    just ticked is not visible yet) and activate the chosen color
/// 3. record the state
/// 4. stop when all nodes expired, or when no spawn remains and nothing is
///    active; one extra tick is recorded before stopping
pub struct Scenario<'a> {
    name: String,
    state: State,
    history: History,
    spawn_times: VecDeque<Tick>,
    strategy: &'a mut dyn DecisionStrategy,
    max_ticks: Option<Tick>,
}

impl<'a> Scenario<'a> {
    pub fn new(
        name: impl Into<String>,
        n_nodes: usize,
        spawn_times: Vec<Tick>,
        colors: Vec<Color>,
        strategy: &'a mut dyn DecisionStrategy,
        model: Box<dyn InterferenceModel>,
    ) -> Self {
        Self::with_ttl(name, n_nodes, spawn_times, colors, strategy, model, DEFAULT_NODE_TTL)
    }

    pub fn with_ttl(
        name: impl Into<String>,
        n_nodes: usize,
        spawn_times: Vec<Tick>,
        colors: Vec<Color>,
        strategy: &'a mut dyn DecisionStrategy,
        model: Box<dyn InterferenceModel>,
        ttl: u32,
    ) -> Self {
        let state = State::with_ttl(n_nodes, model, colors, ttl);
        let history = History::new(&state);
        let name = name.into();
        debug!("{}: created with {} nodes", name, n_nodes);

        Self {
            name,
            state,
            history,
            spawn_times: spawn_times.into(),
            strategy,
            max_ticks: None,
        }
    }

    /// Stop after `max_ticks` ticks even if neither terminal condition is met.
    pub fn with_max_ticks(mut self, max_ticks: Tick) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn run(&mut self) -> Termination {
        info!("{}: starting", self.name);
        debug!("{}: spawn times {:?}", self.name, self.spawn_times);
        let mut next_spawn = self.spawn_times.pop_front();

        loop {
            debug!("{}: tick t={}", self.name, self.state.t());
            self.state.tick();

            if next_spawn == Some(self.state.t()) {
                debug!("{}: spawn at t={}", self.name, self.state.t());
                let decision = self.strategy.decide(&self.history);
                self.state.activate(decision);
                next_spawn = self.spawn_times.pop_front();
            }

            self.history.record(&self.state);

            if self.state.all_expired() {
                return self.end_run(Termination::AllExpired);
            }
            if next_spawn.is_none() && self.state.count_active() == 0 {
                return self.end_run(Termination::SpawnsComplete);
            }
            if self.max_ticks.is_some_and(|max| self.state.t() >= max) {
                info!("{}: stopped at t={}", self.name, self.state.t());
                return Termination::TickBudgetExhausted;
            }
        }
    }

    // one last tick so the final decay step is captured
    fn end_run(&mut self, reason: Termination) -> Termination {
        self.state.tick();
        self.history.record(&self.state);
        info!("{}: simulation complete: {}", self.name, reason);
        reason
    }

    pub fn score(&self) -> f64 {
        self.history.total_score()
    }

    pub fn to_records(&self) -> Vec<StateRecord> {
        self.history.iter().map(StateRecord::from_state).collect()
    }
}
