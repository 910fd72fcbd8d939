//! # aspr - online color assignment under interference
//!
//! Nodes arrive one at a time at predetermined spawn instants. At each
//! arrival a decision strategy picks a color for the new node; nodes stay
//! colored for a fixed lifetime and then go dark. Every tick, pairs of live
//! nodes sharing a color interfere, and a run's quality is the cumulative
//! interference over its whole timeline (lower is better).
//!
//! ## Core Components
//!
//! - **State**: the population of nodes at one tick, plus the interference model
//! - **History**: the timeline of recorded states a strategy decides from
//! - **DecisionStrategy**: greedy lookahead, random, round-robin, linear predictor
//! - **Scenario**: one run from the first tick to termination
//! - **Experiment**: one scenario repeated over a seed range, exported as CSV
//!
//! ```no_run
//! use aspr::{color_range, BinaryInterference, GreedyDecision, Scenario};
//!
//! let mut greedy = GreedyDecision::new(color_range(4), 1)?;
//! let mut scenario = Scenario::new(
//!     "demo",
//!     3,
//!     vec![1, 4, 6],
//!     color_range(4),
//!     &mut greedy,
//!     Box::new(BinaryInterference),
//! );
//! let termination = scenario.run();
//! println!("{}: total score {}", termination, scenario.score());
//! # Ok::<(), aspr::SimError>(())
//! ```
//!
//! ## Offline Tooling
//!
//! Spawn-time sets, per-run CSV export, training-row extraction and the
//! linear predictor fit live in their own modules and back the binaries
//! under `simulator/`.

// Core simulation modules
pub mod aspr_error;
pub mod aspr_interface;
pub mod aspr_interference;
pub mod aspr_node;
pub mod aspr_state;
pub mod aspr_history;
pub mod aspr_decision;
pub mod aspr_scenario;
pub mod aspr_experiment;

// Offline data and model tooling
pub mod aspr_spawn_times;
pub mod aspr_export;
pub mod aspr_features;
pub mod aspr_linreg;

// Re-export commonly used types
pub use aspr_decision::{
    GreedyDecision, LinearPredictorDecision, RandomDecision, RoundRobinDecision, StrategyConfig,
};
pub use aspr_error::{Result, SimError};
pub use aspr_experiment::{Experiment, ExperimentConfig, ExperimentSummary, RunSummary};
pub use aspr_history::History;
pub use aspr_interface::{
    color_range, Color, DecisionStrategy, InterferenceModel, NodeId, Predictor, Tick,
    DEFAULT_NODE_TTL,
};
pub use aspr_interference::{BinaryInterference, InterferenceModelKind};
pub use aspr_node::Node;
pub use aspr_scenario::{Scenario, Termination};
pub use aspr_state::{State, StateStatistics};
