// Decision strategies
//
// Each strategy answers one question: which color does the next arriving node
// get? The node itself is always the next unactivated one, chosen by `State`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::aspr_error::{Result, SimError};
use crate::aspr_features::build_features;
use crate::aspr_history::History;
use crate::aspr_interface::{Color, DecisionStrategy, Predictor};
use crate::aspr_linreg::LinearModelSet;
use crate::aspr_state::State;

fn check_colors(colors: &[Color]) -> Result<()> {
    if colors.is_empty() {
        return Err(SimError::EmptyColorSet);
    }
    Ok(())
}

/// First color holding the strictly smallest score; later equal scores never win.
/// Non-finite scores are never picked.
pub fn min_score_color(scores: &[(Color, f64)]) -> Option<Color> {
    let mut best: Option<(Color, f64)> = None;
    for &(color, score) in scores {
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, min)) if score >= min => {}
            _ => best = Some((color, score)),
        }
    }
    best.map(|(color, _)| color)
}

// ============================================================================
// Random
// ============================================================================

/// Uniformly random color from the configured set.
pub struct RandomDecision {
    colors: Vec<Color>,
    rng: StdRng,
}

impl RandomDecision {
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        check_colors(&colors)?;
        Ok(Self {
            colors,
            rng: StdRng::seed_from_u64(0),
        })
    }
}

impl DecisionStrategy for RandomDecision {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, _history: &History) -> Color {
        let decision = self.colors[self.rng.gen_range(0..self.colors.len())];
        debug!("random: selected c{}", decision);
        decision
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

// ============================================================================
// Round robin
// ============================================================================

/// Cycles through the color set, one step per decision.
pub struct RoundRobinDecision {
    colors: Vec<Color>,
    // None: before the first color
    cursor: Option<usize>,
}

impl RoundRobinDecision {
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        check_colors(&colors)?;
        Ok(Self {
            colors,
            cursor: None,
        })
    }
}

impl DecisionStrategy for RoundRobinDecision {
    fn name(&self) -> &str {
        "rrobin"
    }

    fn decide(&mut self, _history: &History) -> Color {
        let next = self.cursor.map_or(0, |i| (i + 1) % self.colors.len());
        self.cursor = Some(next);
        let decision = self.colors[next];
        debug!("rrobin: selected c{}", decision);
        decision
    }

    fn reset(&mut self) {
        self.cursor = None;
    }
}

// ============================================================================
// Greedy lookahead
// ============================================================================

/// Picks the color with the lowest cumulative score over the next `ps` ticks.
///
/// The lookahead runs on copies read from `History`: the latest snapshot is
/// advanced one tick (the tick the real run is about to take), then each
/// candidate color is played out on its own copy.
pub struct GreedyDecision {
    colors: Vec<Color>,
    ps: usize,
}

impl GreedyDecision {
    pub fn new(colors: Vec<Color>, ps: usize) -> Result<Self> {
        check_colors(&colors)?;
        if ps == 0 {
            return Err(SimError::InvalidStrategyArgument {
                strategy: "greedy".to_string(),
                reason: "planning horizon must be at least 1".to_string(),
            });
        }
        Ok(Self { colors, ps })
    }

    pub fn ps(&self) -> usize {
        self.ps
    }

    /// Cumulative score of activating `color` on a copy of `state`, then
    /// ticking `ps - 1` more times.
    pub fn peek_cum_score(state: &State, color: Color, ps: usize) -> f64 {
        let mut temp = state.copy();
        temp.activate(color);
        let mut score = temp.score();
        for _ in 1..ps {
            score += temp.tick().score();
        }
        score
    }
}

impl DecisionStrategy for GreedyDecision {
    fn name(&self) -> &str {
        "greedy"
    }

    fn decide(&mut self, history: &History) -> Color {
        let mut state = history.latest();
        state.tick();

        let scores: Vec<(Color, f64)> = self
            .colors
            .iter()
            .map(|&c| (c, Self::peek_cum_score(&state, c, self.ps)))
            .collect();
        let decision = min_score_color(&scores).unwrap_or(self.colors[0]);

        debug!("greedy: scores {:?}", scores);
        debug!("greedy: selected c{}", decision);
        decision
    }
}

// ============================================================================
// Linear predictor
// ============================================================================

/// Picks the color with the lowest predicted cost.
///
/// Each candidate color is scored by its own predictor, with that same color
/// substituted as the decision feature.
pub struct LinearPredictorDecision {
    colors: Vec<Color>,
    // aligned with `colors`
    predictors: Vec<Box<dyn Predictor>>,
}

impl LinearPredictorDecision {
    pub fn new(
        colors: Vec<Color>,
        mut predictors: BTreeMap<Color, Box<dyn Predictor>>,
    ) -> Result<Self> {
        check_colors(&colors)?;
        let predictors = colors
            .iter()
            .map(|c| predictors.remove(c).ok_or(SimError::MissingPredictor(*c)))
            .collect::<Result<Vec<_>>>()?;
        debug!("linreg: colors {:?}, predictors {:?}", colors, predictors);
        Ok(Self { colors, predictors })
    }

    pub fn from_model_set(colors: Vec<Color>, set: LinearModelSet) -> Result<Self> {
        check_colors(&colors)?;
        set.validate(&colors)?;
        let predictors = set
            .models
            .into_iter()
            .map(|(c, m)| (c, Box::new(m) as Box<dyn Predictor>))
            .collect();
        Self::new(colors, predictors)
    }
}

impl DecisionStrategy for LinearPredictorDecision {
    fn name(&self) -> &str {
        "linreg"
    }

    fn decide(&mut self, history: &History) -> Color {
        let stats = history.latest().statistics();

        let preds: Vec<(Color, f64)> = self
            .colors
            .iter()
            .zip(&self.predictors)
            .map(|(&c, predictor)| (c, predictor.predict(&build_features(&stats, c))))
            .collect();
        let decision = min_score_color(&preds).unwrap_or(self.colors[0]);

        debug!("linreg: predicted loss {:?}", preds);
        debug!("linreg: selected c{}", decision);
        decision
    }
}

// ============================================================================
// Registry
// ============================================================================

fn default_ps() -> usize {
    1
}

/// Closed set of strategies, resolved once when an experiment is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum StrategyConfig {
    Greedy {
        #[serde(default = "default_ps")]
        ps: usize,
    },
    Random,
    #[serde(rename = "rrobin")]
    RoundRobin,
    #[serde(rename = "linreg")]
    LinearPredictor { models: PathBuf },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Greedy { ps: default_ps() }
    }
}

impl StrategyConfig {
    pub fn options() -> &'static [&'static str] {
        &["greedy", "random", "rrobin", "linreg"]
    }

    /// Resolve the `name [argument]` form used on the command line.
    pub fn from_name(name: &str, arg: Option<&str>) -> Result<Self> {
        match name {
            "greedy" => {
                let ps = match arg {
                    Some(raw) => raw.parse().map_err(|_| SimError::InvalidStrategyArgument {
                        strategy: name.to_string(),
                        reason: format!("'{}' is not a planning horizon", raw),
                    })?,
                    None => default_ps(),
                };
                Ok(Self::Greedy { ps })
            }
            "random" => Ok(Self::Random),
            "rrobin" => Ok(Self::RoundRobin),
            "linreg" => match arg {
                Some(path) => Ok(Self::LinearPredictor {
                    models: PathBuf::from(path),
                }),
                None => Err(SimError::InvalidStrategyArgument {
                    strategy: name.to_string(),
                    reason: "a model file is required".to_string(),
                }),
            },
            other => Err(SimError::UnknownStrategy(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy { .. } => "greedy",
            Self::Random => "random",
            Self::RoundRobin => "rrobin",
            Self::LinearPredictor { .. } => "linreg",
        }
    }

    pub fn build(&self, colors: Vec<Color>) -> Result<Box<dyn DecisionStrategy>> {
        let strategy: Box<dyn DecisionStrategy> = match self {
            Self::Greedy { ps } => Box::new(GreedyDecision::new(colors, *ps)?),
            Self::Random => Box::new(RandomDecision::new(colors)?),
            Self::RoundRobin => Box::new(RoundRobinDecision::new(colors)?),
            Self::LinearPredictor { models } => {
                let set = LinearModelSet::load(models)?;
                Box::new(LinearPredictorDecision::from_model_set(colors, set)?)
            }
        };
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspr_interface::{color_range, DEFAULT_NODE_TTL};
    use crate::aspr_interference::BinaryInterference;
    use crate::aspr_linreg::LinearModel;

    fn empty_history(nodes: usize, colors: usize) -> History {
        History::new(&State::new(nodes, Box::new(BinaryInterference), color_range(colors)))
    }

    #[test]
    fn test_min_score_color() {
        assert_eq!(
            min_score_color(&[(0, 15.0), (1, 9.0), (2, 5.0), (3, 11.0)]),
            Some(2)
        );
        assert_eq!(
            min_score_color(&[(0, 15.0), (1, 9.0), (2, 16.0), (3, 11.0)]),
            Some(1)
        );
        assert_eq!(min_score_color(&[(0, 3.0), (1, 1.0), (2, 1.0)]), Some(1));
        assert_eq!(min_score_color(&[]), None);
    }

    #[test]
    fn test_min_score_color_skips_non_finite() {
        assert_eq!(min_score_color(&[(0, f64::NAN), (1, 3.0), (2, 5.0)]), Some(1));
        assert_eq!(min_score_color(&[(0, 2.0), (1, f64::NAN), (2, 5.0)]), Some(0));
        assert_eq!(min_score_color(&[(0, 4.0), (1, f64::NAN), (2, 1.0)]), Some(2));
        assert_eq!(
            min_score_color(&[(0, f64::NEG_INFINITY), (1, f64::INFINITY), (2, 7.0)]),
            Some(2)
        );
        assert_eq!(min_score_color(&[(0, f64::NAN), (1, f64::NAN)]), None);
    }

    #[test]
    fn test_empty_color_set_rejected() {
        assert!(matches!(RandomDecision::new(vec![]), Err(SimError::EmptyColorSet)));
        assert!(matches!(RoundRobinDecision::new(vec![]), Err(SimError::EmptyColorSet)));
        assert!(matches!(GreedyDecision::new(vec![], 1), Err(SimError::EmptyColorSet)));
        assert!(matches!(
            LinearPredictorDecision::new(vec![], BTreeMap::new()),
            Err(SimError::EmptyColorSet)
        ));
        assert!(matches!(
            GreedyDecision::new(vec![0], 0),
            Err(SimError::InvalidStrategyArgument { .. })
        ));
    }

    #[test]
    fn test_round_robin_cycles_and_resets() {
        let history = empty_history(1, 3);
        let mut rr = RoundRobinDecision::new(color_range(3)).unwrap();
        let picks: Vec<_> = (0..5).map(|_| rr.decide(&history)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1]);

        rr.reset();
        assert_eq!(rr.decide(&history), 0);
    }

    #[test]
    fn test_random_is_reproducible_per_seed() {
        let history = empty_history(1, 4);
        let mut random = RandomDecision::new(color_range(4)).unwrap();

        random.reseed(7);
        let first: Vec<_> = (0..20).map(|_| random.decide(&history)).collect();
        random.reseed(7);
        let second: Vec<_> = (0..20).map(|_| random.decide(&history)).collect();

        assert_eq!(first, second);
        assert!(first.iter().all(|c| *c < 4));
    }

    #[test]
    fn test_greedy_avoids_active_color() {
        let mut state = State::new(3, Box::new(BinaryInterference), color_range(2));
        state.tick().activate(0);
        let history = History::new(&state);

        let mut greedy = GreedyDecision::new(color_range(2), 1).unwrap();
        assert_eq!(greedy.decide(&history), 1);
    }

    #[test]
    fn test_greedy_tie_keeps_first_color() {
        let history = empty_history(3, 3);
        let mut greedy = GreedyDecision::new(vec![2, 0, 1], 4).unwrap();
        assert_eq!(greedy.decide(&history), 2);
    }

    #[test]
    fn test_greedy_horizon() {
        // n0 holds c1 and is about to expire, n1 holds c0 with a long life
        let mut state = State::new(3, Box::new(BinaryInterference), color_range(2));
        state.activate(1).tick_n(DEFAULT_NODE_TTL as usize - 1).activate(0);
        let history = History::new(&state);

        let mut short = GreedyDecision::new(color_range(2), 1).unwrap();
        assert_eq!(short.decide(&history), 0);

        let mut long = GreedyDecision::new(color_range(2), 3).unwrap();
        assert_eq!(long.decide(&history), 1);

        // lookahead never touches what was recorded
        let latest = history.latest();
        assert_eq!(latest.t(), state.t());
        assert_eq!(latest.activation_cursor(), 2);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_peek_cum_score() {
        let mut state = State::with_ttl(3, Box::new(BinaryInterference), color_range(2), 2);
        state.activate(0);
        // c0: pair on every step until n0 clears (2 ticks of life left)
        assert_eq!(GreedyDecision::peek_cum_score(&state, 0, 1), 1.0);
        assert_eq!(GreedyDecision::peek_cum_score(&state, 0, 3), 3.0);
        assert_eq!(GreedyDecision::peek_cum_score(&state, 0, 4), 3.0);
        assert_eq!(GreedyDecision::peek_cum_score(&state, 1, 4), 0.0);
        assert_eq!(state.activation_cursor(), 1);
    }

    #[derive(Debug)]
    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _features: &[f64]) -> f64 {
            self.0
        }
    }

    #[derive(Debug)]
    struct ActiveOfDecision;

    impl Predictor for ActiveOfDecision {
        // active count of the color named by the trailing decision feature
        fn predict(&self, features: &[f64]) -> f64 {
            let decision = features[features.len() - 1] as usize;
            features[decision]
        }
    }

    #[test]
    fn test_linear_predictor_picks_lowest_prediction() {
        let history = empty_history(2, 3);
        let mut predictors: BTreeMap<Color, Box<dyn Predictor>> = BTreeMap::new();
        predictors.insert(0, Box::new(Fixed(5.0)));
        predictors.insert(1, Box::new(Fixed(2.0)));
        predictors.insert(2, Box::new(Fixed(2.0)));

        let mut linreg = LinearPredictorDecision::new(color_range(3), predictors).unwrap();
        assert_eq!(linreg.decide(&history), 1);
    }

    #[test]
    fn test_linear_predictor_uses_latest_state() {
        let mut state = State::new(4, Box::new(BinaryInterference), color_range(2));
        state.activate(0).activate(0).activate(1);
        let history = History::new(&state);

        let mut predictors: BTreeMap<Color, Box<dyn Predictor>> = BTreeMap::new();
        predictors.insert(0, Box::new(ActiveOfDecision));
        predictors.insert(1, Box::new(ActiveOfDecision));
        let mut linreg = LinearPredictorDecision::new(color_range(2), predictors).unwrap();
        assert_eq!(linreg.decide(&history), 1);

        let mut predictors: BTreeMap<Color, Box<dyn Predictor>> = BTreeMap::new();
        predictors.insert(0, Box::new(ActiveOfDecision));
        assert!(matches!(
            LinearPredictorDecision::new(color_range(2), predictors),
            Err(SimError::MissingPredictor(1))
        ));
    }

    #[test]
    fn test_linear_predictor_from_model_set() {
        let mut set = LinearModelSet::default();
        for (color, bias) in [(0, 3.0), (1, 1.0)] {
            set.models.insert(
                color,
                LinearModel {
                    intercept: bias,
                    coefficients: vec![1.0, 1.0, 0.0, 0.0, 0.0],
                },
            );
        }
        let history = empty_history(2, 2);
        let mut linreg = LinearPredictorDecision::from_model_set(color_range(2), set).unwrap();
        assert_eq!(linreg.decide(&history), 1);
    }

    #[test]
    fn test_registry() {
        assert_eq!(
            StrategyConfig::from_name("greedy", Some("3")).unwrap(),
            StrategyConfig::Greedy { ps: 3 }
        );
        assert_eq!(
            StrategyConfig::from_name("greedy", None).unwrap(),
            StrategyConfig::Greedy { ps: 1 }
        );
        assert_eq!(
            StrategyConfig::from_name("rrobin", None).unwrap(),
            StrategyConfig::RoundRobin
        );
        assert!(matches!(
            StrategyConfig::from_name("linreg", None),
            Err(SimError::InvalidStrategyArgument { .. })
        ));
        assert!(matches!(
            StrategyConfig::from_name("oracle", None),
            Err(SimError::UnknownStrategy(_))
        ));

        for name in StrategyConfig::options() {
            let arg = if *name == "linreg" { Some("models.yaml") } else { None };
            assert_eq!(StrategyConfig::from_name(name, arg).unwrap().name(), *name);
        }

        let built = StrategyConfig::RoundRobin.build(color_range(2)).unwrap();
        assert_eq!(built.name(), "rrobin");
    }

    #[test]
    fn test_config_yaml() {
        let greedy: StrategyConfig = serde_yaml::from_str("name: greedy\nps: 2\n").unwrap();
        assert_eq!(greedy, StrategyConfig::Greedy { ps: 2 });

        let greedy: StrategyConfig = serde_yaml::from_str("name: greedy\n").unwrap();
        assert_eq!(greedy, StrategyConfig::Greedy { ps: 1 });

        let linreg: StrategyConfig =
            serde_yaml::from_str("name: linreg\nmodels: out/linreg.yaml\n").unwrap();
        assert_eq!(
            linreg,
            StrategyConfig::LinearPredictor {
                models: PathBuf::from("out/linreg.yaml")
            }
        );

        let rr: StrategyConfig = serde_yaml::from_str("name: rrobin\n").unwrap();
        assert_eq!(rr, StrategyConfig::RoundRobin);
    }
}
