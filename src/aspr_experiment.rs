// Experiment: the same scenario repeated over a contiguous seed range

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::aspr_decision::StrategyConfig;
use crate::aspr_error::{Result, SimError};
use crate::aspr_export::write_csv;
use crate::aspr_interface::{color_range, Color, DecisionStrategy, InterferenceModel, Tick, DEFAULT_NODE_TTL};
use crate::aspr_interference::InterferenceModelKind;
use crate::aspr_scenario::{Scenario, Termination};
use crate::aspr_spawn_times;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Number of node colors available
    pub n_colors: usize,

    /// Number of runs (seeds) to perform
    pub n_runs: usize,

    /// First seed; runs use `base_seed .. base_seed + n_runs`
    pub base_seed: u64,

    pub strategy: StrategyConfig,

    pub interference: InterferenceModelKind,

    /// Newline-delimited spawn-time file
    pub spawn_times: PathBuf,

    /// Where run folders are created; defaults to the spawn-time file's folder
    pub output_root: Option<PathBuf>,

    pub node_ttl: u32,

    /// Optional per-run tick budget
    pub max_ticks: Option<Tick>,

    /// Rewind strategy state (e.g. the round-robin cursor) before every run.
    /// Off by default: one strategy instance carries over across seeds.
    pub reset_strategy_between_runs: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_colors: 4,
            n_runs: 1,
            base_seed: 0,
            strategy: StrategyConfig::default(),
            interference: InterferenceModelKind::default(),
            spawn_times: PathBuf::from(aspr_spawn_times::SPAWN_TIMES_FILE),
            output_root: None,
            node_ttl: DEFAULT_NODE_TTL,
            max_ticks: None,
            reset_strategy_between_runs: false,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub name: String,
    pub ticks: Tick,
    pub total_score: f64,
    pub termination: Termination,
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentSummary {
    pub name: String,
    pub output_dir: PathBuf,
    pub runs: Vec<RunSummary>,
}

impl ExperimentSummary {
    pub fn mean_score(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.runs.iter().map(|r| r.total_score).sum::<f64>() / self.runs.len() as f64
    }

    pub fn print_summary(&self) {
        println!("Experiment: {}", self.name);
        println!("  Output: {}", self.output_dir.display());
        println!("  {:>6} {:>6} {:>10}  {}", "seed", "ticks", "score", "end");
        for run in &self.runs {
            println!(
                "  {:>6} {:>6} {:>10.1}  {}",
                run.seed, run.ticks, run.total_score, run.termination
            );
        }
        println!("  Mean score: {:.2}", self.mean_score());
    }
}

// ============================================================================
// Experiment
// ============================================================================

/// One strategy and one interference model shared by every run.
pub struct Experiment {
    config: ExperimentConfig,
    name: String,
    colors: Vec<Color>,
    spawn_times: Vec<Tick>,
    seeds: Range<u64>,
    strategy: Box<dyn DecisionStrategy>,
    model: Box<dyn InterferenceModel>,
    output_dir: PathBuf,
}

impl Experiment {
    /// Validates everything up front and claims the output folder
    /// `<root>/nc<colors>/data/<strategy>-<model>`, which must not exist yet.
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        if config.n_colors == 0 {
            return Err(SimError::EmptyColorSet);
        }
        let seed_end = config
            .base_seed
            .checked_add(config.n_runs as u64)
            .ok_or(SimError::SeedRangeOverflow {
                base_seed: config.base_seed,
                n_runs: config.n_runs,
            })?;
        let spawn_times = aspr_spawn_times::read(&config.spawn_times)?;
        let colors = color_range(config.n_colors);
        let strategy = config.strategy.build(colors.clone())?;
        let model = config.interference.build();
        let name = format!("{}-{}", config.strategy.name(), config.interference.name());

        let root = match &config.output_root {
            Some(root) => root.clone(),
            None => config
                .spawn_times
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let output_dir = claim_output_dir(&root, config.n_colors, &name)?;

        info!(
            "{}: {} nodes, {} colors, {} runs from seed {}",
            name,
            spawn_times.len(),
            config.n_colors,
            config.n_runs,
            config.base_seed
        );

        Ok(Self {
            seeds: config.base_seed..seed_end,
            config,
            name,
            colors,
            spawn_times,
            strategy,
            model,
            output_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Seeds `run` walks through, `base_seed .. base_seed + n_runs`.
    pub fn seeds(&self) -> Range<u64> {
        self.seeds.clone()
    }

    pub fn run(&mut self) -> Result<ExperimentSummary> {
        let mut runs = Vec::with_capacity(self.config.n_runs);
        for seed in self.seeds() {
            runs.push(self.run_seed(seed)?);
        }

        Ok(ExperimentSummary {
            name: self.name.clone(),
            output_dir: self.output_dir.clone(),
            runs,
        })
    }

    pub fn run_seed(&mut self, seed: u64) -> Result<RunSummary> {
        debug!("{}: running seed {}", self.name, seed);
        self.strategy.reseed(seed);
        if self.config.reset_strategy_between_runs {
            self.strategy.reset();
        }

        let run_name = format!("{}-{}", self.name, seed);
        let mut scenario = Scenario::with_ttl(
            run_name.clone(),
            self.spawn_times.len(),
            self.spawn_times.clone(),
            self.colors.clone(),
            self.strategy.as_mut(),
            self.model.box_clone(),
            self.config.node_ttl,
        );
        if let Some(max) = self.config.max_ticks {
            scenario = scenario.with_max_ticks(max);
        }

        let termination = scenario.run();
        let csv_path = self.output_dir.join(format!("{}.csv", run_name));
        write_csv(&csv_path, &scenario.to_records())?;

        let summary = RunSummary {
            seed,
            name: run_name,
            ticks: scenario.state().t(),
            total_score: scenario.score(),
            termination,
            csv_path,
        };
        info!(
            "{}: {} ticks, total score {}",
            summary.name, summary.ticks, summary.total_score
        );
        Ok(summary)
    }
}

fn claim_output_dir(root: &Path, n_colors: usize, name: &str) -> Result<PathBuf> {
    let parent = root.join(format!("nc{}", n_colors)).join("data");
    fs::create_dir_all(&parent)?;

    let dir = parent.join(name);
    if dir.exists() {
        return Err(SimError::OutputExists(dir));
    }
    fs::create_dir(&dir)?;
    Ok(dir)
}
