// Experiment Runner - Load and execute experiment YAML files
//
// Usage:
//   cargo run --bin experiment_runner scenarios/greedy_small.yaml
//   cargo run --bin experiment_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin experiment_runner scenarios/greedy_small.yaml --seed 7 --runs 20 -v

use std::env;
use std::fs;
use std::path::Path;

use aspr::{Experiment, ExperimentConfig, InterferenceModelKind, StrategyConfig};
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Experiment file format
#[derive(Debug, serde::Deserialize)]
struct ExperimentFile {
    /// Experiment metadata
    #[serde(default)]
    meta: ExperimentMeta,

    experiment: ExperimentConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ExperimentMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

#[derive(Debug, Default)]
struct Overrides {
    seed: Option<u64>,
    runs: Option<usize>,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <experiment.yaml | directory/> [--seed N] [--runs N] [-v | -vv]",
            args[0]
        );
        eprintln!("\nStrategies: {}", StrategyConfig::options().join(", "));
        eprintln!("Interference models: {}", InterferenceModelKind::options().join(", "));
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/greedy_small.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/greedy_small.yaml --seed 7 --runs 20", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let (overrides, verbosity) = parse_flags(&args[2..]);

    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init().unwrap_or_else(|e| {
        eprintln!("Failed to install logger: {}", e);
        std::process::exit(1);
    });

    if path.is_file() {
        run_experiment_file(path, &overrides);
    } else if path.is_dir() {
        run_experiment_directory(path, &overrides);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn parse_flags(flags: &[String]) -> (Overrides, usize) {
    let mut overrides = Overrides::default();
    let mut verbosity = 0;
    let mut iter = flags.iter();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--seed" => overrides.seed = Some(parse_number(flag, iter.next())),
            "--runs" => overrides.runs = Some(parse_number(flag, iter.next())),
            "-v" => verbosity += 1,
            "-vv" => verbosity += 2,
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    (overrides, verbosity)
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    value
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{} expects a non-negative integer", flag);
            std::process::exit(1);
        })
}

fn run_experiment_directory(dir: &Path, overrides: &Overrides) {
    let mut experiments = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                experiments.push(path);
            }
        }
    }

    experiments.sort();

    if experiments.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  EXPERIMENT RUNNER - Multiple Experiments              ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} experiment(s) to run\n", experiments.len());

    for (i, experiment_path) in experiments.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, experiments.len(), experiment_path.display());
        run_experiment_file(experiment_path, overrides);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All experiments complete!                             ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_experiment_file(path: &Path, overrides: &Overrides) {
    println!("Loading experiment from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let file: ExperimentFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let title = file.meta.name.clone().unwrap_or_else(|| {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("experiment");
        format!("Experiment: {}", stem)
    });
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  {}{}║", title, " ".repeat(54_usize.saturating_sub(title.chars().count())));
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = file.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = file.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = file.experiment;
    if let Some(seed) = overrides.seed {
        config.base_seed = seed;
    }
    if let Some(runs) = overrides.runs {
        config.n_runs = runs;
    }

    println!("Configuration:");
    println!("  Strategy: {}", config.strategy.name());
    println!("  Interference: {}", config.interference.name());
    println!("  Colors: {}", config.n_colors);
    println!("  Spawn times: {}", config.spawn_times.display());
    println!("  Seeds: from {}, {} run(s)", config.base_seed, config.n_runs);
    if let Some(max) = config.max_ticks {
        println!("  Tick budget: {}", max);
    }
    println!("\nStarting experiment...\n");

    let summary = Experiment::new(config)
        .and_then(|mut experiment| experiment.run())
        .unwrap_or_else(|e| {
            eprintln!("Experiment failed: {}", e);
            std::process::exit(1);
        });

    summary.print_summary();

    println!("\n✓ Experiment complete!\n");
}
