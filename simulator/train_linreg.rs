// Train Linreg - Fit per-color linear predictors from recorded runs
//
// Reads every CSV in a run folder (e.g. outputs/small/nc4/data/greedy-binary),
// extracts one training row per spawn and writes a YAML model set usable as
// `strategy: { name: linreg, models: ... }`.
//
// Usage:
//   cargo run --bin train_linreg -- -f outputs/small/nc4/data/greedy-binary -c 4
//   cargo run --bin train_linreg -- -f <folder> -c 4 -o models.yaml --ttl 10 -vv

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use aspr::aspr_export::read_csv;
use aspr::aspr_features::{extract_training_rows, TrainingRow};
use aspr::aspr_linreg::{train, LinearModelSet};
use aspr::aspr_spawn_times::{self, SPAWN_TIMES_FILE};
use aspr::{color_range, Result, Tick, DEFAULT_NODE_TTL};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

struct Args {
    folder: PathBuf,
    n_colors: usize,
    output: Option<PathBuf>,
    spawn_times: Option<PathBuf>,
    node_ttl: u32,
    verbosity: usize,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let parsed = parse_args(&args);

    let level = match parsed.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    SimpleLogger::new().with_level(level).init().unwrap_or_else(|e| {
        eprintln!("Failed to install logger: {}", e);
        std::process::exit(1);
    });

    // run folders sit at <set>/nc<k>/data/<run>
    let spawn_path = parsed
        .spawn_times
        .clone()
        .unwrap_or_else(|| parsed.folder.join("..").join("..").join("..").join(SPAWN_TIMES_FILE));
    let output = parsed
        .output
        .clone()
        .unwrap_or_else(|| parsed.folder.join("..").join("..").join("linreg.yaml"));

    match run(&parsed, &spawn_path, &output) {
        Ok(set) => {
            println!("Trained {} color model(s)", set.models.len());
            for (color, model) in &set.models {
                println!("  c{}: intercept {:.4}", color, model.intercept);
            }
            println!("\n✓ Saved to {}\n", output.display());
        }
        Err(e) => {
            eprintln!("Training failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args, spawn_path: &Path, output: &Path) -> Result<LinearModelSet> {
    let spawn_times: Vec<Tick> = aspr_spawn_times::read(spawn_path)?;

    let mut csv_files: Vec<PathBuf> = fs::read_dir(&args.folder)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("csv"))
        .collect();
    csv_files.sort();

    let mut rows: Vec<TrainingRow> = Vec::new();
    for path in &csv_files {
        let records = read_csv(path)?;
        let extracted = extract_training_rows(&records, &spawn_times, args.node_ttl)?;
        info!("{}: {} rows", path.display(), extracted.len());
        rows.extend(extracted);
    }
    info!("{} training rows from {} runs", rows.len(), csv_files.len());

    let set = train(&rows, &color_range(args.n_colors))?;
    set.save(output)?;
    Ok(set)
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} -f FOLDER -c N_COLORS [-o MODELS.yaml] [--spawn-times FILE] [--ttl N] [-v | -vv]",
        program
    );
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Args {
    let mut folder = None;
    let mut n_colors = None;
    let mut parsed = Args {
        folder: PathBuf::new(),
        n_colors: 0,
        output: None,
        spawn_times: None,
        node_ttl: DEFAULT_NODE_TTL,
        verbosity: 0,
    };

    let mut iter = args.iter().skip(1);
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "-v" => parsed.verbosity += 1,
            "-vv" => parsed.verbosity += 2,
            _ => {
                let Some(value) = iter.next() else {
                    usage(&args[0]);
                };
                match flag.as_str() {
                    "-f" | "--folder" => folder = Some(PathBuf::from(value)),
                    "-c" | "--n-colors" => n_colors = value.parse().ok(),
                    "-o" | "--output" => parsed.output = Some(PathBuf::from(value)),
                    "--spawn-times" => parsed.spawn_times = Some(PathBuf::from(value)),
                    "--ttl" => parsed.node_ttl = value.parse().unwrap_or_else(|_| usage(&args[0])),
                    _ => usage(&args[0]),
                }
            }
        }
    }

    match (folder, n_colors) {
        (Some(folder), Some(n_colors)) if n_colors > 0 => {
            parsed.folder = folder;
            parsed.n_colors = n_colors;
            parsed
        }
        _ => usage(&args[0]),
    }
}
