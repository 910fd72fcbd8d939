// Spawn Times - Generate a reusable spawn-time set
//
// Usage:
//   cargo run --bin spawn_times -- -i small
//   cargo run --bin spawn_times -- -i large -n 200 -t 400 -s 3 --root outputs

use std::env;
use std::path::PathBuf;

use aspr::aspr_spawn_times;
use log::LevelFilter;
use simple_logger::SimpleLogger;

struct Args {
    identifier: String,
    n_nodes: usize,
    time_window: u64,
    seed: u64,
    root: PathBuf,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let parsed = parse_args(&args);

    SimpleLogger::new().with_level(LevelFilter::Info).init().unwrap_or_else(|e| {
        eprintln!("Failed to install logger: {}", e);
        std::process::exit(1);
    });

    let result = aspr_spawn_times::random_unique(parsed.n_nodes, parsed.time_window, parsed.seed)
        .and_then(|times| {
            aspr_spawn_times::create_set(&parsed.root, &parsed.identifier, &times)
                .map(|path| (times, path))
        });

    match result {
        Ok((times, path)) => {
            println!("Spawn times ({}): {:?}", times.len(), times);
            println!("\n✓ Saved to {}\n", path.display());
        }
        Err(e) => {
            eprintln!("Failed to create spawn-time set: {}", e);
            std::process::exit(1);
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} -i IDENTIFIER [-n N_NODES] [-t TIME_WINDOW] [-s SEED] [--root DIR]",
        program
    );
    eprintln!("\nDefaults: -n 20 -t 50 -s 0 --root outputs");
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args {
        identifier: String::new(),
        n_nodes: 20,
        time_window: 50,
        seed: 0,
        root: PathBuf::from("outputs"),
    };

    let mut iter = args.iter().skip(1);
    while let Some(flag) = iter.next() {
        let Some(value) = iter.next() else {
            usage(&args[0]);
        };
        match flag.as_str() {
            "-i" | "--identifier" => parsed.identifier = value.clone(),
            "-n" | "--n-nodes" => parsed.n_nodes = value.parse().unwrap_or_else(|_| usage(&args[0])),
            "-t" | "--time-window" => {
                parsed.time_window = value.parse().unwrap_or_else(|_| usage(&args[0]))
            }
            "-s" | "--seed" => parsed.seed = value.parse().unwrap_or_else(|_| usage(&args[0])),
            "--root" => parsed.root = PathBuf::from(value),
            _ => usage(&args[0]),
        }
    }

    if parsed.identifier.is_empty() {
        usage(&args[0]);
    }
    parsed
}
