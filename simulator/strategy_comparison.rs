// Strategy Comparison - greedy vs random vs round-robin on shared arrivals
//
// Everything runs in memory: no spawn-time file, no CSV output.
//
// Usage:
//   cargo run --example strategy_comparison
//   cargo run --example strategy_comparison -- 40 80 5   (nodes, window, runs)

use std::env;

use aspr::aspr_spawn_times::random_unique;
use aspr::{color_range, BinaryInterference, Scenario, StrategyConfig, Tick};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const N_COLORS: usize = 4;

fn main() {
    SimpleLogger::new().with_level(LevelFilter::Warn).init().unwrap();

    let args: Vec<u64> = env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let n_nodes = args.first().copied().unwrap_or(20) as usize;
    let window = args.get(1).copied().unwrap_or(50) as Tick;
    let n_runs = args.get(2).copied().unwrap_or(10);

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  STRATEGY COMPARISON                                   ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("  Nodes: {}  Window: 1..{}  Colors: {}  Runs: {}\n", n_nodes, window, N_COLORS, n_runs);

    let strategies = [
        StrategyConfig::Greedy { ps: 1 },
        StrategyConfig::Greedy { ps: 5 },
        StrategyConfig::Random,
        StrategyConfig::RoundRobin,
    ];

    println!("  {:<12} {:>12} {:>12} {:>12}", "strategy", "mean", "best", "worst");
    println!("  {}", "─".repeat(51));

    for config in &strategies {
        let mut strategy = config.build(color_range(N_COLORS)).unwrap();
        let mut scores = Vec::new();

        for seed in 0..n_runs {
            // every strategy sees the same arrivals for a given seed
            let spawn_times = random_unique(n_nodes, window, seed).unwrap();
            strategy.reseed(seed);

            let mut scenario = Scenario::new(
                format!("{}-{}", config.name(), seed),
                n_nodes,
                spawn_times,
                color_range(N_COLORS),
                strategy.as_mut(),
                Box::new(BinaryInterference),
            );
            scenario.run();
            scores.push(scenario.score());
        }

        let mean = scores.iter().sum::<f64>() / scores.len().max(1) as f64;
        let best = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let worst = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let label = match config {
            StrategyConfig::Greedy { ps } => format!("greedy(ps={})", ps),
            other => other.name().to_string(),
        };
        println!("  {:<12} {:>12.1} {:>12.1} {:>12.1}", label, mean, best, worst);
    }

    println!("\n✓ Comparison complete! (lower is better)\n");
}
