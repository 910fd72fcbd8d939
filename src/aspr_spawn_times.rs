// Spawn-time sets
//
// A spawn-time set is a strictly increasing list of positive ticks, one per
// node, stored newline-delimited so several strategies can be compared on the
// same arrivals.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::aspr_error::{Result, SimError};
use crate::aspr_interface::Tick;

pub const SPAWN_TIMES_FILE: &str = "spt.txt";

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidSpawnTimes {
        reason: reason.into(),
    }
}

/// Non-empty, positive and strictly increasing.
pub fn validate(times: &[Tick]) -> Result<()> {
    let Some(&first) = times.first() else {
        return Err(invalid("no spawn times"));
    };
    if first == 0 {
        return Err(invalid("spawn times must be positive"));
    }
    if let Some(pair) = times.windows(2).find(|w| w[1] <= w[0]) {
        return Err(invalid(format!(
            "spawn times must be strictly increasing ({} then {})",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

pub fn read<P: AsRef<Path>>(path: P) -> Result<Vec<Tick>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SimError::SpawnTimesNotFound(path.to_path_buf()));
    }

    let times = fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<Tick>()
                .map_err(|_| invalid(format!("'{}' is not a tick", line)))
        })
        .collect::<Result<Vec<_>>>()?;

    validate(&times)?;
    Ok(times)
}

pub fn save<P: AsRef<Path>>(path: P, times: &[Tick]) -> Result<()> {
    let body: Vec<String> = times.iter().map(|t| t.to_string()).collect();
    fs::write(path, body.join("\n"))?;
    Ok(())
}

/// `n` distinct ticks drawn from `1..window`, sorted.
pub fn random_unique(n: usize, window: Tick, seed: u64) -> Result<Vec<Tick>> {
    let available = window.saturating_sub(1) as usize;
    if n == 0 || n > available {
        return Err(invalid(format!(
            "cannot draw {} distinct spawn times from 1..{}",
            n, window
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut times: Vec<Tick> = rand::seq::index::sample(&mut rng, available, n)
        .into_iter()
        .map(|i| i as Tick + 1)
        .collect();
    times.sort_unstable();
    Ok(times)
}

/// Persist `times` as `root/identifier/spt.txt`. An identifier is never reused.
pub fn create_set<P: AsRef<Path>>(root: P, identifier: &str, times: &[Tick]) -> Result<PathBuf> {
    validate(times)?;
    let folder = root.as_ref().join(identifier);
    if folder.exists() {
        return Err(SimError::OutputExists(folder));
    }
    fs::create_dir_all(&folder)?;

    let path = folder.join(SPAWN_TIMES_FILE);
    save(&path, times)?;
    info!("Saved {} spawn times to {}", times.len(), path.display());
    Ok(path)
}
