//! Feature vectors for the linear predictor.
//!
//! Layout, for a color set of size `k`:
//! `[c0-n-active .. c{k-1}-n-active, c0-total-ttl .. c{k-1}-total-ttl, decision]`.
//! The realized loss is the regression target and never part of the input.

use std::collections::HashMap;

use log::{debug, warn};

use crate::aspr_error::{Result, SimError};
use crate::aspr_export::StateRecord;
use crate::aspr_interface::{Color, Tick};
use crate::aspr_state::StateStatistics;

pub fn feature_width(n_colors: usize) -> usize {
    2 * n_colors + 1
}

pub fn build_features(stats: &StateStatistics, decision: Color) -> Vec<f64> {
    let mut features = Vec::with_capacity(feature_width(stats.colors.len()));
    features.extend(stats.active.iter().map(|&n| n as f64));
    features.extend(stats.total_ttl.iter().map(|&ttl| ttl as f64));
    features.push(decision as f64);
    features
}

/// One observed decision and what it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub features: Vec<f64>,
    pub decision: Color,
    pub loss: f64,
}

/// Turn a recorded run into (features, decision, loss) rows.
///
/// For the k-th spawn instant `t`: the decision is node k's color at `t`; the
/// features are the row at `t - 1` (what the strategy saw); the loss is the
/// mean score over `t ..= t + node_ttl` minus the score at `t - 1`.
pub fn extract_training_rows(
    records: &[StateRecord],
    spawn_times: &[Tick],
    node_ttl: u32,
) -> Result<Vec<TrainingRow>> {
    let by_tick: HashMap<Tick, &StateRecord> = records.iter().map(|r| (r.t, r)).collect();
    let mut rows = Vec::with_capacity(spawn_times.len());

    for (spawn_num, &t) in spawn_times.iter().enumerate() {
        let (Some(before), Some(at)) = (by_tick.get(&(t.saturating_sub(1))), by_tick.get(&t))
        else {
            return Err(SimError::InvalidRecord {
                reason: format!("no recorded ticks around spawn instant {}", t),
            });
        };

        let Some(decision) = at.nodes.get(spawn_num).and_then(|n| n.color()) else {
            warn!("spawn {} at t={} has no assigned color, skipping", spawn_num, t);
            continue;
        };

        let window: Vec<f64> = (t..=t + node_ttl as Tick)
            .filter_map(|tick| by_tick.get(&tick).map(|r| r.score))
            .collect();
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let loss = mean - before.score;

        debug!(
            "spawn {} at t={}: decision c{}, loss {:.3}",
            spawn_num, t, decision, loss
        );

        rows.push(TrainingRow {
            features: build_features(&before.stats, decision),
            decision,
            loss,
        });
    }

    Ok(rows)
}
