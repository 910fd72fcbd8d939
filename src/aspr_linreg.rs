// Per-color linear cost predictors
//
// Offline: `train` fits one ordinary least-squares model per color from the
// rows whose decision was that color. Online: `LinearModel` is consumed
// through the `Predictor` capability by the linear decision strategy.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::aspr_error::{Result, SimError};
use crate::aspr_features::{feature_width, TrainingRow};
use crate::aspr_interface::{Color, Predictor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

/// Fitted models keyed by color, as persisted on disk (YAML).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModelSet {
    pub models: BTreeMap<Color, LinearModel>,
}

impl LinearModelSet {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading linear models: {}", path.as_ref().display());
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(BufReader::new(file))?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        info!("Saving linear models: {}", path.as_ref().display());
        let file = File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Every color needs a model of the right width.
    pub fn validate(&self, colors: &[Color]) -> Result<()> {
        let expected = feature_width(colors.len());
        for color in colors {
            let model = self
                .models
                .get(color)
                .ok_or(SimError::MissingPredictor(*color))?;
            if model.coefficients.len() != expected {
                return Err(SimError::FeatureMismatch {
                    expected,
                    found: model.coefficients.len(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Fitting
// ============================================================================

/// Fit one model per color.
pub fn train(rows: &[TrainingRow], colors: &[Color]) -> Result<LinearModelSet> {
    let mut set = LinearModelSet::default();
    for &color in colors {
        let color_rows: Vec<TrainingRow> = rows
            .iter()
            .filter(|r| r.decision == color)
            .cloned()
            .collect();
        info!("Training for color {}: {} rows", color, color_rows.len());
        let model = fit(&color_rows)?;
        let (mse, r2) = fit_quality(&model, &color_rows);
        debug!("c{} coefficients: {:?}", color, model);
        debug!("c{} mean squared error: {:.6}, r2: {:.4}", color, mse, r2);
        set.models.insert(color, model);
    }
    Ok(set)
}

/// Ordinary least squares with an intercept.
///
/// Features and losses are centered, the centered system is solved through
/// an SVD (minimum-norm solution), and the intercept is recovered from the
/// means. Columns that are constant across `rows` get a zero coefficient.
pub fn fit(rows: &[TrainingRow]) -> Result<LinearModel> {
    let Some(first) = rows.first() else {
        return Err(SimError::Training {
            reason: "no training rows".to_string(),
        });
    };
    let width = first.features.len();
    if let Some(bad) = rows.iter().find(|r| r.features.len() != width) {
        return Err(SimError::FeatureMismatch {
            expected: width,
            found: bad.features.len(),
        });
    }

    let n = rows.len();
    let x_mean: Vec<f64> = (0..width)
        .map(|j| rows.iter().map(|r| r.features[j]).sum::<f64>() / n as f64)
        .collect();
    let y_mean = rows.iter().map(|r| r.loss).sum::<f64>() / n as f64;

    let xc = DMatrix::from_fn(n, width, |i, j| rows[i].features[j] - x_mean[j]);
    let yc = DVector::from_iterator(n, rows.iter().map(|r| r.loss - y_mean));

    let svd = xc.svd(true, true);
    // same cutoff as numpy's lstsq default
    let eps = svd.singular_values.max() * f64::EPSILON * n.max(width) as f64;
    let beta = svd.solve(&yc, eps).map_err(|e| SimError::Training {
        reason: e.to_string(),
    })?;

    let intercept = y_mean - x_mean.iter().zip(beta.iter()).map(|(m, b)| m * b).sum::<f64>();
    Ok(LinearModel {
        intercept,
        coefficients: beta.iter().copied().collect(),
    })
}

/// In-sample mean squared error and coefficient of determination.
pub fn fit_quality(model: &LinearModel, rows: &[TrainingRow]) -> (f64, f64) {
    if rows.is_empty() {
        return (0.0, 0.0);
    }
    let n = rows.len() as f64;
    let mean = rows.iter().map(|r| r.loss).sum::<f64>() / n;
    let ss_res: f64 = rows
        .iter()
        .map(|r| (model.predict(&r.features) - r.loss).powi(2))
        .sum();
    let ss_tot: f64 = rows.iter().map(|r| (r.loss - mean).powi(2)).sum();

    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
    (ss_res / n, r2)
}
