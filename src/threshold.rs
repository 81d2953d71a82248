//! Promotion cutoffs from a collection of scores.
//!
//! Three definitions are supported: an interpolated percentile, the median
//! (the 50th percentile) and the arithmetic mean. Every method qualifies the
//! scores at or above its cutoff.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PromotionError, Result};

/// Statistical definition used to derive a cutoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMethod {
    Percentile,
    Median,
    Mean,
}

impl ThresholdMethod {
    pub fn all() -> &'static [ThresholdMethod] {
        &[ThresholdMethod::Percentile, ThresholdMethod::Median, ThresholdMethod::Mean]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdMethod::Percentile => "percentile",
            ThresholdMethod::Median => "median",
            ThresholdMethod::Mean => "mean",
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdMethod {
    type Err = PromotionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentile" => Ok(ThresholdMethod::Percentile),
            "median" => Ok(ThresholdMethod::Median),
            "mean" => Ok(ThresholdMethod::Mean),
            other => Err(PromotionError::invalid_parameter(format!(
                "unrecognized threshold method '{}'",
                other
            ))),
        }
    }
}

/// Outcome of applying one method to a score collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub method: ThresholdMethod,
    /// Percentile the cutoff was taken at; `None` for the mean.
    pub target_percentile: Option<f64>,
    pub cutoff: f64,
    /// Indices into the input, highest score first; ties keep input order.
    pub qualifying: Vec<usize>,
    pub promoted_count: usize,
    pub promoted_percentage: f64,
    pub population_size: usize,
}

impl ThresholdResult {
    pub fn label(&self) -> String {
        match (self.method, self.target_percentile) {
            (ThresholdMethod::Percentile, Some(p)) => format!("percentile (p{})", trim_float(p)),
            (method, _) => method.to_string(),
        }
    }
}

/// Compute a cutoff and the members at or above it.
///
/// `target_percentile` is only consulted for [`ThresholdMethod::Percentile`];
/// the median always uses 50.
pub fn compute_threshold(
    scores: &[f64],
    method: ThresholdMethod,
    target_percentile: f64,
) -> Result<ThresholdResult> {
    if scores.is_empty() {
        return Err(PromotionError::insufficient_data(
            "cannot compute a threshold from an empty score collection",
        ));
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(PromotionError::invalid_parameter(format!(
            "scores must be finite, found {}",
            bad
        )));
    }

    let (cutoff, target) = match method {
        ThresholdMethod::Percentile => {
            validate_percentile(target_percentile)?;
            (percentile_of_sorted(&sorted(scores), target_percentile), Some(target_percentile))
        }
        ThresholdMethod::Median => (percentile_of_sorted(&sorted(scores), 50.0), Some(50.0)),
        ThresholdMethod::Mean => (scores.iter().sum::<f64>() / scores.len() as f64, None),
    };

    let qualifying = qualifying_at(scores, cutoff);
    let promoted_count = qualifying.len();
    tracing::debug!(%method, cutoff, promoted_count, n = scores.len(), "computed threshold");

    Ok(ThresholdResult {
        method,
        target_percentile: target,
        cutoff,
        promoted_percentage: promoted_count as f64 / scores.len() as f64 * 100.0,
        promoted_count,
        qualifying,
        population_size: scores.len(),
    })
}

/// Indices of scores `>= cutoff`, highest score first, ties in input order.
pub fn qualifying_at(scores: &[f64], cutoff: f64) -> Vec<usize> {
    let mut indices: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s >= cutoff)
        .map(|(i, _)| i)
        .collect();
    // Stable sort keeps input order among equal scores.
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    indices
}

/// Linearly interpolated percentile of an unsorted collection.
pub fn percentile(scores: &[f64], p: f64) -> Result<f64> {
    if scores.is_empty() {
        return Err(PromotionError::insufficient_data("percentile of an empty collection"));
    }
    validate_percentile(p)?;
    Ok(percentile_of_sorted(&sorted(scores), p))
}

/// Convert a "top X%" promotion share to the percentile whose cutoff
/// admits that share.
pub fn top_share_to_percentile(share: f64) -> Result<f64> {
    if !share.is_finite() || !(0.0..=100.0).contains(&share) {
        return Err(PromotionError::invalid_parameter(format!(
            "promotion share must be within [0, 100], got {}",
            share
        )));
    }
    Ok(100.0 - share)
}

fn validate_percentile(p: f64) -> Result<()> {
    if !p.is_finite() || !(0.0..=100.0).contains(&p) {
        return Err(PromotionError::invalid_parameter(format!(
            "target percentile must be within [0, 100], got {}",
            p
        )));
    }
    Ok(())
}

fn sorted(scores: &[f64]) -> Vec<f64> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Ranks this close to a whole number are treated as that number.
const RANK_EPSILON: f64 = 1e-9;

/// Zero-indexed rank `p/100 * (n-1)`, interpolated between neighbours.
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    // Multiply before dividing so whole-number ranks stay exact for integer p.
    let mut rank = p * (sorted.len() - 1) as f64 / 100.0;
    if (rank - rank.round()).abs() < RANK_EPSILON {
        rank = rank.round();
    }
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(sorted.len() - 1);
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
