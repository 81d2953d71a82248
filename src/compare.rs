//! Side-by-side comparison of threshold methods.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::threshold::{compute_threshold, top_share_to_percentile, ThresholdMethod, ThresholdResult};

/// Percentile used by [`compare_methods`]; promotes roughly the top 10%.
pub const DEFAULT_TARGET_PERCENTILE: f64 = 90.0;

/// Promotion shares the chosen share is compared against by default.
pub const COMMON_TOP_SHARES: [f64; 3] = [10.0, 25.0, 50.0];

/// All three methods applied to the same scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    pub percentile: ThresholdResult,
    pub median: ThresholdResult,
    pub mean: ThresholdResult,
}

impl MethodComparison {
    pub fn get(&self, method: ThresholdMethod) -> &ThresholdResult {
        match method {
            ThresholdMethod::Percentile => &self.percentile,
            ThresholdMethod::Median => &self.median,
            ThresholdMethod::Mean => &self.mean,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThresholdResult> {
        [&self.percentile, &self.median, &self.mean].into_iter()
    }
}

pub fn compare_methods(scores: &[f64]) -> Result<MethodComparison> {
    compare_methods_at(scores, DEFAULT_TARGET_PERCENTILE)
}

pub fn compare_methods_at(scores: &[f64], target_percentile: f64) -> Result<MethodComparison> {
    Ok(MethodComparison {
        percentile: compute_threshold(scores, ThresholdMethod::Percentile, target_percentile)?,
        median: compute_threshold(scores, ThresholdMethod::Median, target_percentile)?,
        mean: compute_threshold(scores, ThresholdMethod::Mean, target_percentile)?,
    })
}

/// One row of a [`ShareComparison`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareEntry {
    /// "Top X%" share this row targets; `None` for median and mean rows.
    pub top_share: Option<f64>,
    pub result: ThresholdResult,
}

/// A chosen "top X%" promotion share against common shares and the
/// median and mean cutoffs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShareComparison {
    pub chosen: ShareEntry,
    pub common: Vec<ShareEntry>,
    pub median: ThresholdResult,
    pub mean: ThresholdResult,
}

impl ShareComparison {
    /// Chosen promoted count minus the other row's promoted count.
    pub fn delta(&self, other: &ThresholdResult) -> i64 {
        self.chosen.result.promoted_count as i64 - other.promoted_count as i64
    }

    pub fn median_delta(&self) -> i64 {
        self.delta(&self.median)
    }

    pub fn mean_delta(&self) -> i64 {
        self.delta(&self.mean)
    }
}

/// Compare the chosen share against `common_shares` (duplicates of the
/// chosen share are skipped) plus the median and mean.
pub fn compare_top_shares(
    scores: &[f64],
    chosen_share: f64,
    common_shares: &[f64],
) -> Result<ShareComparison> {
    let entry = |share: f64| -> Result<ShareEntry> {
        let p = top_share_to_percentile(share)?;
        Ok(ShareEntry {
            top_share: Some(share),
            result: compute_threshold(scores, ThresholdMethod::Percentile, p)?,
        })
    };

    let chosen = entry(chosen_share)?;
    let mut common = Vec::new();
    for &share in common_shares {
        if share != chosen_share {
            common.push(entry(share)?);
        }
    }
    let methods = compare_methods_at(scores, top_share_to_percentile(chosen_share)?)?;

    Ok(ShareComparison {
        chosen,
        common,
        median: methods.median,
        mean: methods.mean,
    })
}
