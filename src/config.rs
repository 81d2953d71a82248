//! Configuration for dataset generation and analysis runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compare::COMMON_TOP_SHARES;
use crate::error::{DatasetError, PromotionError, Result};
use crate::population::DistributionRatios;
use crate::sampler::TaskRange;

/// Parameters for generating a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of volunteers to generate (default: 50).
    pub size: usize,

    /// Fraction of high performers (default: 0.20).
    pub high_performers: f64,

    /// Fraction of low performers (default: 0.20). The rest are average.
    pub low_performers: f64,

    /// Minimum tasks per volunteer (default: 3).
    pub min_tasks: u32,

    /// Maximum tasks per volunteer (default: 15).
    pub max_tasks: u32,

    /// Random seed; a random one is drawn when absent.
    pub seed: Option<u64>,

    /// Output filename prefix (default: "volunteers").
    pub output: String,

    /// Also write the detailed JSON with every task.
    pub detailed: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size: 50,
            high_performers: 0.20,
            low_performers: 0.20,
            min_tasks: 3,
            max_tasks: 15,
            seed: None,
            output: "volunteers".to_string(),
            detailed: false,
        }
    }
}

impl GeneratorConfig {
    /// Archetype ratios; average performers take whatever high and low leave.
    pub fn ratios(&self) -> Result<DistributionRatios> {
        let average = 1.0 - self.high_performers - self.low_performers;
        if average < -crate::population::RATIO_TOLERANCE {
            return Err(PromotionError::configuration(format!(
                "high ({}) and low ({}) performer fractions sum to more than 1.0",
                self.high_performers, self.low_performers
            )));
        }
        Ok(DistributionRatios::new(self.high_performers, average.max(0.0), self.low_performers))
    }

    pub fn task_range(&self) -> Result<TaskRange> {
        TaskRange::new(self.min_tasks, self.max_tasks)
    }

    pub fn load(path: &Path) -> std::result::Result<Self, DatasetError> {
        load_json(path)
    }
}

/// Parameters for an analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Share of volunteers to promote, as "top X%" (default: 10.0).
    pub top_share: f64,

    /// Shares the chosen one is compared against.
    pub common_shares: Vec<f64>,

    /// Only analyze volunteers scoring at least this much.
    pub min_score: Option<f64>,

    /// Fixed score probed at the end of the report (default: 40).
    pub probe_score: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_share: 10.0,
            common_shares: COMMON_TOP_SHARES.to_vec(),
            min_score: None,
            probe_score: 40.0,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> std::result::Result<Self, DatasetError> {
        load_json(path)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> std::result::Result<T, DatasetError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.size, 50);
        let ratios = config.ratios().unwrap();
        assert!((ratios.average - 0.6).abs() < 1e-12);
        assert_eq!(config.task_range().unwrap(), TaskRange::new(3, 15).unwrap());
    }

    #[test]
    fn test_overfull_fractions_rejected() {
        let config = GeneratorConfig {
            high_performers: 0.7,
            low_performers: 0.5,
            ..Default::default()
        };
        assert!(matches!(config.ratios(), Err(PromotionError::Configuration { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"size": 200, "seed": 7}"#).unwrap();
        assert_eq!(config.size, 200);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_tasks, 15);

        let analysis: AnalysisConfig = serde_json::from_str(r#"{"min_score": 12.5}"#).unwrap();
        assert_eq!(analysis.min_score, Some(12.5));
        assert_eq!(analysis.top_share, 10.0);
        assert_eq!(analysis.common_shares, vec![10.0, 25.0, 50.0]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        std::fs::write(&path, r#"{"size": 80, "high_performers": 0.3, "output": "run1"}"#).unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.size, 80);
        assert_eq!(config.output, "run1");
        assert!((config.ratios().unwrap().average - 0.5).abs() < 1e-12);

        let path = dir.path().join("analysis.json");
        std::fs::write(&path, r#"{"top_share": 25, "probe_score": 55}"#).unwrap();
        let analysis = AnalysisConfig::load(&path).unwrap();
        assert_eq!(analysis.top_share, 25.0);
        assert_eq!(analysis.probe_score, 55.0);
        assert_eq!(analysis.min_score, None);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(GeneratorConfig::load(&missing), Err(DatasetError::Io(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ size: ").unwrap();
        assert!(matches!(AnalysisConfig::load(&path), Err(DatasetError::Json(_))));
    }
}
