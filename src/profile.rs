//! Performance archetypes and the sampling parameters each one imposes.
//!
//! Every weight table used by the task sampler lives here; nothing else in
//! the crate hard-codes archetype skew.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PromotionError;

/// Lowest and highest mark a task can receive.
pub const MARK_RANGE: (u8, u8) = (1, 5);
/// Lowest and highest rating a task can receive.
pub const RATING_RANGE: (i8, i8) = (-1, 3);

/// One of the three behavioural profiles used to bias synthetic sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    HighPerformer,
    AveragePerformer,
    LowPerformer,
}

impl Archetype {
    /// All archetypes in canonical order.
    pub fn all() -> &'static [Archetype] {
        &[
            Archetype::HighPerformer,
            Archetype::AveragePerformer,
            Archetype::LowPerformer,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::HighPerformer => "high_performer",
            Archetype::AveragePerformer => "average_performer",
            Archetype::LowPerformer => "low_performer",
        }
    }

    /// Sampling parameters for this archetype.
    pub fn profile(&self) -> &'static ArchetypeProfile {
        match self {
            Archetype::HighPerformer => &HIGH_PERFORMER,
            Archetype::AveragePerformer => &AVERAGE_PERFORMER,
            Archetype::LowPerformer => &LOW_PERFORMER,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Archetype {
    type Err = PromotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "high_performer" | "high" => Ok(Archetype::HighPerformer),
            "average_performer" | "average" => Ok(Archetype::AveragePerformer),
            "low_performer" | "low" => Ok(Archetype::LowPerformer),
            other => Err(PromotionError::invalid_parameter(format!(
                "unrecognized archetype '{}'",
                other
            ))),
        }
    }
}

/// Where in the configured task-count range an archetype tends to land.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskCountBias {
    /// Upper half of the range.
    Upper,
    /// Anywhere in the range.
    Uniform,
    /// Lower half of the range.
    Lower,
}

/// Bounded discrete distribution: parallel value/weight arrays.
///
/// Weights are integer percentages; they need not sum to 100 but must not
/// all be zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightTable<T: 'static> {
    pub values: &'static [T],
    pub weights: &'static [u32],
}

impl<T: Copy + Into<f64>> WeightTable<T> {
    pub fn total_weight(&self) -> u32 {
        self.weights.iter().sum()
    }

    /// Expected value of a draw from this table.
    pub fn expected_value(&self) -> f64 {
        let total = self.total_weight() as f64;
        self.values
            .iter()
            .zip(self.weights)
            .map(|(&v, &w)| v.into() * w as f64)
            .sum::<f64>()
            / total
    }
}

/// Sampling parameters for one archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub mark_weights: WeightTable<u8>,
    pub rating_weights: WeightTable<i8>,
    pub task_bias: TaskCountBias,
}

const MARKS: [u8; 5] = [1, 2, 3, 4, 5];
const RATINGS: [i8; 5] = [-1, 0, 1, 2, 3];

// Favors marks 4-5 and ratings 2-3
static HIGH_PERFORMER: ArchetypeProfile = ArchetypeProfile {
    mark_weights: WeightTable { values: &MARKS, weights: &[5, 10, 25, 35, 25] },
    rating_weights: WeightTable { values: &RATINGS, weights: &[5, 10, 20, 35, 30] },
    task_bias: TaskCountBias::Upper,
};

static AVERAGE_PERFORMER: ArchetypeProfile = ArchetypeProfile {
    mark_weights: WeightTable { values: &MARKS, weights: &[10, 20, 40, 20, 10] },
    rating_weights: WeightTable { values: &RATINGS, weights: &[10, 15, 30, 30, 15] },
    task_bias: TaskCountBias::Uniform,
};

// Favors marks 1-2 and ratings -1 to 1
static LOW_PERFORMER: ArchetypeProfile = ArchetypeProfile {
    mark_weights: WeightTable { values: &MARKS, weights: &[30, 35, 25, 8, 2] },
    rating_weights: WeightTable { values: &RATINGS, weights: &[25, 35, 25, 10, 5] },
    task_bias: TaskCountBias::Lower,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_well_formed() {
        for archetype in Archetype::all() {
            let profile = archetype.profile();
            assert_eq!(profile.mark_weights.values.len(), profile.mark_weights.weights.len());
            assert_eq!(profile.rating_weights.values.len(), profile.rating_weights.weights.len());
            assert_eq!(profile.mark_weights.total_weight(), 100);
            assert_eq!(profile.rating_weights.total_weight(), 100);
            assert!(profile
                .mark_weights
                .values
                .iter()
                .all(|m| (MARK_RANGE.0..=MARK_RANGE.1).contains(m)));
            assert!(profile
                .rating_weights
                .values
                .iter()
                .all(|r| (RATING_RANGE.0..=RATING_RANGE.1).contains(r)));
        }
    }

    #[test]
    fn test_expected_values_are_ordered() {
        let high = Archetype::HighPerformer.profile();
        let avg = Archetype::AveragePerformer.profile();
        let low = Archetype::LowPerformer.profile();

        assert!(high.mark_weights.expected_value() >= 3.5);
        assert!((avg.mark_weights.expected_value() - 3.0).abs() < 1e-9);
        assert!(low.mark_weights.expected_value() < 2.5);

        assert!(high.rating_weights.expected_value() > avg.rating_weights.expected_value());
        assert!(avg.rating_weights.expected_value() > low.rating_weights.expected_value());
    }

    #[test]
    fn test_parse_archetype() {
        assert_eq!("high_performer".parse::<Archetype>(), Ok(Archetype::HighPerformer));
        assert_eq!("Average-Performer".parse::<Archetype>(), Ok(Archetype::AveragePerformer));
        assert_eq!("low".parse::<Archetype>(), Ok(Archetype::LowPerformer));
        assert!(matches!(
            "superstar".parse::<Archetype>(),
            Err(PromotionError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for archetype in Archetype::all() {
            assert_eq!(archetype.to_string().parse::<Archetype>(), Ok(*archetype));
        }
    }
}
