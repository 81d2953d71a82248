//! Descriptive statistics for analysis reports.

use serde::Serialize;

use crate::dataset::ScoreRecord;
use crate::error::{PromotionError, Result};
use crate::threshold::percentile;

/// Percentiles listed in analysis reports.
pub const REPORT_PERCENTILES: [f64; 6] = [10.0, 25.0, 50.0, 75.0, 90.0, 95.0];

/// Count, centre and spread of one metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); 0 for fewer than two values.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(PromotionError::insufficient_data("summary of an empty collection"));
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        Ok(Self {
            count: values.len(),
            mean,
            median: percentile(values, 50.0)?,
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// `(p, value)` pairs for each requested percentile.
pub fn percentile_table(values: &[f64], percentiles: &[f64]) -> Result<Vec<(f64, f64)>> {
    percentiles
        .iter()
        .map(|&p| percentile(values, p).map(|v| (p, v)))
        .collect()
}

/// Metrics a dataset summary row carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    TotalScore,
    AverageMark,
    AverageRating,
    TasksCompleted,
}

impl Metric {
    pub fn all() -> &'static [Metric] {
        &[
            Metric::TotalScore,
            Metric::AverageMark,
            Metric::AverageRating,
            Metric::TasksCompleted,
        ]
    }

    /// Column name used in CSV files and reports.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::TotalScore => "Total_Score",
            Metric::AverageMark => "Average_Mark",
            Metric::AverageRating => "Average_Rating",
            Metric::TasksCompleted => "Tasks_Completed",
        }
    }

    pub fn values(&self, records: &[ScoreRecord]) -> Vec<f64> {
        records
            .iter()
            .map(|r| match self {
                Metric::TotalScore => r.total_score,
                Metric::AverageMark => r.average_mark,
                Metric::AverageRating => r.average_rating,
                Metric::TasksCompleted => r.tasks_completed as f64,
            })
            .collect()
    }
}

/// Pearson correlation; 0 when either side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(PromotionError::invalid_parameter(format!(
            "correlation needs equal lengths, got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(PromotionError::insufficient_data("correlation of empty collections"));
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / (vx.sqrt() * vy.sqrt()))
}

/// Pairwise correlations between every [`Metric`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major, `metrics.len()` squared entries.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == a)?;
        let j = self.metrics.iter().position(|m| *m == b)?;
        self.values.get(i * self.metrics.len() + j).copied()
    }
}

pub fn correlation_matrix(records: &[ScoreRecord]) -> Result<CorrelationMatrix> {
    if records.is_empty() {
        return Err(PromotionError::insufficient_data("correlation of an empty dataset"));
    }
    let metrics = Metric::all().to_vec();
    let columns: Vec<Vec<f64>> = metrics.iter().map(|m| m.values(records)).collect();
    let mut values = Vec::with_capacity(metrics.len() * metrics.len());
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate() {
            if i == j {
                values.push(1.0);
                continue;
            }
            values.push(pearson(a, b)?);
        }
    }
    Ok(CorrelationMatrix { metrics, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(total: f64, tasks: u32, mark: f64, rating: f64) -> ScoreRecord {
        ScoreRecord {
            name: "x".into(),
            total_score: total,
            tasks_completed: tasks,
            average_mark: mark,
            average_rating: rating,
        }
    }

    #[test]
    fn test_summary() {
        let s = Summary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.median, 4.5);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        // sum of squared deviations = 32, n - 1 = 7
        assert!((s.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);

        let single = Summary::of(&[3.0]).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert!(Summary::of(&[]).is_err());
    }

    #[test]
    fn test_percentile_table() {
        let values: Vec<f64> = (1..=11).map(|v| v as f64).collect();
        let table = percentile_table(&values, &[0.0, 50.0, 100.0]).unwrap();
        assert_eq!(table, vec![(0.0, 1.0), (50.0, 6.0), (100.0, 11.0)]);
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[5.0; 4]).unwrap(), 0.0);
        assert!(pearson(&xs, &[1.0]).is_err());
    }

    #[test]
    fn test_correlation_matrix() {
        let records = vec![
            record(10.0, 3, 2.0, 1.0),
            record(20.0, 5, 3.0, 1.5),
            record(40.0, 9, 4.0, 2.0),
        ];
        let m = correlation_matrix(&records).unwrap();
        assert_eq!(m.values.len(), 16);
        assert_eq!(m.get(Metric::TotalScore, Metric::TotalScore), Some(1.0));
        let a = m.get(Metric::TotalScore, Metric::TasksCompleted).unwrap();
        let b = m.get(Metric::TasksCompleted, Metric::TotalScore).unwrap();
        assert!((a - b).abs() < 1e-12);
        assert!(a > 0.9);
    }
}
