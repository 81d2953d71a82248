//! Per-task sampling conditioned on a member's archetype.

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::error::{PromotionError, Result};
use crate::member::{task_id, Task};
use crate::profile::{Archetype, TaskCountBias, WeightTable};

/// Tasks are dated within this many days before the reference date.
pub const TASK_DATE_WINDOW_DAYS: i64 = 180;

/// Inclusive range of tasks a member may own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskRange {
    min: u32,
    max: u32,
}

impl TaskRange {
    /// Both ends must be at least 1 and `min <= max`.
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min < 1 {
            return Err(PromotionError::configuration(format!(
                "minimum task count must be at least 1, got {}",
                min
            )));
        }
        if min > max {
            return Err(PromotionError::configuration(format!(
                "invalid task range: min {} > max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, count: u32) -> bool {
        (self.min..=self.max).contains(&count)
    }

    /// Sub-range an archetype with the given bias draws from.
    pub fn biased_bounds(&self, bias: TaskCountBias) -> (u32, u32) {
        match bias {
            TaskCountBias::Upper => (self.min.max(self.max / 2), self.max),
            TaskCountBias::Uniform => (self.min, self.max),
            TaskCountBias::Lower => (self.min, self.max.min((self.min + 1).max(self.max / 2))),
        }
    }
}

impl Default for TaskRange {
    fn default() -> Self {
        Self { min: 3, max: 15 }
    }
}

/// Roll a value from a weight table.
pub fn roll<T: Copy + 'static>(table: &WeightTable<T>, rng: &mut impl Rng) -> T {
    let total: u32 = table.weights.iter().sum();
    let mut r = rng.gen_range(0..total);
    for (i, &weight) in table.weights.iter().enumerate() {
        if r < weight {
            return table.values[i];
        }
        r -= weight;
    }
    table.values[table.values.len() - 1]
}

/// Draw a bare task (mark and rating only) for the given archetype.
pub fn sample_task(archetype: Archetype, rng: &mut impl Rng) -> Task {
    let profile = archetype.profile();
    let mark = roll(&profile.mark_weights, rng);
    let rating = roll(&profile.rating_weights, rng);
    Task::new(task_id(0), mark, rating)
}

/// Draw how many tasks a member of this archetype completed.
pub fn sample_task_count(range: TaskRange, archetype: Archetype, rng: &mut impl Rng) -> u32 {
    let (lo, hi) = range.biased_bounds(archetype.profile().task_bias);
    rng.gen_range(lo..=hi)
}

/// Draws fully-populated tasks (id, type tag, completion date).
pub struct TaskSampler<'a> {
    task_types: &'a [String],
    reference_date: NaiveDate,
}

impl<'a> TaskSampler<'a> {
    pub fn new(task_types: &'a [String], reference_date: NaiveDate) -> Self {
        Self { task_types, reference_date }
    }

    /// Draw the `index`-th task of a member.
    pub fn sample(&self, archetype: Archetype, index: usize, rng: &mut impl Rng) -> Task {
        let mut task = sample_task(archetype, rng);
        task.task_id = task_id(index);
        if !self.task_types.is_empty() {
            let tag = &self.task_types[rng.gen_range(0..self.task_types.len())];
            task.task_type = Some(tag.clone());
        }
        let days_ago = rng.gen_range(1..=TASK_DATE_WINDOW_DAYS);
        task.date_completed = Some(self.reference_date - Duration::days(days_ago));
        task
    }

    /// Draw a member's whole task list.
    pub fn sample_all(
        &self,
        archetype: Archetype,
        range: TaskRange,
        rng: &mut impl Rng,
    ) -> Vec<Task> {
        let count = sample_task_count(range, archetype, rng);
        (0..count as usize)
            .map(|i| self.sample(archetype, i, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn average_mark(archetype: Archetype, rng: &mut ChaCha8Rng) -> f64 {
        let n = 10_000;
        (0..n).map(|_| sample_task(archetype, rng).mark as f64).sum::<f64>() / n as f64
    }

    #[test]
    fn test_task_range_validation() {
        assert!(TaskRange::new(3, 15).is_ok());
        assert!(TaskRange::new(4, 4).is_ok());
        assert!(matches!(TaskRange::new(0, 5), Err(PromotionError::Configuration { .. })));
        assert!(matches!(TaskRange::new(6, 5), Err(PromotionError::Configuration { .. })));
    }

    #[test]
    fn test_marks_follow_archetype_skew() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let high = average_mark(Archetype::HighPerformer, &mut rng);
        let avg = average_mark(Archetype::AveragePerformer, &mut rng);
        let low = average_mark(Archetype::LowPerformer, &mut rng);

        assert!(high >= 3.5, "high performer mean mark {}", high);
        assert!(low < 2.5, "low performer mean mark {}", low);
        assert!(high > avg && avg > low);
    }

    #[test]
    fn test_high_performers_still_get_low_marks() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lows = (0..5000)
            .filter(|_| sample_task(Archetype::HighPerformer, &mut rng).mark == 1)
            .count();
        assert!(lows > 0);
    }

    #[test]
    fn test_sampled_values_in_domain() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for archetype in Archetype::all() {
            for _ in 0..1000 {
                let task = sample_task(*archetype, &mut rng);
                assert!((1..=5).contains(&task.mark));
                assert!((-1..=3).contains(&task.rating));
                assert_eq!(task.score(), task.mark as i32 * task.rating as i32);
            }
        }
    }

    #[test]
    fn test_task_count_bias() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let range = TaskRange::new(3, 15).unwrap();
        let mean = |archetype, rng: &mut ChaCha8Rng| {
            (0..2000)
                .map(|_| sample_task_count(range, archetype, rng) as f64)
                .sum::<f64>()
                / 2000.0
        };
        let high = mean(Archetype::HighPerformer, &mut rng);
        let low = mean(Archetype::LowPerformer, &mut rng);
        assert!(high > 9.0, "high mean count {}", high);
        assert!(low < 6.0, "low mean count {}", low);
    }

    #[test]
    fn test_task_count_within_degenerate_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for (min, max) in [(1, 1), (5, 5), (1, 2), (7, 8), (10, 12)] {
            let range = TaskRange::new(min, max).unwrap();
            for archetype in Archetype::all() {
                for _ in 0..200 {
                    let count = sample_task_count(range, *archetype, &mut rng);
                    assert!(range.contains(count), "{} not in {:?}", count, range);
                }
            }
        }
    }

    #[test]
    fn test_sampler_fills_metadata() {
        let types = vec!["Financiar".to_string(), "Tineret".to_string()];
        let reference = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let sampler = TaskSampler::new(&types, reference);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let tasks = sampler.sample_all(Archetype::AveragePerformer, TaskRange::default(), &mut rng);
        assert!(TaskRange::default().contains(tasks.len() as u32));
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.task_id, task_id(i));
            assert!(types.contains(task.task_type.as_ref().unwrap()));
            let date = task.date_completed.unwrap();
            assert!(date < reference);
            assert!(date >= reference - Duration::days(TASK_DATE_WINDOW_DAYS));
        }
    }
}
