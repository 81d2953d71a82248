//! Tasks and members: the records a generated population is made of.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::profile::Archetype;

/// One scored unit of work.
///
/// The score is always `mark * rating` and is derived on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub task_id: String,
    /// 1-5
    pub mark: u8,
    /// -1 to 3
    pub rating: i8,
    pub task_type: Option<String>,
    pub date_completed: Option<NaiveDate>,
}

impl Task {
    pub fn new(task_id: impl Into<String>, mark: u8, rating: i8) -> Self {
        Self {
            task_id: task_id.into(),
            mark,
            rating,
            task_type: None,
            date_completed: None,
        }
    }

    pub fn score(&self) -> i32 {
        self.mark as i32 * self.rating as i32
    }
}

/// Format the id of the `index`-th task (zero based) of a member.
pub fn task_id(index: usize) -> String {
    format!("T{:03}", index + 1)
}

/// Membership status label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Volunteer,
    ActiveVolunteer,
}

impl MemberStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MemberStatus::Volunteer => "volunteer",
            MemberStatus::ActiveVolunteer => "active volunteer",
        }
    }
}

/// A synthesized volunteer and the tasks they own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub archetype: Archetype,
    pub tasks: Vec<Task>,
    pub joined: NaiveDate,
    pub status: MemberStatus,
}

impl Member {
    /// Sum of all task scores.
    pub fn total_score(&self) -> i32 {
        self.tasks.iter().map(Task::score).sum()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn average_mark(&self) -> f64 {
        mean(self.tasks.iter().map(|t| t.mark as f64), self.tasks.len())
    }

    pub fn average_rating(&self) -> f64 {
        mean(self.tasks.iter().map(|t| t.rating as f64), self.tasks.len())
    }
}

fn mean(values: impl Iterator<Item = f64>, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.sum::<f64>() / len as f64
}

/// Round to two decimals, the precision summary metrics are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(tasks: Vec<Task>) -> Member {
        Member {
            name: "Ana Popa".to_string(),
            archetype: Archetype::AveragePerformer,
            tasks,
            joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: MemberStatus::Volunteer,
        }
    }

    #[test]
    fn test_task_score_is_product() {
        assert_eq!(Task::new("T001", 5, 3).score(), 15);
        assert_eq!(Task::new("T002", 4, -1).score(), -4);
        assert_eq!(Task::new("T003", 2, 0).score(), 0);
    }

    #[test]
    fn test_derived_metrics() {
        let m = member(vec![
            Task::new("T001", 5, 3),
            Task::new("T002", 2, -1),
            Task::new("T003", 3, 1),
        ]);
        assert_eq!(m.total_score(), 15 - 2 + 3);
        assert_eq!(m.task_count(), 3);
        assert!((m.average_mark() - 10.0 / 3.0).abs() < 1e-12);
        assert!((m.average_rating() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_task_id_format() {
        assert_eq!(task_id(0), "T001");
        assert_eq!(task_id(41), "T042");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-0.456), -0.46);
    }
}
