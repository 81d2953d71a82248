//! Stratified population generation.
//!
//! A population of the requested size is split across archetypes by ratio,
//! the per-archetype counts are reconciled so they sum exactly to the size,
//! and each member is synthesized with the task sampler.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{PromotionError, Result};
use crate::member::{Member, MemberStatus};
use crate::names::{NamePool, NameRegistry};
use crate::profile::Archetype;
use crate::sampler::{TaskRange, TaskSampler};
use crate::threshold::ThresholdResult;

/// How far the ratio sum may stray from 1.0.
pub const RATIO_TOLERANCE: f64 = 0.01;

/// Members join at most this many days before their first task.
pub const MAX_JOIN_LEAD_DAYS: i64 = 730;

/// Reference date used when a caller does not supply one.
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

/// Fraction of the population assigned to each archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributionRatios {
    pub high: f64,
    pub average: f64,
    pub low: f64,
}

impl DistributionRatios {
    pub fn new(high: f64, average: f64, low: f64) -> Self {
        Self { high, average, low }
    }

    /// Build from an archetype map; missing archetypes get 0.
    pub fn from_map(map: &BTreeMap<Archetype, f64>) -> Self {
        let get = |a| map.get(&a).copied().unwrap_or(0.0);
        Self::new(
            get(Archetype::HighPerformer),
            get(Archetype::AveragePerformer),
            get(Archetype::LowPerformer),
        )
    }

    pub fn get(&self, archetype: Archetype) -> f64 {
        match archetype {
            Archetype::HighPerformer => self.high,
            Archetype::AveragePerformer => self.average,
            Archetype::LowPerformer => self.low,
        }
    }

    pub fn sum(&self) -> f64 {
        self.high + self.average + self.low
    }

    /// Each ratio finite and non-negative, sum within tolerance of 1.0.
    pub fn validate(&self) -> Result<()> {
        for archetype in Archetype::all() {
            let r = self.get(*archetype);
            if !r.is_finite() || r < 0.0 {
                return Err(PromotionError::configuration(format!(
                    "ratio for {} must be a non-negative number, got {}",
                    archetype, r
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(PromotionError::configuration(format!(
                "distribution ratios must sum to 1.0, got {:.4}",
                sum
            )));
        }
        Ok(())
    }
}

impl Default for DistributionRatios {
    fn default() -> Self {
        Self::new(0.20, 0.60, 0.20)
    }
}

/// Split `size` members across archetypes.
///
/// Ratios are normalised by their sum, each count is floored, and the
/// leftover members go to the archetypes with the largest fractional parts
/// (ties resolved in canonical archetype order). The counts always sum to
/// `size`.
pub fn allocate_counts(size: usize, ratios: &DistributionRatios) -> Result<Vec<(Archetype, usize)>> {
    if size == 0 {
        return Err(PromotionError::configuration("population size must be positive"));
    }
    ratios.validate()?;

    let sum = ratios.sum();
    let exact: Vec<f64> = Archetype::all()
        .iter()
        .map(|a| ratios.get(*a) / sum * size as f64)
        .collect();
    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = counts.iter().sum();
    let mut remainder = size.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    let mut i = 0;
    while remainder > 0 {
        counts[order[i % order.len()]] += 1;
        remainder -= 1;
        i += 1;
    }

    Ok(Archetype::all().iter().copied().zip(counts).collect())
}

/// An ordered, fixed-size collection of generated members.
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    pub members: Vec<Member>,
    pub reference_date: NaiveDate,
}

impl Population {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    /// Total scores in population order.
    pub fn scores(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.total_score() as f64).collect()
    }

    pub fn archetype_counts(&self) -> BTreeMap<Archetype, usize> {
        let mut counts = BTreeMap::new();
        for m in &self.members {
            *counts.entry(m.archetype).or_insert(0) += 1;
        }
        counts
    }

    /// Members selected by a threshold result computed on `self.scores()`,
    /// in the result's order.
    pub fn qualifying_members(&self, result: &ThresholdResult) -> Vec<&Member> {
        result
            .qualifying
            .iter()
            .filter_map(|&i| self.members.get(i))
            .collect()
    }

    /// Copy of this population with qualifying members marked active.
    pub fn with_promotions(&self, result: &ThresholdResult) -> Population {
        let mut promoted = self.clone();
        for &i in &result.qualifying {
            if let Some(member) = promoted.members.get_mut(i) {
                member.status = MemberStatus::ActiveVolunteer;
            }
        }
        promoted
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// Generates populations against a fixed name registry and reference date.
#[derive(Clone, Debug)]
pub struct PopulationGenerator {
    registry: NameRegistry,
    reference_date: NaiveDate,
}

impl PopulationGenerator {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            registry: NameRegistry::defaults(),
            reference_date,
        }
    }

    pub fn with_registry(mut self, registry: NameRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Generate `size` members. Validation happens before any member is
    /// built, so an error never leaves a partial population behind.
    pub fn generate(
        &self,
        size: usize,
        ratios: &DistributionRatios,
        task_range: TaskRange,
        rng: &mut impl Rng,
    ) -> Result<Population> {
        let counts = allocate_counts(size, ratios)?;
        tracing::debug!(?counts, size, "allocated archetype counts");

        let mut assignments: Vec<Archetype> = counts
            .iter()
            .flat_map(|&(archetype, n)| std::iter::repeat(archetype).take(n))
            .collect();
        assignments.shuffle(rng);

        let mut names = NamePool::new(&self.registry);
        let sampler = TaskSampler::new(&self.registry.task_types, self.reference_date);

        let mut members = Vec::with_capacity(size);
        for archetype in assignments {
            let name = names.draw(rng);
            let tasks = sampler.sample_all(archetype, task_range, rng);
            let first_task = tasks
                .iter()
                .filter_map(|t| t.date_completed)
                .min()
                .unwrap_or(self.reference_date);
            let lead = rng.gen_range(0..=MAX_JOIN_LEAD_DAYS);
            members.push(Member {
                name,
                archetype,
                tasks,
                joined: first_task - Duration::days(lead),
                status: MemberStatus::Volunteer,
            });
        }

        if names.has_repeated() {
            tracing::warn!(size, "name pool exhausted; some names repeat");
        }
        tracing::info!(
            members = members.len(),
            min_tasks = task_range.min(),
            max_tasks = task_range.max(),
            "generated population"
        );

        Ok(Population {
            members,
            reference_date: self.reference_date,
        })
    }
}

impl Default for PopulationGenerator {
    fn default() -> Self {
        Self::new(default_reference_date())
    }
}

/// Generate a population with the default registry and reference date.
pub fn generate_population(
    size: usize,
    ratios: &DistributionRatios,
    task_range: TaskRange,
    rng: &mut impl Rng,
) -> Result<Population> {
    PopulationGenerator::default().generate(size, ratios, task_range, rng)
}

/// Generate a population from a seed. Identical inputs give identical output.
pub fn generate_population_seeded(
    size: usize,
    ratios: &DistributionRatios,
    task_range: TaskRange,
    seed: u64,
) -> Result<Population> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_population(size, ratios, task_range, &mut rng)
}
