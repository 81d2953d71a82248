//! Name and task-type registry.
//!
//! The default lists are embedded in the binary via `include_str!`; a JSON
//! file with the same shape can replace them at runtime.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

const DEFAULT_NAMES_JSON: &str = include_str!("../data/names.json");

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FirstNames {
    pub male: Vec<String>,
    pub female: Vec<String>,
}

/// Read-only lookup tables used while generating members.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameRegistry {
    pub first_names: FirstNames,
    pub last_names: Vec<String>,
    #[serde(default)]
    pub task_types: Vec<String>,
}

impl NameRegistry {
    /// Load the lists compiled into the binary.
    pub fn defaults() -> Self {
        serde_json::from_str(DEFAULT_NAMES_JSON).expect("Failed to parse embedded names.json")
    }

    /// Load a registry from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        let registry: NameRegistry = serde_json::from_str(&contents)?;
        if registry.capacity() == 0 {
            return Err(DatasetError::Empty);
        }
        Ok(registry)
    }

    /// Every distinct "First Last" combination, in list order.
    pub fn full_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for first in self.first_names.male.iter().chain(&self.first_names.female) {
            for last in &self.last_names {
                let name = format!("{} {}", first, last);
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Upper bound on distinct names this registry can produce.
    pub fn capacity(&self) -> usize {
        (self.first_names.male.len() + self.first_names.female.len()) * self.last_names.len()
    }
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Per-run name source.
///
/// Names are drawn without replacement until every combination has been
/// used; after that, draws repeat names from the full set.
pub struct NamePool {
    all: Vec<String>,
    remaining: Vec<String>,
    repeated: bool,
}

impl NamePool {
    pub fn new(registry: &NameRegistry) -> Self {
        let all = registry.full_names();
        Self {
            remaining: all.clone(),
            all,
            repeated: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Whether any draw has handed out a name a second time.
    pub fn has_repeated(&self) -> bool {
        self.repeated
    }

    pub fn draw(&mut self, rng: &mut impl Rng) -> String {
        if !self.remaining.is_empty() {
            let idx = rng.gen_range(0..self.remaining.len());
            return self.remaining.swap_remove(idx);
        }
        self.repeated = true;
        if self.all.is_empty() {
            return "Anonymous Volunteer".to_string();
        }
        self.all[rng.gen_range(0..self.all.len())].clone()
    }
}
