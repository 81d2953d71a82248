//! Volunteer promotion library
//!
//! Generates reproducible synthetic volunteer populations and derives
//! promotion cutoffs from their scores.
//!
//! ```text
//! profile    - archetypes and their weight tables
//! sampler    - task counts and (mark, rating) draws
//! names      - embedded name and task-type lists
//! member     - tasks and members
//! population - stratified population generation
//! threshold  - percentile / median / mean cutoffs
//! compare    - methods and promotion shares side by side
//! stats      - summary statistics and correlations
//! dataset    - summary CSV and detailed JSON files
//! config     - generator and analysis settings
//! report     - plain-text reports for the CLIs
//! ```

pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod member;
pub mod names;
pub mod population;
pub mod profile;
pub mod report;
pub mod sampler;
pub mod stats;
pub mod threshold;

pub use compare::{compare_methods, compare_methods_at, compare_top_shares, MethodComparison, ShareComparison};
pub use error::{DatasetError, PromotionError};
pub use member::{Member, MemberStatus, Task};
pub use population::{
    generate_population, generate_population_seeded, DistributionRatios, Population, PopulationGenerator,
};
pub use profile::Archetype;
pub use sampler::{sample_task, sample_task_count, TaskRange};
pub use threshold::{compute_threshold, ThresholdMethod, ThresholdResult};
