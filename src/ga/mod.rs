//! Genetic-algorithm optimization of worker assignments.
//!
//! # Encoding
//!
//! A candidate schedule is a flat list of genes, one per
//! (work order, operation, worker) triple, carrying the resolved date and
//! start. Operations nobody could take simply have no gene; the fitness
//! function penalizes the gap. Genes are plain values, so population
//! members share nothing mutable.
//!
//! # Submodules
//!
//! - [`candidate`]: Gene/candidate types and the crossover operator
//! - [`problem`]: Problem definition, candidate construction, fitness
//! - [`engine`]: Configuration and the generation loop
//!
//! # Reference
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

pub mod candidate;
pub mod engine;
pub mod problem;

pub use candidate::{two_point_crossover, Candidate, Gene};
pub use engine::{CancelToken, GaConfig, GaResult, GaRunner};
pub use problem::{FitnessWeights, ScheduleProblem};
