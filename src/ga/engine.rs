//! Generation loop and configuration.
//!
//! # Algorithm
//!
//! 1. Build the initial population with independently randomized greedy
//!    assignments.
//! 2. Each generation: evaluate uncached fitness, tournament-select a
//!    full-size parent pool, recombine pairs with two-point crossover,
//!    mutate per individual, replace the population.
//! 3. Track the best candidate ever seen and return it after the fixed
//!    generation budget (or an early cancellation).
//!
//! Fitness evaluation is embarrassingly parallel across candidates since
//! each owns its genes outright; `parallel` switches it onto the rayon
//! pool.
//!
//! # Reference
//!
//! - Goldberg (1989), Ch. 3: Reproduction, Crossover, Mutation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::ga::candidate::{two_point_crossover, Candidate};
use crate::ga::problem::ScheduleProblem;

/// Cooperative cancellation flag checked between generations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the run stops before its next generation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Genetic algorithm configuration.
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Candidates per generation.
    pub population_size: usize,
    /// Fixed generation budget.
    pub generations: usize,
    /// Per-individual mutation probability.
    pub mutation_rate: f64,
    /// Contestants per selection tournament.
    pub tournament_size: usize,
    /// Whether the best candidate so far is reinserted each generation.
    pub elitism: bool,
    /// Whether fitness evaluation runs on the rayon pool.
    pub parallel: bool,
    /// RNG seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Optional cancellation token.
    pub cancel: Option<CancelToken>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GaConfig {
    /// Creates the default configuration: 50 candidates, 50 generations,
    /// 5% mutation, tournaments of 5, elitism and parallel evaluation on.
    pub fn new() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            mutation_rate: 0.05,
            tournament_size: 5,
            elitism: true,
            parallel: true,
            seed: None,
            cancel: None,
        }
    }

    /// Sets the population size (at least 2).
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the per-individual mutation probability, clamped to [0, 1].
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size (at least 1).
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Enables or disables elitist reinsertion.
    pub fn with_elitism(mut self, elitism: bool) -> Self {
        self.elitism = elitism;
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Seeds the RNG for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best candidate ever seen across the run.
    pub best: Candidate,
    /// Fitness of `best`.
    pub best_fitness: f64,
    /// Generations actually executed (less than the budget only when
    /// cancelled).
    pub generations_run: usize,
    /// Best-ever fitness after each generation; non-decreasing.
    pub best_per_generation: Vec<f64>,
    /// Final population, `population_size` candidates.
    pub population: Vec<Candidate>,
}

/// Drives the generation loop for a [`ScheduleProblem`].
pub struct GaRunner;

impl GaRunner {
    /// Runs the optimization and returns the best candidate ever seen.
    pub fn run(problem: &ScheduleProblem, config: &GaConfig) -> GaResult {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let population_size = config.population_size.max(2);
        let mutation_rate = config.mutation_rate.clamp(0.0, 1.0);

        let mut population: Vec<Candidate> = (0..population_size)
            .map(|_| problem.create_candidate(&mut rng))
            .collect();
        Self::evaluate_population(problem, &mut population, config.parallel);
        let mut best = Self::best_of(&population).clone();
        info!(
            population_size,
            generations = config.generations,
            initial_best = fitness_of(&best),
            "optimization started"
        );

        let mut best_per_generation = Vec::with_capacity(config.generations);
        let mut generations_run = 0;

        for generation in 0..config.generations {
            if config.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                info!(generation, "optimization cancelled");
                break;
            }

            let parents = Self::tournament_selection(&population, config.tournament_size, &mut rng);
            let mut next = Vec::with_capacity(population_size);
            while next.len() < population_size {
                let parent1 = pick(&parents, &mut rng);
                let parent2 = pick(&parents, &mut rng);
                let (child1, child2) =
                    two_point_crossover(parent1, parent2, &problem.tasks, &mut rng);
                next.push(child1);
                if next.len() < population_size {
                    next.push(child2);
                }
            }

            for candidate in &mut next {
                if rng.random_bool(mutation_rate) {
                    problem.mutate_candidate(candidate, &mut rng);
                }
            }

            if config.elitism {
                if let Some(slot) = next.last_mut() {
                    *slot = best.clone();
                }
            }

            Self::evaluate_population(problem, &mut next, config.parallel);
            population = next;

            let generation_best = Self::best_of(&population);
            if fitness_of(generation_best) > fitness_of(&best) {
                best = generation_best.clone();
            }
            best_per_generation.push(fitness_of(&best));
            generations_run += 1;
            debug!(
                generation,
                generation_best = fitness_of(generation_best),
                best_ever = fitness_of(&best),
                "generation complete"
            );
        }

        info!(
            generations_run,
            best_fitness = fitness_of(&best),
            "optimization finished"
        );
        GaResult {
            best_fitness: fitness_of(&best),
            best,
            generations_run,
            best_per_generation,
            population,
        }
    }

    fn evaluate_population(
        problem: &ScheduleProblem,
        population: &mut [Candidate],
        parallel: bool,
    ) {
        let evaluate = |candidate: &mut Candidate| {
            if candidate.fitness.is_none() {
                let fitness = problem.evaluate(candidate);
                candidate.fitness = Some(fitness);
            }
        };
        if parallel {
            population.par_iter_mut().for_each(evaluate);
        } else {
            population.iter_mut().for_each(evaluate);
        }
    }

    fn tournament_selection<'a, R: Rng>(
        population: &'a [Candidate],
        tournament_size: usize,
        rng: &mut R,
    ) -> Vec<&'a Candidate> {
        let contestants = tournament_size.clamp(1, population.len());
        (0..population.len())
            .map(|_| {
                population
                    .choose_multiple(rng, contestants)
                    .max_by(|a, b| fitness_of(a).total_cmp(&fitness_of(b)))
                    .unwrap_or(&population[0])
            })
            .collect()
    }

    fn best_of(population: &[Candidate]) -> &Candidate {
        population
            .iter()
            .max_by(|a, b| fitness_of(a).total_cmp(&fitness_of(b)))
            .unwrap_or(&population[0])
    }
}

fn fitness_of(candidate: &Candidate) -> f64 {
    candidate.fitness.unwrap_or(f64::NEG_INFINITY)
}

fn pick<'a, R: Rng>(parents: &[&'a Candidate], rng: &mut R) -> &'a Candidate {
    parents.choose(rng).copied().unwrap_or(parents[0])
}
