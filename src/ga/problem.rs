//! Scheduling problem definition, candidate construction, and fitness.
//!
//! The problem owns the immutable work orders and worker roster. Each
//! candidate is built from private clones of that state, so allocation in
//! one candidate can never disturb the availability checks of another.
//!
//! # Fitness
//!
//! Higher is better. Qualification, asset experience, priority, and
//! per-tuple feasibility raise the score; long and unassigned operations
//! lower it. The exact weights are tunable, not contractual.

use std::collections::HashMap;

use itertools::Itertools;
use rand::Rng;
use tracing::debug;

use crate::ga::candidate::{collect_genes, Candidate, Gene};
use crate::models::{Booking, MaintenanceTask, SchedulePlan, ScheduleRow, Worker};
use crate::time::{end_minute, overlaps, MINUTES_PER_DAY};

/// Tunable fitness weights.
///
/// Defaults keep the qualitative shape: a qualified, feasible assignment
/// on a high-priority order scores well; long or impossible work drags
/// the candidate down.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessWeights {
    /// Bonus per assigned worker whose skills match the requirement.
    pub skill_match: f64,
    /// Bonus per assigned worker with recorded experience on the asset.
    pub asset_experience: f64,
    /// Bonus per assigned worker whose slot is feasible within the
    /// candidate (no overlap with their other genes, budget respected).
    pub availability: f64,
    /// Multiplier applied to the order priority, credited per operation.
    pub priority: f64,
    /// Cost per hour of effort, debited per operation.
    pub effort_cost_per_hour: f64,
    /// Penalty for an operation longer than the daily threshold.
    pub long_operation_penalty: f64,
    /// Daily threshold in minutes for the long-operation penalty.
    pub long_operation_threshold_minutes: u32,
    /// Penalty for an operation with no committed worker.
    pub unassigned_penalty: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            skill_match: 10.0,
            asset_experience: 2.0,
            availability: 5.0,
            priority: 1.0,
            effort_cost_per_hour: 1.0,
            long_operation_penalty: 5.0,
            long_operation_threshold_minutes: 480,
            unassigned_penalty: 15.0,
        }
    }
}

/// An immutable scheduling problem: work orders, roster, and weights.
pub struct ScheduleProblem {
    /// Work orders in arrival order; this order is the gene sequence the
    /// crossover operator cuts.
    pub tasks: Vec<MaintenanceTask>,
    /// Worker roster. Never mutated; candidates clone it.
    pub workers: Vec<Worker>,
    /// Fitness weights.
    pub weights: FitnessWeights,
    worker_index: HashMap<String, usize>,
}

impl ScheduleProblem {
    /// Creates a problem with default weights.
    pub fn new(tasks: Vec<MaintenanceTask>, workers: Vec<Worker>) -> Self {
        let worker_index = workers
            .iter()
            .enumerate()
            .map(|(index, worker)| (worker.id.clone(), index))
            .collect();
        Self {
            tasks,
            workers,
            weights: FitnessWeights::default(),
            worker_index,
        }
    }

    /// Replaces the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Looks up a worker by id.
    pub fn worker(&self, worker_id: &str) -> Option<&Worker> {
        self.worker_index
            .get(worker_id)
            .map(|&index| &self.workers[index])
    }

    /// Builds one candidate by running the greedy assignment pass over
    /// private clones of the work orders and the roster.
    pub fn create_candidate<R: Rng>(&self, rng: &mut R) -> Candidate {
        let mut tasks = self.tasks.clone();
        let mut pool = self.workers.clone();
        for task in &mut tasks {
            task.assign_workers(&mut pool, rng);
        }
        Candidate::new(collect_genes(&tasks))
    }

    /// Mutates a candidate by re-running the assignment pass for one
    /// randomly chosen work order.
    ///
    /// The worker pool is rebuilt from the candidate's remaining genes
    /// first, so the re-assignment sees the load the rest of the schedule
    /// already imposes. Genes that no longer fit the rebuilt pool (a
    /// possibility after crossover) are simply not replayed; fitness
    /// handles the fallout.
    pub fn mutate_candidate<R: Rng>(&self, candidate: &mut Candidate, rng: &mut R) {
        if self.tasks.is_empty() {
            return;
        }
        let task_index = rng.random_range(0..self.tasks.len());
        let task_id = self.tasks[task_index].id.clone();

        let mut pool = self.workers.clone();
        for gene in candidate.genes.iter().filter(|g| g.task_id != task_id) {
            if let Some(&index) = self.worker_index.get(&gene.worker_id) {
                if let Err(conflict) = pool[index].allocate(Booking {
                    task_id: gene.task_id.clone(),
                    operation_id: gene.operation_id.clone(),
                    date: gene.date,
                    start_minute: gene.start_minute,
                    effort_minutes: gene.effort_minutes,
                }) {
                    debug!(%conflict, "skipping infeasible gene while rebuilding pool");
                }
            }
        }

        let mut task = self.tasks[task_index].clone();
        task.assign_workers(&mut pool, rng);
        candidate.genes.retain(|g| g.task_id != task_id);
        candidate
            .genes
            .extend(collect_genes(std::slice::from_ref(&task)));
        candidate.fitness = None;
    }

    /// Evaluates a candidate. Higher is better.
    pub fn evaluate(&self, candidate: &Candidate) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        for task in &self.tasks {
            for operation in &task.operations {
                score += task.priority * w.priority;
                score -= f64::from(operation.effort_minutes) / 60.0 * w.effort_cost_per_hour;
                if operation.effort_minutes > w.long_operation_threshold_minutes {
                    score -= w.long_operation_penalty;
                }

                let genes: Vec<(usize, &Gene)> = candidate
                    .genes
                    .iter()
                    .enumerate()
                    .filter(|(_, g)| g.task_id == task.id && g.operation_id == operation.id)
                    .collect();
                if genes.is_empty() {
                    score -= w.unassigned_penalty;
                    continue;
                }

                for (gene_index, gene) in genes {
                    let Some(worker) = self.worker(&gene.worker_id) else {
                        score -= w.unassigned_penalty;
                        continue;
                    };
                    if worker.has_skill(&operation.required_skills) {
                        score += w.skill_match;
                    }
                    if worker.experience_with(&operation.asset) > 0 {
                        score += w.asset_experience;
                    }
                    if self.gene_is_feasible(candidate, gene_index, worker) {
                        score += w.availability;
                    }
                }
            }
        }
        score
    }

    /// Renders a candidate as the flat schedule report.
    ///
    /// Every operation gets a row, in work-order then operation-id order;
    /// unassigned operations keep their provisional slot with an empty
    /// worker column.
    pub fn plan_for(&self, candidate: &Candidate) -> SchedulePlan {
        let mut plan = SchedulePlan::new();
        for task in &self.tasks {
            for operation in task
                .operations
                .iter()
                .sorted_by(|a, b| a.id.cmp(&b.id))
            {
                let genes: Vec<&Gene> = candidate
                    .genes
                    .iter()
                    .filter(|g| g.task_id == task.id && g.operation_id == operation.id)
                    .collect();
                let start_minute = genes
                    .first()
                    .map(|g| g.start_minute)
                    .unwrap_or(operation.start_minute);
                plan.add_row(ScheduleRow {
                    task_id: task.id.clone(),
                    operation_id: operation.id.clone(),
                    worker_ids: genes.iter().map(|g| g.worker_id.clone()).collect(),
                    date: operation.due_date,
                    start_minute,
                    end_minute: end_minute(start_minute, operation.effort_minutes)
                        .unwrap_or(MINUTES_PER_DAY),
                });
            }
        }
        plan
    }

    /// Whether a gene's slot holds up against the candidate's other genes
    /// for the same worker and date: no half-open overlap and the date's
    /// combined effort fits the worker's minute budget.
    fn gene_is_feasible(&self, candidate: &Candidate, gene_index: usize, worker: &Worker) -> bool {
        let gene = &candidate.genes[gene_index];
        if gene.end_minute() > MINUTES_PER_DAY {
            return false;
        }
        let mut committed = gene.effort_minutes;
        for (other_index, other) in candidate.genes.iter().enumerate() {
            if other_index == gene_index
                || other.worker_id != gene.worker_id
                || other.date != gene.date
            {
                continue;
            }
            if overlaps(
                other.start_minute,
                other.end_minute(),
                gene.start_minute,
                gene.end_minute(),
            ) {
                return false;
            }
            committed += other.effort_minutes;
        }
        committed <= worker.total_minutes_available
    }
}
