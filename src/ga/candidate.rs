//! Candidate schedule encoding and recombination.
//!
//! A gene is one committed (work order, operation, worker) triple with
//! its resolved date and start. A candidate is the full flat gene list
//! plus a cached fitness. Crossover splices whole per-work-order gene
//! segments between two parents, so the work-order count is invariant
//! across the run.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::MaintenanceTask;

/// One committed assignment inside a candidate schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Work-order identifier.
    pub task_id: String,
    /// Operation identifier within the work order.
    pub operation_id: String,
    /// Committed worker identifier.
    pub worker_id: String,
    /// Date of execution.
    pub date: NaiveDate,
    /// Resolved start, minutes since midnight.
    pub start_minute: u32,
    /// Effort in minutes.
    pub effort_minutes: u32,
}

impl Gene {
    /// End of the assignment, minutes since midnight.
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.effort_minutes
    }
}

/// A candidate schedule: flat genes plus a cached fitness.
///
/// `fitness` is `None` until evaluated; crossover and mutation reset it.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Committed assignments, one per (work order, operation, worker).
    pub genes: Vec<Gene>,
    /// Cached fitness; higher is better.
    pub fitness: Option<f64>,
}

impl Candidate {
    /// Creates a candidate from genes with no cached fitness.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Clones the genes with the fitness cache cleared.
    pub fn clone_reset(&self) -> Self {
        Self::new(self.genes.clone())
    }

    /// Genes belonging to one work order.
    pub fn genes_for_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Gene> {
        self.genes.iter().filter(move |g| g.task_id == task_id)
    }
}

/// Collects the committed assignments of fully materialized work orders
/// into flat genes.
pub fn collect_genes(tasks: &[MaintenanceTask]) -> Vec<Gene> {
    let mut genes = Vec::new();
    for task in tasks {
        for operation in &task.operations {
            for worker_id in &operation.workers {
                genes.push(Gene {
                    task_id: task.id.clone(),
                    operation_id: operation.id.clone(),
                    worker_id: worker_id.clone(),
                    date: operation.due_date,
                    start_minute: operation.start_minute,
                    effort_minutes: operation.effort_minutes,
                });
            }
        }
    }
    genes
}

/// Two-point crossover over the ordered work-order sequence.
///
/// Picks two cut points in the task list; the first child takes the outer
/// segments from parent one and the middle segment from parent two, the
/// second child the reverse. Children carry as many work orders as their
/// parents and have no cached fitness.
pub fn two_point_crossover<R: Rng>(
    parent1: &Candidate,
    parent2: &Candidate,
    tasks: &[MaintenanceTask],
    rng: &mut R,
) -> (Candidate, Candidate) {
    if tasks.len() < 2 {
        return (parent1.clone_reset(), parent2.clone_reset());
    }
    let point1 = rng.random_range(0..=tasks.len() / 2);
    let point2 = rng.random_range(point1..tasks.len());
    (
        splice(parent1, parent2, tasks, point1, point2),
        splice(parent2, parent1, tasks, point1, point2),
    )
}

fn splice(
    outer: &Candidate,
    middle: &Candidate,
    tasks: &[MaintenanceTask],
    point1: usize,
    point2: usize,
) -> Candidate {
    let mut genes = Vec::new();
    for (index, task) in tasks.iter().enumerate() {
        let source = if index < point1 || index >= point2 {
            outer
        } else {
            middle
        };
        genes.extend(source.genes_for_task(&task.id).cloned());
    }
    Candidate::new(genes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Operation, Worker};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn task_with_worker(task_id: &str, worker_id: &str) -> MaintenanceTask {
        let mut task = MaintenanceTask::new(task_id, date()).with_start_minute(480);
        let mut operation = Operation::new("0010", date())
            .with_skill("mechanical")
            .with_effort(60)
            .with_start(480);
        let mut worker = Worker::new(worker_id)
            .with_skill("mechanical")
            .with_minute_budget(480);
        operation.assign_worker(task_id, &mut worker).unwrap();
        task.add_operation(operation);
        task
    }

    fn sample_tasks() -> Vec<MaintenanceTask> {
        vec![
            task_with_worker("WO-1", "W1"),
            task_with_worker("WO-2", "W2"),
            task_with_worker("WO-3", "W3"),
            task_with_worker("WO-4", "W4"),
        ]
    }

    #[test]
    fn test_collect_genes() {
        let tasks = sample_tasks();
        let genes = collect_genes(&tasks);
        assert_eq!(genes.len(), 4);
        assert_eq!(genes[0].task_id, "WO-1");
        assert_eq!(genes[0].worker_id, "W1");
        assert_eq!(genes[0].start_minute, 480);
        assert_eq!(genes[0].end_minute(), 540);
    }

    #[test]
    fn test_crossover_keeps_task_count() {
        let tasks = sample_tasks();
        let parent1 = Candidate::new(collect_genes(&tasks));
        // Parent two assigns every order to W9 instead.
        let mut alt_genes = collect_genes(&tasks);
        for gene in &mut alt_genes {
            gene.worker_id = "W9".into();
        }
        let parent2 = Candidate::new(alt_genes);

        let mut rng = SmallRng::seed_from_u64(42);
        let (child1, child2) = two_point_crossover(&parent1, &parent2, &tasks, &mut rng);

        for child in [&child1, &child2] {
            assert_eq!(child.genes.len(), 4);
            assert!(child.fitness.is_none());
            for task in &tasks {
                assert_eq!(child.genes_for_task(&task.id).count(), 1);
            }
        }
    }

    #[test]
    fn test_crossover_mixes_parent_segments() {
        let tasks = sample_tasks();
        let parent1 = Candidate::new(collect_genes(&tasks));
        let mut alt_genes = collect_genes(&tasks);
        for gene in &mut alt_genes {
            gene.worker_id = "W9".into();
        }
        let parent2 = Candidate::new(alt_genes);

        // Every gene in a child must come from one of its parents, and
        // across enough draws both parents contribute.
        let mut rng = SmallRng::seed_from_u64(42);
        let mut saw_both = false;
        for _ in 0..20 {
            let (child, _) = two_point_crossover(&parent1, &parent2, &tasks, &mut rng);
            let from_p2 = child.genes.iter().filter(|g| g.worker_id == "W9").count();
            assert!(child
                .genes
                .iter()
                .all(|g| g.worker_id == "W9" || g.worker_id.starts_with('W')));
            if from_p2 > 0 && from_p2 < child.genes.len() {
                saw_both = true;
            }
        }
        assert!(saw_both);
    }

    #[test]
    fn test_crossover_degenerate_single_task() {
        let tasks = vec![task_with_worker("WO-1", "W1")];
        let parent1 = Candidate::new(collect_genes(&tasks));
        let parent2 = Candidate::new(collect_genes(&tasks));

        let mut rng = SmallRng::seed_from_u64(42);
        let (child1, child2) = two_point_crossover(&parent1, &parent2, &tasks, &mut rng);
        assert_eq!(child1.genes, parent1.genes);
        assert_eq!(child2.genes, parent2.genes);
    }
}
