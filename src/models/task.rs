//! Maintenance work order (task) model.
//!
//! A work order is an ordered collection of operations sharing a due date
//! and a priority. Operation starts chain: the first operation starts at
//! the order's base start, each successor at its predecessor's end.
//!
//! # Assignment Algorithm
//!
//! `assign_workers` is a greedy first-fit pass over the operations in
//! ascending operation-id order. It does not backtrack: an early pick can
//! starve a later operation of an otherwise-available qualified worker.
//! That trade-off is deliberate; the genetic algorithm compensates by
//! building many independently randomized candidates.

use chrono::NaiveDate;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DayOverflow;
use crate::models::{Operation, Worker};
use crate::time::end_minute;

/// A maintenance work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    /// Work-order identifier.
    pub id: String,
    /// Date the order's operations must occur on.
    pub due_date: NaiveDate,
    /// Base start of the first operation, minutes since midnight.
    pub start_minute: u32,
    /// Scheduling priority; higher means more urgent.
    pub priority: f64,
    /// Operations in arrival order.
    pub operations: Vec<Operation>,
}

impl MaintenanceTask {
    /// Creates an empty work order starting at midnight with priority 0.
    pub fn new(id: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            due_date,
            start_minute: 0,
            priority: 0.0,
            operations: Vec::new(),
        }
    }

    /// Sets the base start minute.
    pub fn with_start_minute(mut self, start_minute: u32) -> Self {
        self.start_minute = start_minute;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    /// Appends an operation as-is, keeping whatever start it carries.
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Appends an operation chained behind the current last one: its start
    /// becomes the predecessor's end, or the order's base start when it is
    /// the first. Fails when the predecessor already ends at midnight.
    pub fn chain_operation(&mut self, mut operation: Operation) -> Result<(), DayOverflow> {
        operation.start_minute = match self.operations.last() {
            Some(previous) => end_minute(previous.start_minute, previous.effort_minutes)?,
            None => self.start_minute,
        };
        self.operations.push(operation);
        Ok(())
    }

    /// Total effort across all operations, in minutes.
    pub fn total_effort_minutes(&self) -> u32 {
        self.operations.iter().map(|op| op.effort_minutes).sum()
    }

    /// Assigns workers to this order's operations, greedily.
    ///
    /// Operations are visited in ascending operation-id order. For each
    /// one the qualified pool (skill intersection) is shuffled and walked
    /// first-fit; when nobody is qualified, all workers are tried instead,
    /// ranked by experience with the operation's asset. A worker busy at
    /// the provisional start gets exactly one remediation attempt at their
    /// latest booking end that date. Operations nobody can take stay
    /// unassigned; the fitness function penalizes them later.
    pub fn assign_workers<R: Rng>(&mut self, pool: &mut [Worker], rng: &mut R) {
        let mut visit_order: Vec<usize> = (0..self.operations.len()).collect();
        visit_order.sort_by(|&a, &b| self.operations[a].id.cmp(&self.operations[b].id));

        for index in visit_order {
            let operation = &mut self.operations[index];
            let mut candidates: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, worker)| worker.has_skill(&operation.required_skills))
                .map(|(i, _)| i)
                .collect();

            if candidates.is_empty() {
                candidates = (0..pool.len())
                    .sorted_by(|&a, &b| {
                        let left = pool[a].experience_with(&operation.asset);
                        let right = pool[b].experience_with(&operation.asset);
                        right.cmp(&left)
                    })
                    .collect();
            } else {
                candidates.shuffle(rng);
            }

            for worker_index in candidates {
                let worker = &mut pool[worker_index];
                if worker.is_available(
                    operation.due_date,
                    operation.start_minute,
                    operation.effort_minutes,
                ) {
                    if operation.assign_worker(&self.id, worker).is_ok() {
                        break;
                    }
                } else {
                    let adjusted = worker
                        .latest_end_on(operation.due_date)
                        .unwrap_or(operation.start_minute);
                    if worker.is_available(operation.due_date, adjusted, operation.effort_minutes)
                    {
                        operation.start_minute = adjusted;
                        if operation.assign_worker(&self.id, worker).is_ok() {
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn operation(id: &str, effort_minutes: u32) -> Operation {
        Operation::new(id, date())
            .with_skill("mechanical")
            .with_asset("PUMP-7")
            .with_effort(effort_minutes)
    }

    #[test]
    fn test_chain_sequencing() {
        // Efforts 60, 30, 45 from a base start of 08:00 must produce
        // starts 08:00, 09:00, 09:30 and ends 09:00, 09:30, 10:15.
        let mut task = MaintenanceTask::new("WO-1", date()).with_start_minute(480);
        task.chain_operation(operation("0010", 60)).unwrap();
        task.chain_operation(operation("0020", 30)).unwrap();
        task.chain_operation(operation("0030", 45)).unwrap();

        let starts: Vec<u32> = task.operations.iter().map(|op| op.start_minute).collect();
        assert_eq!(starts, vec![480, 540, 570]);
        let ends: Vec<u32> = task
            .operations
            .iter()
            .map(|op| op.end_minute().unwrap())
            .collect();
        assert_eq!(ends, vec![540, 570, 615]);
    }

    #[test]
    fn test_chain_rejects_midnight_crossing_predecessor() {
        let mut task = MaintenanceTask::new("WO-1", date()).with_start_minute(1400);
        task.chain_operation(operation("0010", 50)).unwrap();
        // Predecessor ends past midnight, so the chain cannot continue.
        assert!(task.chain_operation(operation("0020", 30)).is_err());
        assert_eq!(task.operations.len(), 1);
    }

    #[test]
    fn test_total_effort() {
        let mut task = MaintenanceTask::new("WO-1", date());
        task.chain_operation(operation("0010", 60)).unwrap();
        task.chain_operation(operation("0020", 30)).unwrap();
        assert_eq!(task.total_effort_minutes(), 90);
    }

    #[test]
    fn test_assignment_prefers_qualified_workers() {
        let mut task = MaintenanceTask::new("WO-1", date()).with_start_minute(480);
        task.chain_operation(operation("0010", 60)).unwrap();

        let mut pool = vec![
            Worker::new("W-unqualified")
                .with_skill("painting")
                .with_minute_budget(480),
            Worker::new("W-qualified")
                .with_skill("mechanical")
                .with_minute_budget(480),
        ];
        let mut rng = SmallRng::seed_from_u64(42);
        task.assign_workers(&mut pool, &mut rng);

        assert_eq!(task.operations[0].workers, vec!["W-qualified"]);
    }

    #[test]
    fn test_fallback_ranks_by_asset_experience() {
        let mut task = MaintenanceTask::new("WO-1", date()).with_start_minute(480);
        task.chain_operation(operation("0010", 60)).unwrap();

        // Nobody has the required skill; the veteran on this asset wins.
        let mut pool = vec![
            Worker::new("W-novice")
                .with_skill("painting")
                .with_minute_budget(480),
            Worker::new("W-veteran")
                .with_skill("painting")
                .with_experience("PUMP-7", 5)
                .with_minute_budget(480),
        ];
        let mut rng = SmallRng::seed_from_u64(42);
        task.assign_workers(&mut pool, &mut rng);

        assert_eq!(task.operations[0].workers, vec!["W-veteran"]);
    }

    #[test]
    fn test_remediation_shifts_start_once() {
        // Two operations forced onto the same provisional start with a
        // single worker: the second must shift to the worker's latest end.
        let mut task = MaintenanceTask::new("WO-1", date());
        task.add_operation(operation("0010", 60).with_start(480));
        task.add_operation(operation("0020", 60).with_start(480));

        let mut pool = vec![Worker::new("W1")
            .with_skill("mechanical")
            .with_minute_budget(480)];
        let mut rng = SmallRng::seed_from_u64(42);
        task.assign_workers(&mut pool, &mut rng);

        assert_eq!(task.operations[0].start_minute, 480);
        assert_eq!(task.operations[1].start_minute, 540);
        assert_eq!(task.operations[0].workers, vec!["W1"]);
        assert_eq!(task.operations[1].workers, vec!["W1"]);
    }

    #[test]
    fn test_unassignable_operation_stays_unassigned() {
        let mut task = MaintenanceTask::new("WO-1", date());
        task.add_operation(operation("0010", 120).with_start(480));

        // Budget too small even after remediation; soft failure only.
        let mut pool = vec![Worker::new("W1")
            .with_skill("mechanical")
            .with_minute_budget(60)];
        let mut rng = SmallRng::seed_from_u64(42);
        task.assign_workers(&mut pool, &mut rng);

        assert!(!task.operations[0].is_assigned());
        assert_eq!(pool[0].bookings.len(), 0);
    }

    #[test]
    fn test_visit_order_follows_operation_id() {
        // Insertion order 0020 then 0010; the id-ordered visit must give
        // 0010 the first pick of the only worker slot.
        let mut task = MaintenanceTask::new("WO-1", date());
        task.add_operation(operation("0020", 60).with_start(480));
        task.add_operation(operation("0010", 60).with_start(480));

        let mut pool = vec![Worker::new("W1")
            .with_skill("mechanical")
            .with_minute_budget(60)];
        let mut rng = SmallRng::seed_from_u64(42);
        task.assign_workers(&mut pool, &mut rng);

        assert!(task.operations[1].is_assigned()); // 0010
        assert!(!task.operations[0].is_assigned()); // 0020, budget spent
    }
}
