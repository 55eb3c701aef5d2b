//! Operation model.
//!
//! An operation is the smallest schedulable unit of work inside a work
//! order: one skill requirement, one target asset, a duration, and a
//! start time that may be pushed later once to dodge a conflict.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AllocationConflict, DayOverflow};
use crate::models::{Booking, Worker};
use crate::time::end_minute;

/// An operation within a maintenance work order.
///
/// The identifier is unique within the owning work order only; different
/// work orders routinely reuse operation numbers like `0010`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation identifier within the work order.
    pub id: String,
    /// Skill tokens that qualify a worker; any single match suffices.
    pub required_skills: Vec<String>,
    /// Equipment this operation targets.
    pub asset: String,
    /// Duration in minutes.
    pub effort_minutes: u32,
    /// Calendar date the operation must occur on.
    pub due_date: NaiveDate,
    /// Scheduled start, minutes since midnight. May be advanced once per
    /// assignment attempt to resolve a conflict.
    pub start_minute: u32,
    /// Identifiers of the workers committed to this operation.
    pub workers: Vec<String>,
}

impl Operation {
    /// Creates an operation with zero effort starting at midnight.
    pub fn new(id: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            required_skills: Vec::new(),
            asset: String::new(),
            effort_minutes: 0,
            due_date,
            start_minute: 0,
            workers: Vec::new(),
        }
    }

    /// Adds one required skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skills.push(skill.into());
        self
    }

    /// Replaces the required skill list.
    pub fn with_required_skills(mut self, skills: Vec<String>) -> Self {
        self.required_skills = skills;
        self
    }

    /// Sets the target asset.
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = asset.into();
        self
    }

    /// Sets the effort in minutes.
    pub fn with_effort(mut self, effort_minutes: u32) -> Self {
        self.effort_minutes = effort_minutes;
        self
    }

    /// Sets the start minute.
    pub fn with_start(mut self, start_minute: u32) -> Self {
        self.start_minute = start_minute;
        self
    }

    /// End of the operation, always computed from start and effort.
    pub fn end_minute(&self) -> Result<u32, DayOverflow> {
        end_minute(self.start_minute, self.effort_minutes)
    }

    /// Whether at least one worker is committed.
    pub fn is_assigned(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Commits a worker to this operation, atomically.
    ///
    /// The worker's ledger is updated first; the worker id is recorded on
    /// the operation only if that allocation succeeded. On refusal neither
    /// side changes, so the two can never disagree about the assignment.
    pub fn assign_worker(
        &mut self,
        task_id: &str,
        worker: &mut Worker,
    ) -> Result<(), AllocationConflict> {
        worker.allocate(Booking {
            task_id: task_id.to_string(),
            operation_id: self.id.clone(),
            date: self.due_date,
            start_minute: self.start_minute,
            effort_minutes: self.effort_minutes,
        })?;
        self.workers.push(worker.id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn sample_operation() -> Operation {
        Operation::new("0010", date())
            .with_skill("electrical")
            .with_asset("PUMP-7")
            .with_effort(90)
            .with_start(540)
    }

    #[test]
    fn test_end_minute_is_computed() {
        let mut operation = sample_operation();
        assert_eq!(operation.end_minute().unwrap(), 630);

        operation.start_minute = 600;
        assert_eq!(operation.end_minute().unwrap(), 690);
    }

    #[test]
    fn test_assign_worker_updates_both_sides() {
        let mut operation = sample_operation();
        let mut worker = Worker::new("W1")
            .with_skill("electrical")
            .with_minute_budget(480);

        operation.assign_worker("WO-1", &mut worker).unwrap();
        assert_eq!(operation.workers, vec!["W1"]);
        assert_eq!(worker.bookings.len(), 1);
        assert_eq!(worker.allocated_on(date()), 90);
        assert!(operation.is_assigned());
    }

    #[test]
    fn test_assign_worker_is_atomic_on_refusal() {
        let mut worker = Worker::new("W1")
            .with_skill("electrical")
            .with_minute_budget(480);
        let mut first = sample_operation();
        first.assign_worker("WO-1", &mut worker).unwrap();

        // Same interval again: the worker refuses, and the operation must
        // not list the worker either.
        let mut second = Operation::new("0020", date()).with_effort(90).with_start(540);
        let err = second.assign_worker("WO-1", &mut worker).unwrap_err();
        assert_eq!(err.operation_id, "0020");
        assert!(second.workers.is_empty());
        assert_eq!(worker.bookings.len(), 1);
        assert_eq!(worker.allocated_on(date()), 90);
    }
}
