//! Input validation for scheduling problems.
//!
//! Checks structural integrity of work orders and the worker roster
//! before optimization. Detects:
//! - Duplicate worker and work-order IDs
//! - Duplicate operation IDs within one work order
//! - Empty work orders and an empty roster
//! - Operations that would run past midnight

use std::collections::HashSet;

use crate::models::{MaintenanceTask, Worker};
use crate::time::end_minute;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A work order has no operations.
    EmptyTask,
    /// No workers were provided at all.
    EmptyRoster,
    /// An operation's start plus effort crosses midnight.
    MidnightOverrun,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a scheduling problem.
///
/// Checks:
/// 1. No duplicate work-order IDs
/// 2. No duplicate operation IDs within one work order
/// 3. No duplicate worker IDs
/// 4. At least one worker, and at least one operation per work order
/// 5. Every operation ends at or before midnight
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(tasks: &[MaintenanceTask], workers: &[Worker]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut worker_ids = HashSet::new();
    for worker in workers {
        if !worker_ids.insert(worker.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate worker ID: {}", worker.id),
            ));
        }
    }
    if workers.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "No workers available for assignment",
        ));
    }

    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work-order ID: {}", task.id),
            ));
        }

        if task.operations.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyTask,
                format!("Work order '{}' has no operations", task.id),
            ));
        }

        let mut operation_ids = HashSet::new();
        for operation in &task.operations {
            if !operation_ids.insert(operation.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!(
                        "Work order '{}' repeats operation ID '{}'",
                        task.id, operation.id
                    ),
                ));
            }
            if end_minute(operation.start_minute, operation.effort_minutes).is_err() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MidnightOverrun,
                    format!(
                        "Operation '{}' of work order '{}' runs past midnight",
                        operation.id, task.id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    fn sample_workers() -> Vec<Worker> {
        vec![
            Worker::new("W1").with_skill("electrical").with_minute_budget(480),
            Worker::new("W2").with_skill("welding").with_minute_budget(480),
        ]
    }

    fn sample_tasks() -> Vec<MaintenanceTask> {
        let mut wo1 = MaintenanceTask::new("WO-1", date()).with_start_minute(480);
        wo1.chain_operation(Operation::new("0010", date()).with_effort(60))
            .unwrap();
        wo1.chain_operation(Operation::new("0020", date()).with_effort(30))
            .unwrap();
        let mut wo2 = MaintenanceTask::new("WO-2", date()).with_start_minute(540);
        wo2.chain_operation(Operation::new("0010", date()).with_effort(45))
            .unwrap();
        vec![wo1, wo2]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_tasks(), &sample_workers()).is_ok());
    }

    #[test]
    fn test_duplicate_task_id() {
        let mut tasks = sample_tasks();
        tasks[1].id = "WO-1".into();

        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("WO-1")));
    }

    #[test]
    fn test_duplicate_worker_id() {
        let workers = vec![Worker::new("W1"), Worker::new("W1")];
        let errors = validate_input(&sample_tasks(), &workers).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("worker")));
    }

    #[test]
    fn test_operation_ids_may_repeat_across_orders() {
        // Both orders use operation '0010'; only repeats within one order
        // are flagged.
        assert!(validate_input(&sample_tasks(), &sample_workers()).is_ok());

        let mut tasks = sample_tasks();
        tasks[0].operations[1].id = "0010".into();
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("0010")));
    }

    #[test]
    fn test_empty_task() {
        let tasks = vec![MaintenanceTask::new("WO-empty", date())];
        let errors = validate_input(&tasks, &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyTask));
    }

    #[test]
    fn test_empty_roster() {
        let errors = validate_input(&sample_tasks(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyRoster));
    }

    #[test]
    fn test_midnight_overrun() {
        let mut task = MaintenanceTask::new("WO-1", date()).with_start_minute(1400);
        task.add_operation(Operation::new("0010", date()).with_effort(120).with_start(1400));

        let errors = validate_input(&[task], &sample_workers()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MidnightOverrun));
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![MaintenanceTask::new("WO-empty", date())];
        let errors = validate_input(&tasks, &[]).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
