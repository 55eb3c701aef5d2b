//! Schedule plan (result) model.
//!
//! The final product of scheduling: a flat table with one row per
//! (work order, operation), carrying the committed workers and resolved
//! times. This is a terminal report, not a persisted store.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::time::format_minute;

/// One line of the schedule report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Work-order identifier.
    pub task_id: String,
    /// Operation identifier within the work order.
    pub operation_id: String,
    /// Committed worker identifiers; empty when nobody could take it.
    pub worker_ids: Vec<String>,
    /// Date of execution.
    pub date: NaiveDate,
    /// Resolved start, minutes since midnight.
    pub start_minute: u32,
    /// Resolved end, minutes since midnight.
    pub end_minute: u32,
}

/// A complete flat schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    /// Report rows in work-order, then operation-id order.
    pub rows: Vec<ScheduleRow>,
}

impl SchedulePlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn add_row(&mut self, row: ScheduleRow) {
        self.rows.push(row);
    }

    /// Rows belonging to one work order.
    pub fn rows_for_task(&self, task_id: &str) -> Vec<&ScheduleRow> {
        self.rows.iter().filter(|r| r.task_id == task_id).collect()
    }

    /// Rows a given worker appears on.
    pub fn rows_for_worker(&self, worker_id: &str) -> Vec<&ScheduleRow> {
        self.rows
            .iter()
            .filter(|r| r.worker_ids.iter().any(|id| id == worker_id))
            .collect()
    }

    /// Number of rows with at least one committed worker.
    pub fn assigned_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.worker_ids.is_empty()).count()
    }

    /// Number of rows nobody could take.
    pub fn unassigned_count(&self) -> usize {
        self.rows.len() - self.assigned_count()
    }

    /// Renders the terminal report, one line per row.
    pub fn render(&self) -> String {
        let mut out = String::from("task | operation | workers | date | start | end\n");
        for row in &self.rows {
            out.push_str(&format!(
                "{} | {} | {} | {} | {} | {}\n",
                row.task_id,
                row.operation_id,
                row.worker_ids.iter().join(", "),
                row.date,
                format_minute(row.start_minute),
                format_minute(row.end_minute),
            ));
        }
        out
    }
}
