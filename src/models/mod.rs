//! Maintenance scheduling domain models.
//!
//! Core data types for representing a maintenance scheduling problem and
//! its solution:
//!
//! | Type | Role |
//! |------|------|
//! | [`Worker`] | Schedulable person with skills, experience, and a minute budget |
//! | [`Operation`] | Atomic unit of work inside a work order |
//! | [`MaintenanceTask`] | Work order: ordered operations, due date, priority |
//! | [`SchedulePlan`] | Flat (task, operation, workers, date, time) result rows |
//!
//! Worker state is value-typed on purpose: cloning a `Worker` clones its
//! ledger, so optimizer candidates can never contaminate each other
//! through a shared booking list.

mod operation;
mod plan;
mod task;
mod worker;

pub use operation::Operation;
pub use plan::{SchedulePlan, ScheduleRow};
pub use task::MaintenanceTask;
pub use worker::{Booking, Worker};
