//! Error taxonomy.
//!
//! Three failure classes with different recovery contracts:
//!
//! - [`FormatError`]: a malformed time, date, or duration string. Fatal for
//!   the record being parsed; ingestion surfaces it and continues with the
//!   remaining records.
//! - [`DayOverflow`]: an operation whose effort would run past midnight.
//!   Rejected at validation time; during scheduling the slot is simply
//!   treated as unavailable.
//! - [`AllocationConflict`]: a worker cannot absorb a requested slot.
//!   Recoverable; the assignment pass either shifts the start once or
//!   leaves the operation unassigned for the fitness function to penalize.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// A string that could not be parsed as a time, date, or duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Not a valid `HH:MM:SS` or `HH:MM` time of day.
    #[error("cannot parse '{0}' as a time of day")]
    Time(String),
    /// Not a valid `DD/MM/YYYY` date.
    #[error("cannot parse '{0}' as a date")]
    Date(String),
    /// Not a valid duration (fractional hours or `HH:MM:SS` total).
    #[error("cannot parse '{0}' as a duration")]
    Duration(String),
}

/// An interval that would cross midnight.
///
/// Times of day are minutes since midnight; an operation must end at or
/// before minute 1440. Wrapping into the next day is never done silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interval starting at minute {start_minute} with effort {effort_minutes} min runs past midnight")]
pub struct DayOverflow {
    /// Start of the interval (minutes since midnight).
    pub start_minute: u32,
    /// Interval length in minutes.
    pub effort_minutes: u32,
}

/// A worker refused an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker {worker_id} cannot take operation {operation_id} on {date} at minute {start_minute}: {reason}")]
pub struct AllocationConflict {
    /// The refusing worker.
    pub worker_id: String,
    /// The operation that could not be placed.
    pub operation_id: String,
    /// Requested date.
    pub date: NaiveDate,
    /// Requested start (minutes since midnight).
    pub start_minute: u32,
    /// Why the worker refused.
    pub reason: ConflictReason,
}

/// Why an allocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The slot overlaps an existing booking on the same date.
    Overlap,
    /// The worker's minute budget cannot absorb the effort.
    BudgetExhausted,
    /// The slot would run past midnight.
    DayOverflow,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::Overlap => write!(f, "overlapping booking"),
            ConflictReason::BudgetExhausted => write!(f, "minute budget exhausted"),
            ConflictReason::DayOverflow => write!(f, "slot runs past midnight"),
        }
    }
}
