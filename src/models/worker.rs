//! Worker model.
//!
//! A worker is a schedulable person with a skill list, a per-asset
//! experience history, and a finite minute budget tracked per date in an
//! allocation ledger. Availability is a pure query; allocation is the only
//! mutation and either fully succeeds or returns the conflict.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AllocationConflict, ConflictReason};
use crate::time::{end_minute, overlaps};

/// A committed slot in a worker's agenda.
///
/// Bookings are value records, not references to live operations, so a
/// cloned worker carries a fully independent agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Owning work order.
    pub task_id: String,
    /// Operation within the work order.
    pub operation_id: String,
    /// Calendar date of the slot.
    pub date: NaiveDate,
    /// Start, minutes since midnight.
    pub start_minute: u32,
    /// Length in minutes.
    pub effort_minutes: u32,
}

impl Booking {
    /// End of the slot, minutes since midnight.
    ///
    /// Bookings are only created through [`Worker::allocate`], which
    /// rejects midnight-crossing slots, so the sum never exceeds 1440.
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.effort_minutes
    }
}

/// A schedulable worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker identifier (employee number).
    pub id: String,
    /// Skill tokens this worker can perform.
    pub skills: Vec<String>,
    /// Completed-operation count per asset, a tie-break preference signal.
    pub experience_with_assets: HashMap<String, u32>,
    /// Total minutes this worker can absorb on any single date.
    pub total_minutes_available: u32,
    /// Cumulative committed minutes per date. Grows only via [`Worker::allocate`].
    pub allocated_minutes_by_date: HashMap<NaiveDate, u32>,
    /// Committed slots in assignment order.
    pub bookings: Vec<Booking>,
}

impl Worker {
    /// Creates a worker with no skills and a zero minute budget.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skills: Vec::new(),
            experience_with_assets: HashMap::new(),
            total_minutes_available: 0,
            allocated_minutes_by_date: HashMap::new(),
            bookings: Vec::new(),
        }
    }

    /// Adds one skill.
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Replaces the skill list.
    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    /// Records historical experience with an asset.
    pub fn with_experience(mut self, asset: impl Into<String>, count: u32) -> Self {
        self.experience_with_assets.insert(asset.into(), count);
        self
    }

    /// Sets the per-date minute budget.
    pub fn with_minute_budget(mut self, minutes: u32) -> Self {
        self.total_minutes_available = minutes;
        self
    }

    /// Whether this worker satisfies a skill requirement.
    ///
    /// OR semantics: any intersection between the requirement and the
    /// worker's skills satisfies it. An empty requirement is never
    /// satisfied; such operations are filled through the experience
    /// fallback instead.
    pub fn has_skill(&self, required: &[String]) -> bool {
        required
            .iter()
            .any(|needed| self.skills.iter().any(|own| own == needed))
    }

    /// Completed-operation count for an asset (0 when unrecorded).
    pub fn experience_with(&self, asset: &str) -> u32 {
        self.experience_with_assets.get(asset).copied().unwrap_or(0)
    }

    /// Minutes already committed on a date.
    pub fn allocated_on(&self, date: NaiveDate) -> u32 {
        self.allocated_minutes_by_date
            .get(&date)
            .copied()
            .unwrap_or(0)
    }

    /// Whether the worker can absorb a slot: no overlap with an existing
    /// booking that date, enough remaining budget, and the slot must not
    /// run past midnight. Pure query, no side effects.
    pub fn is_available(&self, date: NaiveDate, start_minute: u32, effort_minutes: u32) -> bool {
        self.check_slot(date, start_minute, effort_minutes).is_ok()
    }

    /// Latest booking end on a date, used to propose a shifted start when
    /// the provisional one conflicts.
    pub fn latest_end_on(&self, date: NaiveDate) -> Option<u32> {
        self.bookings
            .iter()
            .filter(|b| b.date == date)
            .map(Booking::end_minute)
            .max()
    }

    /// Commits a slot.
    ///
    /// Re-checks availability, then increments the date ledger by the
    /// slot's effort and appends the booking. On refusal nothing changes
    /// and the conflict is returned; refusals are never silent.
    pub fn allocate(&mut self, booking: Booking) -> Result<(), AllocationConflict> {
        if let Err(reason) =
            self.check_slot(booking.date, booking.start_minute, booking.effort_minutes)
        {
            return Err(AllocationConflict {
                worker_id: self.id.clone(),
                operation_id: booking.operation_id,
                date: booking.date,
                start_minute: booking.start_minute,
                reason,
            });
        }
        *self.allocated_minutes_by_date.entry(booking.date).or_insert(0) +=
            booking.effort_minutes;
        self.bookings.push(booking);
        Ok(())
    }

    fn check_slot(
        &self,
        date: NaiveDate,
        start_minute: u32,
        effort_minutes: u32,
    ) -> Result<(), ConflictReason> {
        let end = end_minute(start_minute, effort_minutes)
            .map_err(|_| ConflictReason::DayOverflow)?;
        let collision = self.bookings.iter().any(|existing| {
            existing.date == date
                && overlaps(existing.start_minute, existing.end_minute(), start_minute, end)
        });
        if collision {
            return Err(ConflictReason::Overlap);
        }
        let remaining = self
            .total_minutes_available
            .saturating_sub(self.allocated_on(date));
        if remaining < effort_minutes {
            return Err(ConflictReason::BudgetExhausted);
        }
        Ok(())
    }
}
