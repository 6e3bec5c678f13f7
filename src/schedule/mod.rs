//! Medication schedule expansion.
//!
//! Turns the flat medication list fetched from the backend into calendar
//! marks: for each record, every date between its start and end date
//! (inclusive) that its recurrence rule selects. The same test answers
//! "what is due on this date" without expanding the full range. Both entry
//! points are pure and never fail; records with unusable dates are skipped.

pub mod dose;
pub mod expand;
pub mod rule;

pub use dose::*;
pub use expand::*;
pub use rule::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Missing {field}")]
    MissingDate { field: &'static str },

    #[error("Invalid {field}: {value}")]
    InvalidDate { field: &'static str, value: String },
}
