//! Appointment slot generation and availability.
//!
//! The slot pipeline in three stages, each its own module:
//!
//! ```text
//! AppointmentType ──▶ expansion ──▶ availability ──▶ grid
//!   (template)         concrete        staff          month/week/day
//!                      slots           assignment     matrix
//! ```
//!
//! - `types`: appointment configuration, slot rules, generated slots
//! - `expansion`: recurring template and one-off ranges to concrete slots
//! - `availability`: commitment bucketing and first-free-staff assignment
//! - `grid`: locale-aware month folding with pagination counters
//! - `engine`: the stages wired to the staff directory and commitment store
//!
//! # Usage
//!
//! ```ignore
//! use rendez::appointment::{AppointmentType, SlotEngine, SlotQuery};
//!
//! let engine = SlotEngine::new(directory, commitments);
//! let months = engine
//!     .appointment_slots(&appointment, &SlotQuery::new(chrono_tz::UTC))
//!     .await?;
//! ```

pub mod availability;
pub mod engine;
pub mod expansion;
pub mod grid;
pub mod types;

pub use availability::{assign_staff, candidate_staff, load_commitments, CommitmentIndex};
pub use engine::{SlotEngine, SlotQuery};
pub use expansion::{expand_slots, SchedulingWindow};
pub use grid::{fold_months, month_matrix, DayCell, MonthGrid, SlotRef};
pub use types::{
    AppointmentCategory, AppointmentSlot, AppointmentType, AssignMethod, SlotPattern, SlotRule,
};
