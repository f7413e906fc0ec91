//! Rendez: appointment slot generation and availability engine
//!
//! Expands weekly availability templates into concrete bookable slots,
//! filters them against staff calendar commitments, and folds the result
//! into locale-aware month grids, with a booking path that re-validates
//! availability transactionally at write time.

pub mod appointment;
pub mod booking;
pub mod calendar;
pub mod config;
pub mod error;
pub mod locale;
pub mod staff;

pub use appointment::{
    AppointmentCategory, AppointmentSlot, AppointmentType, AssignMethod, CommitmentIndex, DayCell,
    MonthGrid, SchedulingWindow, SlotEngine, SlotPattern, SlotQuery, SlotRef, SlotRule,
};
pub use booking::{BookingRequest, BookingService};
pub use calendar::{
    Attendee, AttendeeStatus, Commitment, CommitmentStore, InMemoryCommitmentStore,
};
pub use config::Config;
pub use error::{BookingError, ConfigError, RendezError, Result, StorageError};
pub use locale::Locale;
pub use staff::{InMemoryStaffDirectory, StaffDirectory, StaffProfile};
