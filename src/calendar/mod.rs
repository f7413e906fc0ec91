//! Calendar commitments: the busy time that constrains appointment slots.
//!
//! This module provides the external-calendar side of the scheduling engine:
//!
//! - **Commitments**: existing calendar events with attendees and acceptance
//!   states; only non-declined attendances block availability
//! - **Commitment Store**: async storage trait with overlap queries batched
//!   per calendar identity
//! - **Atomic Reservation**: the check-then-insert primitive bookings rely
//!   on, serialized inside the store so concurrent bookings cannot both win
//! - **Persistence**: optional JSON snapshots for the in-memory store
//!
//! # Usage
//!
//! ```ignore
//! use rendez::calendar::{Commitment, CommitmentStore, InMemoryCommitmentStore};
//! use chrono::{Duration, Utc};
//!
//! let store = InMemoryCommitmentStore::new();
//!
//! let start = Utc::now();
//! let commitment = Commitment::new("Standup", start, start + Duration::minutes(30))
//!     .with_attendee("cal-ada");
//! store.create(commitment).await?;
//!
//! // All busy intervals for cal-ada over the next week:
//! let busy = store
//!     .find_overlapping(&["cal-ada".to_string()], start, start + Duration::days(7))
//!     .await?;
//! ```

pub mod store;
pub mod types;

pub use store::{CommitmentStore, InMemoryCommitmentStore};
pub use types::{Attendee, AttendeeStatus, Commitment};
