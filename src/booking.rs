//! Booking.
//!
//! Turns a displayed slot into a real commitment. The grid a visitor saw
//! may already be stale when they submit, so the booking path never trusts
//! it: the commitment store re-checks availability atomically with the
//! write, and a lost race surfaces as [`BookingError::SlotTaken`], which
//! callers handle by re-rendering the grid.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::appointment::AppointmentType;
use crate::calendar::{Commitment, CommitmentStore};
use crate::error::{BookingError, Result};
use crate::staff::StaffDirectory;

/// Visitor details for one booking attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Staff member shown on the picked slot.
    pub staff_id: String,
    /// UTC bounds of the picked slot.
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    /// Requester name, carried into the commitment title.
    pub name: String,
    /// Optional contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl BookingRequest {
    pub fn new(
        staff_id: impl Into<String>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            staff_id: staff_id.into(),
            start,
            stop,
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Books slots against the commitment store.
pub struct BookingService<D, C> {
    directory: Arc<D>,
    commitments: Arc<C>,
}

impl<D, C> BookingService<D, C>
where
    D: StaffDirectory,
    C: CommitmentStore,
{
    pub fn new(directory: Arc<D>, commitments: Arc<C>) -> Self {
        Self {
            directory,
            commitments,
        }
    }

    /// Book a slot for the visitor, creating the commitment that will block
    /// this time range in every later grid.
    ///
    /// Fails with [`BookingError::NotConfigured`] when the staff member does
    /// not belong to the appointment type, [`BookingError::UnknownStaff`]
    /// when the directory has no profile for them, and
    /// [`BookingError::SlotTaken`] when a concurrent booking won the race
    /// for the same time.
    pub async fn book(
        &self,
        appointment: &AppointmentType,
        request: &BookingRequest,
    ) -> Result<Commitment> {
        if request.stop <= request.start {
            return Err(BookingError::InvalidInterval {
                start: request.start,
                stop: request.stop,
            }
            .into());
        }
        if !appointment.staff_ids.iter().any(|id| id == &request.staff_id) {
            return Err(BookingError::NotConfigured(request.staff_id.clone()).into());
        }
        let profile = self
            .directory
            .profile(&request.staff_id)
            .await?
            .ok_or_else(|| BookingError::UnknownStaff(request.staff_id.clone()))?;

        let title = format!("{}: {}", appointment.name, request.name);
        let commitment = Commitment::new(title, request.start, request.stop)
            .with_attendee(&profile.calendar_id);

        let created = self.commitments.reserve(commitment).await?;
        info!(
            staff = %request.staff_id,
            start = %request.start,
            commitment = %created.id,
            "booked appointment"
        );
        Ok(created)
    }
}
