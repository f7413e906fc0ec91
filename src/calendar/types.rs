//! Commitment types: existing calendar events that block staff availability.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Commitment Types
// ============================================================================

/// An existing calendar event for one or more calendar identities.
///
/// `start`/`stop` bound a half-open interval `[start, stop)` in UTC. All-day
/// events follow the same convention: an event covering the whole of Monday
/// runs from Monday 00:00 to Tuesday 00:00 with `all_day` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    /// Unique identifier.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Start instant (UTC).
    pub start: DateTime<Utc>,
    /// Stop instant (UTC, exclusive).
    pub stop: DateTime<Utc>,
    /// All-day flag: the event blocks every day it spans regardless of hours.
    #[serde(default)]
    pub all_day: bool,
    /// Attendees with their acceptance state.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// When this commitment was recorded.
    pub created_at: DateTime<Utc>,
}

/// One attendee of a commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    /// Calendar identity of the attendee.
    pub calendar_id: String,
    /// Acceptance state.
    #[serde(default)]
    pub status: AttendeeStatus,
}

/// Acceptance state of an attendee. Everything except `Declined` counts as
/// busy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeStatus {
    /// Invited, not yet answered.
    #[default]
    NeedsAction,
    /// Accepted the invitation.
    Accepted,
    /// Tentatively accepted.
    Tentative,
    /// Declined; does not block availability.
    Declined,
}

impl Attendee {
    /// Create an attendee with the given state.
    pub fn new(calendar_id: impl Into<String>, status: AttendeeStatus) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            status,
        }
    }
}

impl Commitment {
    /// Create a commitment with a fresh id and no attendees.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            start,
            stop,
            all_day: false,
            attendees: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Add an accepted attendee.
    pub fn with_attendee(mut self, calendar_id: impl Into<String>) -> Self {
        self.attendees
            .push(Attendee::new(calendar_id, AttendeeStatus::Accepted));
        self
    }

    /// Add an attendee with an explicit state.
    pub fn with_attendee_status(
        mut self,
        calendar_id: impl Into<String>,
        status: AttendeeStatus,
    ) -> Self {
        self.attendees.push(Attendee::new(calendar_id, status));
        self
    }

    /// Mark the commitment as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Event duration.
    pub fn duration(&self) -> Duration {
        self.stop - self.start
    }

    /// True if this commitment overlaps `[start, stop)`. Touching intervals
    /// do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> bool {
        self.start < stop && self.stop > start
    }

    /// True if this commitment makes `calendar_id` busy: the identity must
    /// appear in the attendee list with a non-declined state.
    pub fn blocks(&self, calendar_id: &str) -> bool {
        self.attendees
            .iter()
            .any(|a| a.calendar_id == calendar_id && a.status != AttendeeStatus::Declined)
    }

    /// Inclusive first/last UTC calendar date this commitment touches.
    pub fn date_span(&self) -> (NaiveDate, NaiveDate) {
        utc_date_span(self.start, self.stop)
    }

    /// UTC calendar dates this commitment touches. The stop instant is
    /// exclusive, so an event ending exactly at midnight does not spill into
    /// the next day.
    pub fn spanned_dates(&self) -> Vec<NaiveDate> {
        let (first, last) = self.date_span();

        let mut dates = Vec::new();
        let mut day = first;
        while day <= last {
            dates.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        dates
    }

    /// True if this commitment makes its attendees busy during `[start,
    /// stop)`: timed events use strict interval overlap, all-day events block
    /// every UTC date they span.
    pub fn conflicts_with(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> bool {
        if self.all_day {
            let (first, last) = self.date_span();
            let (win_first, win_last) = utc_date_span(start, stop);
            first <= win_last && last >= win_first
        } else {
            self.overlaps(start, stop)
        }
    }
}

/// Inclusive UTC date range covered by a half-open `[start, stop)` interval.
pub(crate) fn utc_date_span(start: DateTime<Utc>, stop: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let first = start.date_naive();
    let mut last = stop.date_naive();
    if stop.time() == NaiveTime::MIN && stop > start {
        last = last.pred_opt().unwrap_or(last);
    }
    if last < first {
        last = first;
    }
    (first, last)
}
