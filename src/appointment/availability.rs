//! Availability filtering.
//!
//! Second stage of the slot pipeline. Assigns at most one free staff member
//! to each expanded slot:
//!
//! - Candidate staff resolution (caller filter intersected with the
//!   configured list, order preserved)
//! - One batch commitment load for the whole window, bucketed by calendar
//!   identity and UTC date
//! - Per-slot first-match assignment over a shuffled candidate order
//!
//! Slots nobody can serve stay in the sequence unassigned; presentation
//! decides how to render them.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::types::{AppointmentSlot, AppointmentType};
use crate::calendar::types::utc_date_span;
use crate::calendar::{Commitment, CommitmentStore};
use crate::error::Result;
use crate::staff::StaffProfile;

// ============================================================================
// Candidate Resolution
// ============================================================================

/// Staff ids eligible for this request: the caller's filter intersected with
/// the configured list, in configured order. An empty filter means every
/// configured staff member.
pub fn candidate_staff(appointment: &AppointmentType, filter: &[String]) -> Vec<String> {
    if filter.is_empty() {
        return appointment.staff_ids.clone();
    }
    appointment
        .staff_ids
        .iter()
        .filter(|id| filter.contains(id))
        .cloned()
        .collect()
}

// ============================================================================
// Commitment Index
// ============================================================================

/// Commitments bucketed by calendar identity and UTC date.
///
/// A multi-day commitment is indexed under every date it spans, so checking
/// a slot only touches the buckets of the days the slot itself spans.
#[derive(Debug, Default)]
pub struct CommitmentIndex {
    buckets: HashMap<String, HashMap<NaiveDate, Vec<Commitment>>>,
}

impl CommitmentIndex {
    /// Build the index from a batch of commitments, keeping for each
    /// calendar identity only the ones that actually block it.
    pub fn build(commitments: &[Commitment], calendar_ids: &[String]) -> Self {
        let mut buckets: HashMap<String, HashMap<NaiveDate, Vec<Commitment>>> = HashMap::new();
        for commitment in commitments {
            for calendar_id in calendar_ids {
                if !commitment.blocks(calendar_id) {
                    continue;
                }
                let days = buckets.entry(calendar_id.clone()).or_default();
                for date in commitment.spanned_dates() {
                    days.entry(date).or_default().push(commitment.clone());
                }
            }
        }
        Self { buckets }
    }

    /// True if any commitment bucketed under a day of `[start, stop)`
    /// conflicts with it.
    pub fn has_conflict(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> bool {
        let Some(days) = self.buckets.get(calendar_id) else {
            return false;
        };
        let (first, last) = utc_date_span(start, stop);
        let mut date = first;
        loop {
            if let Some(bucket) = days.get(&date) {
                if bucket.iter().any(|c| c.conflicts_with(start, stop)) {
                    return true;
                }
            }
            if date >= last {
                return false;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => return false,
            }
        }
    }
}

/// Batch-load every commitment touching the window for the given profiles
/// and bucket them for per-slot lookups.
pub async fn load_commitments(
    store: &dyn CommitmentStore,
    profiles: &[StaffProfile],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<CommitmentIndex> {
    let calendar_ids: Vec<String> = profiles.iter().map(|p| p.calendar_id.clone()).collect();
    let commitments = store
        .find_overlapping(&calendar_ids, window_start, window_end)
        .await?;
    Ok(CommitmentIndex::build(&commitments, &calendar_ids))
}

// ============================================================================
// Assignment
// ============================================================================

/// Assign at most one free staff member to each slot, in place.
///
/// Candidates are shuffled once per call so repeated renders do not always
/// favor the first configured staff member; within a slot the first free
/// candidate in shuffled order wins. A staff member is free for a slot when
/// the rule's restriction allows them and no indexed commitment overlaps the
/// slot's UTC range.
pub fn assign_staff<R: Rng + ?Sized>(
    slots: &mut [AppointmentSlot],
    profiles: &[StaffProfile],
    index: &CommitmentIndex,
    rng: &mut R,
) {
    let mut candidates: Vec<&StaffProfile> = profiles.iter().collect();
    candidates.shuffle(rng);

    for slot in slots.iter_mut() {
        slot.staff_id = candidates
            .iter()
            .find(|profile| {
                slot.allows(&profile.id)
                    && !index.has_conflict(&profile.calendar_id, slot.utc_start, slot.utc_end)
            })
            .map(|profile| profile.id.clone());
    }
}
