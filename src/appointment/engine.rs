//! Slot engine.
//!
//! Wires the three pipeline stages (expansion, availability filtering,
//! presentation folding) to their collaborators and exposes the one entry
//! point callers use: [`SlotEngine::appointment_slots`].
//!
//! # Usage
//!
//! ```ignore
//! let engine = SlotEngine::new(directory, commitments);
//! let query = SlotQuery::new(chrono_tz::Europe::Brussels)
//!     .with_locale(Locale::fr_fr());
//! let months = engine.appointment_slots(&appointment, &query).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::availability::{assign_staff, candidate_staff, load_commitments};
use super::expansion::{expand_slots, SchedulingWindow};
use super::grid::{fold_months, MonthGrid};
use super::types::AppointmentType;
use crate::calendar::CommitmentStore;
use crate::error::Result;
use crate::locale::Locale;
use crate::staff::StaffDirectory;

// ============================================================================
// Query
// ============================================================================

/// Parameters of one grid request.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    /// Viewer timezone: display frame of every slot and of the grid.
    pub timezone: Tz,
    /// Locale driving week layout, weekend days and month labels.
    pub locale: Locale,
    /// Staff ids the viewer picked; empty means no filter.
    pub filter_staff: Vec<String>,
    /// Evaluation instant; `None` means now.
    pub reference: Option<DateTime<Utc>>,
}

impl SlotQuery {
    /// Query in the given viewer timezone with the default locale.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            locale: Locale::default(),
            filter_staff: Vec::new(),
            reference: None,
        }
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Restrict to the given staff ids.
    pub fn with_filter_staff(mut self, staff_ids: Vec<String>) -> Self {
        self.filter_staff = staff_ids;
        self
    }

    /// Pin the evaluation instant (defaults to now).
    pub fn with_reference(mut self, reference: DateTime<Utc>) -> Self {
        self.reference = Some(reference);
        self
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The slot pipeline and its injected collaborators.
pub struct SlotEngine<D, C> {
    directory: Arc<D>,
    commitments: Arc<C>,
}

impl<D, C> SlotEngine<D, C>
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

    /// Compute the bookable month grids for one appointment type.
    ///
    /// Configuration dead ends (no staff configured, or a caller filter
    /// matching none of the configured staff) yield an empty list rather
    /// than an error; callers render "no availability". An appointment with
    /// rules but no free staff still yields the full month skeleton with
    /// every cell empty.
    pub async fn appointment_slots(
        &self,
        appointment: &AppointmentType,
        query: &SlotQuery,
    ) -> Result<Vec<MonthGrid>> {
        let reference = query.reference.unwrap_or_else(Utc::now);

        let staff_ids = candidate_staff(appointment, &query.filter_staff);
        if staff_ids.is_empty() {
            debug!(
                appointment = %appointment.name,
                "no eligible staff, returning empty grid"
            );
            return Ok(Vec::new());
        }

        let window = SchedulingWindow::for_appointment(appointment, reference);
        let mut slots = expand_slots(appointment, &window, query.timezone, reference);
        debug!(
            appointment = %appointment.name,
            slots = slots.len(),
            "expanded slot template"
        );

        let profiles = self.directory.profiles(&staff_ids).await?;
        if profiles.len() < staff_ids.len() {
            warn!(
                appointment = %appointment.name,
                requested = staff_ids.len(),
                found = profiles.len(),
                "staff without a directory profile are skipped"
            );
        }
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        // One-off ranges may lie outside the derived window; widen the
        // commitment load so every slot is checked against real busyness.
        let load_start = slots
            .iter()
            .map(|s| s.utc_start)
            .min()
            .map_or(window.first, |s| s.min(window.first));
        let load_end = slots
            .iter()
            .map(|s| s.utc_end)
            .max()
            .map_or(window.last, |e| e.max(window.last));
        let index =
            load_commitments(self.commitments.as_ref(), &profiles, load_start, load_end).await?;

        assign_staff(&mut slots, &profiles, &index, &mut rand::thread_rng());

        Ok(fold_months(
            slots,
            query.timezone,
            &query.locale,
            &window,
            reference,
        ))
    }
}
