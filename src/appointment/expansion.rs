//! Slot template expansion.
//!
//! First stage of the slot pipeline. Turns an appointment type's weekly
//! recurring template (or its one-off date ranges) into concrete
//! [`AppointmentSlot`]s inside the scheduling window:
//!
//! - Day-by-day enumeration of the window in the appointment timezone
//! - Consecutive duration-sized slots per rule, dropping the final partial
//! - Lead-time suppression so no slot starts before "now plus notice"
//! - Deterministic handling of DST gaps and ambiguous wall clocks
//!
//! # Usage
//!
//! ```ignore
//! let window = SchedulingWindow::for_appointment(&appointment, reference);
//! let slots = expand_slots(&appointment, &window, chrono_tz::UTC, reference);
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::types::{fractional_hour_on, AppointmentSlot, AppointmentType, SlotPattern, SlotRule};

// ============================================================================
// Scheduling Window
// ============================================================================

/// Bookable period derived from one appointment type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulingWindow {
    /// Earliest instant a slot may start (reference plus lead time).
    pub first: DateTime<Utc>,
    /// End of the horizon.
    pub last: DateTime<Utc>,
}

impl SchedulingWindow {
    /// Derive the window for `appointment` as seen from `reference`.
    ///
    /// Recurring categories span from the lead-time threshold to the
    /// configured horizon. Custom types follow their one-off ranges instead:
    /// the window opens with the first range still in the future and closes
    /// when the last one ends.
    pub fn for_appointment(appointment: &AppointmentType, reference: DateTime<Utc>) -> Self {
        let lead = appointment.lead_time();
        let mut first = reference + lead;
        let mut last = reference + Duration::days(appointment.max_schedule_days);

        if appointment.category.uses_unique_rules() {
            let future: Vec<(DateTime<Utc>, DateTime<Utc>)> = appointment
                .slot_rules
                .iter()
                .filter_map(|rule| match rule.pattern {
                    SlotPattern::Unique { start, end } if end > reference => Some((start, end)),
                    _ => None,
                })
                .collect();
            if let Some(earliest) = future.iter().map(|(start, _)| *start).min() {
                first = earliest.max(reference) + lead;
            }
            if let Some(latest) = future.iter().map(|(_, end)| *end).max() {
                last = latest;
            }
        }

        Self { first, last }
    }
}

// ============================================================================
// Expansion
// ============================================================================

/// Expand the appointment's template into concrete slots.
///
/// Recurring rules are enumerated day by rule by sub-slot; one-off rules
/// contribute their literal ranges. The result is sorted by UTC start, which
/// later stages rely on.
pub fn expand_slots(
    appointment: &AppointmentType,
    window: &SchedulingWindow,
    display_tz: Tz,
    reference: DateTime<Utc>,
) -> Vec<AppointmentSlot> {
    let mut slots = if appointment.category.uses_unique_rules() {
        expand_unique(appointment, display_tz, reference)
    } else {
        expand_recurring(appointment, window, display_tz)
    };
    slots.sort_by(|a, b| a.utc_start.cmp(&b.utc_start));
    slots
}

fn expand_recurring(
    appointment: &AppointmentType,
    window: &SchedulingWindow,
    display_tz: Tz,
) -> Vec<AppointmentSlot> {
    let tz = appointment.appointment_tz;
    let duration = appointment.duration();
    // A non-positive duration would never advance the cursor.
    if duration <= Duration::zero() {
        return Vec::new();
    }

    let first_day = window.first.with_timezone(&tz).date_naive();
    let last_day = window.last.with_timezone(&tz).date_naive();

    let mut slots = Vec::new();
    let mut day = first_day;
    while day <= last_day {
        let weekday = day.weekday();
        let mut day_rules: Vec<&SlotRule> = appointment
            .slot_rules
            .iter()
            .filter(|rule| {
                matches!(rule.pattern, SlotPattern::Recurring { weekday: w, .. } if w == weekday)
            })
            .collect();
        day_rules.sort_by(|a, b| rule_start_hour(a).total_cmp(&rule_start_hour(b)));

        for rule in day_rules {
            let SlotPattern::Recurring {
                start_hour,
                end_hour,
                ..
            } = rule.pattern
            else {
                continue;
            };
            let rule_start = resolve_local(tz, fractional_hour_on(day, start_hour));
            let rule_end = resolve_local(tz, fractional_hour_on(day, end_hour));
            let rule_end = rule_end.with_timezone(&Utc);

            // Lead-time suppression: never start before the window opens.
            let mut slot_start = rule_start.with_timezone(&Utc).max(window.first);
            while slot_start + duration <= rule_end {
                slots.push(AppointmentSlot::from_instants(
                    rule,
                    slot_start,
                    slot_start + duration,
                    tz,
                    display_tz,
                ));
                slot_start += duration;
            }
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    slots
}

fn expand_unique(
    appointment: &AppointmentType,
    display_tz: Tz,
    reference: DateTime<Utc>,
) -> Vec<AppointmentSlot> {
    let tz = appointment.appointment_tz;
    appointment
        .slot_rules
        .iter()
        .filter_map(|rule| match rule.pattern {
            SlotPattern::Unique { start, end } if end > reference => {
                Some(AppointmentSlot::from_instants(rule, start, end, tz, display_tz))
            }
            _ => None,
        })
        .collect()
}

fn rule_start_hour(rule: &SlotRule) -> f64 {
    match rule.pattern {
        SlotPattern::Recurring { start_hour, .. } => start_hour,
        SlotPattern::Unique { .. } => 0.0,
    }
}

/// Resolve a wall-clock time in `tz`, deterministically.
///
/// An ambiguous wall clock (repeated hour when DST ends) takes the earlier
/// offset. A nonexistent wall clock (skipped hour when DST starts) takes the
/// first valid instant after the gap. All slot arithmetic then runs on the
/// UTC instant; per-frame wall clocks are re-derived from it.
pub(crate) fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut probe = naive;
    for _ in 0..52 {
        if let Some(resolved) = tz.from_local_datetime(&probe).earliest() {
            return resolved;
        }
        probe += Duration::minutes(30);
    }
    // No tzdata gap spans more than a day; interpret the wall clock as UTC
    // rather than keep probing.
    tz.from_utc_datetime(&naive)
}
