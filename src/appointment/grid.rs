//! Calendar presentation folding.
//!
//! Third stage of the slot pipeline. Folds the filtered slot sequence into a
//! month/week/day grid ready for rendering:
//!
//! - Locale-aware month matrices (first day of week, weekend days)
//! - Muted cells for adjacent-month days, plus weekend and today flags
//! - Assigned slots attached to their day with a time or "All day" label
//! - Per-month pagination counters (assigned slots before and after)
//!
//! Folding is a single forward pass: slots arrive sorted by start instant
//! and each one is examined exactly once.

use std::collections::VecDeque;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::expansion::SchedulingWindow;
use super::types::AppointmentSlot;
use crate::locale::Locale;

// ============================================================================
// Grid Types
// ============================================================================

/// One bookable entry attached to a day cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotRef {
    /// Assigned staff member.
    pub staff_id: String,
    /// Start in the display timezone, `%Y-%m-%d %H:%M:%S`.
    pub datetime: String,
    /// Hour label, or "All day".
    pub label: String,
    /// UTC bounds, handed back verbatim when the visitor books.
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
}

/// One day cell of a month matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Belongs to an adjacent month and renders dimmed.
    pub muted: bool,
    pub weekend: bool,
    pub today: bool,
    /// Bookable slots on this day, in start order.
    pub slots: Vec<SlotRef>,
}

/// One month of the folded grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    /// Zero-based position in the returned sequence.
    pub id: usize,
    /// Localized "Month Year" label.
    pub label: String,
    /// Full weeks covering the month, including muted adjacent days.
    pub weeks: Vec<Vec<DayCell>>,
    /// True if any day of this month has a bookable slot.
    pub has_availabilities: bool,
    /// Assigned slots strictly before this month.
    pub nb_slots_previous_months: usize,
    /// Assigned slots strictly after this month.
    pub nb_slots_next_months: usize,
}

// ============================================================================
// Month Matrix
// ============================================================================

/// Full weeks covering one month, starting each week on `week_start`.
///
/// Leading and trailing cells belong to the adjacent months, exactly like a
/// printed wall calendar.
pub fn month_matrix(year: i32, month: u32, week_start: chrono::Weekday) -> Vec<Vec<NaiveDate>> {
    let Some(first_of_month) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let mut cursor = first_of_month;
    while cursor.weekday() != week_start {
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    let mut weeks = Vec::new();
    loop {
        let week: Vec<NaiveDate> = (0..7).map(|i| cursor + Duration::days(i)).collect();
        cursor += Duration::days(7);
        weeks.push(week);
        if cursor.year() != year || cursor.month() != month {
            break;
        }
    }
    weeks
}

// ============================================================================
// Folding
// ============================================================================

/// Fold sorted, staff-assigned slots into month grids.
///
/// The first rendered month is the month of the first slot (in the display
/// timezone) so early one-off ranges are never lost; with no slots at all it
/// falls back to the month the window opens in. Months then advance one by
/// one until the month of the window's last day, so empty input still yields
/// the full skeleton.
pub fn fold_months(
    slots: Vec<AppointmentSlot>,
    display_tz: Tz,
    locale: &Locale,
    window: &SchedulingWindow,
    reference: DateTime<Utc>,
) -> Vec<MonthGrid> {
    let first_day = window.first.with_timezone(&display_tz).date_naive();
    let last_day = window.last.with_timezone(&display_tz).date_naive();
    let today = reference.with_timezone(&display_tz).date_naive();

    let total_assigned = slots.iter().filter(|s| s.is_assigned()).count();
    let mut remaining: VecDeque<AppointmentSlot> = slots.into();

    let (mut year, mut month) = match remaining.front() {
        Some(first) => {
            let date = first.display_start.date_naive();
            (date.year(), date.month())
        }
        None => (first_day.year(), first_day.month()),
    };
    let last = (last_day.year(), last_day.month());

    let mut months = Vec::new();
    let mut previous_assigned = 0;
    while (year, month) <= last {
        // Counter starts at "every assigned slot still queued" and loses one
        // per slot attached below, leaving the strictly-after count.
        let mut next_assigned = remaining.iter().filter(|s| s.is_assigned()).count();
        let mut has_availabilities = false;

        let mut weeks = Vec::new();
        for week in month_matrix(year, month, locale.week_start) {
            let mut cells = Vec::with_capacity(7);
            for date in week {
                let muted = date.year() != year || date.month() != month;
                let mut day_slots = Vec::new();
                if !muted {
                    // Slots are sorted, so the queue head is drained up to
                    // and including this date; only exact-date assigned
                    // slots become cell entries.
                    while remaining
                        .front()
                        .is_some_and(|s| s.display_start.date_naive() <= date)
                    {
                        let Some(slot) = remaining.pop_front() else {
                            break;
                        };
                        if slot.display_start.date_naive() != date {
                            continue;
                        }
                        if let Some(staff_id) = slot.staff_id {
                            let label = if slot.all_day {
                                "All day".to_string()
                            } else {
                                slot.display_start.format("%H:%M").to_string()
                            };
                            day_slots.push(SlotRef {
                                staff_id,
                                datetime: slot
                                    .display_start
                                    .format("%Y-%m-%d %H:%M:%S")
                                    .to_string(),
                                label,
                                utc_start: slot.utc_start,
                                utc_end: slot.utc_end,
                            });
                            next_assigned -= 1;
                            has_availabilities = true;
                        }
                    }
                }
                cells.push(DayCell {
                    date,
                    muted,
                    weekend: locale.is_weekend(date.weekday()),
                    today: date == today,
                    slots: day_slots,
                });
            }
            weeks.push(cells);
        }

        months.push(MonthGrid {
            id: months.len(),
            label: locale.month_label(year, month),
            weeks,
            has_availabilities,
            nb_slots_previous_months: previous_assigned,
            nb_slots_next_months: next_assigned,
        });

        previous_assigned = total_assigned - next_assigned;
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}
