//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use rendez::appointment::{AppointmentType, MonthGrid};
use rendez::calendar::Commitment;

/// Print the folded month grids.
pub fn print_month_grids(grids: &[MonthGrid], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(grids).unwrap());
        return;
    }

    if grids.is_empty() {
        println!("No availability.");
        return;
    }

    let mut total = 0;
    for grid in grids {
        let month_slots: usize = grid
            .weeks
            .iter()
            .flatten()
            .map(|day| day.slots.len())
            .sum();
        total += month_slots;

        if grid.has_availabilities {
            println!(
                "{} ({} bookable slots; {} earlier, {} later)",
                grid.label, month_slots, grid.nb_slots_previous_months, grid.nb_slots_next_months
            );
        } else {
            println!("{} (no bookable slots)", grid.label);
        }

        for day in grid.weeks.iter().flatten() {
            if day.muted || day.slots.is_empty() {
                continue;
            }
            let slots = day
                .slots
                .iter()
                .map(|slot| format!("{} ({})", slot.label, slot.staff_id))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {}: {}", day.date.format("%a %Y-%m-%d"), slots);
        }
    }

    println!("\nTotal: {} bookable slots", total);
}

/// Print a confirmed booking.
pub fn print_booking(commitment: &Commitment, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(commitment).unwrap());
    } else {
        println!("Booked: {}", commitment.title);
        println!("From: {}", commitment.start.format("%Y-%m-%d %H:%M UTC"));
        println!("To:   {}", commitment.stop.format("%Y-%m-%d %H:%M UTC"));
        let attendees = commitment
            .attendees
            .iter()
            .map(|a| a.calendar_id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Attendees: {}", attendees);
        println!("Commitment ID: {}", commitment.id);
    }
}

/// Print the result of validating an appointment type.
pub fn print_validation(appointment: &AppointmentType, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(appointment).unwrap());
    } else {
        println!("Configuration valid.");
        println!("Name: {}", appointment.name);
        println!("Category: {}", appointment.category);
        println!("Duration: {} hours", appointment.appointment_duration);
        println!("Lead time: {} hours", appointment.min_schedule_hours);
        println!("Horizon: {} days", appointment.max_schedule_days);
        println!("Timezone: {}", appointment.appointment_tz);
        println!("Staff: {}", appointment.staff_ids.join(", "));
        println!("Slot rules: {}", appointment.slot_rules.len());
    }
}
