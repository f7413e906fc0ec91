//! Booking flow tests: display a grid, book a slot, display again.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc, Weekday};
use tempfile::TempDir;

use rendez::appointment::{
    AppointmentCategory, AppointmentType, MonthGrid, SlotEngine, SlotQuery, SlotRule,
};
use rendez::booking::{BookingRequest, BookingService};
use rendez::calendar::InMemoryCommitmentStore;
use rendez::error::{BookingError, RendezError};
use rendez::staff::{InMemoryStaffDirectory, StaffProfile};
use rendez::CommitmentStore;

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn create_demo_appointment() -> AppointmentType {
    AppointmentType::new("Demo call", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(5)
        .with_staff(vec!["ana".to_string()])
        .with_rule(SlotRule::recurring(Weekday::Mon, 9.0, 12.0))
}

fn slot_labels(months: &[MonthGrid]) -> Vec<String> {
    months
        .iter()
        .flat_map(|m| m.weeks.iter().flatten())
        .flat_map(|cell| cell.slots.iter())
        .map(|s| s.label.clone())
        .collect()
}

#[tokio::test]
async fn test_booked_slot_disappears_from_the_next_grid() {
    let directory = Arc::new(InMemoryStaffDirectory::with_profiles([StaffProfile::new(
        "ana", "Ana",
    )]));
    let store = Arc::new(InMemoryCommitmentStore::new());
    let engine = SlotEngine::new(directory.clone(), store.clone());
    let service = BookingService::new(directory, store);

    let appointment = create_demo_appointment();
    let query = SlotQuery::new(chrono_tz::UTC).with_reference(ts(2026, 9, 4, 10, 0));

    // Step 1: the visitor sees three Monday slots.
    let before = engine.appointment_slots(&appointment, &query).await.unwrap();
    assert_eq!(slot_labels(&before), vec!["09:00", "10:00", "11:00"]);

    // Step 2: they book the middle one.
    let request = BookingRequest::new(
        "ana",
        ts(2026, 9, 7, 10, 0),
        ts(2026, 9, 7, 11, 0),
        "Visitor",
    );
    let commitment = service.book(&appointment, &request).await.unwrap();
    assert_eq!(commitment.title, "Demo call: Visitor");

    // Step 3: the next grid no longer offers it.
    let after = engine.appointment_slots(&appointment, &query).await.unwrap();
    assert_eq!(slot_labels(&after), vec!["09:00", "11:00"]);
}

#[tokio::test]
async fn test_grid_slot_carries_bookable_bounds() {
    // The UTC bounds on a rendered slot are exactly what the booking layer
    // accepts, with no recomputation in between.
    let directory = Arc::new(InMemoryStaffDirectory::with_profiles([StaffProfile::new(
        "ana", "Ana",
    )]));
    let store = Arc::new(InMemoryCommitmentStore::new());
    let engine = SlotEngine::new(directory.clone(), store.clone());
    let service = BookingService::new(directory, store);

    let appointment = create_demo_appointment();
    let query = SlotQuery::new(chrono_tz::Europe::Brussels).with_reference(ts(2026, 9, 4, 10, 0));

    let months = engine.appointment_slots(&appointment, &query).await.unwrap();
    let picked = months
        .iter()
        .flat_map(|m| m.weeks.iter().flatten())
        .flat_map(|cell| cell.slots.iter())
        .next()
        .expect("grid should offer at least one slot");

    let request = BookingRequest::new(
        picked.staff_id.clone(),
        picked.utc_start,
        picked.utc_end,
        "Visitor",
    );
    let commitment = service.book(&appointment, &request).await.unwrap();
    assert_eq!(commitment.start, ts(2026, 9, 7, 9, 0));
    assert_eq!(commitment.stop, ts(2026, 9, 7, 10, 0));
}

#[tokio::test]
async fn test_concurrent_bookings_cannot_both_win() {
    let directory = Arc::new(InMemoryStaffDirectory::with_profiles([StaffProfile::new(
        "ana", "Ana",
    )]));
    let store = Arc::new(InMemoryCommitmentStore::new());
    let service = Arc::new(BookingService::new(directory, store.clone()));
    let appointment = Arc::new(create_demo_appointment());

    let mut handles = Vec::new();
    for visitor in ["First visitor", "Second visitor"] {
        let service = service.clone();
        let appointment = appointment.clone();
        handles.push(tokio::spawn(async move {
            let request = BookingRequest::new(
                "ana",
                ts(2026, 9, 7, 10, 0),
                ts(2026, 9, 7, 11, 0),
                visitor,
            );
            service.book(&appointment, &request).await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(RendezError::Booking(BookingError::SlotTaken { .. })) => conflicts += 1,
            Err(other) => panic!("unexpected booking error: {other}"),
        }
    }

    assert_eq!(wins, 1, "exactly one booking should win the race");
    assert_eq!(conflicts, 1, "the loser should see a slot-taken conflict");
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_bookings_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    let appointment = create_demo_appointment();

    {
        let directory = Arc::new(InMemoryStaffDirectory::with_profiles([StaffProfile::new(
            "ana", "Ana",
        )]));
        let store = Arc::new(
            InMemoryCommitmentStore::with_persistence(dir.path())
                .await
                .unwrap(),
        );
        let service = BookingService::new(directory, store);
        let request = BookingRequest::new(
            "ana",
            ts(2026, 9, 7, 10, 0),
            ts(2026, 9, 7, 11, 0),
            "Visitor",
        );
        service.book(&appointment, &request).await.unwrap();
    }

    let reopened = InMemoryCommitmentStore::with_persistence(dir.path())
        .await
        .unwrap();
    assert_eq!(reopened.count().await.unwrap(), 1);

    let found = reopened
        .find_overlapping(
            &["ana".to_string()],
            ts(2026, 9, 7, 0, 0),
            ts(2026, 9, 8, 0, 0),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Demo call: Visitor");

    // The reopened store still refuses a conflicting reservation.
    let directory = Arc::new(InMemoryStaffDirectory::with_profiles([StaffProfile::new(
        "ana", "Ana",
    )]));
    let service = BookingService::new(directory, Arc::new(reopened));
    let request = BookingRequest::new(
        "ana",
        ts(2026, 9, 7, 10, 30),
        ts(2026, 9, 7, 11, 30),
        "Late visitor",
    );
    let err = service.book(&appointment, &request).await.unwrap_err();
    assert!(matches!(
        err,
        RendezError::Booking(BookingError::SlotTaken { .. })
    ));
}
