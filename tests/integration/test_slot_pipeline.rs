//! End-to-end slot pipeline tests.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};

use rendez::appointment::{
    AppointmentCategory, AppointmentType, MonthGrid, SlotEngine, SlotQuery, SlotRule,
};
use rendez::calendar::{Commitment, InMemoryCommitmentStore};
use rendez::staff::{InMemoryStaffDirectory, StaffProfile};
use rendez::CommitmentStore;

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, mo, d).unwrap()
}

/// Helper to build an engine over the given profiles and commitments.
async fn create_engine(
    profiles: Vec<StaffProfile>,
    commitments: Vec<Commitment>,
) -> SlotEngine<InMemoryStaffDirectory, InMemoryCommitmentStore> {
    let directory = InMemoryStaffDirectory::with_profiles(profiles);
    let store = InMemoryCommitmentStore::new();
    for commitment in commitments {
        store.create(commitment).await.unwrap();
    }
    SlotEngine::new(Arc::new(directory), Arc::new(store))
}

/// Collect every attached slot as (date, time label, staff id).
fn collect_slots(months: &[MonthGrid]) -> Vec<(NaiveDate, String, String)> {
    months
        .iter()
        .flat_map(|m| m.weeks.iter().flatten())
        .filter(|cell| !cell.muted)
        .flat_map(|cell| {
            cell.slots
                .iter()
                .map(|s| (cell.date, s.label.clone(), s.staff_id.clone()))
        })
        .collect()
}

#[tokio::test]
async fn test_default_website_rules_over_the_full_horizon() {
    let engine = create_engine(vec![StaffProfile::new("ana", "Ana")], vec![]).await;

    let reference = ts(2026, 9, 4, 10, 0);
    let appointment = AppointmentType::new("Demo call", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(15)
        .with_staff(vec!["ana".to_string()])
        .with_default_rules(reference)
        .unwrap();
    appointment.validate().unwrap();

    let query = SlotQuery::new(chrono_tz::UTC).with_reference(reference);
    let months = engine.appointment_slots(&appointment, &query).await.unwrap();

    // All fifteen days land in September.
    assert_eq!(months.len(), 1);
    assert!(months[0].has_availabilities);

    let slots = collect_slots(&months);
    // Friday the 4th keeps 11:00 plus the afternoon block after the one-hour
    // notice; the ten remaining weekdays contribute six slots each.
    assert_eq!(slots.len(), 64);
    assert!(slots.iter().all(|(_, _, staff)| staff == "ana"));

    let friday: Vec<&str> = slots
        .iter()
        .filter(|(day, _, _)| *day == date(2026, 9, 4))
        .map(|(_, label, _)| label.as_str())
        .collect();
    assert_eq!(friday, vec!["11:00", "14:00", "15:00", "16:00"]);

    let monday: Vec<&str> = slots
        .iter()
        .filter(|(day, _, _)| *day == date(2026, 9, 7))
        .map(|(_, label, _)| label.as_str())
        .collect();
    assert_eq!(monday, vec!["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"]);
}

#[tokio::test]
async fn test_restriction_and_busyness_compose() {
    // Monday is reserved to Ana, who is busy mid-morning; Tuesday is open to
    // both Ana and Bob.
    let engine = create_engine(
        vec![
            StaffProfile::new("ana", "Ana"),
            StaffProfile::new("bob", "Bob"),
        ],
        vec![
            Commitment::new("Standup", ts(2026, 9, 7, 10, 0), ts(2026, 9, 7, 10, 30))
                .with_attendee("ana"),
        ],
    )
    .await;

    let appointment = AppointmentType::new("Support", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(5)
        .with_staff(vec!["ana".to_string(), "bob".to_string()])
        .with_rule(
            SlotRule::recurring(Weekday::Mon, 9.0, 12.0)
                .with_restricted_staff(vec!["ana".to_string()]),
        )
        .with_rule(SlotRule::recurring(Weekday::Tue, 9.0, 12.0));

    let query = SlotQuery::new(chrono_tz::UTC).with_reference(ts(2026, 9, 4, 10, 0));
    let months = engine.appointment_slots(&appointment, &query).await.unwrap();
    let slots = collect_slots(&months);

    let monday: Vec<(&str, &str)> = slots
        .iter()
        .filter(|(day, _, _)| *day == date(2026, 9, 7))
        .map(|(_, label, staff)| (label.as_str(), staff.as_str()))
        .collect();
    // Bob may not take the restricted rule even though he is free at 10:00.
    assert_eq!(monday, vec![("09:00", "ana"), ("11:00", "ana")]);

    let tuesday: Vec<&(NaiveDate, String, String)> = slots
        .iter()
        .filter(|(day, _, _)| *day == date(2026, 9, 8))
        .collect();
    assert_eq!(tuesday.len(), 3);
    assert!(tuesday
        .iter()
        .all(|(_, _, staff)| staff == "ana" || staff == "bob"));
}

#[tokio::test]
async fn test_repeated_queries_offer_the_same_slots() {
    // Two visitors loading the grid see the same bookable times; only the
    // staff behind each slot may differ while both are free.
    let engine = create_engine(
        vec![
            StaffProfile::new("ana", "Ana"),
            StaffProfile::new("bob", "Bob"),
        ],
        vec![],
    )
    .await;

    let appointment = AppointmentType::new("Support", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(5)
        .with_staff(vec!["ana".to_string(), "bob".to_string()])
        .with_rule(SlotRule::recurring(Weekday::Mon, 9.0, 12.0));
    let query = SlotQuery::new(chrono_tz::UTC).with_reference(ts(2026, 9, 4, 10, 0));

    let first = engine.appointment_slots(&appointment, &query).await.unwrap();
    let second = engine.appointment_slots(&appointment, &query).await.unwrap();

    let times = |months: &[MonthGrid]| -> Vec<(NaiveDate, String)> {
        collect_slots(months)
            .into_iter()
            .map(|(day, label, _)| (day, label))
            .collect()
    };
    assert_eq!(times(&first), times(&second));
}

#[tokio::test]
async fn test_viewer_timezones_agree_on_instants() {
    // The wall-clock labels differ per viewer, but the UTC bounds carried by
    // each slot are the same instants.
    let engine = create_engine(vec![StaffProfile::new("ana", "Ana")], vec![]).await;
    let appointment = AppointmentType::new("Demo call", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(5)
        .with_staff(vec!["ana".to_string()])
        .with_rule(SlotRule::recurring(Weekday::Mon, 9.0, 12.0));
    let reference = ts(2026, 9, 4, 10, 0);

    let instants = |months: &[MonthGrid]| -> Vec<DateTime<Utc>> {
        months
            .iter()
            .flat_map(|m| m.weeks.iter().flatten())
            .flat_map(|cell| cell.slots.iter())
            .map(|s| s.utc_start)
            .collect()
    };

    let brussels = engine
        .appointment_slots(
            &appointment,
            &SlotQuery::new(chrono_tz::Europe::Brussels).with_reference(reference),
        )
        .await
        .unwrap();
    let new_york = engine
        .appointment_slots(
            &appointment,
            &SlotQuery::new(chrono_tz::America::New_York).with_reference(reference),
        )
        .await
        .unwrap();

    assert_eq!(instants(&brussels), instants(&new_york));
    assert_eq!(instants(&brussels).len(), 3);
}

#[tokio::test]
async fn test_pagination_counters_partition_the_total() {
    let engine = create_engine(vec![StaffProfile::new("ana", "Ana")], vec![]).await;
    let appointment = AppointmentType::new("Long haul", AppointmentCategory::Website)
        .with_duration(1.0)
        .with_lead_time(1.0)
        .with_horizon(45)
        .with_staff(vec!["ana".to_string()])
        .with_rule(SlotRule::recurring(Weekday::Mon, 9.0, 12.0));

    let query = SlotQuery::new(chrono_tz::UTC).with_reference(ts(2026, 9, 4, 10, 0));
    let months = engine.appointment_slots(&appointment, &query).await.unwrap();
    assert!(months.len() >= 2);

    let per_month: Vec<usize> = months
        .iter()
        .map(|m| {
            m.weeks
                .iter()
                .flatten()
                .map(|cell| cell.slots.len())
                .sum()
        })
        .collect();
    let total: usize = per_month.iter().sum();

    for (i, month) in months.iter().enumerate() {
        assert_eq!(month.id, i);
        let earlier: usize = per_month[..i].iter().sum();
        assert_eq!(
            month.nb_slots_previous_months, earlier,
            "month {} previous counter",
            month.label
        );
        assert_eq!(
            month.nb_slots_next_months,
            total - earlier - per_month[i],
            "month {} next counter",
            month.label
        );
    }
}
