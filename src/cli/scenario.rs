//! Scenario files for CLI runs.
//!
//! A scenario is one TOML file describing an appointment type, its staff
//! profiles, and the commitments already on their calendars. Dates are
//! RFC 3339 strings, e.g. `"2026-09-07T10:00:00Z"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use rendez::appointment::AppointmentType;
use rendez::calendar::{Commitment, InMemoryCommitmentStore};
use rendez::error::{ConfigError, Result};
use rendez::staff::{InMemoryStaffDirectory, StaffProfile};
use rendez::{CommitmentStore, Config};

/// One self-contained CLI scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub appointment: AppointmentType,
    #[serde(default)]
    pub staff: Vec<StaffProfile>,
    #[serde(default)]
    pub commitments: Vec<ScenarioCommitment>,
}

/// Seed commitment: a simplified commitment row for scenario files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCommitment {
    pub title: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    /// Calendar identities attending, all accepted.
    pub attendees: Vec<String>,
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        let scenario: Scenario = toml::from_str(&content).map_err(ConfigError::Parse)?;
        scenario.appointment.validate()?;
        Ok(scenario)
    }

    /// Build the staff directory this scenario describes.
    pub fn directory(&self) -> InMemoryStaffDirectory {
        InMemoryStaffDirectory::with_profiles(self.staff.iter().cloned())
    }

    /// Build the commitment store: persistent when the config asks for it,
    /// in-memory otherwise. Seed commitments are loaded only into an empty
    /// store, so an existing snapshot (with earlier bookings) wins.
    pub async fn commitment_store(&self, config: &Config) -> Result<InMemoryCommitmentStore> {
        let store = if config.storage.persist {
            InMemoryCommitmentStore::with_persistence(&config.data_dir()?).await?
        } else {
            InMemoryCommitmentStore::new()
        };
        if store.count().await? == 0 {
            for seed in &self.commitments {
                let mut commitment = Commitment::new(seed.title.clone(), seed.start, seed.stop)
                    .with_all_day(seed.all_day);
                for attendee in &seed.attendees {
                    commitment = commitment.with_attendee(attendee);
                }
                store.create(commitment).await?;
            }
        }
        Ok(store)
    }
}
