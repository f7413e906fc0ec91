//! Staff directory service.
//!
//! The scheduling engine never reaches into user or HR records directly: it
//! resolves staff ids through a [`StaffDirectory`], which yields the linked
//! calendar identity (the id commitments are recorded under) and the working
//! timezone. An in-memory implementation backs tests and the CLI.

use async_trait::async_trait;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;

/// Directory entry for one bookable staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    /// Staff identity used in appointment configuration.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Calendar identity commitments are recorded under.
    pub calendar_id: String,
    /// Working timezone.
    #[serde(default = "default_tz")]
    pub tz: Tz,
}

fn default_tz() -> Tz {
    chrono_tz::UTC
}

impl StaffProfile {
    /// Create a profile whose calendar identity defaults to the staff id.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            calendar_id: id.clone(),
            id,
            name: name.into(),
            tz: chrono_tz::UTC,
        }
    }

    /// Set a distinct calendar identity.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Set the working timezone.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }
}

/// Read access to staff identities.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Resolve one staff id.
    async fn profile(&self, staff_id: &str) -> Result<Option<StaffProfile>>;

    /// Resolve several staff ids, preserving input order. Unknown ids are
    /// skipped rather than failing the whole resolution.
    async fn profiles(&self, staff_ids: &[String]) -> Result<Vec<StaffProfile>>;
}

/// In-memory staff directory.
#[derive(Default)]
pub struct InMemoryStaffDirectory {
    profiles: Arc<RwLock<HashMap<String, StaffProfile>>>,
}

impl InMemoryStaffDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with profiles.
    pub fn with_profiles(profiles: impl IntoIterator<Item = StaffProfile>) -> Self {
        let map = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            profiles: Arc::new(RwLock::new(map)),
        }
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, profile: StaffProfile) {
        self.profiles.write().await.insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStaffDirectory {
    async fn profile(&self, staff_id: &str) -> Result<Option<StaffProfile>> {
        Ok(self.profiles.read().await.get(staff_id).cloned())
    }

    async fn profiles(&self, staff_ids: &[String]) -> Result<Vec<StaffProfile>> {
        let map = self.profiles.read().await;
        Ok(staff_ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }
}
