//! Appointment configuration and slot types.
//!
//! This module defines the configuration root ([`AppointmentType`]), its
//! availability template rows ([`SlotRule`]), and the ephemeral
//! [`AppointmentSlot`] values produced by expansion.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ============================================================================
// Categories and Policies
// ============================================================================

/// Kind of appointment type, deciding where its slots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentCategory {
    /// Bookable by visitors from a weekly recurring template; any number of
    /// staff members.
    #[default]
    Website,
    /// One-off date ranges picked by the organizer; single staff member.
    Custom,
    /// Availability follows the staff member's working schedule; single
    /// staff member, no slot template of its own.
    WorkHours,
}

impl AppointmentCategory {
    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            AppointmentCategory::Website => "Website",
            AppointmentCategory::Custom => "Custom",
            AppointmentCategory::WorkHours => "Work Hours",
        }
    }

    /// True if slots for this category come from one-off `unique` rules.
    pub fn uses_unique_rules(&self) -> bool {
        matches!(self, AppointmentCategory::Custom)
    }
}

impl std::fmt::Display for AppointmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How an appointment type picks the staff member for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignMethod {
    /// The engine assigns any free staff member.
    #[default]
    Random,
    /// The visitor picks a staff member; callers forward it as a filter.
    Chosen,
}

// ============================================================================
// Slot Rules
// ============================================================================

/// Shape of one availability template row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot_type", rename_all = "snake_case")]
pub enum SlotPattern {
    /// Weekly recurring window: weekday plus fractional start/end hours
    /// (9.5 = 9:30) in the appointment timezone.
    Recurring {
        weekday: Weekday,
        start_hour: f64,
        end_hour: f64,
    },
    /// One-off window with absolute UTC bounds.
    Unique {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// One availability template row of an [`AppointmentType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRule {
    /// Unique identifier, generated when absent.
    #[serde(default = "generate_id")]
    pub id: String,
    /// Recurring or one-off window.
    #[serde(flatten)]
    pub pattern: SlotPattern,
    /// Staff ids this rule is restricted to; empty means every configured
    /// staff member may serve it.
    #[serde(default)]
    pub restricted_staff: Vec<String>,
    /// Renders as "All day" instead of a time label.
    #[serde(default)]
    pub all_day: bool,
}

impl SlotRule {
    /// Create a weekly recurring rule.
    pub fn recurring(weekday: Weekday, start_hour: f64, end_hour: f64) -> Self {
        Self {
            id: generate_id(),
            pattern: SlotPattern::Recurring {
                weekday,
                start_hour,
                end_hour,
            },
            restricted_staff: Vec::new(),
            all_day: false,
        }
    }

    /// Create a one-off rule with absolute bounds.
    pub fn unique(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            pattern: SlotPattern::Unique { start, end },
            restricted_staff: Vec::new(),
            all_day: false,
        }
    }

    /// Restrict this rule to specific staff ids.
    pub fn with_restricted_staff(mut self, staff_ids: Vec<String>) -> Self {
        self.restricted_staff = staff_ids;
        self
    }

    /// Mark this rule as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Standard template rows for a freshly created appointment type.
    ///
    /// Website types get weekday mornings and afternoons (Mon-Fri, 9-12 and
    /// 14-17); custom types get a single one-hour range starting at the next
    /// full hour. Work-hours types derive availability from working
    /// schedules and have no template: asking for one is a caller bug and
    /// fails loudly.
    pub fn default_rules(
        category: AppointmentCategory,
        reference: DateTime<Utc>,
    ) -> Result<Vec<SlotRule>> {
        match category {
            AppointmentCategory::Website => {
                let weekdays = [
                    Weekday::Mon,
                    Weekday::Tue,
                    Weekday::Wed,
                    Weekday::Thu,
                    Weekday::Fri,
                ];
                let mut rules = Vec::with_capacity(weekdays.len() * 2);
                for weekday in weekdays {
                    rules.push(SlotRule::recurring(weekday, 9.0, 12.0));
                    rules.push(SlotRule::recurring(weekday, 14.0, 17.0));
                }
                Ok(rules)
            }
            AppointmentCategory::Custom => {
                let next_hour = (reference + Duration::hours(1))
                    .date_naive()
                    .and_hms_opt((reference + Duration::hours(1)).time().hour(), 0, 0)
                    .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                    .unwrap_or(reference);
                Ok(vec![SlotRule::unique(next_hour, next_hour + Duration::hours(1))])
            }
            AppointmentCategory::WorkHours => Err(ConfigError::UnsupportedCategory {
                category: category.display_name().to_string(),
                operation: "default slot".to_string(),
            }
            .into()),
        }
    }
}

// ============================================================================
// Appointment Type
// ============================================================================

/// Configuration root for one bookable service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentType {
    /// Unique identifier, generated when absent.
    #[serde(default = "generate_id")]
    pub id: String,
    /// Display name, also used as the title of booked commitments.
    pub name: String,
    /// Category deciding the slot source.
    #[serde(default)]
    pub category: AppointmentCategory,
    /// Slot length in fractional hours.
    #[serde(default = "default_duration")]
    pub appointment_duration: f64,
    /// Minimum lead time before a slot may start, in fractional hours.
    #[serde(default = "default_lead_hours")]
    pub min_schedule_hours: f64,
    /// Scheduling horizon in days.
    #[serde(default = "default_horizon_days")]
    pub max_schedule_days: i64,
    /// Timezone the recurring template is expressed in.
    #[serde(default = "default_tz")]
    pub appointment_tz: Tz,
    /// Staff assignment policy.
    #[serde(default)]
    pub assign_method: AssignMethod,
    /// Configured staff ids.
    #[serde(default)]
    pub staff_ids: Vec<String>,
    /// Availability template.
    #[serde(default)]
    pub slot_rules: Vec<SlotRule>,
}

fn default_duration() -> f64 {
    1.0
}

fn default_lead_hours() -> f64 {
    1.0
}

fn default_horizon_days() -> i64 {
    15
}

fn default_tz() -> Tz {
    chrono_tz::UTC
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl AppointmentType {
    /// Create an appointment type with defaults (1 h slots, 1 h lead time,
    /// 15 day horizon, UTC).
    pub fn new(name: impl Into<String>, category: AppointmentCategory) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            category,
            appointment_duration: default_duration(),
            min_schedule_hours: default_lead_hours(),
            max_schedule_days: default_horizon_days(),
            appointment_tz: chrono_tz::UTC,
            assign_method: AssignMethod::Random,
            staff_ids: Vec::new(),
            slot_rules: Vec::new(),
        }
    }

    /// Set the slot duration in fractional hours.
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.appointment_duration = hours;
        self
    }

    /// Set the minimum lead time in fractional hours.
    pub fn with_lead_time(mut self, hours: f64) -> Self {
        self.min_schedule_hours = hours;
        self
    }

    /// Set the scheduling horizon in days.
    pub fn with_horizon(mut self, days: i64) -> Self {
        self.max_schedule_days = days;
        self
    }

    /// Set the appointment timezone.
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.appointment_tz = tz;
        self
    }

    /// Set the assignment policy.
    pub fn with_assign_method(mut self, method: AssignMethod) -> Self {
        self.assign_method = method;
        self
    }

    /// Set the configured staff ids.
    pub fn with_staff(mut self, staff_ids: Vec<String>) -> Self {
        self.staff_ids = staff_ids;
        self
    }

    /// Add one slot rule.
    pub fn with_rule(mut self, rule: SlotRule) -> Self {
        self.slot_rules.push(rule);
        self
    }

    /// Replace the slot template with the category's default rows.
    pub fn with_default_rules(mut self, reference: DateTime<Utc>) -> Result<Self> {
        self.slot_rules = SlotRule::default_rules(self.category, reference)?;
        Ok(self)
    }

    /// Validate the configuration. Checked when an administrator saves an
    /// appointment type, never during slot computation.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField("appointment.name".to_string()).into());
        }
        if self.appointment_duration <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "appointment_duration must be positive, got {}",
                self.appointment_duration
            ))
            .into());
        }
        if self.min_schedule_hours < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_schedule_hours must not be negative, got {}",
                self.min_schedule_hours
            ))
            .into());
        }
        if self.max_schedule_days < 1 {
            return Err(ConfigError::Invalid(format!(
                "max_schedule_days must be at least 1, got {}",
                self.max_schedule_days
            ))
            .into());
        }
        if self.category != AppointmentCategory::Website && self.staff_ids.len() != 1 {
            return Err(ConfigError::Invalid(format!(
                "{} appointment types need exactly one staff member, got {}",
                self.category.display_name(),
                self.staff_ids.len()
            ))
            .into());
        }

        for rule in &self.slot_rules {
            match rule.pattern {
                SlotPattern::Recurring {
                    start_hour,
                    end_hour,
                    ..
                } => {
                    if self.category.uses_unique_rules() {
                        return Err(ConfigError::Invalid(format!(
                            "rule {} is recurring but {} types use one-off rules",
                            rule.id,
                            self.category.display_name()
                        ))
                        .into());
                    }
                    if !(0.0..=24.0).contains(&start_hour)
                        || !(0.0..=24.0).contains(&end_hour)
                        || start_hour >= end_hour
                    {
                        return Err(ConfigError::Invalid(format!(
                            "rule {} has an invalid hour range {}..{}",
                            rule.id, start_hour, end_hour
                        ))
                        .into());
                    }
                }
                SlotPattern::Unique { start, end } => {
                    if !self.category.uses_unique_rules() {
                        return Err(ConfigError::Invalid(format!(
                            "rule {} is one-off but {} types use recurring rules",
                            rule.id,
                            self.category.display_name()
                        ))
                        .into());
                    }
                    if start >= end {
                        return Err(ConfigError::Invalid(format!(
                            "rule {} ends before it starts",
                            rule.id
                        ))
                        .into());
                    }
                }
            }
        }

        Ok(())
    }

    /// Slot duration as a chrono `Duration` (minute precision).
    pub fn duration(&self) -> Duration {
        Duration::minutes((self.appointment_duration * 60.0).round() as i64)
    }

    /// Lead time as a chrono `Duration` (minute precision).
    pub fn lead_time(&self) -> Duration {
        Duration::minutes((self.min_schedule_hours * 60.0).round() as i64)
    }
}

// ============================================================================
// Generated Slots
// ============================================================================

/// One concrete bookable interval produced by expansion.
///
/// The same instant is carried in three frames (appointment timezone, viewer
/// timezone, UTC), all converted from one source instant so they can never
/// drift apart. Slots are ephemeral: they are recomputed per request and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentSlot {
    /// Originating slot rule.
    pub rule_id: String,
    /// Copied from the rule: renders as "All day".
    pub all_day: bool,
    /// Copied from the rule: staff restriction (empty = unrestricted).
    pub restricted_staff: Vec<String>,
    /// Start in the appointment timezone.
    pub appointment_start: DateTime<Tz>,
    /// End in the appointment timezone.
    pub appointment_end: DateTime<Tz>,
    /// Start in the viewer's timezone.
    pub display_start: DateTime<Tz>,
    /// End in the viewer's timezone.
    pub display_end: DateTime<Tz>,
    /// Start in UTC.
    pub utc_start: DateTime<Utc>,
    /// End in UTC.
    pub utc_end: DateTime<Utc>,
    /// Assigned staff member, filled by availability filtering; `None` when
    /// nobody is free.
    pub staff_id: Option<String>,
}

impl AppointmentSlot {
    /// Build a slot from its UTC bounds, deriving the other two frames.
    pub fn from_instants(
        rule: &SlotRule,
        utc_start: DateTime<Utc>,
        utc_end: DateTime<Utc>,
        appointment_tz: Tz,
        display_tz: Tz,
    ) -> Self {
        Self {
            rule_id: rule.id.clone(),
            all_day: rule.all_day,
            restricted_staff: rule.restricted_staff.clone(),
            appointment_start: utc_start.with_timezone(&appointment_tz),
            appointment_end: utc_end.with_timezone(&appointment_tz),
            display_start: utc_start.with_timezone(&display_tz),
            display_end: utc_end.with_timezone(&display_tz),
            utc_start,
            utc_end,
            staff_id: None,
        }
    }

    /// True once availability filtering found a free staff member.
    pub fn is_assigned(&self) -> bool {
        self.staff_id.is_some()
    }

    /// True if the rule's restriction allows this staff member.
    pub fn allows(&self, staff_id: &str) -> bool {
        self.restricted_staff.is_empty() || self.restricted_staff.iter().any(|s| s == staff_id)
    }

    /// Slot length.
    pub fn duration(&self) -> Duration {
        self.utc_end - self.utc_start
    }
}

/// Naive wall-clock instant for a fractional hour on a given day. Handles
/// `24.0` by rolling into the next day's midnight.
pub(crate) fn fractional_hour_on(day: NaiveDate, hour: f64) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN) + Duration::minutes((hour * 60.0).round() as i64)
}
