//! CLI command dispatcher.
//!
//! Each `run_*` function loads a scenario file, wires the in-memory
//! collaborators and runs one library operation against it.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use rendez::appointment::{SlotEngine, SlotQuery};
use rendez::booking::{BookingRequest, BookingService};
use rendez::locale::Locale;
use rendez::Config;

use super::{output, scenario::Scenario};

fn parse_tz(value: &str) -> Result<Tz> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", value))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Invalid RFC 3339 date '{}': {}", value, e))
}

/// Run the slots command.
pub async fn run_slots(
    config: Config,
    scenario_path: String,
    timezone: Option<String>,
    locale: Option<String>,
    staff: Vec<String>,
    reference: Option<String>,
    json_output: bool,
) -> Result<()> {
    let scenario = Scenario::from_file(&scenario_path)?;

    let display_tz = match &timezone {
        Some(tz) => parse_tz(tz)?,
        None => config.display_tz()?,
    };
    let locale = match &locale {
        Some(code) => Locale::from_code(code)
            .ok_or_else(|| anyhow::anyhow!("Unknown locale: {}", code))?,
        None => config.locale()?,
    };

    let mut query = SlotQuery::new(display_tz)
        .with_locale(locale)
        .with_filter_staff(staff);
    if let Some(value) = &reference {
        query = query.with_reference(parse_instant(value)?);
    }

    let directory = Arc::new(scenario.directory());
    let commitments = Arc::new(scenario.commitment_store(&config).await?);
    let engine = SlotEngine::new(directory, commitments);

    let grids = engine
        .appointment_slots(&scenario.appointment, &query)
        .await?;
    output::print_month_grids(&grids, json_output);
    Ok(())
}

/// Run the book command.
pub async fn run_book(
    config: Config,
    scenario_path: String,
    staff: String,
    start: String,
    end: String,
    name: String,
    email: Option<String>,
    json_output: bool,
) -> Result<()> {
    let scenario = Scenario::from_file(&scenario_path)?;
    let start = parse_instant(&start)?;
    let stop = parse_instant(&end)?;

    let directory = Arc::new(scenario.directory());
    let commitments = Arc::new(scenario.commitment_store(&config).await?);
    let service = BookingService::new(directory, commitments);

    let mut request = BookingRequest::new(staff, start, stop, name);
    if let Some(email) = email {
        request = request.with_email(email);
    }

    let commitment = service.book(&scenario.appointment, &request).await?;
    output::print_booking(&commitment, json_output);
    Ok(())
}

/// Run the validate command.
pub async fn run_validate(scenario_path: String, json_output: bool) -> Result<()> {
    let scenario = Scenario::from_file(&scenario_path)?;
    output::print_validation(&scenario.appointment, json_output);
    Ok(())
}
