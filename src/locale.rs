//! Locale data for calendar rendering.
//!
//! A [`Locale`] tells the presentation layer where a week starts, which
//! weekdays count as weekend, and how to label months. It is a plain value
//! passed explicitly to the folding stage, so two requests with different
//! locales never share state.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Calendar-rendering conventions for one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    /// Normalized locale code, e.g. `en_US`.
    pub code: String,
    /// First day of the displayed week.
    pub week_start: Weekday,
    /// Days rendered with the weekend flag.
    pub weekend_days: Vec<Weekday>,
    /// Month names, January first.
    pub month_names: Vec<String>,
}

impl Locale {
    /// English (United States): weeks start on Sunday.
    pub fn en_us() -> Self {
        Self {
            code: "en_US".to_string(),
            week_start: Weekday::Sun,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            month_names: month_names(&[
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
        }
    }

    /// English (United Kingdom): weeks start on Monday.
    pub fn en_gb() -> Self {
        Self {
            code: "en_GB".to_string(),
            week_start: Weekday::Mon,
            ..Self::en_us()
        }
    }

    /// French.
    pub fn fr_fr() -> Self {
        Self {
            code: "fr_FR".to_string(),
            week_start: Weekday::Mon,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            month_names: month_names(&[
                "janvier",
                "février",
                "mars",
                "avril",
                "mai",
                "juin",
                "juillet",
                "août",
                "septembre",
                "octobre",
                "novembre",
                "décembre",
            ]),
        }
    }

    /// German.
    pub fn de_de() -> Self {
        Self {
            code: "de_DE".to_string(),
            week_start: Weekday::Mon,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            month_names: month_names(&[
                "Januar",
                "Februar",
                "März",
                "April",
                "Mai",
                "Juni",
                "Juli",
                "August",
                "September",
                "Oktober",
                "November",
                "Dezember",
            ]),
        }
    }

    /// Spanish.
    pub fn es_es() -> Self {
        Self {
            code: "es_ES".to_string(),
            week_start: Weekday::Mon,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            month_names: month_names(&[
                "enero",
                "febrero",
                "marzo",
                "abril",
                "mayo",
                "junio",
                "julio",
                "agosto",
                "septiembre",
                "octubre",
                "noviembre",
                "diciembre",
            ]),
        }
    }

    /// Look up a locale by code. Accepts `en_US`, `en-us`, or the bare
    /// language (`fr`); returns `None` for codes outside the catalog.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().replace('-', "_").to_lowercase();
        match normalized.as_str() {
            "en" | "en_us" => Some(Self::en_us()),
            "en_gb" => Some(Self::en_gb()),
            "fr" | "fr_fr" => Some(Self::fr_fr()),
            "de" | "de_de" => Some(Self::de_de()),
            "es" | "es_es" => Some(Self::es_es()),
            _ => None,
        }
    }

    /// True if the weekday is rendered as weekend in this locale.
    pub fn is_weekend(&self, weekday: Weekday) -> bool {
        self.weekend_days.contains(&weekday)
    }

    /// Localized "Month Year" header, e.g. `September 2026`.
    pub fn month_label(&self, year: i32, month: u32) -> String {
        match self.month_names.get(month.saturating_sub(1) as usize) {
            Some(name) => format!("{} {}", name, year),
            None => format!("{}-{:02}", year, month),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

fn month_names(names: &[&str; 12]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
