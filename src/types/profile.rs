//! Birth profile input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender category as entered on the birth form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other or unspecified value.
    #[default]
    Other,
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "male" => Self::Male,
            "female" => Self::Female,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Calendar the birth date was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarSystem {
    /// Gregorian calendar.
    #[default]
    Solar,
    /// Chinese lunisolar calendar.
    Lunar,
}

/// Birth-data form as submitted.
///
/// Immutable once submitted. The identity fields (name, date, time, city)
/// form the seed material for every generated report. Missing fields
/// deserialize to their defaults rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BirthProfileInput {
    /// Display name (may be empty).
    pub name: String,
    /// Gender category.
    pub gender: Gender,
    /// Calendar of `date`.
    pub calendar: CalendarSystem,
    /// Birth date, `YYYY-MM-DD`.
    pub date: String,
    /// Birth time, `HH:mm`.
    pub time: String,
    /// Birth location label.
    pub city: String,
    /// Whether true-solar-time correction was requested.
    pub true_solar: bool,
}

impl BirthProfileInput {
    /// Create an input with the identity fields set and defaults elsewhere.
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            time: time.into(),
            city: city.into(),
            ..Default::default()
        }
    }

    /// Set the gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Set the calendar system.
    pub fn with_calendar(mut self, calendar: CalendarSystem) -> Self {
        self.calendar = calendar;
        self
    }

    /// Enable or disable true-solar-time correction.
    pub fn with_true_solar(mut self, enabled: bool) -> Self {
        self.true_solar = enabled;
        self
    }

    /// Identity string hashed into the report seed.
    pub fn identity(&self) -> String {
        format!("{}-{}-{}-{}", self.name, self.date, self.time, self.city)
    }
}
