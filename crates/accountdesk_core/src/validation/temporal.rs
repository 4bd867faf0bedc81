//! Date-bound validators. `today` is always supplied by the caller's clock.

use super::error::{ValidationError, ValidationResult};
use chrono::{Datelike, NaiveDate};

pub fn validate_date_not_in_past(value: NaiveDate, today: NaiveDate) -> ValidationResult {
    if value < today {
        return Err(ValidationError::out_of_range(
            "date_in_past",
            "Date cannot be in the past.",
        ));
    }
    Ok(())
}

pub fn validate_date_not_in_future(value: NaiveDate, today: NaiveDate) -> ValidationResult {
    if value > today {
        return Err(ValidationError::out_of_range(
            "date_in_future",
            "Date cannot be in the future.",
        ));
    }
    Ok(())
}

/// Rejects birthdates younger than `years` full years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumAge {
    pub years: u32,
}

impl MinimumAge {
    pub fn new(years: u32) -> Self {
        Self { years }
    }

    pub fn validate(&self, birthdate: NaiveDate, today: NaiveDate) -> ValidationResult {
        if age_on(birthdate, today) < i64::from(self.years) {
            return Err(ValidationError::out_of_range(
                "min_age",
                format!("Must be at least {} years old.", self.years),
            ));
        }
        Ok(())
    }
}

/// Completed years between `birthdate` and `today`.
///
/// A year only counts once today's (month, day) reaches the birth (month, day),
/// so a 29 February birthday completes on 1 March in common years.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year()) - i64::from(birthdate.year());
    let before_birthday = (today.month(), today.day()) < (birthdate.month(), birthdate.day());
    years - i64::from(before_birthday)
}
