//! Pure field validators and the error set they feed.
//!
//! Format rules mirror the client-side patterns: employee ids look like
//! `ABC0123` (three capitals, a literal zero, then 001-999), months are
//! strict `YYYY-MM`, and passwords need a letter, a digit and a symbol. The
//! original look-ahead patterns are expressed as a regex plus an explicit
//! check, since the `regex` crate has no look-around.
//!
//! Validators never panic on malformed input; they return booleans or
//! `Result` values that callers collect into a [`ValidationErrors`] map.

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn pattern(cell: &'static OnceLock<Regex>, source: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("hard-coded pattern"))
}

fn emp_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^[A-Z]{3}0[0-9]{3}$")
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(
        &RE,
        r"^[A-Za-z]+(?:\.[A-Za-z]+)*(?: [A-Za-z]+)*(?:\.[A-Za-z]+){0,3}$",
    )
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
}

fn month_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^\d{4}-\d{2}$")
}

/// `ABC0123`-style employee id; the all-zero serial `XXX0000` is reserved.
pub fn valid_employee_id(value: &str) -> bool {
    emp_id_re().is_match(value) && !value.ends_with("000")
}

pub fn valid_email(value: &str) -> bool {
    email_re().is_match(value)
}

/// Full name: letters with single spaces and up to a few dotted initials.
pub fn valid_full_name(value: &str) -> bool {
    name_re().is_match(value)
}

/// At least five characters with one letter, one digit and one symbol.
pub fn valid_password(value: &str) -> bool {
    value.chars().count() >= 5
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Parses a strict `YYYY-MM` month string into the first day of that month.
pub fn parse_month(value: &str) -> Result<NaiveDate, String> {
    if !month_re().is_match(value) {
        return Err(format!(
            "Expected format YYYY-MM, but received '{}'. Please re-select the month.",
            value
        ));
    }
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a real calendar month.", value))
}

/// Parses a `YYYY-MM-DD` form date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parses an `HH:MM` time-of-day value.
pub fn parse_hour(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// An itemized set of validation failures, keyed by field or category name.
///
/// Collected exhaustively rather than short-circuiting: handlers surface
/// every message, never just the first. The first message recorded for a
/// field wins; later ones for the same field are dropped, so a format error
/// is not overwritten by a coarser follow-up check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn employee_id_format() {
        assert!(valid_employee_id("ABC0123"));
        assert!(valid_employee_id("XYZ0999"));
        assert!(!valid_employee_id("ABC0000")); // reserved serial
        assert!(!valid_employee_id("AB0123"));
        assert!(!valid_employee_id("abc0123"));
        assert!(!valid_employee_id("ABC1123"));
        assert!(!valid_employee_id("ABC01234"));
    }

    #[test]
    fn email_format() {
        assert!(valid_email("jane.doe+forms@example.co.uk"));
        assert!(!valid_email("jane@localhost"));
        assert!(!valid_email("not-an-email"));
    }

    #[test]
    fn full_name_format() {
        assert!(valid_full_name("Jane Doe"));
        assert!(valid_full_name("J.R.R Tolkien"));
        assert!(!valid_full_name("Jane  Doe")); // double space
        assert!(!valid_full_name("Jane3"));
    }

    #[test]
    fn password_strength() {
        assert!(valid_password("ab1_x"));
        assert!(valid_password("pa$s9word"));
        assert!(!valid_password("a1$")); // too short
        assert!(!valid_password("abcdef1")); // no symbol
        assert!(!valid_password("abc$def")); // no digit
        assert!(!valid_password("12345$")); // no letter
    }

    #[test]
    fn month_parsing() {
        assert_eq!(parse_month("2025-04").unwrap(), day("2025-04-01"));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("2025-00").is_err());
        assert!(parse_month("2025-4").is_err());
        assert!(parse_month("04-2025").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Invalid email format.");
        errors.add("email", "Email is required.");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.into_map().get("email").map(String::as_str),
            Some("Invalid email format.")
        );
    }
}
