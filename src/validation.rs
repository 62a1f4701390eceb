//! Field rules and normalizers shared by the movie input schemas.
//!
//! A [`Checker`] collects every violated rule instead of stopping at the
//! first one, and only hands back a [`Valid`] value when nothing failed.

use std::{fmt, ops::Deref};

use jiff::civil::Date;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A value that has passed validation. Persistence operations only accept these.
#[derive(Clone, Debug, PartialEq)]
pub struct Valid<T>(T);

impl<T> Valid<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError { field, message: message.into() });
    }

    pub fn max_chars(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    /// Inclusive on both ends. NaN never passes.
    pub fn between(&mut self, field: &'static str, value: f64, min: f64, max: f64) {
        if !(min..=max).contains(&value) {
            self.push(field, format!("must be between {min} and {max}"));
        }
    }

    pub fn non_negative(&mut self, field: &'static str, value: f64) {
        if value.is_nan() || value < 0.0 {
            self.push(field, "must be greater than or equal to 0");
        }
    }

    /// Parses an ISO `YYYY-MM-DD` date, recording a field error when it is not one.
    pub fn date(&mut self, field: &'static str, raw: &str) -> Option<Date> {
        match raw.parse::<Date>() {
            Ok(date) => Some(date),
            Err(_) => {
                self.push(field, "must be a valid date in YYYY-MM-DD format");
                None
            },
        }
    }

    /// Rejects dates whose year is past next year, relative to `today`.
    pub fn release_year(&mut self, field: &'static str, value: Date, today: Date) {
        let limit = i32::from(today.year()) + 1;
        if i32::from(value.year()) > limit {
            self.push(field, format!("The year in 'date' cannot be greater than {limit}."));
        }
    }

    pub fn finish<T>(self, value: T) -> Result<Valid<T>, ValidationError> {
        if self.errors.is_empty() {
            Ok(Valid(value))
        } else {
            Err(self.into_error())
        }
    }

    /// The errors collected so far, for when a parsed value could not be built.
    pub fn into_error(self) -> ValidationError {
        ValidationError { errors: self.errors }
    }
}

pub fn normalize_country(value: &str) -> String {
    value.to_uppercase()
}

/// Upper-cases the first letter of every word and lower-cases the rest,
/// where a word is any run of letters.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn normalize_list_fields(values: &[String]) -> Vec<String> {
    values.iter().map(|v| title_case(v)).collect()
}

/// Today's date in the local time zone, for date rules.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn country_is_upper_cased_and_idempotent() {
        assert_eq!(normalize_country("us"), "US");
        assert_eq!(normalize_country("Gb"), "GB");
        let once = normalize_country("de");
        assert_eq!(normalize_country(&once), once);
    }

    #[test]
    fn title_case_handles_word_boundaries() {
        assert_eq!(title_case("sci-fi"), "Sci-Fi");
        assert_eq!(title_case("ACTION"), "Action");
        assert_eq!(title_case("leonardo dicaprio"), "Leonardo Dicaprio");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn list_normalization_is_elementwise_and_idempotent() {
        let input = vec!["sci-fi".to_string(), "ACTION".to_string(), "drama".to_string()];
        let once = normalize_list_fields(&input);
        assert_eq!(once, vec!["Sci-Fi", "Action", "Drama"]);
        assert_eq!(normalize_list_fields(&once), once);
    }

    #[test]
    fn release_year_boundary() {
        let today = date(2025, 6, 1);

        let mut checker = Checker::new();
        checker.release_year("date", date(2026, 12, 31), today);
        assert!(checker.finish(()).is_ok());

        let mut checker = Checker::new();
        checker.release_year("date", date(2027, 1, 1), today);
        let err = checker.finish(()).unwrap_err();
        assert_eq!(err.errors[0].message, "The year in 'date' cannot be greater than 2026.");
    }

    #[test]
    fn malformed_dates_are_field_errors() {
        let mut checker = Checker::new();
        assert_eq!(checker.date("date", "2010-07-16"), Some(date(2010, 7, 16)));
        assert_eq!(checker.date("date", "2010-02-30"), None);
        assert_eq!(checker.date("date", "yesterday"), None);
        let err = checker.into_error();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].message, "must be a valid date in YYYY-MM-DD format");
    }

    #[test]
    fn score_bounds_are_inclusive() {
        for ok in [0.0, 55.5, 100.0] {
            let mut checker = Checker::new();
            checker.between("score", ok, 0.0, 100.0);
            assert!(checker.finish(()).is_ok(), "{ok} should pass");
        }
        for bad in [-0.0001, 100.0001, f64::NAN] {
            let mut checker = Checker::new();
            checker.between("score", bad, 0.0, 100.0);
            assert!(checker.finish(()).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn collects_every_violation() {
        let mut checker = Checker::new();
        checker.max_chars("name", &"x".repeat(256), 255);
        checker.non_negative("budget", -1.0);
        checker.non_negative("revenue", 0.0);
        let err = checker.finish(()).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert!(err.has_field("name"));
        assert!(err.has_field("budget"));
        assert_eq!(
            err.to_string(),
            "validation failed: name: must be at most 255 characters; budget: must be greater than or equal to 0"
        );
    }
}
