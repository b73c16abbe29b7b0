// ── Field validators ──
//
// Pure predicates over raw form input. Invalid input yields `false`,
// never an error; every predicate has a fixed user-facing message.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex is valid"));

static NATIONAL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("national id regex is valid"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email regex is valid")
});

// ── Messages ─────────────────────────────────────────────────────────

pub const PHONE_MESSAGE: &str = "Phone number must be exactly 10 digits";
pub const NATIONAL_ID_MESSAGE: &str = "Aadhar number must be exactly 12 digits";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const AMOUNT_MESSAGE: &str = "Amount must be a non-negative number";
pub const POSITIVE_AMOUNT_MESSAGE: &str = "Amount must be greater than zero";
pub const AGE_MESSAGE: &str = "Age must be between 1 and 149";
pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const STATUS_MESSAGE: &str = "Status must be one of Available, Adopted, Under Care";
pub const DATE_MESSAGE: &str = "Date must be in YYYY-MM-DD format";

// ── Predicates ───────────────────────────────────────────────────────

/// Exactly 10 ASCII digits, ignoring surrounding whitespace.
pub fn phone(v: &str) -> bool {
    PHONE_REGEX.is_match(v.trim())
}

/// Exactly 12 ASCII digits (Aadhaar format), ignoring surrounding
/// whitespace.
pub fn national_id(v: &str) -> bool {
    NATIONAL_ID_REGEX.is_match(v.trim())
}

/// `local@domain.tld`, ASCII, case-insensitive. Surrounding whitespace is
/// ignored; submissions store the trimmed value.
pub fn email(v: &str) -> bool {
    EMAIL_REGEX.is_match(v.trim())
}

/// Finite number ≥ 0.
pub fn amount(v: &str) -> bool {
    v.trim()
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n >= 0.0)
}

/// Finite number > 0.
pub fn positive_amount(v: &str) -> bool {
    v.trim()
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n > 0.0)
}

/// Integer strictly between 0 and 150.
pub fn age(v: &str) -> bool {
    v.trim().parse::<i64>().is_ok_and(|n| n > 0 && n < 150)
}

/// Non-empty after trimming.
pub fn required(v: &str) -> bool {
    !v.trim().is_empty()
}

/// At most `max` characters after trimming.
pub fn max_length(v: &str, max: usize) -> bool {
    v.trim().chars().count() <= max
}

/// At least `min` characters after trimming.
pub fn min_length(v: &str, min: usize) -> bool {
    v.trim().chars().count() >= min
}

// ── Check ────────────────────────────────────────────────────────────

/// One validation rule attached to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Required,
    Phone,
    NationalId,
    Email,
    Amount,
    PositiveAmount,
    Age,
    MaxLength(usize),
    MinLength(usize),
    Status,
    Date,
}

impl Check {
    pub fn passes(self, v: &str) -> bool {
        match self {
            Self::Required => required(v),
            Self::Phone => phone(v),
            Self::NationalId => national_id(v),
            Self::Email => email(v),
            Self::Amount => amount(v),
            Self::PositiveAmount => positive_amount(v),
            Self::Age => age(v),
            Self::MaxLength(max) => max_length(v, max),
            Self::MinLength(min) => min_length(v, min),
            Self::Status => v.parse::<crate::model::AnimalStatus>().is_ok(),
            Self::Date => chrono::NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").is_ok(),
        }
    }

    pub fn message(self) -> String {
        match self {
            Self::Required => REQUIRED_MESSAGE.to_owned(),
            Self::Phone => PHONE_MESSAGE.to_owned(),
            Self::NationalId => NATIONAL_ID_MESSAGE.to_owned(),
            Self::Email => EMAIL_MESSAGE.to_owned(),
            Self::Amount => AMOUNT_MESSAGE.to_owned(),
            Self::PositiveAmount => POSITIVE_AMOUNT_MESSAGE.to_owned(),
            Self::Age => AGE_MESSAGE.to_owned(),
            Self::MaxLength(max) => format!("Maximum {max} characters allowed"),
            Self::MinLength(min) => format!("Minimum {min} characters required"),
            Self::Status => STATUS_MESSAGE.to_owned(),
            Self::Date => DATE_MESSAGE.to_owned(),
        }
    }
}

/// First failing check's message, or `None` when the value is acceptable.
///
/// A field without [`Check::Required`] is optional: a blank value skips
/// its remaining checks.
pub fn validate_field(value: &str, checks: &[Check]) -> Option<String> {
    if !checks.contains(&Check::Required) && !required(value) {
        return None;
    }
    checks
        .iter()
        .find(|check| !check.passes(value))
        .map(|check| check.message())
}

// ── FieldErrors ──────────────────────────────────────────────────────

/// Per-field error map for one form. Empty means the submission is
/// acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    errors: BTreeMap<F, String>,
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy + fmt::Display> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Drop a field's error, e.g. once its value is edited.
    pub fn clear(&mut self, field: F) {
        self.errors.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when empty, otherwise a [`CoreError::Validation`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Ok(());
        }
        Err(CoreError::Validation {
            fields: self
                .errors
                .into_iter()
                .map(|(f, m)| (f.to_string(), m))
                .collect(),
        })
    }
}

/// Run every field's checks and collect the failures.
pub fn validate_form<'a, F>(fields: impl IntoIterator<Item = (F, &'a str, &'a [Check])>) -> FieldErrors<F>
where
    F: Ord + Copy + fmt::Display,
{
    let mut errors = FieldErrors::new();
    for (field, value, checks) in fields {
        if let Some(message) = validate_field(value, checks) {
            errors.insert(field, message);
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_boundaries() {
        assert!(phone("1234567890"));
        assert!(!phone("123456789"));
        assert!(!phone("12345678901"));
        assert!(!phone("12345 67890"));
        assert!(!phone("+911234567"));
    }

    #[test]
    fn national_id_boundaries() {
        assert!(national_id("123412341234"));
        assert!(!national_id("12341234123"));
        assert!(!national_id("1234123412345"));
        assert!(!national_id("1234-1234-1234"));
    }

    #[test]
    fn email_shapes() {
        assert!(email("a@b.co"));
        assert!(email("First.Last+tag@Shelter.ORG"));
        assert!(!email("a@b"));
        assert!(!email("a@b.c"));
        assert!(!email("@b.co"));
        assert!(!email("a b@c.co"));
    }

    #[test]
    fn pattern_checks_ignore_surrounding_whitespace() {
        assert!(email(" Asha@Example.org "));
        assert!(phone("9876543210\n"));
        assert!(national_id("  123412341234"));
        assert!(!email(" "));
        assert_eq!(validate_field(" Asha@Example.org ", &[Check::Required, Check::Email]), None);
    }

    #[test]
    fn age_boundaries() {
        assert!(!age("0"));
        assert!(age("1"));
        assert!(age("149"));
        assert!(!age("150"));
        assert!(!age("-3"));
        assert!(!age("2.5"));
        assert!(!age("abc"));
    }

    #[test]
    fn amount_rules() {
        assert!(amount("0"));
        assert!(amount("250.50"));
        assert!(!amount("-1"));
        assert!(!amount("NaN"));
        assert!(!amount("inf"));
        assert!(!amount(""));
        assert!(!positive_amount("0"));
        assert!(positive_amount("0.01"));
    }

    #[test]
    fn required_and_lengths_trim() {
        assert!(!required("   "));
        assert!(required(" x "));
        assert!(max_length("  abc  ", 3));
        assert!(!max_length("abcd", 3));
        assert!(min_length(" 0123456789 ", 10));
        assert!(!min_length("short", 10));
    }

    #[test]
    fn messages_match_checks() {
        assert_eq!(Check::Age.message(), "Age must be between 1 and 149");
        assert_eq!(Check::MaxLength(1000).message(), "Maximum 1000 characters allowed");
        assert_eq!(Check::MinLength(10).message(), "Minimum 10 characters required");
    }

    #[test]
    fn optional_field_skips_blank() {
        assert_eq!(validate_field("", &[Check::Phone]), None);
        assert_eq!(
            validate_field("123", &[Check::Phone]),
            Some(PHONE_MESSAGE.to_owned())
        );
        assert_eq!(
            validate_field("", &[Check::Required, Check::Phone]),
            Some(REQUIRED_MESSAGE.to_owned())
        );
    }

    #[test]
    fn status_check_is_exact() {
        assert!(Check::Status.passes("Under Care"));
        assert!(!Check::Status.passes("under care"));
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Field {
        Name,
        Phone,
    }

    impl fmt::Display for Field {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::Name => "name",
                Self::Phone => "phone",
            })
        }
    }

    #[test]
    fn form_errors_collect_and_clear() {
        let mut errors = validate_form([
            (Field::Name, "", &[Check::Required][..]),
            (Field::Phone, "12", &[Check::Required, Check::Phone][..]),
        ]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::Phone), Some(PHONE_MESSAGE));

        errors.clear(Field::Name);
        assert!(errors.get(Field::Name).is_none());

        match errors.into_result() {
            Err(CoreError::Validation { fields }) => {
                assert_eq!(fields, vec![("phone".to_owned(), PHONE_MESSAGE.to_owned())]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_form_errors_are_ok() {
        let errors = validate_form([(Field::Name, "Rex", &[Check::Required][..])]);
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }
}
