//! Field rules shared by the intake, registration and login forms.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// One failed rule on one form field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collects failures while walking a form.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, ok: bool, field: &'static str, message: &'static str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Character count after trimming.
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

static MOROCCAN_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+212|0)[5-7][0-9]{8}$").expect("phone regex is valid")
});

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("decimal regex is valid"));

/// National ID card number: one or two capitals then six digits.
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}[0-9]{6}$").expect("national id regex is valid"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

pub fn is_moroccan_phone(value: &str) -> bool {
    MOROCCAN_PHONE.is_match(value)
}

/// Plain digits with an optional fractional part. No sign, exponent or bare dot.
pub fn is_decimal(value: &str) -> bool {
    DECIMAL.is_match(value)
}

pub fn is_national_id(value: &str) -> bool {
    NATIONAL_ID.is_match(value)
}

/// `local@domain.tld` with no whitespace.
pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("+212612345678", true)]
    #[case("0612345678", true)]
    #[case("0512345678", true)]
    #[case("0712345678", true)]
    #[case("0812345678", false)]
    #[case("061234567", false)]
    #[case("06123456789", false)]
    #[case("+33612345678", false)]
    #[case("06 12345678", false)]
    fn phone_rule(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(is_moroccan_phone(value), ok);
    }

    #[rstest]
    #[case("2", true)]
    #[case("2.5", true)]
    #[case("10.25", true)]
    #[case("2.", false)]
    #[case(".5", false)]
    #[case("2,5", false)]
    #[case("-1", false)]
    #[case("+2", false)]
    #[case("1e3", false)]
    #[case("٣", false)]
    #[case("", false)]
    fn decimal_rule(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(is_decimal(value), ok);
    }

    #[rstest]
    #[case("A123456", true)]
    #[case("AB123456", true)]
    #[case("ABC123456", false)]
    #[case("a123456", false)]
    #[case("A12345", false)]
    #[case("123456", false)]
    fn national_id_rule(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(is_national_id(value), ok);
    }

    #[rstest]
    #[case("ahmed.benali@email.ma", true)]
    #[case("a@b.c", true)]
    #[case("ahmed@", false)]
    #[case("@email.ma", false)]
    #[case("ahmed@email", false)]
    #[case("ahmed benali@email.ma", false)]
    #[case("a@b@c.ma", false)]
    fn email_rule(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(is_email(value), ok);
    }

    #[test]
    fn checks_collect_every_failure() {
        let mut checks = Checks::new();
        checks
            .require(true, "name", "too short")
            .require(false, "phone", "invalid")
            .require(false, "city", "missing");
        let errors = checks.finish().expect_err("two failures");
        assert_eq!(
            errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            vec!["phone", "city"]
        );
    }
}
