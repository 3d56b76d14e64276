//! Tracking codes: `PM` + `YYYYMMDD` + six random digits.
//!
//! Codes are only probabilistically unique. Nothing checks a freshly
//! generated code against the store, so two parcels registered on the same
//! day can collide (one in a million per pair).

use std::{fmt, str::FromStr, sync::LazyLock};

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, Month, OffsetDateTime};

use super::ports::StoreError;

pub const TRACKING_PREFIX: &str = "PM";
pub const TRACKING_CODE_LEN: usize = 16;
const DIGIT_COUNT: usize = 14;
const SUFFIX_MAX: u32 = 999_999;

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!("^{TRACKING_PREFIX}[0-9]{{{DIGIT_COUNT}}}$");
    Regex::new(&pattern).expect("tracking code regex is valid")
});

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TrackingCodeError {
    #[error("tracking code is empty")]
    Empty,
    #[error("tracking code must start with PM")]
    MissingPrefix,
    #[error("tracking code must be PM followed by 14 digits")]
    Malformed,
}

impl TrackingCode {
    /// Validates `raw` against `^PM[0-9]{14}$` after trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, TrackingCodeError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(TrackingCodeError::Empty);
        }
        if !code.starts_with(TRACKING_PREFIX) {
            return Err(TrackingCodeError::MissingPrefix);
        }
        if !CODE_PATTERN.is_match(code) {
            return Err(TrackingCodeError::Malformed);
        }
        Ok(Self(code.to_string()))
    }

    /// Builds a code for `date` with a suffix drawn uniformly from `0..=999999`.
    pub fn generate_on<R: Rng + ?Sized>(date: Date, rng: &mut R) -> Self {
        let suffix = rng.gen_range(0..=SUFFIX_MAX);
        Self(format!(
            "{TRACKING_PREFIX}{:04}{:02}{:02}{suffix:06}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ))
    }

    /// Builds a code for today's local date.
    pub fn generate() -> Self {
        Self::generate_on(today(), &mut rand::thread_rng())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The calendar date encoded after the prefix, if it is a real date.
    pub fn issued_on(&self) -> Option<Date> {
        let digits = self.0.get(TRACKING_PREFIX.len()..)?;
        let year = digits.get(0..4)?.parse::<i32>().ok()?;
        let month = digits.get(4..6)?.parse::<u8>().ok()?;
        let day = digits.get(6..8)?.parse::<u8>().ok()?;
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok()
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TrackingCode {
    type Err = TrackingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TrackingCode {
    type Error = TrackingCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackingCode> for String {
    fn from(code: TrackingCode) -> Self {
        code.0
    }
}

/// Current local date, or the UTC date when the local offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Why a tracking lookup produced no result.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidCode(#[from] TrackingCodeError),
    #[error("no parcel found with code {0}")]
    NotFound(TrackingCode),
    #[error(transparent)]
    Store(#[from] StoreError),
}
