//! Marker-file grammar: `<number> <unit>` → retention period in seconds.
//!
//! Input is trimmed and lowercased, then must match exactly one non-negative
//! decimal literal, whitespace, and one unit word from the synonym table.
//! The period is `floor(number * multiplier)`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// `<number><whitespace><word>`; the number has no sign and no exponent.
static POLICY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s+(\w+)$").expect("policy regex is valid")
});

const SECONDS_PER_DAY: u64 = 86_400;

/// Canonical time units accepted in a marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    /// 30 days.
    Month,
    /// 365 days.
    Year,
}

impl TimeUnit {
    /// Every unit, shortest first.
    pub const ALL: [Self; 6] = [
        Self::Minute,
        Self::Hour,
        Self::Day,
        Self::Week,
        Self::Month,
        Self::Year,
    ];

    /// Length of one unit in seconds.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => SECONDS_PER_DAY,
            Self::Week => 7 * SECONDS_PER_DAY,
            Self::Month => 30 * SECONDS_PER_DAY,
            Self::Year => 365 * SECONDS_PER_DAY,
        }
    }

    /// Accepted lowercase spellings.
    #[must_use]
    pub const fn spellings(self) -> &'static [&'static str] {
        match self {
            Self::Minute => &["minute", "minutes", "min", "m"],
            Self::Hour => &["hour", "hours", "hr", "h"],
            Self::Day => &["day", "days", "d"],
            Self::Week => &["week", "weeks", "w"],
            Self::Month => &["month", "months", "mo"],
            Self::Year => &["year", "years", "yr", "y"],
        }
    }

    /// Look up a lowercase unit word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.spellings().contains(&word))
    }

    /// All accepted spellings, for diagnostics.
    pub fn all_spellings() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().flat_map(|u| u.spellings().iter().copied())
    }

    /// Comma-separated list of every accepted spelling.
    #[must_use]
    pub fn valid_units() -> String {
        Self::all_spellings().collect::<Vec<_>>().join(", ")
    }
}

/// Plural long form: `minutes`, `hours`, ...
impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spellings()[1])
    }
}

/// Maximum file age allowed under one marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetentionPolicy {
    max_age_seconds: u64,
}

impl RetentionPolicy {
    #[must_use]
    pub const fn from_seconds(max_age_seconds: u64) -> Self {
        Self { max_age_seconds }
    }

    #[must_use]
    pub const fn max_age_seconds(self) -> u64 {
        self.max_age_seconds
    }

    /// A file qualifies only when strictly older than the limit.
    #[must_use]
    pub const fn is_expired(self, age_seconds: u64) -> bool {
        age_seconds > self.max_age_seconds
    }
}

/// Marker content as declared, with the period it resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedPolicy {
    pub magnitude: f64,
    pub unit: TimeUnit,
    pub policy: RetentionPolicy,
}

/// Why marker content was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyParseError {
    /// Content is not `<number> <word>`.
    #[error("expected '<number> <unit>'")]
    Malformed,
    /// Shape matched but the word is not a known unit.
    #[error("unknown unit {unit:?}, valid units: {}", TimeUnit::valid_units())]
    UnknownUnit { unit: String },
}

/// Parse marker-file content into a retention policy.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn parse(content: &str) -> Result<ParsedPolicy, PolicyParseError> {
    let normalized = content.trim().to_lowercase();
    let caps = POLICY_RE
        .captures(&normalized)
        .ok_or(PolicyParseError::Malformed)?;

    let number: f64 = caps[1].parse().map_err(|_| PolicyParseError::Malformed)?;
    let word = &caps[2];
    let unit = TimeUnit::from_word(word).ok_or_else(|| PolicyParseError::UnknownUnit {
        unit: word.to_string(),
    })?;

    let seconds = (number * unit.seconds() as f64).trunc();
    if !seconds.is_finite() || seconds >= u64::MAX as f64 {
        return Err(PolicyParseError::Malformed);
    }

    Ok(ParsedPolicy {
        magnitude: number,
        unit,
        policy: RetentionPolicy::from_seconds(seconds as u64),
    })
}
