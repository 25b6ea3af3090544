//! Calendar Tokens
//!
//! Sorted sets of the lowercase string tokens used by activation and
//! schedule configuration, plus derivation of tokens from calendar values:
//! hours `"00:00"`..`"23:00"`, weekdays `"monday"`..`"sunday"`, month days
//! `"01"`..`"31"`, months `"january"`..`"december"`.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use smallvec::SmallVec;

/// A sorted, deduplicated set of calendar tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenSet {
    tokens: SmallVec<[String; 5]>,
}

impl TokenSet {
    /// Create a token set from a vector of tokens.
    #[must_use]
    pub fn new(tokens: SmallVec<[String; 5]>) -> Self {
        let mut set = Self { tokens };

        set.tokens.sort();
        set.tokens.dedup();

        set
    }

    /// Create a token set from string slices.
    pub fn from_strs(tokens: &[&str]) -> Self {
        Self::new(
            tokens
                .iter()
                .map(ToString::to_string)
                .collect::<SmallVec<[String; 5]>>(),
        )
    }

    /// Create an empty token set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tokens: SmallVec::with_capacity(0),
        }
    }

    /// Whether the set contains the given token.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens
            .binary_search_by(|candidate| candidate.as_str().cmp(token))
            .is_ok()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Add a token, keeping the set sorted.
    pub fn add(&mut self, token: &str) {
        if let Err(pos) = self
            .tokens
            .binary_search_by(|candidate| candidate.as_str().cmp(token))
        {
            self.tokens.insert(pos, token.to_string());
        }
    }

    /// Iterate over the tokens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

/// Hour-of-day token for a datetime, e.g. `"13:00"`.
#[must_use]
pub fn hour_token(at: NaiveDateTime) -> String {
    format!("{:02}:00", at.hour())
}

/// Weekday token for a datetime, e.g. `"monday"`.
#[must_use]
pub fn weekday_token(at: NaiveDateTime) -> String {
    weekday_name(at.weekday()).to_string()
}

/// Day-of-month token for a datetime, e.g. `"07"`.
#[must_use]
pub fn month_day_token(at: NaiveDateTime) -> String {
    format!("{:02}", at.day())
}

/// Month token for a datetime, e.g. `"august"`.
#[must_use]
pub fn month_token(at: NaiveDateTime) -> String {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let Some(month) = MONTHS.get(at.month0() as usize) else {
        unreachable!("`month0` is always within 0..=11")
    };

    (*month).to_string()
}

/// Lowercase name for a weekday.
#[must_use]
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}
