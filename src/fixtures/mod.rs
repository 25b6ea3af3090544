//! Fixtures
//!
//! YAML-backed configuration loading for coupons and delivery methods.
//! Fixture sets live under `./fixtures/coupons` and
//! `./fixtures/delivery_methods`; malformed configuration fails here, at
//! load time, so the calculators only ever see well-formed records.

use std::{fs, path::PathBuf};

use chrono::{Duration, NaiveDateTime, NaiveTime, Weekday};
use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::iso;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponError, CouponKey},
    delivery::{DeliveryConfigError, DeliveryMethod, DeliveryMethodKey},
};

pub mod coupons;
pub mod delivery;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid money format
    #[error("Invalid money format: {0}")]
    InvalidMoney(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage rate
    #[error("Invalid percentage rate: {0}")]
    InvalidPercentage(String),

    /// Invalid distance value
    #[error("Invalid distance: {0}")]
    InvalidDistance(String),

    /// Invalid time-of-day string
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    /// Invalid datetime string
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    /// Invalid weekday name
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),

    /// Invalid operational-hours window string
    #[error("Invalid hours window: {0}")]
    InvalidWindow(String),

    /// Invalid notice duration string
    #[error("Invalid notice duration: {0}")]
    InvalidNotice(String),

    /// Coupon not found
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Delivery method not found
    #[error("Delivery method not found: {0}")]
    DeliveryMethodNotFound(String),

    /// Coupon construction error
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Delivery configuration error
    #[error(transparent)]
    DeliveryConfig(#[from] DeliveryConfigError),
}

/// Fixture
///
/// Loads named coupon and delivery-method sets from YAML files and keeps
/// them addressable both by string key and by generated slot key.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// `SlotMaps` storing the parsed records with generated keys
    coupons: SlotMap<CouponKey, Coupon<'static>>,
    delivery_methods: SlotMap<DeliveryMethodKey, DeliveryMethod<'static>>,

    /// String key -> `SlotMap` key mappings for lookups
    coupon_keys: FxHashMap<String, CouponKey>,
    delivery_method_keys: FxHashMap<String, DeliveryMethodKey>,
}

impl Fixture {
    /// Create an empty fixture with the default base path.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create an empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            coupons: SlotMap::with_key(),
            delivery_methods: SlotMap::with_key(),
            coupon_keys: FxHashMap::default(),
            delivery_method_keys: FxHashMap::default(),
        }
    }

    /// Load the named coupon and delivery-method sets from the default
    /// base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if either file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_coupons(name)?;
        fixture.load_delivery_methods(name)?;

        Ok(fixture)
    }

    /// Load a coupon set from `<base>/coupons/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read, parsed, or
    /// converted into well-formed coupons.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: coupons::CouponsFixture = serde_norway::from_str(&contents)?;

        for (key, coupon_fixture) in fixture.coupons {
            let coupon = Coupon::try_from(coupon_fixture)?;
            let slot_key = self.coupons.insert(coupon);

            self.coupon_keys.insert(key, slot_key);
        }

        Ok(self)
    }

    /// Load a delivery-method set from `<base>/delivery_methods/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read, parsed, or
    /// converted into well-formed delivery methods.
    pub fn load_delivery_methods(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("delivery_methods")
            .join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: delivery::DeliveryMethodsFixture = serde_norway::from_str(&contents)?;

        for (key, method_fixture) in fixture.delivery_methods {
            let method = DeliveryMethod::try_from(method_fixture)?;
            let slot_key = self.delivery_methods.insert(method);

            self.delivery_method_keys.insert(key, slot_key);
        }

        Ok(self)
    }

    /// Look up a coupon by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CouponNotFound`] for an unknown key.
    pub fn coupon(&self, key: &str) -> Result<&Coupon<'static>, FixtureError> {
        self.coupon_keys
            .get(key)
            .and_then(|slot_key| self.coupons.get(*slot_key))
            .ok_or_else(|| FixtureError::CouponNotFound(key.to_string()))
    }

    /// Look up a delivery method by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::DeliveryMethodNotFound`] for an unknown key.
    pub fn delivery_method(&self, key: &str) -> Result<&DeliveryMethod<'static>, FixtureError> {
        self.delivery_method_keys
            .get(key)
            .and_then(|slot_key| self.delivery_methods.get(*slot_key))
            .ok_or_else(|| FixtureError::DeliveryMethodNotFound(key.to_string()))
    }

    /// Iterate over loaded coupons with their fixture keys.
    pub fn coupons(&self) -> impl Iterator<Item = (&str, &Coupon<'static>)> {
        self.coupon_keys.iter().filter_map(|(name, slot_key)| {
            self.coupons
                .get(*slot_key)
                .map(|coupon| (name.as_str(), coupon))
        })
    }

    /// Iterate over loaded delivery methods with their fixture keys.
    pub fn delivery_methods(&self) -> impl Iterator<Item = (&str, &DeliveryMethod<'static>)> {
        self.delivery_method_keys
            .iter()
            .filter_map(|(name, slot_key)| {
                self.delivery_methods
                    .get(*slot_key)
                    .map(|method| (name.as_str(), method))
            })
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a money string like `"12.50 USD"` into minor units and currency.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidMoney`] for malformed amounts and
/// [`FixtureError::UnknownCurrency`] for unrecognised currency codes.
pub fn parse_money(value: &str) -> Result<(i64, &'static iso::Currency), FixtureError> {
    let mut parts = value.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidMoney(value.to_string()));
    };

    let currency = iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let Ok(mut amount) = amount.parse::<rust_decimal::Decimal>() else {
        return Err(FixtureError::InvalidMoney(value.to_string()));
    };

    amount.rescale(currency.exponent);

    let Ok(minor_units) = i64::try_from(amount.mantissa()) else {
        return Err(FixtureError::InvalidMoney(value.to_string()));
    };

    Ok((minor_units, currency))
}

/// Parse a fractional percentage rate (e.g. `0.2` for 20%).
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] for non-finite or negative
/// rates.
pub fn parse_percentage(value: f64) -> Result<Percentage, FixtureError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FixtureError::InvalidPercentage(value.to_string()));
    }

    Ok(Percentage::from(value))
}

/// Parse a time-of-day string like `"09:00"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidTime`] for malformed times.
pub fn parse_time(value: &str) -> Result<NaiveTime, FixtureError> {
    let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M") else {
        return Err(FixtureError::InvalidTime(value.to_string()));
    };

    Ok(time)
}

/// Parse a datetime string like `"2026-08-01 00:00"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidDateTime`] for malformed datetimes.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, FixtureError> {
    let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") else {
        return Err(FixtureError::InvalidDateTime(value.to_string()));
    };

    Ok(datetime)
}

/// Parse a weekday name like `"monday"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidWeekday`] for unrecognised names.
pub fn parse_weekday(value: &str) -> Result<Weekday, FixtureError> {
    let Ok(weekday) = value.trim().parse::<Weekday>() else {
        return Err(FixtureError::InvalidWeekday(value.to_string()));
    };

    Ok(weekday)
}

/// Parse a notice duration like `"45 minutes"`, `"2 hours"` or `"3 days"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidNotice`] for malformed durations.
pub fn parse_notice(value: &str) -> Result<Duration, FixtureError> {
    let mut parts = value.split_whitespace();

    let (Some(count), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidNotice(value.to_string()));
    };

    let Ok(count) = count.parse::<i64>() else {
        return Err(FixtureError::InvalidNotice(value.to_string()));
    };

    if count < 0 {
        return Err(FixtureError::InvalidNotice(value.to_string()));
    }

    match unit {
        "minute" | "minutes" => Ok(Duration::minutes(count)),
        "hour" | "hours" => Ok(Duration::hours(count)),
        "day" | "days" => Ok(Duration::days(count)),
        _ => Err(FixtureError::InvalidNotice(value.to_string())),
    }
}
