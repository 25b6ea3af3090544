//! Money Views
//!
//! Display-ready money and percentage values, plus the shared
//! percentage-of-amount arithmetic used by the discount and fee calculators.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors from money arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyMathError {
    /// Percentage calculation overflowed or was not representable in minor units.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Two amounts in different currencies were combined.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency the operation was carried out in.
        expected: &'static str,

        /// Currency of the offending amount.
        found: &'static str,
    },
}

/// A display-ready price derived from a [`Money`] value.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceView {
    amount: Decimal,
    minor_units: i64,
    formatted: String,
    symbol: &'static str,
    currency_code: &'static str,
}

impl PriceView {
    /// Build a view from a money value.
    #[must_use]
    pub fn from_money(money: &Money<'_, Currency>) -> Self {
        Self {
            amount: *money.amount(),
            minor_units: money.to_minor_units(),
            formatted: money.to_string(),
            symbol: money.currency().symbol,
            currency_code: money.currency().iso_alpha_code,
        }
    }

    /// Amount in major units (e.g. `12.50`).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Amount in minor units (e.g. `1250`).
    #[must_use]
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Amount formatted with the currency's rules (e.g. `"$12.50"`).
    #[must_use]
    pub fn formatted(&self) -> &str {
        &self.formatted
    }

    /// Currency symbol (e.g. `"$"`).
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// ISO 4217 alpha code (e.g. `"USD"`).
    #[must_use]
    pub fn currency_code(&self) -> &'static str {
        self.currency_code
    }
}

/// A display-ready percentage rate.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentView {
    rate: Decimal,
    formatted: String,
}

impl PercentView {
    /// Build a view from a fractional percentage (e.g. `0.2` renders `"20%"`).
    #[must_use]
    pub fn from_percentage(percentage: Percentage) -> Self {
        // `Percentage` is a fraction, so scale to percent points for display.
        let points = ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2).normalize();

        Self {
            rate: percentage * Decimal::ONE,
            formatted: format!("{points}%"),
        }
    }

    /// The rate as a decimal fraction (e.g. `0.2`).
    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// The rate rendered in percent points (e.g. `"20%"`).
    #[must_use]
    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

/// Calculate a percentage of an amount in minor units.
///
/// The multiplication happens in decimal space and the result is rounded
/// half-up once, at the end.
///
/// # Errors
///
/// Returns [`MoneyMathError::PercentConversion`] if the multiplication
/// overflows or the rounded result does not fit in minor units.
pub fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, MoneyMathError> {
    let Some(minor_dec) = Decimal::from_i64(minor) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let rate = percent * Decimal::ONE;

    let Some(applied) = rate.checked_mul(minor_dec) else {
        return Err(MoneyMathError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(MoneyMathError::PercentConversion)
}

/// Check that two amounts share a currency before they are compared or combined.
///
/// # Errors
///
/// Returns [`MoneyMathError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_same_currency(
    expected: &Currency,
    found: &Currency,
) -> Result<(), MoneyMathError> {
    if expected == found {
        Ok(())
    } else {
        Err(MoneyMathError::CurrencyMismatch {
            expected: expected.iso_alpha_code,
            found: found.iso_alpha_code,
        })
    }
}
