//! Coupon Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    coupons::{Coupon, CouponBenefits, DiscountKind, activation::ActivationRule},
    fixtures::{FixtureError, parse_datetime, parse_money, parse_percentage},
    tokens::TokenSet,
};

use rusty_money::Money;

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon key -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Display name
    pub name: String,

    /// Whether the coupon is live
    #[serde(default = "default_true")]
    pub active: bool,

    /// Discount configuration; omit for free-delivery-only coupons
    #[serde(default)]
    pub discount: Option<DiscountFixtureConfig>,

    /// Whether the coupon grants free delivery
    #[serde(default)]
    pub free_delivery: bool,

    /// Redemptions remaining; pairs with the `usage_limit` switch
    #[serde(default)]
    pub remaining_quantity: Option<u32>,

    /// Activation switches
    #[serde(default)]
    pub activation: Vec<ActivationFixtureConfig>,
}

/// Discount configuration from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixtureConfig {
    /// Percentage discount (value between 0.0 and 1.0)
    Percentage {
        /// Discount rate as a decimal fraction (e.g. 0.2 for 20%)
        value: f64,
    },

    /// Fixed amount off (e.g. "5.00 USD")
    Fixed {
        /// Amount string (e.g. "5.00 USD")
        value: String,
    },
}

/// Activation switch from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationFixtureConfig {
    /// Requires a redemption code
    Code {
        /// The code customers must supply
        value: String,
    },

    /// Valid from this datetime ("2026-08-01 00:00")
    StartsAt {
        /// Datetime string
        value: String,
    },

    /// Valid until this datetime
    EndsAt {
        /// Datetime string
        value: String,
    },

    /// Valid during these hours of the day
    HoursOfDay {
        /// Hour tokens ("00:00".."23:00")
        values: Vec<String>,
    },

    /// Valid on these weekdays
    DaysOfWeek {
        /// Weekday tokens ("monday".."sunday")
        values: Vec<String>,
    },

    /// Valid on these days of the month
    DaysOfMonth {
        /// Day tokens ("01".."31")
        values: Vec<String>,
    },

    /// Valid in these months
    MonthsOfYear {
        /// Month tokens ("january".."december")
        values: Vec<String>,
    },

    /// Valid while redemptions remain
    UsageLimit,

    /// Minimum order subtotal ("50.00 USD")
    MinimumSubtotal {
        /// Amount string
        value: String,
    },

    /// Minimum distinct products in the order
    MinimumUniqueProducts {
        /// Product count threshold
        value: u32,
    },

    /// Minimum total item quantity in the order
    MinimumTotalQuantity {
        /// Quantity threshold
        value: u32,
    },

    /// First-time customers only
    NewCustomersOnly,

    /// Returning customers only
    ExistingCustomersOnly,
}

fn default_true() -> bool {
    true
}

fn token_set(values: Vec<String>) -> TokenSet {
    TokenSet::new(
        values
            .iter()
            .map(|value| value.trim().to_lowercase())
            .collect::<SmallVec<[String; 5]>>(),
    )
}

impl TryFrom<ActivationFixtureConfig> for ActivationRule<'static> {
    type Error = FixtureError;

    fn try_from(config: ActivationFixtureConfig) -> Result<Self, Self::Error> {
        match config {
            ActivationFixtureConfig::Code { value } => {
                Ok(ActivationRule::RequiresCode(value.trim().to_string()))
            }
            ActivationFixtureConfig::StartsAt { value } => {
                Ok(ActivationRule::StartsAt(parse_datetime(&value)?))
            }
            ActivationFixtureConfig::EndsAt { value } => {
                Ok(ActivationRule::EndsAt(parse_datetime(&value)?))
            }
            ActivationFixtureConfig::HoursOfDay { values } => {
                Ok(ActivationRule::HoursOfDay(token_set(values)))
            }
            ActivationFixtureConfig::DaysOfWeek { values } => {
                Ok(ActivationRule::DaysOfWeek(token_set(values)))
            }
            ActivationFixtureConfig::DaysOfMonth { values } => {
                Ok(ActivationRule::DaysOfMonth(token_set(values)))
            }
            ActivationFixtureConfig::MonthsOfYear { values } => {
                Ok(ActivationRule::MonthsOfYear(token_set(values)))
            }
            ActivationFixtureConfig::UsageLimit => Ok(ActivationRule::UsageRemaining),
            ActivationFixtureConfig::MinimumSubtotal { value } => {
                let (minor_units, currency) = parse_money(&value)?;

                Ok(ActivationRule::MinimumSubtotal(Money::from_minor(
                    minor_units,
                    currency,
                )))
            }
            ActivationFixtureConfig::MinimumUniqueProducts { value } => {
                Ok(ActivationRule::MinimumUniqueProducts(value))
            }
            ActivationFixtureConfig::MinimumTotalQuantity { value } => {
                Ok(ActivationRule::MinimumTotalQuantity(value))
            }
            ActivationFixtureConfig::NewCustomersOnly => Ok(ActivationRule::NewCustomersOnly),
            ActivationFixtureConfig::ExistingCustomersOnly => {
                Ok(ActivationRule::ExistingCustomersOnly)
            }
        }
    }
}

impl TryFrom<DiscountFixtureConfig> for DiscountKind<'static> {
    type Error = FixtureError;

    fn try_from(config: DiscountFixtureConfig) -> Result<Self, Self::Error> {
        match config {
            DiscountFixtureConfig::Percentage { value } => {
                Ok(DiscountKind::Percentage(parse_percentage(value)?))
            }
            DiscountFixtureConfig::Fixed { value } => {
                let (minor_units, currency) = parse_money(&value)?;

                Ok(DiscountKind::Fixed(Money::from_minor(minor_units, currency)))
            }
        }
    }
}

impl TryFrom<CouponFixture> for Coupon<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CouponFixture) -> Result<Self, Self::Error> {
        let discount = fixture
            .discount
            .map(DiscountKind::try_from)
            .transpose()?;

        let benefits = CouponBenefits::new(discount, fixture.free_delivery)?;

        let rules = fixture
            .activation
            .into_iter()
            .map(ActivationRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut coupon = Coupon::new(fixture.name, fixture.active, benefits, rules);

        if let Some(remaining) = fixture.remaining_quantity {
            coupon = coupon.with_remaining_quantity(remaining);
        }

        Ok(coupon)
    }
}
