//! Delivery Method Fixtures

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    delivery::{
        DeliveryMethod, DistanceZone, FallbackFee, FeePolicy, PostalCodeZone,
        schedule::{DeliverySchedule, IntervalUnit, OperationalHours, SlotInterval},
    },
    fixtures::{FixtureError, parse_money, parse_notice, parse_percentage, parse_time, parse_weekday},
};

/// Wrapper for delivery methods in YAML
#[derive(Debug, Deserialize)]
pub struct DeliveryMethodsFixture {
    /// Map of method key -> method fixture
    pub delivery_methods: FxHashMap<String, DeliveryMethodFixture>,
}

/// Delivery method fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DeliveryMethodFixture {
    /// Display name
    pub name: String,

    /// Whether the method is offered
    #[serde(default = "default_true")]
    pub active: bool,

    /// Whether the method charges a fee at all
    #[serde(default = "default_true")]
    pub charge_fee: bool,

    /// Minimum subtotal to qualify for the method (e.g. "25.00 USD")
    #[serde(default)]
    pub minimum_grand_total: Option<String>,

    /// Subtotal at which the fee is waived (e.g. "75.00 USD")
    #[serde(default)]
    pub free_delivery_minimum: Option<String>,

    /// Fee configuration
    pub fee: FeeFixtureConfig,

    /// Schedule configuration
    #[serde(default)]
    pub schedule: Option<ScheduleFixtureConfig>,
}

/// Fee configuration from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeFixtureConfig {
    /// Same fee for every order (e.g. "5.00 USD")
    Flat {
        /// Amount string
        value: String,
    },

    /// Fee as a share of the subtotal (value between 0.0 and 1.0)
    Percentage {
        /// Rate as a decimal fraction
        value: f64,
    },

    /// Fee by distance band
    ByDistance {
        /// Bands ordered by ascending boundary
        zones: Vec<DistanceZoneFixture>,

        /// Fee when the destination is beyond every band
        fallback: FallbackFixtureConfig,
    },

    /// Fee by exact postal code
    ByPostalCode {
        /// Priced postal codes
        zones: Vec<PostalCodeZoneFixture>,

        /// Fee when no code matches
        fallback: FallbackFixtureConfig,
    },
}

/// Distance band from YAML
#[derive(Debug, Deserialize)]
pub struct DistanceZoneFixture {
    /// Upper boundary in kilometres, inclusive
    pub up_to_km: f64,

    /// Fee string (e.g. "20.00 USD")
    pub fee: String,
}

/// Postal code zone from YAML
#[derive(Debug, Deserialize)]
pub struct PostalCodeZoneFixture {
    /// The postal code
    pub code: String,

    /// Fee string (e.g. "9.00 USD")
    pub fee: String,
}

/// Fallback fee from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FallbackFixtureConfig {
    /// Fixed fallback fee
    Flat {
        /// Amount string
        value: String,
    },

    /// Fallback as a share of the subtotal
    Percentage {
        /// Rate as a decimal fraction
        value: f64,
    },
}

/// Schedule configuration from YAML
#[derive(Debug, Deserialize)]
pub struct ScheduleFixtureConfig {
    /// Weekday -> "09:00-17:00" windows
    pub hours: FxHashMap<String, Vec<String>>,

    /// Auto-generated slot interval; omit to use the windows as slots
    #[serde(default)]
    pub auto_generate: Option<IntervalFixture>,

    /// Minimum notice before a slot starts, e.g. "45 minutes" or "2 hours"
    #[serde(default)]
    pub minimum_notice: Option<String>,

    /// Maximum notice before a slot starts
    #[serde(default)]
    pub maximum_notice: Option<String>,

    /// Orders accepted per slot per day
    #[serde(default)]
    pub daily_order_limit: Option<u32>,
}

/// Slot interval from YAML
#[derive(Debug, Deserialize)]
pub struct IntervalFixture {
    /// Interval length
    pub value: u32,

    /// Interval unit
    pub unit: IntervalUnitFixture,
}

/// Interval unit from YAML
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnitFixture {
    /// Minutes
    Minutes,

    /// Hours
    Hours,
}

fn default_true() -> bool {
    true
}

impl TryFrom<FallbackFixtureConfig> for FallbackFee<'static> {
    type Error = FixtureError;

    fn try_from(config: FallbackFixtureConfig) -> Result<Self, Self::Error> {
        match config {
            FallbackFixtureConfig::Flat { value } => {
                let (minor_units, currency) = parse_money(&value)?;

                Ok(FallbackFee::Flat(Money::from_minor(minor_units, currency)))
            }
            FallbackFixtureConfig::Percentage { value } => {
                Ok(FallbackFee::Percentage(parse_percentage(value)?))
            }
        }
    }
}

impl TryFrom<FeeFixtureConfig> for FeePolicy<'static> {
    type Error = FixtureError;

    fn try_from(config: FeeFixtureConfig) -> Result<Self, Self::Error> {
        match config {
            FeeFixtureConfig::Flat { value } => {
                let (minor_units, currency) = parse_money(&value)?;

                Ok(FeePolicy::Flat(Money::from_minor(minor_units, currency)))
            }
            FeeFixtureConfig::Percentage { value } => {
                Ok(FeePolicy::Percentage(parse_percentage(value)?))
            }
            FeeFixtureConfig::ByDistance { zones, fallback } => {
                let zones = zones
                    .into_iter()
                    .map(|zone| {
                        let Some(up_to_km) = Decimal::from_f64(zone.up_to_km) else {
                            return Err(FixtureError::InvalidDistance(zone.up_to_km.to_string()));
                        };

                        let (minor_units, currency) = parse_money(&zone.fee)?;

                        Ok(DistanceZone::new(
                            up_to_km,
                            Money::from_minor(minor_units, currency),
                        ))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(FeePolicy::ByDistance {
                    zones,
                    fallback: FallbackFee::try_from(fallback)?,
                })
            }
            FeeFixtureConfig::ByPostalCode { zones, fallback } => {
                let zones = zones
                    .into_iter()
                    .map(|zone| {
                        let (minor_units, currency) = parse_money(&zone.fee)?;

                        Ok(PostalCodeZone::new(
                            zone.code.trim().to_string(),
                            Money::from_minor(minor_units, currency),
                        ))
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                Ok(FeePolicy::ByPostalCode {
                    zones,
                    fallback: FallbackFee::try_from(fallback)?,
                })
            }
        }
    }
}

impl TryFrom<ScheduleFixtureConfig> for DeliverySchedule {
    type Error = FixtureError;

    fn try_from(config: ScheduleFixtureConfig) -> Result<Self, Self::Error> {
        let mut hours = OperationalHours::new();

        for (day, windows) in config.hours {
            let weekday = parse_weekday(&day)?;

            for window in windows {
                let Some((opens, closes)) = window.split_once('-') else {
                    return Err(FixtureError::InvalidWindow(window));
                };

                hours.add_window(weekday, parse_time(opens.trim())?, parse_time(closes.trim())?)?;
            }
        }

        let mut schedule = DeliverySchedule::new(hours);

        if let Some(interval) = config.auto_generate {
            let unit = match interval.unit {
                IntervalUnitFixture::Minutes => IntervalUnit::Minutes,
                IntervalUnitFixture::Hours => IntervalUnit::Hours,
            };

            schedule = schedule.with_auto_generate(SlotInterval::new(interval.value, unit)?);
        }

        if let Some(notice) = config.minimum_notice {
            schedule = schedule.with_minimum_notice(parse_notice(&notice)?)?;
        }

        if let Some(notice) = config.maximum_notice {
            schedule = schedule.with_maximum_notice(parse_notice(&notice)?)?;
        }

        if let Some(limit) = config.daily_order_limit {
            schedule = schedule.with_daily_order_limit(limit);
        }

        Ok(schedule)
    }
}

impl TryFrom<DeliveryMethodFixture> for DeliveryMethod<'static> {
    type Error = FixtureError;

    fn try_from(fixture: DeliveryMethodFixture) -> Result<Self, Self::Error> {
        let policy = FeePolicy::try_from(fixture.fee)?;

        let mut method =
            DeliveryMethod::new(fixture.name, fixture.active, fixture.charge_fee, policy)?;

        if let Some(minimum) = fixture.minimum_grand_total {
            let (minor_units, currency) = parse_money(&minimum)?;
            method = method.with_minimum_grand_total(Money::from_minor(minor_units, currency));
        }

        if let Some(minimum) = fixture.free_delivery_minimum {
            let (minor_units, currency) = parse_money(&minimum)?;
            method = method.with_free_delivery_minimum(Money::from_minor(minor_units, currency));
        }

        if let Some(schedule) = fixture.schedule {
            method = method.with_schedule(DeliverySchedule::try_from(schedule)?);
        }

        Ok(method)
    }
}
