//! Delivery Methods
//!
//! Store-scoped delivery options: fee policies, qualification thresholds
//! and schedule configuration. Construction validates the configuration so
//! the fee and slot calculators only ever see well-formed methods.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;

use crate::delivery::schedule::DeliverySchedule;

pub mod fees;
pub mod schedule;

new_key_type! {
    /// Delivery Method Key
    pub struct DeliveryMethodKey;
}

/// Errors from delivery method configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryConfigError {
    /// A zoned policy was configured without zones.
    #[error("a zoned fee policy needs at least one zone")]
    EmptyZones,

    /// Distance zone boundaries must increase strictly.
    #[error("distance zone boundaries must be strictly ascending")]
    UnorderedZones,

    /// Two postal code zones share a code.
    #[error("duplicate postal code zone: {0}")]
    DuplicatePostalCode(String),

    /// An operational-hours window closes at or before it opens.
    #[error("operational hours window must close after it opens")]
    WindowInverted,

    /// Two operational-hours windows on the same day overlap.
    #[error("operational hours windows on the same day must not overlap")]
    OverlappingWindows,

    /// Minimum notice exceeds maximum notice.
    #[error("earliest delivery time must not be after latest delivery time")]
    NoticeWindowInverted,

    /// Slot interval must be non-zero.
    #[error("time slot interval must be greater than zero")]
    ZeroInterval,
}

/// Fee applied when no zone matches the destination.
///
/// Zoned policies carry one of these so a method that charges can never
/// price an unmatched destination as free by default.
#[derive(Debug, Copy, Clone)]
pub enum FallbackFee<'a> {
    /// Fixed fallback fee.
    Flat(Money<'a, Currency>),

    /// Fallback fee as a share of the order subtotal.
    Percentage(Percentage),
}

/// A distance band with its fee.
///
/// A zone covers distances from the previous zone's boundary (exclusive)
/// up to and including its own; the first zone starts at zero.
#[derive(Debug, Copy, Clone)]
pub struct DistanceZone<'a> {
    up_to_km: Decimal,
    fee: Money<'a, Currency>,
}

impl<'a> DistanceZone<'a> {
    /// Create a zone reaching up to the given distance.
    #[must_use]
    pub fn new(up_to_km: Decimal, fee: Money<'a, Currency>) -> Self {
        Self { up_to_km, fee }
    }

    /// Upper distance boundary in kilometres, inclusive.
    #[must_use]
    pub fn up_to_km(&self) -> Decimal {
        self.up_to_km
    }

    /// Fee charged within this zone.
    #[must_use]
    pub fn fee(&self) -> &Money<'a, Currency> {
        &self.fee
    }
}

/// A postal code with its fee.
#[derive(Debug, Clone)]
pub struct PostalCodeZone<'a> {
    code: String,
    fee: Money<'a, Currency>,
}

impl<'a> PostalCodeZone<'a> {
    /// Create a zone for one postal code.
    pub fn new(code: impl Into<String>, fee: Money<'a, Currency>) -> Self {
        Self {
            code: code.into(),
            fee,
        }
    }

    /// The postal code this zone prices.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Fee charged for this postal code.
    #[must_use]
    pub fn fee(&self) -> &Money<'a, Currency> {
        &self.fee
    }
}

/// How a delivery method charges.
#[derive(Debug, Clone)]
pub enum FeePolicy<'a> {
    /// Same fee for every order.
    Flat(Money<'a, Currency>),

    /// Fee as a share of the order subtotal.
    Percentage(Percentage),

    /// Fee from the first distance zone containing the destination.
    ByDistance {
        /// Zones ordered by ascending boundary.
        zones: Vec<DistanceZone<'a>>,

        /// Fee when the destination is beyond every zone.
        fallback: FallbackFee<'a>,
    },

    /// Fee from an exact postal code match.
    ByPostalCode {
        /// Priced postal codes.
        zones: Vec<PostalCodeZone<'a>>,

        /// Fee when no postal code matches.
        fallback: FallbackFee<'a>,
    },
}

impl FeePolicy<'_> {
    /// Validate zone configuration.
    fn validate(&self) -> Result<(), DeliveryConfigError> {
        match self {
            Self::Flat(_) | Self::Percentage(_) => Ok(()),
            Self::ByDistance { zones, .. } => {
                if zones.is_empty() {
                    return Err(DeliveryConfigError::EmptyZones);
                }

                let ascending = zones
                    .windows(2)
                    .all(|pair| matches!(pair, [a, b] if a.up_to_km() < b.up_to_km()));

                if ascending {
                    Ok(())
                } else {
                    Err(DeliveryConfigError::UnorderedZones)
                }
            }
            Self::ByPostalCode { zones, .. } => {
                if zones.is_empty() {
                    return Err(DeliveryConfigError::EmptyZones);
                }

                for (idx, zone) in zones.iter().enumerate() {
                    let duplicated = zones
                        .iter()
                        .skip(idx + 1)
                        .any(|other| other.code().eq_ignore_ascii_case(zone.code()));

                    if duplicated {
                        return Err(DeliveryConfigError::DuplicatePostalCode(
                            zone.code().to_string(),
                        ));
                    }
                }

                Ok(())
            }
        }
    }
}

/// A delivery option offered by a store.
#[derive(Debug, Clone)]
pub struct DeliveryMethod<'a> {
    name: String,
    active: bool,
    charge_fee: bool,
    minimum_grand_total: Option<Money<'a, Currency>>,
    free_delivery_minimum: Option<Money<'a, Currency>>,
    policy: FeePolicy<'a>,
    schedule: Option<DeliverySchedule>,
}

impl<'a> DeliveryMethod<'a> {
    /// Create a delivery method, validating the fee policy.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryConfigError`] when the policy's zones are empty,
    /// out of order, or duplicated.
    pub fn new(
        name: impl Into<String>,
        active: bool,
        charge_fee: bool,
        policy: FeePolicy<'a>,
    ) -> Result<Self, DeliveryConfigError> {
        policy.validate()?;

        Ok(Self {
            name: name.into(),
            active,
            charge_fee,
            minimum_grand_total: None,
            free_delivery_minimum: None,
            policy,
            schedule: None,
        })
    }

    /// Require a minimum order subtotal to qualify for this method.
    #[must_use]
    pub fn with_minimum_grand_total(mut self, minimum: Money<'a, Currency>) -> Self {
        self.minimum_grand_total = Some(minimum);
        self
    }

    /// Waive the fee for orders at or above this subtotal.
    #[must_use]
    pub fn with_free_delivery_minimum(mut self, minimum: Money<'a, Currency>) -> Self {
        self.free_delivery_minimum = Some(minimum);
        self
    }

    /// Attach schedule configuration.
    #[must_use]
    pub fn with_schedule(mut self, schedule: DeliverySchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Method display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the method is offered at all.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Whether this method charges a delivery fee.
    #[must_use]
    pub fn charges_fee(&self) -> bool {
        self.charge_fee
    }

    /// Qualification threshold, when configured.
    #[must_use]
    pub fn minimum_grand_total(&self) -> Option<&Money<'a, Currency>> {
        self.minimum_grand_total.as_ref()
    }

    /// Free-delivery threshold, when configured.
    #[must_use]
    pub fn free_delivery_minimum(&self) -> Option<&Money<'a, Currency>> {
        self.free_delivery_minimum.as_ref()
    }

    /// The configured fee policy.
    #[must_use]
    pub fn policy(&self) -> &FeePolicy<'a> {
        &self.policy
    }

    /// Schedule configuration, when the method offers time slots.
    #[must_use]
    pub fn schedule(&self) -> Option<&DeliverySchedule> {
        self.schedule.as_ref()
    }

    /// Whether an order subtotal qualifies for this method.
    ///
    /// A method without a qualification threshold accepts every order; a
    /// threshold in a different currency than the subtotal fails closed.
    #[must_use]
    pub fn qualifies(&self, subtotal: &Money<'_, Currency>) -> bool {
        self.minimum_grand_total.as_ref().is_none_or(|minimum| {
            subtotal.currency() == minimum.currency()
                && subtotal.to_minor_units() >= minimum.to_minor_units()
        })
    }
}
