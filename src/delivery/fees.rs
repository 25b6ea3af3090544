//! Delivery Fees
//!
//! Prices delivery for an order against a method's fee policy: flat and
//! percentage fees, zone lookups by distance or postal code, and the
//! fallback fee when no zone matches.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    context::{Destination, OrderContext},
    delivery::{DeliveryMethod, DistanceZone, FallbackFee, FeePolicy, PostalCodeZone},
    money::{MoneyMathError, percent_of_minor},
};

/// Errors while pricing delivery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryFeeError {
    /// The fee policy needs a destination the context does not carry.
    #[error("fee policy needs a {needed} destination")]
    MissingDestination {
        /// The kind of destination the policy dispatches on.
        needed: &'static str,
    },

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyMathError),
}

/// Compute the delivery charge for an order.
///
/// A method that does not charge, or an order at or above the
/// free-delivery threshold, is priced at zero before any policy dispatch.
/// Zone misses are not errors: they fall through to the policy's fallback
/// fee.
///
/// # Errors
///
/// - [`DeliveryFeeError::MissingDestination`] when a zoned policy is
///   evaluated against a context without the matching destination kind.
/// - [`DeliveryFeeError::Money`] when percentage math cannot be
///   represented in minor units.
pub fn compute_fee<'a>(
    method: &DeliveryMethod<'a>,
    ctx: &OrderContext<'a>,
) -> Result<Money<'a, Currency>, DeliveryFeeError> {
    let currency = ctx.subtotal().currency();

    if !method.charges_fee() {
        return Ok(Money::from_minor(0, currency));
    }

    if let Some(threshold) = method.free_delivery_minimum() {
        let qualifies = threshold.currency() == currency
            && ctx.subtotal().to_minor_units() >= threshold.to_minor_units();

        if qualifies {
            return Ok(Money::from_minor(0, currency));
        }
    }

    match method.policy() {
        FeePolicy::Flat(rate) => Ok(*rate),
        FeePolicy::Percentage(rate) => Ok(percentage_fee(*rate, ctx)?),
        FeePolicy::ByDistance { zones, fallback } => {
            let Some(Destination::Distance(km)) = ctx.destination() else {
                return Err(DeliveryFeeError::MissingDestination { needed: "distance" });
            };

            match distance_zone_fee(zones, *km) {
                Some(fee) => Ok(fee),
                None => Ok(fallback_fee(*fallback, ctx)?),
            }
        }
        FeePolicy::ByPostalCode { zones, fallback } => {
            let Some(Destination::PostalCode(code)) = ctx.destination() else {
                return Err(DeliveryFeeError::MissingDestination {
                    needed: "postal code",
                });
            };

            match postal_code_zone_fee(zones, code) {
                Some(fee) => Ok(fee),
                None => Ok(fallback_fee(*fallback, ctx)?),
            }
        }
    }
}

/// First zone whose band contains the distance; zones ascend by boundary.
fn distance_zone_fee<'a>(zones: &[DistanceZone<'a>], km: Decimal) -> Option<Money<'a, Currency>> {
    zones
        .iter()
        .find(|zone| km <= zone.up_to_km())
        .map(|zone| *zone.fee())
}

/// Exact postal code match, trimmed and case-insensitive.
fn postal_code_zone_fee<'a>(
    zones: &[PostalCodeZone<'a>],
    code: &str,
) -> Option<Money<'a, Currency>> {
    let code = code.trim();

    zones
        .iter()
        .find(|zone| zone.code().eq_ignore_ascii_case(code))
        .map(|zone| *zone.fee())
}

fn percentage_fee<'a>(
    rate: decimal_percentage::Percentage,
    ctx: &OrderContext<'a>,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    let minor = percent_of_minor(rate, ctx.subtotal().to_minor_units())?;

    Ok(Money::from_minor(minor.max(0), ctx.subtotal().currency()))
}

/// Fallback pricing reuses the flat/percentage logic.
fn fallback_fee<'a>(
    fallback: FallbackFee<'a>,
    ctx: &OrderContext<'a>,
) -> Result<Money<'a, Currency>, MoneyMathError> {
    match fallback {
        FallbackFee::Flat(rate) => Ok(rate),
        FallbackFee::Percentage(rate) => percentage_fee(rate, ctx),
    }
}
