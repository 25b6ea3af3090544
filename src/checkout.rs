//! Checkout Evaluation
//!
//! The facade checkout handlers call: coupon evaluation, delivery pricing
//! and slot listing over pre-validated records. Everything here is pure and
//! synchronous; the caller supplies the clock.

use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::{
    context::OrderContext,
    coupons::{Coupon, discount::compute_discount},
    delivery::{
        DeliveryMethod,
        fees::{DeliveryFeeError, compute_fee},
        schedule::{ScheduleError, TimeSlot},
    },
    money::MoneyMathError,
};

/// Outcome of evaluating a coupon against an order.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponEvaluation<'a> {
    /// Whether the coupon qualifies for this order.
    pub qualifies: bool,

    /// Discount granted; zero when the coupon does not qualify.
    pub discount: Money<'a, Currency>,

    /// Whether delivery is free; false when the coupon does not qualify.
    pub free_delivery: bool,
}

/// Evaluate a coupon against an order snapshot.
///
/// A coupon that does not qualify is a normal result, not an error: the
/// evaluation reports `qualifies: false` with a zero discount.
///
/// # Errors
///
/// Returns a [`MoneyMathError`] when a qualifying coupon's discount cannot
/// be computed (percentage overflow or a misconfigured fixed-discount
/// currency).
pub fn evaluate_coupon<'a>(
    coupon: &Coupon<'a>,
    ctx: &OrderContext<'a>,
    now: NaiveDateTime,
) -> Result<CouponEvaluation<'a>, MoneyMathError> {
    if !coupon.is_active(ctx, now) {
        return Ok(CouponEvaluation {
            qualifies: false,
            discount: Money::from_minor(0, ctx.subtotal().currency()),
            free_delivery: false,
        });
    }

    let savings = compute_discount(coupon, ctx.subtotal())?;

    Ok(CouponEvaluation {
        qualifies: true,
        discount: savings.discount,
        free_delivery: savings.free_delivery,
    })
}

/// Price delivery for an order.
///
/// # Errors
///
/// Returns a [`DeliveryFeeError`] when a zoned policy is missing its
/// destination kind or percentage math cannot be represented.
pub fn evaluate_delivery_fee<'a>(
    method: &DeliveryMethod<'a>,
    ctx: &OrderContext<'a>,
) -> Result<Money<'a, Currency>, DeliveryFeeError> {
    compute_fee(method, ctx)
}

/// List the available delivery slots for a date.
///
/// `booked` carries the number of orders already scheduled per slot; a
/// method without schedule configuration has no slots.
///
/// # Errors
///
/// Returns a [`ScheduleError`] when the requested date is in the past.
pub fn list_available_slots(
    method: &DeliveryMethod<'_>,
    date: NaiveDate,
    now: NaiveDateTime,
    booked: &FxHashMap<TimeSlot, u32>,
) -> Result<Vec<TimeSlot>, ScheduleError> {
    match method.schedule() {
        Some(schedule) => schedule.generate_slots(date, now, booked),
        None => Ok(Vec::new()),
    }
}
