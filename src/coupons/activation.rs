//! Coupon Activation Rules
//!
//! Each enabled activation switch on a coupon becomes one rule. Rules are
//! independent AND-combined predicates: a coupon qualifies only when every
//! configured rule passes, and a disabled switch simply has no rule.

use chrono::NaiveDateTime;
use rusty_money::{Money, iso::Currency};

use crate::{
    context::OrderContext,
    tokens::{TokenSet, hour_token, month_day_token, month_token, weekday_token},
};

/// A single qualification constraint on a coupon.
#[derive(Debug, Clone)]
pub enum ActivationRule<'a> {
    /// The order must supply this redemption code.
    RequiresCode(String),

    /// The coupon is valid from this moment.
    StartsAt(NaiveDateTime),

    /// The coupon is valid until this moment.
    EndsAt(NaiveDateTime),

    /// Valid during these hours of the day (`"00:00"`..`"23:00"`).
    HoursOfDay(TokenSet),

    /// Valid on these weekdays (`"monday"`..`"sunday"`).
    DaysOfWeek(TokenSet),

    /// Valid on these days of the month (`"01"`..`"31"`).
    DaysOfMonth(TokenSet),

    /// Valid in these months (`"january"`..`"december"`).
    MonthsOfYear(TokenSet),

    /// Valid while the coupon's usage counter is above zero.
    UsageRemaining,

    /// The order subtotal must reach this amount.
    MinimumSubtotal(Money<'a, Currency>),

    /// The order must contain at least this many distinct products.
    MinimumUniqueProducts(u32),

    /// The order must contain at least this many items in total.
    MinimumTotalQuantity(u32),

    /// Only orders from first-time customers qualify.
    NewCustomersOnly,

    /// Only orders from returning customers qualify.
    ExistingCustomersOnly,
}

impl ActivationRule<'_> {
    /// Evaluate this rule against an order.
    ///
    /// `usage_remaining` is the owning coupon's redemption counter. Rules
    /// never error: data the rule needs that the context does not carry
    /// fails the rule closed.
    #[must_use]
    pub fn is_satisfied(
        &self,
        ctx: &OrderContext<'_>,
        now: NaiveDateTime,
        usage_remaining: Option<u32>,
    ) -> bool {
        match self {
            Self::RequiresCode(code) => ctx
                .supplied_code()
                .is_some_and(|supplied| supplied.trim().eq_ignore_ascii_case(code)),
            Self::StartsAt(start) => now >= *start,
            Self::EndsAt(end) => now <= *end,
            Self::HoursOfDay(hours) => hours.contains(&hour_token(now)),
            Self::DaysOfWeek(days) => days.contains(&weekday_token(now)),
            Self::DaysOfMonth(days) => days.contains(&month_day_token(now)),
            Self::MonthsOfYear(months) => months.contains(&month_token(now)),
            Self::UsageRemaining => usage_remaining.is_some_and(|remaining| remaining > 0),
            Self::MinimumSubtotal(threshold) => subtotal_meets(ctx.subtotal(), threshold),
            Self::MinimumUniqueProducts(min) => ctx.unique_products() >= *min,
            Self::MinimumTotalQuantity(min) => ctx.total_quantity() >= *min,
            Self::NewCustomersOnly => ctx.new_customer() == Some(true),
            Self::ExistingCustomersOnly => ctx.new_customer() == Some(false),
        }
    }
}

/// Threshold comparison on the subtotal; a currency mismatch fails closed.
fn subtotal_meets(subtotal: &Money<'_, Currency>, threshold: &Money<'_, Currency>) -> bool {
    subtotal.currency() == threshold.currency()
        && subtotal.to_minor_units() >= threshold.to_minor_units()
}
